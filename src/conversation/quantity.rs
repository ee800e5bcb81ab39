//! Parsing of typed quantity replies.

use crate::model::{MAX_QUANTITY, MIN_QUANTITY};

/// A well-formed answer to a quantity prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuantityAnswer {
    Set(u8),
    /// `0` or `-`: drop the item.
    Remove,
}

impl QuantityAnswer {
    /// `None` when the text is neither a removal sentinel nor a whole number in range.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "0" | "-" => Some(QuantityAnswer::Remove),
            digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => digits
                .parse::<u8>()
                .ok()
                .filter(|n| (MIN_QUANTITY..=MAX_QUANTITY).contains(n))
                .map(QuantityAnswer::Set),
            _ => None,
        }
    }
}
