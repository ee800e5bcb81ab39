//! # Mock Framework
//!
//! Utilities for testing code that talks to a [`ResourceClient`] without spawning the real
//! actor, e.g. to make the order store fail on demand.
//!
//! ```ignore
//! let mut mock = MockClient::<Order>::new();
//! mock.expect_get(user_id.clone()).return_ok(None);
//! mock.expect_save().return_err(FrameworkError::ActorClosed);
//!
//! let store = OrderStoreClient::new(mock.client());
//! // Exercise the code under test...
//! mock.verify(); // Ensures all expectations were met
//! ```

use crate::framework::{ActorEntity, FrameworkError, ResourceClient, ResourceRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected request and the answer to give.
enum Expectation<T: ActorEntity> {
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    List {
        response: Result<Vec<T>, FrameworkError>,
    },
    /// `None` answers with the entity that was sent.
    Save {
        response: Option<Result<T, FrameworkError>>,
    },
    Remove {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    Clear {
        response: Result<usize, FrameworkError>,
    },
}

type Expectations<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock client with expectation tracking for fluent testing.
///
/// Requests must arrive in the order the expectations were registered; anything else
/// panics the background task, which surfaces as `ActorDropped` in the caller.
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Expectations<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Expectations<T> = Arc::new(Mutex::new(VecDeque::new()));
        let expectations_clone = expectations.clone();

        // Spawn background task to handle requests
        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = expectations_clone.lock().unwrap().pop_front();

                match (request, expectation) {
                    (ResourceRequest::Get { id, respond_to }, Some(Expectation::Get { id: expected, response })) => {
                        assert_eq!(id, expected, "get called with an unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::List { respond_to }, Some(Expectation::List { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Save { entity, respond_to }, Some(Expectation::Save { response })) => {
                        let _ = respond_to.send(response.unwrap_or(Ok(entity)));
                    }
                    (ResourceRequest::Remove { id, respond_to }, Some(Expectation::Remove { id: expected, response })) => {
                        assert_eq!(id, expected, "remove called with an unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Clear { respond_to }, Some(Expectation::Clear { response })) => {
                        let _ = respond_to.send(response);
                    }
                    _ => {
                        panic!("Unexpected request or expectation mismatch");
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    /// Expects a `get` operation.
    pub fn expect_get(&mut self, id: T::Id) -> GetExpectationBuilder<T> {
        GetExpectationBuilder {
            id,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `list` operation.
    pub fn expect_list(&mut self) -> ListExpectationBuilder<T> {
        ListExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `save` operation.
    pub fn expect_save(&mut self) -> SaveExpectationBuilder<T> {
        SaveExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `remove` operation.
    pub fn expect_remove(&mut self, id: T::Id) -> RemoveExpectationBuilder<T> {
        RemoveExpectationBuilder {
            id,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `clear` operation.
    pub fn expect_clear(&mut self) -> ClearExpectationBuilder<T> {
        ClearExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `get` expectations.
pub struct GetExpectationBuilder<T: ActorEntity> {
    id: T::Id,
    expectations: Expectations<T>,
}

impl<T: ActorEntity> GetExpectationBuilder<T> {
    pub fn return_ok(self, value: Option<T>) {
        self.expectations.lock().unwrap().push_back(Expectation::Get {
            id: self.id,
            response: Ok(value),
        });
    }

    pub fn return_err(self, error: FrameworkError) {
        self.expectations.lock().unwrap().push_back(Expectation::Get {
            id: self.id,
            response: Err(error),
        });
    }
}

/// Builder for `list` expectations.
pub struct ListExpectationBuilder<T: ActorEntity> {
    expectations: Expectations<T>,
}

impl<T: ActorEntity> ListExpectationBuilder<T> {
    pub fn return_ok(self, items: Vec<T>) {
        self.expectations.lock().unwrap().push_back(Expectation::List { response: Ok(items) });
    }

    pub fn return_err(self, error: FrameworkError) {
        self.expectations.lock().unwrap().push_back(Expectation::List { response: Err(error) });
    }
}

/// Builder for `save` expectations.
pub struct SaveExpectationBuilder<T: ActorEntity> {
    expectations: Expectations<T>,
}

impl<T: ActorEntity> SaveExpectationBuilder<T> {
    /// Accepts the save and answers with the entity as sent.
    pub fn return_saved(self) {
        self.expectations.lock().unwrap().push_back(Expectation::Save { response: None });
    }

    pub fn return_ok(self, stored: T) {
        self.expectations.lock().unwrap().push_back(Expectation::Save { response: Some(Ok(stored)) });
    }

    pub fn return_err(self, error: FrameworkError) {
        self.expectations.lock().unwrap().push_back(Expectation::Save { response: Some(Err(error)) });
    }
}

/// Builder for `remove` expectations.
pub struct RemoveExpectationBuilder<T: ActorEntity> {
    id: T::Id,
    expectations: Expectations<T>,
}

impl<T: ActorEntity> RemoveExpectationBuilder<T> {
    pub fn return_ok(self, removed: Option<T>) {
        self.expectations.lock().unwrap().push_back(Expectation::Remove {
            id: self.id,
            response: Ok(removed),
        });
    }

    pub fn return_err(self, error: FrameworkError) {
        self.expectations.lock().unwrap().push_back(Expectation::Remove {
            id: self.id,
            response: Err(error),
        });
    }
}

/// Builder for `clear` expectations.
pub struct ClearExpectationBuilder<T: ActorEntity> {
    expectations: Expectations<T>,
}

impl<T: ActorEntity> ClearExpectationBuilder<T> {
    pub fn return_ok(self, removed: usize) {
        self.expectations.lock().unwrap().push_back(Expectation::Clear { response: Ok(removed) });
    }

    pub fn return_err(self, error: FrameworkError) {
        self.expectations.lock().unwrap().push_back(Expectation::Clear { response: Err(error) });
    }
}
