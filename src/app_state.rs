use std::sync::Arc;

use crate::services::{relay::RelayService, signature::SignatureVerifier};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayService>,
    pub verifier: Arc<dyn SignatureVerifier>,
}

impl AppState {
    pub fn new(relay: RelayService, verifier: impl SignatureVerifier + 'static) -> Self {
        Self {
            relay: Arc::new(relay),
            verifier: Arc::new(verifier),
        }
    }
}
