//! Shared handler context.

use crate::notify::Notifier;
use folio_core::entity::Account;
use folio_core::{Service, SessionId};
use std::sync::Arc;

use crate::http::Request;

/// What every handler closes over: the domain service and the mail
/// notifier.
pub struct AppState {
    /// The domain layer.
    pub service: Arc<Service>,
    /// Outbound mail.
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Bundles a service with a notifier.
    pub fn new(service: Arc<Service>, notifier: Arc<dyn Notifier>) -> Self {
        Self { service, notifier }
    }

    /// Resolves the request's session cookie to its account, extending
    /// the session on success.
    pub fn current_account(&self, request: &Request) -> Option<Account> {
        let id: SessionId = request.cookie("session")?.parse().ok()?;
        let name = self.service.sessions().touch(id)?;
        self.service.accounts().get(&name).ok().flatten()
    }
}
