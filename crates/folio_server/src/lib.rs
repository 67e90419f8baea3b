//! # Folio Server
//!
//! The HTTP front end of the Folio publishing service.
//!
//! This crate provides:
//! - A small hand-rolled HTTP layer (request parsing, responses, routing)
//! - A connection dispatcher that runs one task per connection
//! - Handlers for every route: accounts, articles, comments,
//!   notifications, verification and the audit log
//! - A background sweeper that expires idle sessions
//!
//! # Architecture
//!
//! All domain state lives in [`folio_core::Service`]; this crate never
//! touches the data files directly. One [`AppState`] is shared by every
//! connection task, and each handler is a plain function from request
//! to response:
//!
//! ```rust,ignore
//! use folio_server::{register_routes, AppState, Dispatcher, Router};
//!
//! let mut router = Router::new();
//! register_routes(&mut router, service.static_dir());
//! let dispatcher = Dispatcher::new(router, Arc::new(AppState::new(service, notifier)));
//! dispatcher.serve(listener).await?;
//! ```
//!
//! Requests that fail handler-side validation get an HTML error page
//! with status 200; protocol-level failures get 400/404/500. A handler
//! panic is contained to its connection.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod dispatch;
mod error;
mod handlers;
pub mod http;
mod notify;
mod state;
mod sweep;

pub use config::ServerConfig;
pub use dispatch::Dispatcher;
pub use error::{ServerError, ServerResult};
pub use handlers::register_routes;
pub use http::{Handler, Method, Request, Response, Router};
pub use notify::{LogNotifier, Notifier, RecordingNotifier};
pub use state::AppState;
pub use sweep::spawn_sweeper;
