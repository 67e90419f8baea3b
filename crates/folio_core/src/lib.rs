//! # Folio Core
//!
//! Domain layer of the Folio publishing service.
//!
//! This crate provides:
//! - The flat-file [`RecordStore`] backing every persisted entity
//! - Entity types and their binary layouts (accounts, articles,
//!   comments, notifications)
//! - The [`SessionTable`] with sliding expiry
//! - Per-account notifications and daily audit [`EventLog`] files
//! - The [`Service`] facade the HTTP layer and CLI consume
//!
//! Persistence is explicit: entities are plain data, and nothing
//! touches disk until a repository `save` (or equivalent) is called.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod accounts;
pub mod articles;
pub mod clock;
pub mod comments;
pub mod dir;
pub mod entity;
pub mod error;
pub mod eventlog;
pub mod notifications;
pub mod service;
pub mod session;
pub mod store;

pub use accounts::{signup_grace_validator, AccountRegistry};
pub use articles::ArticleRepo;
pub use clock::{Clock, ManualClock, SystemClock};
pub use comments::CommentLog;
pub use dir::ServiceDir;
pub use entity::{
    Account, Article, Comment, Notification, NotificationSeverity, Permission, PublishStatus,
};
pub use error::{CoreError, CoreResult};
pub use eventlog::{EventLog, EventQuery, EventSeverity, LogEvent};
pub use notifications::NotificationStore;
pub use service::Service;
pub use session::{SessionId, SessionTable, DEFAULT_SESSION_TTL};
pub use store::{Record, RecordStore, Slot};
