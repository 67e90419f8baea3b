//! Persistent entity types and their on-disk layouts.

mod account;
mod article;
mod comment;
mod notification;
mod permission;

pub use account::Account;
pub use article::{Article, PublishStatus, ARTICLE_FORMAT_CURRENT, ARTICLE_FORMAT_LEGACY};
pub use comment::Comment;
pub use notification::{Notification, NotificationSeverity};
pub use permission::Permission;
