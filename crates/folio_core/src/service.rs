//! The service facade tying the stores together.

use crate::accounts::{signup_grace_validator, AccountRegistry};
use crate::articles::ArticleRepo;
use crate::clock::Clock;
use crate::comments::CommentLog;
use crate::dir::ServiceDir;
use crate::error::CoreResult;
use crate::eventlog::{EventLog, EventSeverity, LogEvent};
use crate::notifications::NotificationStore;
use crate::session::{SessionTable, DEFAULT_SESSION_TTL};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Everything a handler needs: the stores, the session table and the
/// audit log, sharing one data directory and one clock.
///
/// Each store carries its own lock; there is no cross-store atomicity.
/// A handler updating two stores can observe one write without the
/// other (accepted non-goal, see DESIGN.md).
pub struct Service {
    dir: ServiceDir,
    clock: Arc<dyn Clock>,
    accounts: AccountRegistry,
    articles: ArticleRepo,
    comments: CommentLog,
    notifications: NotificationStore,
    events: EventLog,
    sessions: SessionTable,
}

impl Service {
    /// Opens the data directory and every store, then loads the account
    /// registry with the startup verification-grace policy.
    pub fn open(path: &Path, clock: Arc<dyn Clock>) -> CoreResult<Self> {
        Self::open_with_ttl(path, clock, DEFAULT_SESSION_TTL)
    }

    /// Like [`Service::open`] with an explicit session lifetime.
    pub fn open_with_ttl(
        path: &Path,
        clock: Arc<dyn Clock>,
        session_ttl: Duration,
    ) -> CoreResult<Self> {
        let dir = ServiceDir::open(path)?;
        let root = dir.path().to_path_buf();

        let accounts = AccountRegistry::open(&root)?;
        let live = accounts.load(signup_grace_validator(clock.now()))?;
        info!(accounts = live, root = %root.display(), "service opened");

        Ok(Self {
            accounts,
            articles: ArticleRepo::open(&root)?,
            comments: CommentLog::open(&root)?,
            notifications: NotificationStore::open(&root)?,
            events: EventLog::open(&root)?,
            sessions: SessionTable::new(clock.clone(), session_ttl),
            clock,
            dir,
        })
    }

    /// The time source every component shares.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// The account registry.
    pub fn accounts(&self) -> &AccountRegistry {
        &self.accounts
    }

    /// The article repository.
    pub fn articles(&self) -> &ArticleRepo {
        &self.articles
    }

    /// The per-discussion comment logs.
    pub fn comments(&self) -> &CommentLog {
        &self.comments
    }

    /// The per-account notification store.
    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    /// The audit event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The session table.
    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    /// The directory serving static files.
    pub fn static_dir(&self) -> PathBuf {
        self.dir.static_dir()
    }

    /// Records one audit event stamped with the service clock.
    pub fn log_event(
        &self,
        severity: EventSeverity,
        description: impl Into<String>,
        username: Option<&str>,
        address: Option<IpAddr>,
    ) -> CoreResult<()> {
        self.events.record(&LogEvent {
            severity,
            description: description.into(),
            username: username.map(String::from),
            address,
            time: self.clock.now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::eventlog::EventQuery;
    use folio_codec::Ticks;
    use tempfile::tempdir;

    fn service(path: &Path) -> Service {
        let clock = Arc::new(ManualClock::new(Ticks::from_unix_seconds(1_700_000_000)));
        Service::open(path, clock).unwrap()
    }

    #[test]
    fn opens_all_stores_together() {
        let dir = tempdir().unwrap();
        let service = service(dir.path());

        service
            .accounts()
            .register("alice1234", "pw", "a@x.com", service.clock().now())
            .unwrap();
        let article = service
            .articles()
            .submit("T".into(), "B".into(), "alice1234".into(), service.clock().now())
            .unwrap();
        assert!(service.articles().exists(article.id));

        let id = service.sessions().create("alice1234").unwrap();
        assert_eq!(service.sessions().touch(id).as_deref(), Some("alice1234"));
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let service = service(dir.path());
            service
                .accounts()
                .register("alice1234", "pw", "a@x.com", service.clock().now())
                .unwrap();
            service.accounts().mark_verified("alice1234").unwrap();
        }
        let service = service(dir.path());
        assert!(service.accounts().require("alice1234").unwrap().verified);
    }

    #[test]
    fn log_event_lands_in_query() {
        let dir = tempdir().unwrap();
        let service = service(dir.path());

        service
            .log_event(
                EventSeverity::Alert,
                "unauthorized permission change",
                Some("alice1234"),
                None,
            )
            .unwrap();

        let now = service.clock().now();
        let events = service
            .events()
            .query(Ticks::ZERO, now, &EventQuery::default())
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].username.as_deref(), Some("alice1234"));
    }
}
