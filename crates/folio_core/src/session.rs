//! The session table.

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use folio_codec::Ticks;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Default sliding session lifetime.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(15 * 60);

/// An opaque 128-bit bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

struct Entry {
    account: String,
    expiry: Ticks,
}

struct Inner {
    sessions: HashMap<SessionId, Entry>,
    logged_in: HashSet<String>,
    /// Outstanding one-time verification codes, by account name.
    codes: HashMap<String, u32>,
}

/// Maps bearer tokens to logged-in accounts with sliding expiry.
///
/// At most one live session exists per account. A single lock covers
/// the table, the logged-in set and the verification codes; the sweeper
/// takes the same lock, so a sweep never races a login.
pub struct SessionTable {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SessionTable {
    /// Builds a table reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                sessions: HashMap::new(),
                logged_in: HashSet::new(),
                codes: HashMap::new(),
            }),
            clock,
            ttl,
        }
    }

    /// Starts a session for `account`.
    ///
    /// # Errors
    ///
    /// [`CoreError::AlreadyLoggedIn`] when the account has a live
    /// session; the table is left untouched.
    pub fn create(&self, account: &str) -> CoreResult<SessionId> {
        let mut inner = self.inner.lock();

        if inner.logged_in.contains(account) {
            return Err(CoreError::AlreadyLoggedIn {
                account: account.to_string(),
            });
        }

        let id = SessionId::fresh();
        let expiry = self.clock.now().saturating_add(self.ttl);
        inner.sessions.insert(
            id,
            Entry {
                account: account.to_string(),
                expiry,
            },
        );
        inner.logged_in.insert(account.to_string());
        debug!(account, "session created");
        Ok(id)
    }

    /// Validates a token, sliding its expiry forward on success.
    ///
    /// Expired entries are left for the sweeper; they just stop
    /// resolving.
    pub fn touch(&self, id: SessionId) -> Option<String> {
        let mut inner = self.inner.lock();
        let now = self.clock.now();
        let ttl = self.ttl;

        let entry = inner.sessions.get_mut(&id)?;
        if now > entry.expiry {
            return None;
        }
        entry.expiry = now.saturating_add(ttl);
        Some(entry.account.clone())
    }

    /// Explicit logout. Returns the account that held the session.
    pub fn end(&self, id: SessionId) -> Option<String> {
        let mut inner = self.inner.lock();
        let entry = inner.sessions.remove(&id)?;
        inner.logged_in.remove(&entry.account);
        inner.codes.remove(&entry.account);
        debug!(account = %entry.account, "session ended");
        Some(entry.account)
    }

    /// Whether `account` currently holds a session.
    pub fn is_logged_in(&self, account: &str) -> bool {
        self.inner.lock().logged_in.contains(account)
    }

    /// Number of live (unswept) sessions.
    pub fn len(&self) -> usize {
        self.inner.lock().sessions.len()
    }

    /// Whether no sessions exist.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Issues a fresh five-digit verification code for `account`,
    /// replacing any outstanding one. Codes live exactly as long as the
    /// account's session.
    pub fn issue_code(&self, account: &str) -> u32 {
        let code = rand::thread_rng().gen_range(0..100_000);
        self.inner.lock().codes.insert(account.to_string(), code);
        code
    }

    /// Whether `account` has an outstanding code.
    pub fn has_code(&self, account: &str) -> bool {
        self.inner.lock().codes.contains_key(account)
    }

    /// Checks a submitted code, consuming it on success.
    pub fn verify_code(&self, account: &str, code: u32) -> bool {
        let mut inner = self.inner.lock();
        if inner.codes.get(account) == Some(&code) {
            inner.codes.remove(account);
            true
        } else {
            false
        }
    }

    /// Removes every expired session, clearing the owning accounts'
    /// logged-in flags and outstanding codes. Returns the logged-out
    /// account names.
    pub fn sweep(&self) -> Vec<String> {
        let mut inner = self.inner.lock();
        let now = self.clock.now();

        let expired: Vec<SessionId> = inner
            .sessions
            .iter()
            .filter(|(_, entry)| now > entry.expiry)
            .map(|(id, _)| *id)
            .collect();

        let mut accounts = Vec::with_capacity(expired.len());
        for id in expired {
            if let Some(entry) = inner.sessions.remove(&id) {
                inner.logged_in.remove(&entry.account);
                inner.codes.remove(&entry.account);
                accounts.push(entry.account);
            }
        }

        if !accounts.is_empty() {
            debug!(expired = accounts.len(), "sessions swept");
        }
        accounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn table() -> (Arc<ManualClock>, SessionTable) {
        let clock = Arc::new(ManualClock::new(Ticks::from_unix_seconds(1_700_000_000)));
        let table = SessionTable::new(clock.clone(), DEFAULT_SESSION_TTL);
        (clock, table)
    }

    #[test]
    fn create_touch_end() {
        let (_, table) = table();

        let id = table.create("alice1234").unwrap();
        assert!(table.is_logged_in("alice1234"));
        assert_eq!(table.touch(id).as_deref(), Some("alice1234"));

        assert_eq!(table.end(id).as_deref(), Some("alice1234"));
        assert!(!table.is_logged_in("alice1234"));
        assert_eq!(table.touch(id), None);
        assert_eq!(table.end(id), None);
    }

    #[test]
    fn second_login_rejected_without_mutation() {
        let (_, table) = table();

        table.create("alice1234").unwrap();
        let err = table.create("alice1234").unwrap_err();
        assert!(matches!(err, CoreError::AlreadyLoggedIn { .. }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn touch_slides_expiry() {
        let (clock, table) = table();

        let id = table.create("alice1234").unwrap();

        // Ten minutes in: still valid, and touching restarts the window.
        clock.advance(Duration::from_secs(10 * 60));
        assert!(table.touch(id).is_some());

        // Another ten minutes would have crossed the original expiry.
        clock.advance(Duration::from_secs(10 * 60));
        assert!(table.touch(id).is_some());

        // Sixteen minutes idle: expired.
        clock.advance(Duration::from_secs(16 * 60));
        assert_eq!(table.touch(id), None);
    }

    #[test]
    fn touch_unknown_token() {
        let (_, table) = table();
        assert_eq!(table.touch(SessionId::fresh()), None);
    }

    #[test]
    fn sweep_expires_only_stale_sessions() {
        let (clock, table) = table();

        table.create("stale1234").unwrap();
        clock.advance(Duration::from_secs(10 * 60));
        let live = table.create("live12345").unwrap();

        // 16 minutes after the first login, 6 after the second.
        clock.advance(Duration::from_secs(6 * 60));
        let expired = table.sweep();
        assert_eq!(expired, vec!["stale1234".to_string()]);

        assert_eq!(table.len(), 1);
        assert!(!table.is_logged_in("stale1234"));
        assert!(table.is_logged_in("live12345"));
        assert_eq!(table.touch(live).as_deref(), Some("live12345"));
    }

    #[test]
    fn sweep_clears_verification_codes() {
        let (clock, table) = table();

        table.create("alice1234").unwrap();
        let code = table.issue_code("alice1234");
        assert!(code < 100_000);
        assert!(table.has_code("alice1234"));

        clock.advance(Duration::from_secs(16 * 60));
        table.sweep();
        assert!(!table.has_code("alice1234"));
        assert!(!table.verify_code("alice1234", code));
    }

    #[test]
    fn codes_consume_on_success_only() {
        let (_, table) = table();

        table.create("alice1234").unwrap();
        let code = table.issue_code("alice1234");

        assert!(!table.verify_code("alice1234", code.wrapping_add(1) % 100_000));
        assert!(table.has_code("alice1234"));
        assert!(table.verify_code("alice1234", code));
        assert!(!table.verify_code("alice1234", code));
    }

    #[test]
    fn session_ids_parse_back() {
        let id = SessionId::fresh();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-token".parse::<SessionId>().is_err());
    }
}
