//! Per-account notification storage.

use crate::entity::{Notification, NotificationSeverity};
use crate::error::{CoreError, CoreResult};
use folio_codec::{RecordReader, RecordWriter, Ticks};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Notification storage under `<root>/users/<account>/notifs/`, one file
/// per notification named by its id.
pub struct NotificationStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl NotificationStore {
    /// Creates the per-user root if needed.
    pub fn open(root: &Path) -> CoreResult<Self> {
        let root = root.join("users");
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            lock: Mutex::new(()),
        })
    }

    fn account_dir(&self, account: &str) -> PathBuf {
        self.root.join(account).join("notifs")
    }

    fn path(&self, account: &str, id: Uuid) -> PathBuf {
        self.account_dir(account).join(id.to_string())
    }

    /// Raises a new notification for `account`.
    pub fn push(
        &self,
        account: &str,
        subject: String,
        body: String,
        severity: NotificationSeverity,
        resolve_action: Option<(String, String)>,
        delete_on_resolve: bool,
        now: Ticks,
    ) -> CoreResult<Notification> {
        let _guard = self.lock.lock();

        let notification = Notification::new(
            Uuid::new_v4(),
            now,
            subject,
            body,
            severity,
            resolve_action,
            delete_on_resolve,
        );

        fs::create_dir_all(self.account_dir(account))?;
        self.write_unlocked(account, &notification)?;
        debug!(account, id = %notification.id, "notification raised");
        Ok(notification)
    }

    fn write_unlocked(&self, account: &str, notification: &Notification) -> CoreResult<()> {
        let mut writer = RecordWriter::new();
        notification.encode(&mut writer);
        fs::write(self.path(account, notification.id), writer.into_bytes())?;
        Ok(())
    }

    /// Loads one notification.
    pub fn get(&self, account: &str, id: Uuid) -> CoreResult<Option<Notification>> {
        let _guard = self.lock.lock();
        self.read_unlocked(account, id)
    }

    fn read_unlocked(&self, account: &str, id: Uuid) -> CoreResult<Option<Notification>> {
        let path = self.path(account, id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        let mut reader = RecordReader::new(&bytes);
        Ok(Some(Notification::decode(id, &mut reader)?))
    }

    /// An account's notifications, newest first. Read ones can be
    /// filtered out.
    pub fn list(&self, account: &str, exclude_read: bool) -> CoreResult<Vec<Notification>> {
        let _guard = self.lock.lock();

        let dir = self.account_dir(account);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut notifications = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(id) = name.to_str().and_then(|name| Uuid::parse_str(name).ok()) else {
                continue;
            };
            if let Some(notification) = self.read_unlocked(account, id)? {
                if !(exclude_read && notification.read) {
                    notifications.push(notification);
                }
            }
        }

        notifications.sort_by_key(|notification| std::cmp::Reverse(notification.time));
        Ok(notifications)
    }

    /// Marks a notification seen. Action-less notifications resolve on
    /// read; resolving deletes the file when the notification asks for
    /// that.
    pub fn mark_read(&self, account: &str, id: Uuid) -> CoreResult<()> {
        let _guard = self.lock.lock();

        let mut notification = self
            .read_unlocked(account, id)?
            .ok_or_else(|| CoreError::not_found("notification", id.to_string()))?;
        notification.read = true;

        if notification.resolve_action.is_none() && notification.delete_on_resolve {
            fs::remove_file(self.path(account, id))?;
        } else {
            self.write_unlocked(account, &notification)?;
        }
        Ok(())
    }

    /// Resolves a notification, returning the redirect target of its
    /// action.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidOperation`] when the notification has no
    /// resolve action.
    pub fn resolve(&self, account: &str, id: Uuid) -> CoreResult<String> {
        let _guard = self.lock.lock();

        let mut notification = self
            .read_unlocked(account, id)?
            .ok_or_else(|| CoreError::not_found("notification", id.to_string()))?;
        let Some((_, target)) = notification.resolve_action.clone() else {
            return Err(CoreError::invalid_operation(format!(
                "no resolve action configured for notification {id}"
            )));
        };

        notification.read = true;
        if notification.delete_on_resolve {
            fs::remove_file(self.path(account, id))?;
        } else {
            self.write_unlocked(account, &notification)?;
        }
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const NOW: Ticks = Ticks::from_unix_seconds(1_700_000_000);

    fn store(root: &Path) -> NotificationStore {
        NotificationStore::open(root).unwrap()
    }

    #[test]
    fn push_list_and_filter() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        let first = store
            .push(
                "alice1234",
                "Welcome".into(),
                "Hi.".into(),
                NotificationSeverity::CanIgnore,
                None,
                false,
                NOW,
            )
            .unwrap();
        store
            .push(
                "alice1234",
                "Second".into(),
                "Again.".into(),
                NotificationSeverity::ShouldResolve,
                None,
                false,
                Ticks::from_unix_seconds(1_700_000_100),
            )
            .unwrap();

        let all = store.list("alice1234", false).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].subject, "Second", "newest first");

        store.mark_read("alice1234", first.id).unwrap();
        let unread = store.list("alice1234", true).unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].subject, "Second");

        assert!(store.list("bob5678aa", false).unwrap().is_empty());
    }

    #[test]
    fn read_resolves_and_deletes_actionless() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        let notification = store
            .push(
                "alice1234",
                "Gone after read".into(),
                "Body".into(),
                NotificationSeverity::CanIgnore,
                None,
                true,
                NOW,
            )
            .unwrap();

        store.mark_read("alice1234", notification.id).unwrap();
        assert!(store.get("alice1234", notification.id).unwrap().is_none());
    }

    #[test]
    fn resolve_returns_target() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        let kept = store
            .push(
                "alice1234",
                "Review".into(),
                "Body".into(),
                NotificationSeverity::MustResolve,
                Some(("View".into(), "/article?id=abc".into())),
                false,
                NOW,
            )
            .unwrap();

        let target = store.resolve("alice1234", kept.id).unwrap();
        assert_eq!(target, "/article?id=abc");

        // delete_on_resolve = false: notification survives, now read.
        let survivor = store.get("alice1234", kept.id).unwrap().unwrap();
        assert!(survivor.read);

        let dropped = store
            .push(
                "alice1234",
                "Once".into(),
                "Body".into(),
                NotificationSeverity::ShouldResolve,
                Some(("Go".into(), "/index".into())),
                true,
                NOW,
            )
            .unwrap();
        store.resolve("alice1234", dropped.id).unwrap();
        assert!(store.get("alice1234", dropped.id).unwrap().is_none());

        assert!(matches!(
            store.resolve("alice1234", Uuid::new_v4()),
            Err(CoreError::NotFound { .. })
        ));
    }
}
