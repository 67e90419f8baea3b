//! The account registry.

use crate::entity::{Account, Permission};
use crate::error::{CoreError, CoreResult};
use crate::store::RecordStore;
use folio_codec::Ticks;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Accounts registered before this date are exempt from the verification
/// requirement.
const VERIFICATION_CUTOFF: Ticks = Ticks::from_unix_seconds(1_686_960_000); // 2023-06-17

/// How long a new account may stay unverified before load drops it.
const VERIFICATION_GRACE_TICKS: i64 = 7 * folio_codec::TICKS_PER_DAY;

/// Keyed access to every registered account, backed by one record store
/// plus an in-memory email index for login-by-email.
pub struct AccountRegistry {
    store: RecordStore<Account>,
    by_email: Mutex<HashMap<String, String>>,
}

impl AccountRegistry {
    /// Opens `accounts.db`/`accounts.size` under `dir` without loading.
    pub fn open(dir: &Path) -> CoreResult<Self> {
        Ok(Self {
            store: RecordStore::open(dir, "accounts")?,
            by_email: Mutex::new(HashMap::new()),
        })
    }

    /// Scans the account file, dropping records failing `validator`, and
    /// rebuilds the email index. Returns the number of live accounts.
    pub fn load<F>(&self, validator: F) -> CoreResult<usize>
    where
        F: Fn(&Account) -> bool,
    {
        let accounts = self.store.load(validator)?;
        let mut by_email = self.by_email.lock();
        by_email.clear();
        for account in &accounts {
            by_email.insert(account.email.clone(), account.name.clone());
        }
        info!(accounts = accounts.len(), "account registry loaded");
        Ok(accounts.len())
    }

    /// Registers a new contributor account.
    ///
    /// # Errors
    ///
    /// [`CoreError::DuplicateKey`] when the name or email is taken.
    pub fn register(
        &self,
        name: &str,
        password: &str,
        email: &str,
        now: Ticks,
    ) -> CoreResult<Account> {
        {
            let by_email = self.by_email.lock();
            if by_email.contains_key(email) {
                return Err(CoreError::DuplicateKey {
                    key: email.to_string(),
                });
            }
        }

        let account = Account::new(
            name.to_string(),
            password.to_string(),
            email.to_string(),
            now,
        );
        self.store.append(&account)?;
        self.by_email
            .lock()
            .insert(email.to_string(), name.to_string());
        Ok(account)
    }

    /// Looks an account up by name, falling back to the email index.
    pub fn get(&self, name_or_email: &str) -> CoreResult<Option<Account>> {
        if let Some(account) = self.store.get(name_or_email)? {
            return Ok(Some(account));
        }
        let name = match self.by_email.lock().get(name_or_email) {
            Some(name) => name.clone(),
            None => return Ok(None),
        };
        self.store.get(&name)
    }

    /// Like [`AccountRegistry::get`] but absence is an error.
    pub fn require(&self, name_or_email: &str) -> CoreResult<Account> {
        self.get(name_or_email)?
            .ok_or_else(|| CoreError::not_found("account", name_or_email))
    }

    /// Persists a modified account, keeping the email index current.
    pub fn save(&self, account: &Account) -> CoreResult<()> {
        let previous = self.store.get(&account.name)?;
        self.store.update(account)?;

        let mut by_email = self.by_email.lock();
        if let Some(previous) = previous {
            if previous.email != account.email {
                by_email.remove(&previous.email);
            }
        }
        by_email.insert(account.email.clone(), account.name.clone());
        Ok(())
    }

    /// Deletes an account record.
    pub fn remove(&self, name: &str) -> CoreResult<()> {
        let account = self.require(name)?;
        self.store.remove(&account.name)?;
        self.by_email.lock().remove(&account.email);
        Ok(())
    }

    /// Whether `name_or_email` resolves to an account.
    pub fn contains(&self, name_or_email: &str) -> bool {
        self.store.contains(name_or_email)
            || self.by_email.lock().contains_key(name_or_email)
    }

    /// Current number of accounts.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no accounts are registered.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// All account names, in file order as of the last load plus appends.
    pub fn names(&self) -> Vec<String> {
        self.by_email.lock().values().cloned().collect()
    }

    /// Marks an account verified and persists it.
    pub fn mark_verified(&self, name: &str) -> CoreResult<Account> {
        let mut account = self.require(name)?;
        account.verified = true;
        self.save(&account)?;
        Ok(account)
    }

    /// Changes an account's permission level and persists it.
    pub fn set_permission(&self, name: &str, permission: Permission) -> CoreResult<Account> {
        let mut account = self.require(name)?;
        account.permission = permission;
        self.save(&account)?;
        Ok(account)
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &RecordStore<Account> {
        &self.store
    }
}

/// The load-time validator used at startup: verified accounts and
/// accounts predating the verification cutoff always survive; newer
/// unverified accounts get a seven-day grace window measured against
/// `startup`.
pub fn signup_grace_validator(startup: Ticks) -> impl Fn(&Account) -> bool {
    move |account| {
        if account.verified || account.created < VERIFICATION_CUTOFF {
            return true;
        }
        startup.as_raw().saturating_sub(account.created.as_raw()) < VERIFICATION_GRACE_TICKS
    }
}
