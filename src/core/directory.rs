//! Registered users and the current session.
use crate::core::error::{Result, WalletError};
use crate::core::store::{self, KeyValueStore, SESSION_KEY, USERS_KEY};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "CC")]
    CitizenId,
    #[serde(rename = "CE")]
    ForeignerId,
    #[serde(rename = "TI")]
    MinorId,
    Passport,
}

impl Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DocumentType::CitizenId => "CC",
                DocumentType::ForeignerId => "CE",
                DocumentType::MinorId => "TI",
                DocumentType::Passport => "Passport",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub balance: Decimal,
    pub document_type: DocumentType,
    pub document_number: String,
    pub phone: String,
}

/// Profile fields supplied at registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub document_type: DocumentType,
    pub document_number: String,
    pub phone: String,
}

/// A user the directory is created with when no snapshot exists yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub id: String,
    #[serde(flatten)]
    pub profile: NewUser,
    pub password: String,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    user: User,
    password_digest: String,
}

type SessionListener = Box<dyn Fn(Option<&User>) + Send + Sync>;

pub struct UserDirectory {
    users: HashMap<String, UserRecord>,
    current: Option<User>,
    starting_balance: Decimal,
    store: Arc<dyn KeyValueStore>,
    listeners: Vec<SessionListener>,
}

fn digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

impl UserDirectory {
    /// Rebuilds the directory from its snapshots, seeding `seed_users` on first run.
    pub async fn restore(
        store: Arc<dyn KeyValueStore>,
        seed_users: &[SeedUser],
        starting_balance: Decimal,
    ) -> Result<Self> {
        let saved = store::load_snapshot::<Vec<UserRecord>>(store.as_ref(), USERS_KEY).await?;
        let users = match saved {
            Some(records) => records,
            None => {
                debug!("Seeding {} users", seed_users.len());
                seed_users
                    .iter()
                    .map(|seed| UserRecord {
                        user: User {
                            id: seed.id.clone(),
                            name: seed.profile.name.clone(),
                            surname: seed.profile.surname.clone(),
                            email: seed.profile.email.clone(),
                            balance: seed.balance,
                            document_type: seed.profile.document_type,
                            document_number: seed.profile.document_number.clone(),
                            phone: seed.profile.phone.clone(),
                        },
                        password_digest: digest(&seed.password),
                    })
                    .collect()
            }
        };
        let current = store::load_snapshot::<User>(store.as_ref(), SESSION_KEY).await?;
        debug!(
            users = users.len(),
            session = current.as_ref().map(|u| u.email.as_str()),
            "Restored user directory"
        );

        Ok(Self {
            users: users
                .into_iter()
                .map(|record| (record.user.email.clone(), record))
                .collect(),
            current,
            starting_balance,
            store,
            listeners: Vec::new(),
        })
    }

    /// Registers a callback invoked whenever the session user changes.
    pub fn on_session_change(&mut self, listener: impl Fn(Option<&User>) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn find_by_email(&self, email: &str) -> Option<&User> {
        self.users.get(email).map(|record| &record.user)
    }

    pub async fn authenticate(&mut self, email: &str, password: &str) -> Result<User> {
        let user = match self.users.get(email) {
            Some(record) if record.password_digest == digest(password) => record.user.clone(),
            _ => return Err(WalletError::InvalidCredentials),
        };

        self.set_session(Some(user.clone())).await?;
        debug!("Authenticated {}", user.email);
        Ok(user)
    }

    pub async fn register(&mut self, profile: NewUser, password: &str) -> Result<User> {
        if self.users.contains_key(&profile.email) {
            return Err(WalletError::DuplicateEmail(profile.email));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: profile.name,
            surname: profile.surname,
            email: profile.email,
            balance: self.starting_balance,
            document_type: profile.document_type,
            document_number: profile.document_number,
            phone: profile.phone,
        };
        let record = UserRecord {
            user: user.clone(),
            password_digest: digest(password),
        };
        self.save_users_with(&record).await?;
        if let Err(e) = self.set_session(Some(user.clone())).await {
            self.restore_users_snapshot().await;
            return Err(e);
        }
        self.users.insert(user.email.clone(), record);
        debug!("Registered {} with id {}", user.email, user.id);
        Ok(user)
    }

    /// Overwrites the session user's balance. A no-op without a session.
    pub async fn update_balance(&mut self, new_balance: Decimal) -> Result<()> {
        let Some(mut user) = self.current.clone() else {
            debug!("Balance update ignored without a session");
            return Ok(());
        };

        user.balance = new_balance;
        let record = self.users.get(&user.email).map(|record| UserRecord {
            user: user.clone(),
            password_digest: record.password_digest.clone(),
        });
        if let Some(record) = &record {
            self.save_users_with(record).await?;
        }
        if let Err(e) = self.set_session(Some(user)).await {
            if record.is_some() {
                self.restore_users_snapshot().await;
            }
            return Err(e);
        }
        if let Some(record) = record {
            self.users.insert(record.user.email.clone(), record);
        }
        debug!("Balance updated to {}", new_balance);
        Ok(())
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.set_session(None).await
    }

    async fn set_session(&mut self, user: Option<User>) -> Result<()> {
        match &user {
            Some(u) => store::save_snapshot(self.store.as_ref(), SESSION_KEY, u).await?,
            None => self.store.remove(SESSION_KEY).await?,
        }
        self.current = user;
        for listener in &self.listeners {
            listener(self.current.as_ref());
        }
        Ok(())
    }

    /// Writes the users snapshot as it would look with `changed` applied.
    /// The in-memory map is left untouched.
    async fn save_users_with(&self, changed: &UserRecord) -> Result<()> {
        let mut records: Vec<&UserRecord> = self
            .users
            .values()
            .filter(|record| record.user.email != changed.user.email)
            .chain(std::iter::once(changed))
            .collect();
        records.sort_by(|a, b| a.user.email.cmp(&b.user.email));
        store::save_snapshot(self.store.as_ref(), USERS_KEY, &records).await
    }

    /// Puts the users snapshot back in line with the in-memory map.
    async fn restore_users_snapshot(&self) {
        let mut records: Vec<&UserRecord> = self.users.values().collect();
        records.sort_by(|a, b| a.user.email.cmp(&b.user.email));
        if let Err(e) = store::save_snapshot(self.store.as_ref(), USERS_KEY, &records).await {
            warn!(error = %e, "Failed to restore users snapshot");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::memory::{FaultyStore, MemoryStore};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    pub(crate) fn admin_seed() -> SeedUser {
        SeedUser {
            id: "1".to_string(),
            profile: NewUser {
                name: "Admin".to_string(),
                surname: "BTG".to_string(),
                email: "admin@btg.com".to_string(),
                document_type: DocumentType::CitizenId,
                document_number: "123456789".to_string(),
                phone: "3001234567".to_string(),
            },
            password: "admin123".to_string(),
            balance: dec!(50000000),
        }
    }

    pub(crate) fn new_profile(email: &str) -> NewUser {
        NewUser {
            name: "Ana".to_string(),
            surname: "Gomez".to_string(),
            email: email.to_string(),
            document_type: DocumentType::Passport,
            document_number: "987654".to_string(),
            phone: "3109876543".to_string(),
        }
    }

    pub(crate) async fn directory_with(store: &MemoryStore) -> UserDirectory {
        UserDirectory::restore(Arc::new(store.clone()), &[admin_seed()], dec!(500000))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_success_persists_session() {
        let store = MemoryStore::new();
        let mut directory = directory_with(&store).await;
        assert!(directory.current_user().is_none());

        let user = directory
            .authenticate("admin@btg.com", "admin123")
            .await
            .unwrap();
        assert_eq!(user.id, "1");
        assert_eq!(user.balance, dec!(50000000));
        assert_eq!(directory.current_user(), Some(&user));

        let saved: User = store::load_snapshot(&store, SESSION_KEY)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved, user);
    }

    #[tokio::test]
    async fn test_authenticate_rejects_bad_credentials() {
        let store = MemoryStore::new();
        let mut directory = directory_with(&store).await;

        assert!(matches!(
            directory.authenticate("admin@btg.com", "wrong").await,
            Err(WalletError::InvalidCredentials)
        ));
        assert!(matches!(
            directory.authenticate("nobody@btg.com", "admin123").await,
            Err(WalletError::InvalidCredentials)
        ));
        assert!(directory.current_user().is_none());
        assert!(store.get(SESSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_seeds_starting_balance() {
        let store = MemoryStore::new();
        let mut directory = directory_with(&store).await;

        let user = directory
            .register(new_profile("ana@example.com"), "secret1")
            .await
            .unwrap();
        assert_eq!(user.balance, dec!(500000));
        assert_ne!(user.id, "1");
        assert_eq!(directory.current_user(), Some(&user));

        // The new account can log in again after logout
        directory.logout().await.unwrap();
        let again = directory
            .authenticate("ana@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(again.id, user.id);
    }

    #[tokio::test]
    async fn test_register_assigns_unique_ids() {
        let store = MemoryStore::new();
        let mut directory = directory_with(&store).await;

        let first = directory
            .register(new_profile("one@example.com"), "secret1")
            .await
            .unwrap();
        let second = directory
            .register(new_profile("two@example.com"), "secret2")
            .await
            .unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_leaves_record_untouched() {
        let store = MemoryStore::new();
        let mut directory = directory_with(&store).await;
        let before = directory.find_by_email("admin@btg.com").cloned().unwrap();

        let mut profile = new_profile("admin@btg.com");
        profile.name = "Impostor".to_string();
        let result = directory.register(profile, "other-password").await;
        assert!(matches!(
            result,
            Err(WalletError::DuplicateEmail(email)) if email == "admin@btg.com"
        ));

        assert_eq!(directory.find_by_email("admin@btg.com"), Some(&before));
        assert!(directory.current_user().is_none());
        // The existing password still works
        assert!(directory.authenticate("admin@btg.com", "admin123").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_balance_without_session_is_noop() {
        let store = MemoryStore::new();
        let mut directory = directory_with(&store).await;

        directory.update_balance(dec!(1)).await.unwrap();
        assert!(directory.current_user().is_none());
        assert_eq!(
            directory.find_by_email("admin@btg.com").unwrap().balance,
            dec!(50000000)
        );
        assert!(store.get(SESSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_balance_writes_record_and_snapshot() {
        let store = MemoryStore::new();
        let mut directory = directory_with(&store).await;
        directory
            .authenticate("admin@btg.com", "admin123")
            .await
            .unwrap();

        directory.update_balance(dec!(49900000)).await.unwrap();
        assert_eq!(directory.current_user().unwrap().balance, dec!(49900000));
        assert_eq!(
            directory.find_by_email("admin@btg.com").unwrap().balance,
            dec!(49900000)
        );

        let saved: User = store::load_snapshot(&store, SESSION_KEY)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.balance, dec!(49900000));
    }

    #[tokio::test]
    async fn test_logout_removes_session_snapshot() {
        let store = MemoryStore::new();
        let mut directory = directory_with(&store).await;
        directory
            .authenticate("admin@btg.com", "admin123")
            .await
            .unwrap();

        directory.logout().await.unwrap();
        assert!(directory.current_user().is_none());
        assert!(store.get(SESSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_picks_up_session_and_registrations() {
        let store = MemoryStore::new();
        {
            let mut directory = directory_with(&store).await;
            directory
                .register(new_profile("ana@example.com"), "secret1")
                .await
                .unwrap();
            directory.update_balance(dec!(400000)).await.unwrap();
        }

        let directory = directory_with(&store).await;
        let current = directory.current_user().unwrap();
        assert_eq!(current.email, "ana@example.com");
        assert_eq!(current.balance, dec!(400000));
        assert_eq!(
            directory.find_by_email("ana@example.com").unwrap().balance,
            dec!(400000)
        );
        assert!(directory.find_by_email("admin@btg.com").is_some());
    }

    #[tokio::test]
    async fn test_passwords_are_not_stored_in_plain_text() {
        let store = MemoryStore::new();
        let mut directory = directory_with(&store).await;
        directory
            .register(new_profile("ana@example.com"), "secret1")
            .await
            .unwrap();

        let raw = store.get(USERS_KEY).await.unwrap().unwrap();
        assert!(!raw.contains("secret1"));
        assert!(raw.contains(&digest("secret1")));
    }

    #[tokio::test]
    async fn test_session_listeners_observe_changes() {
        let store = MemoryStore::new();
        let mut directory = directory_with(&store).await;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        directory.on_session_change(move |user| {
            sink.lock()
                .unwrap()
                .push(user.map(|u| u.balance));
        });

        directory
            .authenticate("admin@btg.com", "admin123")
            .await
            .unwrap();
        directory.update_balance(dec!(10)).await.unwrap();
        directory.logout().await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Some(dec!(50000000)), Some(dec!(10)), None]
        );
    }

    #[tokio::test]
    async fn test_register_failing_users_write_leaves_email_free() {
        let store = FaultyStore::default();
        let mut directory =
            UserDirectory::restore(Arc::new(store.clone()), &[admin_seed()], dec!(500000))
                .await
                .unwrap();

        store.fail_writes_to(Some(USERS_KEY));
        let result = directory
            .register(new_profile("ana@example.com"), "secret1")
            .await;
        assert!(matches!(result, Err(WalletError::Storage(_))));
        assert!(directory.find_by_email("ana@example.com").is_none());
        assert!(directory.current_user().is_none());

        // Retrying once the store recovers succeeds
        store.fail_writes_to(None);
        let user = directory
            .register(new_profile("ana@example.com"), "secret1")
            .await
            .unwrap();
        assert_eq!(directory.current_user(), Some(&user));
    }

    #[tokio::test]
    async fn test_register_failing_session_write_rolls_back_users() {
        let store = FaultyStore::default();
        let mut directory =
            UserDirectory::restore(Arc::new(store.clone()), &[admin_seed()], dec!(500000))
                .await
                .unwrap();

        store.fail_writes_to(Some(SESSION_KEY));
        let result = directory
            .register(new_profile("ana@example.com"), "secret1")
            .await;
        assert!(matches!(result, Err(WalletError::Storage(_))));
        assert!(directory.find_by_email("ana@example.com").is_none());

        let reopened = directory_with(&store.inner).await;
        assert!(reopened.find_by_email("ana@example.com").is_none());
        assert!(reopened.find_by_email("admin@btg.com").is_some());
    }

    #[tokio::test]
    async fn test_update_balance_failing_write_keeps_old_balance() {
        let store = FaultyStore::default();
        let mut directory =
            UserDirectory::restore(Arc::new(store.clone()), &[admin_seed()], dec!(500000))
                .await
                .unwrap();
        directory
            .authenticate("admin@btg.com", "admin123")
            .await
            .unwrap();

        for key in [USERS_KEY, SESSION_KEY] {
            store.fail_writes_to(Some(key));
            assert!(directory.update_balance(dec!(1)).await.is_err());
            assert_eq!(directory.current_user().unwrap().balance, dec!(50000000));
            assert_eq!(
                directory.find_by_email("admin@btg.com").unwrap().balance,
                dec!(50000000)
            );

            let reopened = directory_with(&store.inner).await;
            assert_eq!(reopened.current_user().unwrap().balance, dec!(50000000));
            assert_eq!(
                reopened.find_by_email("admin@btg.com").unwrap().balance,
                dec!(50000000)
            );
        }
    }
}
