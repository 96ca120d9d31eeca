//! The vault engine: lock/unlock state machine plus item operations.
//!
//! `VaultEngine` is a cheap cloneable handle.  All state sits behind one
//! async mutex so explicit calls and the auto-lock timer observe the same
//! mutual exclusion.  Key derivation runs on the blocking pool while that
//! mutex is held, which keeps at most one lock/unlock transition in
//! flight without stalling the async executor.
//!
//! While **Locked** every item and settings operation fails with
//! [`VaultError::VaultLocked`].  While **Unlocked** each successful call
//! counts as activity and re-arms the inactivity timer.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;
use zeroize::{Zeroize, Zeroizing};

use super::autolock::{AutoLockTimer, DEFAULT_AUTO_LOCK};
use super::format::{self, EncryptedVault, Vault};
use super::item::{ItemUpdate, NewItem, SettingsUpdate, VaultItem, VaultSettings};
use super::secure::{SecretBuffer, SecretHandle, SecureMemoryPool};
use crate::crypto::{self, Argon2Params};
use crate::errors::{Result, VaultError};
use crate::storage::StorageAdapter;

/// Tunables for one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Inactivity window before the vault locks itself.  `None` disables
    /// auto-lock.
    pub auto_lock: Option<Duration>,

    /// Argon2id parameters used when sealing.
    pub argon2: Argon2Params,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_lock: Some(DEFAULT_AUTO_LOCK),
            argon2: Argon2Params::default(),
        }
    }
}

/// Decrypted state that only exists while unlocked.
struct Session {
    vault: Vault,
    pool: SecureMemoryPool,
    password: SecretHandle,
}

impl Session {
    /// Copy of the retained master password for one KDF call.
    fn password_copy(&self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new(self.pool.get(self.password)?.to_vec()))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.vault.items.iter().position(|item| item.id == id)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.position(&id).is_none() {
                return id;
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.vault.wipe_items();
        self.pool.wipe_all();
    }
}

#[derive(Default)]
struct EngineState {
    session: Option<Session>,
    timer: AutoLockTimer,
    /// Envelope produced by the most recent auto-lock, until taken.
    auto_locked: Option<EncryptedVault>,
}

struct Shared {
    state: Mutex<EngineState>,
    config: EngineConfig,
    storage: Option<Arc<dyn StorageAdapter>>,
}

/// Handle to a password vault.  Clone to share between tasks.
#[derive(Clone)]
pub struct VaultEngine {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for VaultEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultEngine")
            .field("config", &self.shared.config)
            .field("has_storage", &self.shared.storage.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for VaultEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl VaultEngine {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// A locked engine with no storage attached.  Callers persist the
    /// envelopes returned by `lock` themselves.
    pub fn new(config: EngineConfig) -> Self {
        Self::build(config, None)
    }

    /// A locked engine that saves every envelope it produces (explicit or
    /// automatic lock) to `storage`.
    pub fn with_storage(config: EngineConfig, storage: Arc<dyn StorageAdapter>) -> Self {
        Self::build(config, Some(storage))
    }

    fn build(config: EngineConfig, storage: Option<Arc<dyn StorageAdapter>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(EngineState::default()),
                config,
                storage,
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    // ------------------------------------------------------------------
    // State transitions
    // ------------------------------------------------------------------

    /// Locked -> Unlocked.
    ///
    /// With `Some(blob)` the envelope is decrypted and validated.  With
    /// `None` a new, empty vault is created.  A wrong password surfaces as
    /// [`VaultError::Authentication`].
    pub async fn unlock(&self, password: &str, blob: Option<&EncryptedVault>) -> Result<()> {
        if password.is_empty() {
            return Err(VaultError::InvalidInput("password cannot be empty".into()));
        }

        let mut state = self.shared.state.lock().await;
        if state.session.is_some() {
            return Err(VaultError::InvalidInput("vault is already unlocked".into()));
        }

        let pw = Zeroizing::new(password.as_bytes().to_vec());
        let vault = match blob {
            Some(blob) => {
                let blob = blob.clone();
                run_kdf(move || format::open(&blob, &pw)).await?
            }
            None => {
                // Creation still pays the KDF once so bad parameters fail
                // here rather than at the first lock.
                let params = self.shared.config.argon2;
                run_kdf(move || {
                    let salt = crypto::generate_salt();
                    crypto::derive_key_with_params(&pw, &salt, &params).map(drop)
                })
                .await?;
                Vault::default()
            }
        };

        let mut pool = SecureMemoryPool::new();
        let password = pool.allocate(SecretBuffer::copy_from_str(password));
        let item_count = vault.items.len();

        state.session = Some(Session {
            vault,
            pool,
            password,
        });
        arm_timer(&self.shared, &mut state);

        info!(items = item_count, created = blob.is_none(), "vault unlocked");
        Ok(())
    }

    /// Load the envelope from the attached storage (if any is stored) and
    /// unlock with it.
    pub async fn unlock_from_storage(&self, password: &str) -> Result<()> {
        let storage = self
            .shared
            .storage
            .as_ref()
            .ok_or_else(|| VaultError::Storage("no storage adapter attached".into()))?;
        let blob = storage.load()?;
        self.unlock(password, blob.as_ref()).await
    }

    /// Unlocked -> Locked.
    ///
    /// Re-encrypts under a fresh salt and IV, saves to the attached
    /// storage, wipes plaintext and the retained password, and returns the
    /// envelope.  Returns `Ok(None)` when already locked.
    ///
    /// If sealing or saving fails the vault stays unlocked so no edits are
    /// lost.
    pub async fn lock(&self) -> Result<Option<EncryptedVault>> {
        let mut state = self.shared.state.lock().await;
        let Some(session) = state.session.as_ref() else {
            return Ok(None);
        };

        let blob = self.shared.seal(session).await?;
        if let Some(storage) = &self.shared.storage {
            storage.save(&blob)?;
        }

        state.timer.disarm();
        state.session = None;
        info!("vault locked");
        Ok(Some(blob))
    }

    pub async fn is_locked(&self) -> bool {
        self.shared.state.lock().await.session.is_none()
    }

    /// Take the envelope produced by the last auto-lock, if one happened
    /// since the previous call.
    pub async fn take_auto_locked(&self) -> Option<EncryptedVault> {
        self.shared.state.lock().await.auto_locked.take()
    }

    // ------------------------------------------------------------------
    // Item operations
    // ------------------------------------------------------------------

    /// Create an item with a fresh id and current timestamps.
    pub async fn add_item(&self, fields: NewItem) -> Result<VaultItem> {
        self.with_session(|session| {
            validate_name(&fields.name)?;
            let item = VaultItem::create(session.fresh_id(), fields, Utc::now());
            session.vault.items.push(item.clone());
            debug!(id = %item.id, "item added");
            Ok(item)
        })
        .await
    }

    /// Merge `update` into the item with `id`.  `Ok(None)` if no such item.
    pub async fn update_item(&self, id: &str, update: ItemUpdate) -> Result<Option<VaultItem>> {
        self.with_session(|session| {
            if let Some(name) = update.name.as_deref() {
                validate_name(name)?;
            }
            let Some(idx) = session.position(id) else {
                return Ok(None);
            };
            let item = &mut session.vault.items[idx];
            item.apply(update, Utc::now());
            debug!(id, "item updated");
            Ok(Some(item.clone()))
        })
        .await
    }

    /// Remove the item with `id`.  Returns `false` if it did not exist.
    pub async fn delete_item(&self, id: &str) -> Result<bool> {
        self.with_session(|session| {
            let Some(idx) = session.position(id) else {
                return Ok(false);
            };
            let mut removed = session.vault.items.remove(idx);
            removed.zeroize();
            debug!(id, "item deleted");
            Ok(true)
        })
        .await
    }

    pub async fn get_item(&self, id: &str) -> Result<Option<VaultItem>> {
        self.with_session(|session| {
            Ok(session
                .position(id)
                .map(|idx| session.vault.items[idx].clone()))
        })
        .await
    }

    /// Copies of every item, in insertion order.
    pub async fn get_all_items(&self) -> Result<Vec<VaultItem>> {
        self.with_session(|session| Ok(session.vault.items.clone()))
            .await
    }

    /// Case-insensitive substring search over name, username, url, notes
    /// and tags, preserving insertion order.  An empty or whitespace-only
    /// query returns every item.
    pub async fn search_items(&self, query: &str) -> Result<Vec<VaultItem>> {
        self.with_session(|session| {
            if query.trim().is_empty() {
                return Ok(session.vault.items.clone());
            }
            let needle = query.to_lowercase();
            Ok(session
                .vault
                .items
                .iter()
                .filter(|item| item.matches(&needle))
                .cloned()
                .collect())
        })
        .await
    }

    /// Record that the item with `id` was just used.  Does not touch
    /// `updated_at`.
    pub async fn mark_used(&self, id: &str) -> Result<Option<VaultItem>> {
        self.with_session(|session| {
            let Some(idx) = session.position(id) else {
                return Ok(None);
            };
            let item = &mut session.vault.items[idx];
            item.last_used = Some(Utc::now());
            Ok(Some(item.clone()))
        })
        .await
    }

    // ------------------------------------------------------------------
    // Whole-vault operations
    // ------------------------------------------------------------------

    /// Deep copy of the full decrypted vault.
    pub async fn export(&self) -> Result<Vault> {
        self.with_session(|session| Ok(session.vault.clone())).await
    }

    /// Replace the decrypted state wholesale after validating `vault`.
    pub async fn import(&self, vault: Vault) -> Result<()> {
        self.with_session(|session| {
            vault.validate()?;
            let count = vault.items.len();
            let mut previous = std::mem::replace(&mut session.vault, vault);
            previous.wipe_items();
            info!(items = count, "vault contents replaced by import");
            Ok(())
        })
        .await
    }

    pub async fn get_settings(&self) -> Result<VaultSettings> {
        self.with_session(|session| Ok(session.vault.settings.clone()))
            .await
    }

    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<VaultSettings> {
        self.with_session(|session| {
            session.vault.settings.apply(update);
            Ok(session.vault.settings.clone())
        })
        .await
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Run `f` against the unlocked session, then count it as activity.
    ///
    /// The lock state is checked before `f` runs, so a locked engine reports
    /// `VaultLocked` ahead of any input error.
    async fn with_session<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> Result<T>,
    {
        let mut guard = self.shared.state.lock().await;
        let state = &mut *guard;
        let session = state.session.as_mut().ok_or(VaultError::VaultLocked)?;
        let out = f(session)?;
        arm_timer(&self.shared, state);
        Ok(out)
    }
}

fn arm_timer(shared: &Arc<Shared>, state: &mut EngineState) {
    let Some(window) = shared.config.auto_lock else {
        return;
    };
    let weak: Weak<Shared> = Arc::downgrade(shared);
    state.timer.arm(window, move |generation| async move {
        if let Some(shared) = weak.upgrade() {
            shared.auto_lock(generation).await;
        }
    });
}

impl Shared {
    /// Serialize and encrypt the session under a fresh salt and IV.
    async fn seal(&self, session: &Session) -> Result<EncryptedVault> {
        let plaintext = session.vault.to_canonical_json()?;
        let version = session.vault.version;
        let pw = session.password_copy()?;
        let params = self.config.argon2;

        run_kdf(move || format::seal_plaintext(&plaintext, version, &pw, &params)).await
    }

    /// Timer callback.  Locks only if no activity re-armed the timer in
    /// the meantime.  If sealing fails the session is kept and the timer
    /// re-armed, same as a failed explicit `lock`.
    async fn auto_lock(self: Arc<Self>, generation: u64) {
        let mut state = self.state.lock().await;
        if !state.timer.accept_fire(generation) {
            debug!(generation, "stale auto-lock ignored");
            return;
        }
        let Some(session) = state.session.as_ref() else {
            return;
        };

        let sealed = self.seal(session).await;
        match sealed {
            Ok(blob) => {
                if let Some(storage) = &self.storage {
                    if let Err(e) = storage.save(&blob) {
                        error!(error = %e, "auto-lock could not persist the vault");
                    }
                }
                state.auto_locked = Some(blob);
                state.session = None;
                info!("vault auto-locked after inactivity");
            }
            Err(e) => {
                error!(error = %e, "auto-lock could not seal the vault, staying unlocked");
                arm_timer(&self, &mut state);
            }
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(VaultError::InvalidInput("item name cannot be empty".into()));
    }
    Ok(())
}

/// Run CPU-heavy KDF work on the blocking pool.
async fn run_kdf<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| VaultError::KeyDerivationFailed(format!("KDF task failed: {e}")))?
}
