//! PassVault: a local password-vault engine.
//!
//! Credentials live decrypted only inside an unlocked [`VaultEngine`].
//! Locking seals them into an [`EncryptedVault`] (Argon2id + AES-256-GCM,
//! fresh salt and IV every time) that storage and sync collaborators treat
//! as an opaque blob.
//!
//! ```rust,no_run
//! use passvault::vault::{EngineConfig, NewItem, VaultEngine};
//!
//! # async fn example() -> passvault::errors::Result<()> {
//! let engine = VaultEngine::new(EngineConfig::default());
//! engine.unlock("correct-horse", None).await?;
//! engine
//!     .add_item(NewItem::new("GitHub", "ghPassword123").username("john"))
//!     .await?;
//! let blob = engine.lock().await?.expect("was unlocked");
//!
//! let other = VaultEngine::new(EngineConfig::default());
//! other.unlock("correct-horse", Some(&blob)).await?;
//! assert_eq!(other.get_all_items().await?.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod storage;
pub mod vault;

pub use errors::{Result, VaultError};
pub use storage::{FileStorage, MemoryStorage, StorageAdapter};
pub use vault::{EncryptedVault, EngineConfig, Vault, VaultEngine, VaultItem};
