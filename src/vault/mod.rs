//! Vault module: the decrypted vault and the engine that guards it.
//!
//! This module provides:
//! - `VaultItem`, `NewItem`, `ItemUpdate` and settings types (`item`)
//! - The plaintext schema and encrypted envelope (`format`)
//! - Wipeable secret buffers (`secure`)
//! - The inactivity timer (`autolock`)
//! - The lock/unlock state machine with item CRUD (`engine`)

pub mod autolock;
pub mod engine;
pub mod format;
pub mod item;
pub mod secure;

// Re-export the most commonly used items.
pub use autolock::DEFAULT_AUTO_LOCK;
pub use engine::{EngineConfig, VaultEngine};
pub use format::{EncryptedVault, Vault, CURRENT_VERSION};
pub use item::{ItemUpdate, NewItem, SettingsUpdate, VaultItem, VaultSettings};
pub use secure::{SecretBuffer, SecureMemoryPool};
