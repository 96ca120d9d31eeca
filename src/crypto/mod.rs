//! Cryptographic primitives for PassVault.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Argon2id password-based key derivation (`kdf`)
//! - The zeroize-on-drop derived key wrapper (`keys`)
//! - Random password generation (`password`)

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod password;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use encryption::{decrypt, encrypt, IV_LEN, TAG_LEN};
pub use kdf::{derive_key, derive_key_with_params, generate_salt, Argon2Params, SALT_LEN};
pub use keys::{DerivedKey, KEY_LEN};
pub use password::{generate_password, PasswordOptions};
