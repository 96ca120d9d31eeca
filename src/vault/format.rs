//! Plaintext vault schema and the encrypted envelope.
//!
//! An `EncryptedVault` serializes to JSON as:
//!
//! ```text
//! { "version": 1, "data": "<base64>", "kdf": { ... } }
//! ```
//!
//! where `data` decodes to:
//!
//! ```text
//! [salt: 16 bytes][iv: 12 bytes][ciphertext + 16-byte GCM tag]
//! ```
//!
//! - **Salt** feeds Argon2id; a fresh one is drawn on every seal.
//! - **IV** is the AES-256-GCM nonce, also fresh on every seal.
//! - **kdf** is only present when the vault was sealed with non-default
//!   Argon2 parameters.  Absent means defaults.

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use super::item::{VaultItem, VaultSettings};
use crate::crypto::{self, Argon2Params, IV_LEN, SALT_LEN, TAG_LEN};
use crate::errors::{Result, VaultError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Current plaintext schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Smallest payload that can possibly decrypt: salt + iv + empty ciphertext + tag.
const MIN_PAYLOAD_LEN: usize = SALT_LEN + IV_LEN + TAG_LEN;

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// The decrypted vault: items in insertion order plus settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Vault {
    pub version: u32,
    pub items: Vec<VaultItem>,
    pub settings: VaultSettings,
}

impl Default for Vault {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            items: Vec::new(),
            settings: VaultSettings::default(),
        }
    }
}

impl Vault {
    /// Parse and validate plaintext vault JSON.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let vault: Vault = serde_json::from_slice(bytes)
            .map_err(|e| VaultError::SchemaValidation(format!("vault JSON: {e}")))?;
        vault.validate()?;
        Ok(vault)
    }

    /// Serialize to the canonical JSON form (items in insertion order).
    ///
    /// The buffer is wiped when dropped.
    pub fn to_canonical_json(&self) -> Result<Zeroizing<Vec<u8>>> {
        serde_json::to_vec(self)
            .map(Zeroizing::new)
            .map_err(|e| VaultError::Serialization(format!("vault: {e}")))
    }

    /// Structural checks serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.version == 0 || self.version > CURRENT_VERSION {
            return Err(VaultError::SchemaValidation(format!(
                "unsupported vault version {}, expected 1..={CURRENT_VERSION}",
                self.version
            )));
        }

        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if item.id.is_empty() {
                return Err(VaultError::SchemaValidation("item with empty id".into()));
            }
            if item.name.is_empty() {
                return Err(VaultError::SchemaValidation(format!(
                    "item '{}' has an empty name",
                    item.id
                )));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(VaultError::SchemaValidation(format!(
                    "duplicate item id '{}'",
                    item.id
                )));
            }
        }

        Ok(())
    }

    /// Overwrite every secret string held by the vault, then drop the items.
    pub fn wipe_items(&mut self) {
        for item in &mut self.items {
            item.zeroize();
        }
        self.items.clear();
    }
}

// ---------------------------------------------------------------------------
// EncryptedVault
// ---------------------------------------------------------------------------

/// The opaque, persisted form of a vault.
///
/// Storage and sync collaborators must pass this back unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedVault {
    pub version: u32,

    /// base64(salt || iv || ciphertext_with_tag)
    pub data: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf: Option<Argon2Params>,
}

impl EncryptedVault {
    /// Parse an envelope from its JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| VaultError::SchemaValidation(format!("encrypted vault JSON: {e}")))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| VaultError::Serialization(format!("encrypted vault: {e}")))
    }

    /// The Argon2 parameters this envelope was sealed with.
    pub fn kdf_params(&self) -> Argon2Params {
        self.kdf.unwrap_or_default()
    }
}

/// Encrypt `vault` under a key derived from `password` with a fresh salt
/// and IV.
pub fn seal(vault: &Vault, password: &[u8], params: &Argon2Params) -> Result<EncryptedVault> {
    let plaintext = vault.to_canonical_json()?;
    seal_plaintext(&plaintext, vault.version, password, params)
}

/// Encrypt already-serialized vault JSON.  Used by the engine, which
/// serializes under its lock and encrypts on the blocking pool.
pub fn seal_plaintext(
    plaintext: &[u8],
    version: u32,
    password: &[u8],
    params: &Argon2Params,
) -> Result<EncryptedVault> {
    let salt = crypto::generate_salt();
    let key = crypto::derive_key_with_params(password, &salt, params)?;
    let (ciphertext, iv) = crypto::encrypt(plaintext, &key)?;

    let mut payload = Vec::with_capacity(SALT_LEN + IV_LEN + ciphertext.len());
    payload.extend_from_slice(&salt); // 16 bytes
    payload.extend_from_slice(&iv); // 12 bytes
    payload.extend_from_slice(&ciphertext); // ciphertext + tag

    let data = BASE64.encode(&payload);

    Ok(EncryptedVault {
        version,
        data,
        kdf: (*params != Argon2Params::default()).then_some(*params),
    })
}

/// Decrypt and validate an envelope produced by `seal`.
///
/// Tag verification happens before any JSON parsing, so a wrong password
/// can never yield a "valid" vault.
pub fn open(blob: &EncryptedVault, password: &[u8]) -> Result<Vault> {
    let plaintext = decrypt_payload(blob, password)?;
    Vault::from_json(&plaintext)
}

/// Split the payload, derive the key and decrypt.  Every malformed
/// payload is reported as `Authentication`, same as a bad tag.
fn decrypt_payload(blob: &EncryptedVault, password: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let payload = BASE64
        .decode(blob.data.as_bytes())
        .map_err(|_| VaultError::Authentication)?;

    if payload.len() < MIN_PAYLOAD_LEN {
        return Err(VaultError::Authentication);
    }

    let (salt, rest) = payload.split_at(SALT_LEN);
    let (iv_bytes, ciphertext) = rest.split_at(IV_LEN);
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(iv_bytes);

    let key = crypto::derive_key_with_params(password, salt, &blob.kdf_params())?;
    crypto::decrypt(ciphertext, &key, &iv)
}

// ── Tests ────────────────────────────────────────────────────────────
