//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte IV and returns
//! it alongside the ciphertext.  The caller decides how to lay the two
//! out; the vault envelope stores them as `iv || ciphertext`.
//!
//! The ciphertext always carries the 16-byte GCM auth tag at its end.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use zeroize::Zeroizing;

use super::keys::DerivedKey;
use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM IV in bytes.
pub const IV_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key`.
///
/// Returns `(ciphertext_with_tag, iv)`.
pub fn encrypt(plaintext: &[u8], key: &DerivedKey) -> Result<(Vec<u8>, [u8; IV_LEN])> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    // Never reuse an IV: draw a new one on every call.
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&nonce);
    Ok((ciphertext, iv))
}

/// Decrypt data that was produced by `encrypt`.
///
/// Every failure (short input, bad tag, wrong key) surfaces as the same
/// `Authentication` error.
pub fn decrypt(
    ciphertext_with_tag: &[u8],
    key: &DerivedKey,
    iv: &[u8; IV_LEN],
) -> Result<Zeroizing<Vec<u8>>> {
    if ciphertext_with_tag.len() < TAG_LEN {
        return Err(VaultError::Authentication);
    }

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| VaultError::Authentication)?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(iv), ciphertext_with_tag)
        .map_err(|_| VaultError::Authentication)?;

    Ok(Zeroizing::new(plaintext))
}
