//! Integration tests for the PassVault crypto module.

use passvault::crypto::{
    decrypt, derive_key, derive_key_with_params, encrypt, generate_password, generate_salt,
    Argon2Params, DerivedKey, PasswordOptions, IV_LEN, TAG_LEN,
};
use passvault::VaultError;

fn fast() -> Argon2Params {
    Argon2Params::minimum()
}

// ---------------------------------------------------------------------------
// Encryption round-trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = DerivedKey::new([0xABu8; 32]);
    let plaintext = b"{\"version\":1,\"items\":[]}";

    let (ciphertext, iv) = encrypt(plaintext, &key).expect("encrypt should succeed");

    // Ciphertext carries the 16-byte tag.
    assert_eq!(ciphertext.len(), plaintext.len() + TAG_LEN);
    assert_eq!(iv.len(), IV_LEN);

    let recovered = decrypt(&ciphertext, &key, &iv).expect("decrypt should succeed");
    assert_eq!(recovered.as_slice(), plaintext);
}

#[test]
fn encrypt_uses_a_fresh_iv_each_time() {
    let key = DerivedKey::new([0xCDu8; 32]);
    let plaintext = b"same input";

    let (ct1, iv1) = encrypt(plaintext, &key).expect("encrypt 1");
    let (ct2, iv2) = encrypt(plaintext, &key).expect("encrypt 2");

    assert_ne!(iv1, iv2, "IVs must never repeat");
    assert_ne!(ct1, ct2, "two encryptions of the same plaintext must differ");
}

#[test]
fn decrypt_with_wrong_key_fails() {
    let key = DerivedKey::new([0x11u8; 32]);
    let wrong_key = DerivedKey::new([0x22u8; 32]);

    let (ciphertext, iv) = encrypt(b"TOP_SECRET=42", &key).expect("encrypt");
    let result = decrypt(&ciphertext, &wrong_key, &iv);

    assert!(matches!(result, Err(VaultError::Authentication)));
}

#[test]
fn decrypt_with_wrong_iv_fails() {
    let key = DerivedKey::new([0x33u8; 32]);
    let (ciphertext, mut iv) = encrypt(b"payload", &key).expect("encrypt");
    iv[0] ^= 0x01;

    assert!(matches!(
        decrypt(&ciphertext, &key, &iv),
        Err(VaultError::Authentication)
    ));
}

#[test]
fn decrypt_with_truncated_data_fails() {
    let key = DerivedKey::new([0xAAu8; 32]);
    let result = decrypt(&[0u8; 5], &key, &[0u8; IV_LEN]);
    assert!(matches!(result, Err(VaultError::Authentication)));
}

#[test]
fn decrypt_with_corrupted_ciphertext_fails() {
    let key = DerivedKey::new([0xBBu8; 32]);

    let (mut ciphertext, iv) = encrypt(b"VALUE=abc", &key).expect("encrypt");
    ciphertext[3] ^= 0xFF;

    let result = decrypt(&ciphertext, &key, &iv);
    assert!(
        matches!(result, Err(VaultError::Authentication)),
        "corrupted ciphertext must fail auth check"
    );
}

// ---------------------------------------------------------------------------
// Key derivation (Argon2id)
// ---------------------------------------------------------------------------

#[test]
fn derive_key_same_inputs_same_output() {
    let password = "my-secure-passphrase".as_bytes();
    let salt = generate_salt();

    let key1 = derive_key_with_params(password, &salt, &fast()).expect("derive 1");
    let key2 = derive_key_with_params(password, &salt, &fast()).expect("derive 2");

    assert_eq!(key1, key2, "same password + salt must produce the same key");
}

#[test]
fn derive_key_different_salts_different_keys() {
    let password = b"same-password";

    let key1 = derive_key_with_params(password, &generate_salt(), &fast()).expect("derive 1");
    let key2 = derive_key_with_params(password, &generate_salt(), &fast()).expect("derive 2");

    assert_ne!(key1, key2, "different salts must produce different keys");
}

#[test]
fn derive_key_different_passwords_different_keys() {
    let salt = generate_salt();

    let key1 = derive_key_with_params(b"password-one", &salt, &fast()).expect("derive 1");
    let key2 = derive_key_with_params(b"password-two", &salt, &fast()).expect("derive 2");

    assert_ne!(key1, key2, "different passwords must produce different keys");
}

#[test]
fn derive_key_accepts_unicode_passwords() {
    let salt = generate_salt();
    let pw = "pässwörd-密码-🔑";
    let key1 = derive_key_with_params(pw.as_bytes(), &salt, &fast()).expect("derive");
    let key2 = derive_key_with_params(pw.as_bytes(), &salt, &fast()).expect("derive");
    assert_eq!(key1, key2);
}

#[test]
fn derive_key_with_default_params_rejects_bad_salt() {
    // Validation happens before the expensive hashing.
    let err = derive_key(b"pw", &[1u8; 15]).unwrap_err();
    assert!(matches!(err, VaultError::InvalidInput(_)));
}

// ---------------------------------------------------------------------------
// End-to-end: password -> key -> encrypt/decrypt
// ---------------------------------------------------------------------------

#[test]
fn full_crypto_pipeline() {
    let salt = generate_salt();
    let key = derive_key_with_params(b"hunter2", &salt, &fast()).expect("derive");

    let plaintext = b"ghPassword123";
    let (ciphertext, iv) = encrypt(plaintext, &key).expect("encrypt");

    // Re-derive from scratch, as an unlock would.
    let again = derive_key_with_params(b"hunter2", &salt, &fast()).expect("derive again");
    let recovered = decrypt(&ciphertext, &again, &iv).expect("decrypt");
    assert_eq!(recovered.as_slice(), plaintext);
}

// ---------------------------------------------------------------------------
// Password generation
// ---------------------------------------------------------------------------

#[test]
fn generated_password_without_symbols_is_alphanumeric() {
    let options = PasswordOptions {
        symbols: false,
        ..PasswordOptions::with_length(32)
    };
    let pw = generate_password(&options).expect("generate");
    assert_eq!(pw.chars().count(), 32);
    assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn generated_password_hits_every_enabled_class_eventually() {
    let pw = generate_password(&PasswordOptions::with_length(512)).expect("generate");
    assert!(pw.chars().any(|c| c.is_ascii_lowercase()));
    assert!(pw.chars().any(|c| c.is_ascii_uppercase()));
    assert!(pw.chars().any(|c| c.is_ascii_digit()));
    assert!(pw.chars().any(|c| !c.is_ascii_alphanumeric()));
}
