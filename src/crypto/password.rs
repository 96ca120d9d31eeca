//! Random password generation.
//!
//! Characters are drawn uniformly from the union of the enabled classes.
//! `random_range` rejects out-of-range samples instead of reducing modulo
//! the charset length, so no character is favoured.

use rand::Rng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Default generated password length.
pub const DEFAULT_LENGTH: usize = 20;

/// Which character classes to draw from, and how many characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordOptions {
    pub length: usize,
    pub lowercase: bool,
    pub uppercase: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            lowercase: true,
            uppercase: true,
            digits: true,
            symbols: true,
        }
    }
}

impl PasswordOptions {
    /// All classes enabled with the given length.
    pub fn with_length(length: usize) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    /// Build the effective charset.  Falls back to lowercase when every
    /// class is disabled.
    fn charset(&self) -> Vec<u8> {
        let mut charset = Vec::with_capacity(
            LOWERCASE.len() + UPPERCASE.len() + DIGITS.len() + SYMBOLS.len(),
        );
        if self.lowercase {
            charset.extend_from_slice(LOWERCASE);
        }
        if self.uppercase {
            charset.extend_from_slice(UPPERCASE);
        }
        if self.digits {
            charset.extend_from_slice(DIGITS);
        }
        if self.symbols {
            charset.extend_from_slice(SYMBOLS);
        }
        if charset.is_empty() {
            charset.extend_from_slice(LOWERCASE);
        }
        charset
    }
}

/// Generate a random password according to `options`.
pub fn generate_password(options: &PasswordOptions) -> Result<Zeroizing<String>> {
    if options.length == 0 {
        return Err(VaultError::InvalidInput(
            "password length must be at least 1".into(),
        ));
    }

    let charset = options.charset();
    let mut rng = rand::rng();

    let mut password = Zeroizing::new(String::with_capacity(options.length));
    for _ in 0..options.length {
        let idx = rng.random_range(0..charset.len());
        password.push(char::from(charset[idx]));
    }

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_length_and_classes() {
        let pw = generate_password(&PasswordOptions::default()).unwrap();
        assert_eq!(pw.chars().count(), DEFAULT_LENGTH);
    }

    #[test]
    fn no_symbols_means_alphanumeric_only() {
        let options = PasswordOptions {
            symbols: false,
            ..PasswordOptions::with_length(32)
        };
        let pw = generate_password(&options).unwrap();
        assert_eq!(pw.len(), 32);
        assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn digits_only() {
        let options = PasswordOptions {
            length: 64,
            lowercase: false,
            uppercase: false,
            digits: true,
            symbols: false,
        };
        let pw = generate_password(&options).unwrap();
        assert!(pw.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn all_classes_disabled_falls_back_to_lowercase() {
        let options = PasswordOptions {
            length: 50,
            lowercase: false,
            uppercase: false,
            digits: false,
            symbols: false,
        };
        let pw = generate_password(&options).unwrap();
        assert_eq!(pw.len(), 50);
        assert!(pw.chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn zero_length_is_rejected() {
        let err = generate_password(&PasswordOptions::with_length(0)).unwrap_err();
        assert!(matches!(err, VaultError::InvalidInput(_)));
    }

    #[test]
    fn symbols_only_draws_from_symbol_set() {
        let options = PasswordOptions {
            length: 200,
            lowercase: false,
            uppercase: false,
            digits: false,
            symbols: true,
        };
        let pw = generate_password(&options).unwrap();
        assert!(pw.bytes().all(|b| SYMBOLS.contains(&b)));
    }

    #[test]
    fn consecutive_passwords_differ() {
        let a = generate_password(&PasswordOptions::with_length(32)).unwrap();
        let b = generate_password(&PasswordOptions::with_length(32)).unwrap();
        assert_ne!(*a, *b);
    }
}
