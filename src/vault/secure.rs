//! Wipeable secret buffers and the pool that owns them.
//!
//! Wiping is best-effort.  It clears the bytes this process owns, but
//! cannot reach copies the allocator left behind after a reallocation,
//! pages the OS swapped out, or strings a caller made from the data.
//! Buffers here never grow after construction, which removes the first
//! of those sources.

use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{Result, VaultError};

/// Number of random overwrite passes performed before the final zeroing.
const RANDOM_PASSES: usize = 3;

/// A fixed-size owned byte buffer that is wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretBuffer {
    data: Vec<u8>,
    #[zeroize(skip)]
    wiped: bool,
}

impl SecretBuffer {
    /// Take ownership of `bytes`.  The caller's buffer is moved, not copied.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            data: bytes,
            wiped: false,
        }
    }

    /// Copy `s` into a new buffer.  The caller remains responsible for
    /// wiping its own copy.
    pub fn copy_from_str(s: &str) -> Self {
        Self::new(s.as_bytes().to_vec())
    }

    /// Borrow the secret bytes.  Fails once the buffer has been wiped.
    pub fn expose(&self) -> Result<&[u8]> {
        if self.wiped {
            return Err(VaultError::VaultLocked);
        }
        Ok(&self.data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_wiped(&self) -> bool {
        self.wiped
    }

    /// Overwrite with random bytes several times, then zero and release.
    pub fn wipe(&mut self) {
        if self.wiped {
            return;
        }
        let mut rng = rand::rng();
        for _ in 0..RANDOM_PASSES {
            rng.fill_bytes(&mut self.data);
        }
        // `zeroize` zeroes the full capacity and truncates to empty.
        self.data.zeroize();
        self.data.shrink_to_fit();
        self.wiped = true;
    }
}

impl std::fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretBuffer")
            .field("len", &self.data.len())
            .field("wiped", &self.wiped)
            .finish()
    }
}

/// Handle to a buffer inside a `SecureMemoryPool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SecretHandle {
    epoch: u64,
    index: usize,
}

/// Owns every secret buffer of one engine session so a single call can
/// wipe them all on lock.
#[derive(Debug, Default)]
pub struct SecureMemoryPool {
    allocations: Vec<SecretBuffer>,
    /// Bumped by `wipe_all` so handles from an earlier session never
    /// resolve to a later allocation.
    epoch: u64,
}

impl SecureMemoryPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `buffer` into the pool.
    pub fn allocate(&mut self, buffer: SecretBuffer) -> SecretHandle {
        self.allocations.push(buffer);
        SecretHandle {
            epoch: self.epoch,
            index: self.allocations.len() - 1,
        }
    }

    /// Borrow the bytes behind `handle`.
    pub fn get(&self, handle: SecretHandle) -> Result<&[u8]> {
        if handle.epoch != self.epoch {
            return Err(VaultError::VaultLocked);
        }
        self.allocations
            .get(handle.index)
            .ok_or(VaultError::VaultLocked)?
            .expose()
    }

    /// Number of live (not yet wiped) allocations.
    pub fn len(&self) -> usize {
        self.allocations.iter().filter(|b| !b.is_wiped()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wipe and release every allocation.  Outstanding handles become
    /// invalid.
    pub fn wipe_all(&mut self) {
        for buffer in &mut self.allocations {
            buffer.wipe();
        }
        self.allocations.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }
}

impl Drop for SecureMemoryPool {
    fn drop(&mut self) {
        self.wipe_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expose_returns_original_bytes() {
        let buf = SecretBuffer::copy_from_str("hunter2");
        assert_eq!(buf.expose().unwrap(), b"hunter2");
        assert_eq!(buf.len(), 7);
    }

    #[test]
    fn wipe_clears_and_blocks_access() {
        let mut buf = SecretBuffer::new(b"correct-horse".to_vec());
        buf.wipe();
        assert!(buf.is_wiped());
        assert!(buf.is_empty());
        assert!(matches!(buf.expose(), Err(VaultError::VaultLocked)));
    }

    #[test]
    fn wipe_is_idempotent() {
        let mut buf = SecretBuffer::copy_from_str("x");
        buf.wipe();
        buf.wipe();
        assert!(buf.is_wiped());
    }

    #[test]
    fn pool_wipe_all_invalidates_handles() {
        let mut pool = SecureMemoryPool::new();
        let a = pool.allocate(SecretBuffer::copy_from_str("one"));
        let b = pool.allocate(SecretBuffer::copy_from_str("two"));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(b).unwrap(), b"two");

        pool.wipe_all();
        assert!(pool.is_empty());
        assert!(pool.get(a).is_err());
        assert!(pool.get(b).is_err());
    }

    #[test]
    fn stale_handle_does_not_reach_new_allocation() {
        let mut pool = SecureMemoryPool::new();
        let old = pool.allocate(SecretBuffer::copy_from_str("first-session"));
        pool.wipe_all();

        let new = pool.allocate(SecretBuffer::copy_from_str("second-session"));
        assert!(pool.get(old).is_err());
        assert_eq!(pool.get(new).unwrap(), b"second-session");
    }

    #[test]
    fn debug_does_not_print_contents() {
        let buf = SecretBuffer::copy_from_str("topsecret");
        assert!(!format!("{buf:?}").contains("topsecret"));
    }
}
