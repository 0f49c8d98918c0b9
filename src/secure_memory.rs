//! Secure memory handling for cryptographic operations.
//!
//! The core performs no dynamic allocation: key schedules, GHASH state, and
//! H-power tables all live in fixed-size [`SecureArray`]s embedded directly
//! in the context record, which is zeroized field-by-field on drop (and
//! explicitly by [`crate::traits::AeadEngine::context_wipe`] before that).

use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Fixed-size buffer for sensitive data that zeros itself on drop.
///
/// Used for round keys, the GHASH subkey and its powers, the running
/// authenticator state, and the partial-block holding buffer — everything
/// in [`crate::gcm::Aes256GcmContext`] and [`crate::chacha::ChaCha20Poly1305Context`]
/// that must never outlive its context unwiped.
#[derive(Clone)]
pub struct SecureArray<const N: usize> {
    data: [u8; N],
}

impl<const N: usize> SecureArray<N> {
    /// Wrap an existing array.
    pub fn new(data: [u8; N]) -> Self {
        Self { data }
    }

    /// A zero-filled array.
    pub fn zero() -> Self {
        Self { data: [0u8; N] }
    }

    /// Overwrite the contents from a slice of matching length.
    pub fn copy_from_slice(&mut self, slice: &[u8]) {
        self.data.copy_from_slice(slice);
    }
}

impl<const N: usize> Default for SecureArray<N> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const N: usize> Zeroize for SecureArray<N> {
    fn zeroize(&mut self) {
        self.data.zeroize();
    }
}

impl<const N: usize> Drop for SecureArray<N> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<const N: usize> ZeroizeOnDrop for SecureArray<N> {}

impl<const N: usize> fmt::Debug for SecureArray<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureArray")
            .field("size", &N)
            .field("data", &"[REDACTED]")
            .finish()
    }
}

impl<const N: usize> AsRef<[u8]> for SecureArray<N> {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl<const N: usize> AsMut<[u8]> for SecureArray<N> {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// A value forced to 64-byte alignment.
///
/// `H_powers` must be 64-byte aligned for SIMD loads, and the context as a
/// whole documents a 64-byte alignment requirement at its base address;
/// wrapping the backing array in this type lets the compiler enforce it
/// instead of relying on caller discipline.
#[repr(align(64))]
#[derive(Clone, Copy, Debug)]
pub struct Aligned64<T>(pub T);

impl<T> core::ops::Deref for Aligned64<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> core::ops::DerefMut for Aligned64<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: Zeroize> Zeroize for Aligned64<T> {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Run a closure with a stack-local, zero-on-exit buffer.
///
/// ```
/// use soliton_aead::secure_memory::secure_scope;
/// let result = secure_scope(|buffer: &mut [u8; 16]| {
///     buffer[0] = 42;
///     buffer[0]
/// });
/// assert_eq!(result, 42);
/// ```
pub fn secure_scope<const N: usize, F, R>(f: F) -> R
where
    F: FnOnce(&mut [u8; N]) -> R,
{
    let mut buffer = [0u8; N];
    let result = f(&mut buffer);
    buffer.zeroize();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_array_roundtrips() {
        let mut secure = SecureArray::<32>::zero();
        secure.copy_from_slice(&[42u8; 32]);
        assert_eq!(secure.as_ref(), &[42u8; 32]);
    }

    #[test]
    fn secure_scope_zeroizes_after_use() {
        let result = secure_scope(|buffer: &mut [u8; 16]| {
            buffer[0] = 42;
            buffer[0]
        });
        assert_eq!(result, 42);
    }

    #[test]
    fn aligned64_has_required_alignment() {
        let a: Aligned64<[u8; 256]> = Aligned64([0u8; 256]);
        assert_eq!(core::mem::align_of_val(&a), 64);
    }
}
