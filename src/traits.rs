//! Core trait for AEAD operations.
//!
//! This module defines [`AeadEngine`], the contract both [`crate::gcm`] and
//! [`crate::chacha`] implement. It mirrors the operation table of the public
//! interface: `init`, `reset`, `aad_update`, `encrypt_update`/`decrypt_update`,
//! `encrypt_final`/`decrypt_final`, `context_wipe`.

use crate::error::Result;
use core::fmt::Debug;

/// Contract shared by every streaming AEAD cipher in this crate.
///
/// Implementers own a POD context record and drive it through the
/// `init -> (aad_update*) -> (encrypt_update* | decrypt_update*) ->
/// encrypt_final | decrypt_final` lifecycle. Calls that violate the
/// state-machine ordering return [`crate::Error::InvalidInput`] rather than
/// panicking.
pub trait AeadEngine: Debug + Sized {
    /// Key size in bytes.
    const KEY_SIZE: usize;

    /// Authentication tag size in bytes.
    const TAG_SIZE: usize;

    /// The IV length this engine was designed around (96 bits for GCM's fast
    /// path, 96 bits for ChaCha20-Poly1305's only defined nonce length).
    const IV_RECOMMENDED_SIZE: usize;

    /// Initialize a fresh context: expand the key schedule / derive the
    /// Poly1305 one-time key, run any per-key precomputation (GHASH H-power
    /// table), and derive the initial counter block from `iv`.
    fn init(key: &[u8], iv: &[u8]) -> Result<Self>;

    /// Reuse the key schedule and H-power table from a previous `init`,
    /// re-deriving the initial counter block from a new IV. Clears the
    /// running authenticator state, partial-block buffer, and counters.
    fn reset(&mut self, iv: &[u8]) -> Result<()>;

    /// Absorb additional authenticated data. May be called multiple times;
    /// the calls commute as long as the concatenation of all AAD bytes is
    /// identical. Must precede the first `encrypt_update`/`decrypt_update`.
    fn aad_update(&mut self, aad: &[u8]) -> Result<()>;

    /// Encrypt `buf` in place, advancing the keystream counter and folding
    /// the resulting ciphertext into the running authenticator.
    fn encrypt_update(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Decrypt `buf` in place, folding the ciphertext (pre-decryption) into
    /// the running authenticator before recovering plaintext.
    fn decrypt_update(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Finalize an encryption: fold in the AAD/ciphertext length block,
    /// mask with the encrypted counter-value-one block, and emit the tag.
    fn encrypt_final(&mut self) -> Result<[u8; 16]>;

    /// Finalize a decryption: compute the expected tag exactly as
    /// `encrypt_final` would and compare it in constant time against
    /// `tag`. Returns [`crate::Error::AuthenticationFailed`] on mismatch.
    fn decrypt_final(&mut self, tag: &[u8]) -> Result<()>;

    /// Zero all key material and intermediate state held by the context.
    fn context_wipe(&mut self);
}
