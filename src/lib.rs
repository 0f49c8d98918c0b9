//! # Soliton AEAD
//!
//! A freestanding, constant-time authenticated-encryption engine providing
//! **AES-256-GCM** (NIST SP 800-38D) and **ChaCha20-Poly1305** (RFC 8439).
//!
//! ## Overview
//!
//! This crate implements the AEAD primitives themselves — key schedule, block
//! cipher, counter-mode keystream, GHASH/Poly1305 authentication, and runtime
//! backend dispatch — rather than wrapping an existing crypto library. The
//! AES-256-GCM path is the primary engineering target: a bit-exact, streaming
//! state machine that dispatches to hand-written AES-NI+PCLMULQDQ, ARMv8
//! crypto+PMULL, or scalar kernels depending on what the host CPU supports,
//! while guaranteeing byte-identical output across every backend.
//!
//! ## Features
//!
//! - **NIST/RFC-conformant**: bit-exact against SP 800-38D and RFC 8439 test
//!   vectors.
//! - **Constant-time**: tag comparison, context wipe, and the scalar AES SBox
//!   never branch on secret data.
//! - **Zero dynamic allocation in the core**: the [`gcm::Aes256GcmContext`] and
//!   [`chacha::ChaCha20Poly1305Context`] are caller-owned, stack-friendly, POD
//!   records.
//! - **Runtime backend dispatch**: [`cpu::Features::detect`] picks the fastest
//!   available kernel set once per context; the scalar backend is always kept
//!   as the correctness oracle.
//! - **`no_std` capable**: the `std` feature only affects convenience glue
//!   (`getrandom`-backed IV generation helpers, `std::error::Error`).
//!
//! ## Quick Start
//!
//! ```
//! use soliton_aead::gcm::Aes256GcmContext;
//! use soliton_aead::traits::AeadEngine;
//!
//! # fn main() -> Result<(), soliton_aead::Error> {
//! let key = [0x11u8; 32];
//! let iv = [0x22u8; 12];
//!
//! let mut ctx = Aes256GcmContext::init(&key, &iv)?;
//! ctx.aad_update(b"header")?;
//! let mut buf = *b"hello, world!!!!"; // 16 bytes, one block
//! ctx.encrypt_update(&mut buf)?;
//! let tag = ctx.encrypt_final()?;
//!
//! let mut ctx = Aes256GcmContext::init(&key, &iv)?;
//! ctx.aad_update(b"header")?;
//! ctx.decrypt_update(&mut buf)?;
//! ctx.decrypt_final(&tag)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - [`gcm`]: AES-256-GCM state machine, key schedule, GHASH, fused kernels.
//! - [`chacha`]: ChaCha20-Poly1305, a simpler secondary variant of the same
//!   streaming contract.
//! - [`traits`]: The [`traits::AeadEngine`] contract both ciphers implement.
//! - [`cpu`]: Runtime CPU feature detection and backend selection.
//! - [`constant_time`]: Branchless select, compare, and wipe primitives.
//! - [`secure_memory`]: Fixed-size, zeroizing buffer types for key material.
//! - [`domain`]: The GCM spec-domain / kernel-domain byte-order contract.
//! - [`observability`]: Process-wide operation counters, plus `tracing`
//!   events when the `observability` feature is enabled.
//!
//! ## Security Considerations
//!
//! 1. Contexts are **not** thread-safe; run one context per thread.
//! 2. On `AUTH_FAIL`, any plaintext already written by `decrypt_update` is
//!    undefined and must be discarded by the caller.
//! 3. This crate performs no key agreement or certificate handling. IVs and
//!    keys are supplied by the caller; [`random_iv`] (behind the `std`
//!    feature) is offered only as a convenience wrapper around `getrandom`,
//!    never called internally by `init`/`reset`.
//!
//! ## Security Warning
//!
//! This implementation has not undergone a formal security audit. Use at your
//! own risk in production environments.

#![cfg_attr(not(feature = "std"), no_std)]
#![allow(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_qualifications,
    missing_debug_implementations
)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Re-export core traits and types
pub use crate::error::{Error, Result};
pub use crate::traits::AeadEngine;

// Core modules
pub mod constant_time;
pub mod cpu;
pub mod domain;
pub mod error;
pub mod observability;
pub mod params;
pub mod secure_memory;
pub mod traits;

// Cryptographic primitive modules
pub mod chacha;
pub mod gcm;

/// Fill `iv` with bytes from the OS CSPRNG via `getrandom`.
///
/// Convenience only: every operation in this crate takes caller-supplied
/// IVs/nonces directly, and nothing in [`gcm::Aes256GcmContext`] or
/// [`chacha::ChaCha20Poly1305Context`] calls this internally. Typical use is
/// filling a 12-byte buffer before `init`/`reset`.
#[cfg(feature = "std")]
pub fn random_iv(iv: &mut [u8]) -> Result<()> {
    getrandom::getrandom(iv).map_err(|_| Error::Internal)
}

// Prelude for convenient imports
pub mod prelude {
    //! Common imports for using soliton-aead.
    //!
    //! ```
    //! use soliton_aead::prelude::*;
    //! ```

    pub use crate::{
        chacha::ChaCha20Poly1305Context,
        cpu::Features,
        gcm::Aes256GcmContext,
        AeadEngine, Error, Result,
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn library_compiles() {
        assert_eq!(2 + 2, 4);
    }

    #[test]
    #[cfg(feature = "std")]
    fn random_iv_fills_the_whole_buffer_and_varies() {
        let mut a = [0u8; 12];
        let mut b = [0u8; 12];
        super::random_iv(&mut a).unwrap();
        super::random_iv(&mut b).unwrap();
        assert_ne!(a, [0u8; 12]);
        assert_ne!(a, b);
    }
}
