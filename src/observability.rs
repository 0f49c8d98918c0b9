//! Structured tracing for AEAD operations, gated behind the
//! `observability` feature.
//!
//! This crate's core never allocates and never carries a logging
//! dependency into the default build; when the feature is off, every item
//! here compiles away to nothing and call sites pay no cost. When it's on,
//! operations emit [`tracing`] events the same way
//! `synapsed-crypto::observability` instruments key generation and
//! encrypt/decrypt/sign/verify calls, scaled down to this crate's four
//! operations (init, aad, encrypt, decrypt) and without the Substrates/
//! Serventis event-bus plumbing that crate also wires up, which this crate
//! has no dependency on.

use core::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counters for each AEAD lifecycle operation. Cheap enough to
/// update unconditionally; reading them costs one relaxed load per field.
#[derive(Debug, Default)]
pub struct AeadMetrics {
    inits: AtomicU64,
    aad_updates: AtomicU64,
    encrypt_updates: AtomicU64,
    decrypt_updates: AtomicU64,
    auth_failures: AtomicU64,
}

impl AeadMetrics {
    /// A fresh, zeroed counter set.
    pub const fn new() -> Self {
        AeadMetrics {
            inits: AtomicU64::new(0),
            aad_updates: AtomicU64::new(0),
            encrypt_updates: AtomicU64::new(0),
            decrypt_updates: AtomicU64::new(0),
            auth_failures: AtomicU64::new(0),
        }
    }

    /// Snapshot the current counter values.
    pub fn snapshot(&self) -> AeadMetricsSnapshot {
        AeadMetricsSnapshot {
            inits: self.inits.load(Ordering::Relaxed),
            aad_updates: self.aad_updates.load(Ordering::Relaxed),
            encrypt_updates: self.encrypt_updates.load(Ordering::Relaxed),
            decrypt_updates: self.decrypt_updates.load(Ordering::Relaxed),
            auth_failures: self.auth_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`AeadMetrics`]'s counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AeadMetricsSnapshot {
    /// Number of `init` calls across all contexts.
    pub inits: u64,
    /// Number of `aad_update` calls.
    pub aad_updates: u64,
    /// Number of `encrypt_update` calls.
    pub encrypt_updates: u64,
    /// Number of `decrypt_update` calls.
    pub decrypt_updates: u64,
    /// Number of `decrypt_final` calls that returned `AuthenticationFailed`.
    pub auth_failures: u64,
}

/// Process-wide metrics, shared across every context regardless of cipher.
pub static METRICS: AeadMetrics = AeadMetrics::new();

/// Record a context `init` call and, when `observability` is enabled, emit a
/// trace event naming the cipher.
pub fn record_init(cipher: &'static str) {
    METRICS.inits.fetch_add(1, Ordering::Relaxed);
    #[cfg(feature = "observability")]
    tracing::trace!(cipher, "aead context initialized");
    #[cfg(not(feature = "observability"))]
    let _ = cipher;
}

/// Record an `aad_update` call of `len` bytes.
pub fn record_aad_update(len: usize) {
    METRICS.aad_updates.fetch_add(1, Ordering::Relaxed);
    #[cfg(feature = "observability")]
    tracing::trace!(len, "aad absorbed");
    #[cfg(not(feature = "observability"))]
    let _ = len;
}

/// Record an `encrypt_update` call of `len` bytes.
pub fn record_encrypt_update(len: usize) {
    METRICS.encrypt_updates.fetch_add(1, Ordering::Relaxed);
    #[cfg(feature = "observability")]
    tracing::trace!(len, "plaintext encrypted");
    #[cfg(not(feature = "observability"))]
    let _ = len;
}

/// Record a `decrypt_update` call of `len` bytes.
pub fn record_decrypt_update(len: usize) {
    METRICS.decrypt_updates.fetch_add(1, Ordering::Relaxed);
    #[cfg(feature = "observability")]
    tracing::trace!(len, "ciphertext decrypted");
    #[cfg(not(feature = "observability"))]
    let _ = len;
}

/// Record a failed `decrypt_final` authentication check.
pub fn record_auth_failure(cipher: &'static str) {
    METRICS.auth_failures.fetch_add(1, Ordering::Relaxed);
    #[cfg(feature = "observability")]
    tracing::warn!(cipher, "authentication failed");
    #[cfg(not(feature = "observability"))]
    let _ = cipher;
}
