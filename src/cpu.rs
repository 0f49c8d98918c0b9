//! Runtime CPU feature detection and backend selection.
//!
//! The dispatcher is a **tagged enum** over backend variants rather than a
//! table of function pointers: for a single cipher family this gives the
//! compiler a monomorphizable, branch-predictable dispatch point without
//! reaching for dynamic/virtual dispatch.
//!
//! Detection happens once (see [`Features::detect`]) and the result is
//! cached in the context at `init` time; it is never re-queried per
//! `update` call.

use core::sync::atomic::{AtomicU32, Ordering};

const F_AES_NI: u32 = 1 << 0;
const F_PCLMUL: u32 = 1 << 1;
const F_AVX2: u32 = 1 << 2;
const F_VAES: u32 = 1 << 3;
const F_VPCLMULQDQ: u32 = 1 << 4;
const F_AVX512F: u32 = 1 << 5;
const F_NEON: u32 = 1 << 6;
const F_PMULL: u32 = 1 << 7;

/// A bitfield of detected hardware AEAD-relevant features.
///
/// Exposed to callers (and to test selection / logging) via
/// [`Features::detect`] and the individual `has_*` accessors; the bit
/// layout itself is an implementation detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Features(u32);

impl Features {
    /// Detect features once, process-wide, and cache the result in a static.
    /// Side-effect-free from the caller's perspective and safe to call
    /// concurrently: the underlying detection runs at most once, using an
    /// initialize-once discipline that tolerates concurrent first calls
    /// (a racing detection is idempotent, so no lock is needed).
    pub fn detect() -> Self {
        static CACHE: AtomicU32 = AtomicU32::new(u32::MAX);
        let cached = CACHE.load(Ordering::Relaxed);
        if cached != u32::MAX {
            return Features(cached);
        }
        let detected = detect_uncached().0;
        CACHE.store(detected, Ordering::Relaxed);
        Features(detected)
    }

    /// AES-NI is available.
    pub const fn has_aes_ni(self) -> bool {
        self.0 & F_AES_NI != 0
    }

    /// PCLMULQDQ is available.
    pub const fn has_pclmul(self) -> bool {
        self.0 & F_PCLMUL != 0
    }

    /// AVX2 is available.
    pub const fn has_avx2(self) -> bool {
        self.0 & F_AVX2 != 0
    }

    /// VAES is available.
    pub const fn has_vaes(self) -> bool {
        self.0 & F_VAES != 0
    }

    /// VPCLMULQDQ is available.
    pub const fn has_vpclmulqdq(self) -> bool {
        self.0 & F_VPCLMULQDQ != 0
    }

    /// AVX-512 Foundation is available.
    pub const fn has_avx512f(self) -> bool {
        self.0 & F_AVX512F != 0
    }

    /// ARM NEON is available.
    pub const fn has_neon(self) -> bool {
        self.0 & F_NEON != 0
    }

    /// ARMv8 PMULL (polynomial multiply) crypto extension is available.
    pub const fn has_pmull(self) -> bool {
        self.0 & F_PMULL != 0
    }

    /// VAES + VPCLMULQDQ + AVX2, the top tier in the backend selection
    /// table: fused depth-8/depth-16 kernels with GHASH embedded.
    pub const fn has_vaes_vpclmul(self) -> bool {
        self.has_vaes() && self.has_vpclmulqdq() && self.has_avx2()
    }

    /// AES-NI + PCLMULQDQ, the baseline x86 hardware tier.
    pub const fn has_aesni_pclmul(self) -> bool {
        self.has_aes_ni() && self.has_pclmul()
    }

    /// ARMv8 crypto extensions + PMULL, the AArch64 hardware tier.
    pub const fn has_arm_crypto_pmull(self) -> bool {
        self.has_neon() && self.has_pmull()
    }
}

#[cfg(all(feature = "std", any(target_arch = "x86", target_arch = "x86_64")))]
fn detect_uncached() -> Features {
    let mut bits = 0u32;
    if std::is_x86_feature_detected!("aes") {
        bits |= F_AES_NI;
    }
    if std::is_x86_feature_detected!("pclmulqdq") {
        bits |= F_PCLMUL;
    }
    if std::is_x86_feature_detected!("avx2") {
        bits |= F_AVX2;
    }
    if std::is_x86_feature_detected!("vaes") {
        bits |= F_VAES;
    }
    if std::is_x86_feature_detected!("vpclmulqdq") {
        bits |= F_VPCLMULQDQ;
    }
    if std::is_x86_feature_detected!("avx512f") {
        bits |= F_AVX512F;
    }
    Features(bits)
}

#[cfg(all(feature = "std", target_arch = "aarch64"))]
fn detect_uncached() -> Features {
    let mut bits = 0u32;
    if std::arch::is_aarch64_feature_detected!("neon") {
        bits |= F_NEON;
    }
    if std::arch::is_aarch64_feature_detected!("aes") {
        bits |= F_PMULL;
    }
    Features(bits)
}

/// Without `std`, there is no portable runtime-detection facility available
/// to this crate (reading `/proc/cpuinfo` or the ARM hwcaps auxiliary
/// vector both require an OS surface); the conservative, always-correct
/// choice is to report no hardware features and let callers fall back to
/// the scalar backend. A `no_std` host that knows its own hardware can
/// still call the backend constructors in [`crate::gcm::backend`] directly.
#[cfg(not(all(feature = "std", any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"))))]
fn detect_uncached() -> Features {
    Features(0)
}
