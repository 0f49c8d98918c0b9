//! The GCM spec-domain / kernel-domain byte-order contract.
//!
//! GCM's specification defines GHASH over GF(2^128) using a reflected
//! (big-endian, MSB-first) bit convention. PCLMULQDQ — and this crate's
//! scalar multiply, which must agree with it bit-for-bit — operates on
//! polynomials in native (little-endian) order. Every block that crosses
//! that boundary goes through exactly one reversal, in exactly one
//! direction, at exactly one point:
//!
//! - **Ingress** (ciphertext, AAD blocks, the length block): spec domain to
//!   kernel domain, once, at the point data enters GHASH.
//! - **Internal storage** (`H`, `H_powers`, the running GHASH accumulator):
//!   always kernel domain. No reversal on hot-loop loads.
//! - **Egress** (the final tag): kernel domain to spec domain, once, at the
//!   point the tag leaves the core.
//!
//! Violating this silently — an ingress swap left out, or a swap applied
//! twice — is the single most common bug class in a GCM implementation and
//! is the reason the domain-commute property test in the test suite exists.

/// Reverse the byte order of a 128-bit block. Self-inverse: applying it
/// twice is the identity, which is exactly why "always convert once" is a
/// rule and not a suggestion — a missing or doubled call is silent.
#[inline]
pub fn reverse_block(block: [u8; 16]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for i in 0..16 {
        out[i] = block[15 - i];
    }
    out
}

/// Convert a 128-bit block from GCM spec domain to kernel domain.
#[inline]
pub fn to_kernel(spec: [u8; 16]) -> [u8; 16] {
    reverse_block(spec)
}

/// Convert a 128-bit block from kernel domain back to GCM spec domain.
#[inline]
pub fn from_kernel(kernel: [u8; 16]) -> [u8; 16] {
    reverse_block(kernel)
}
