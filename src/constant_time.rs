//! Constant-time primitives for side-channel resistance.
//!
//! Everything here runs in time independent of the *values* involved, only
//! their lengths. These primitives back (a) tag comparison in
//! `decrypt_final`, (b) context destruction (`ct_wipe`, used by
//! `derive_mac`/`xor_with_keystream` in [`crate::chacha`]), and (c) the
//! Poly1305 final reduction's constant-time conditional subtraction
//! (`ct_select_u32`). Hardware AES paths and the scalar AES SBox inherit
//! constant-time behavior from the instruction spec / branchless
//! field-arithmetic formulation and do not need these helpers.

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// Constant-time `cond ? a : b` over a 32-bit word.
#[inline]
pub fn ct_select_u32(cond: Choice, a: u32, b: u32) -> u32 {
    u32::conditional_select(&b, &a, cond)
}

/// Constant-time memory compare. XOR-accumulates differences across the
/// full length of both slices and collapses to a single non-zero-ness
/// indicator; never short-circuits on the first mismatch.
///
/// Returns `false` immediately (non-constant-time) only when lengths
/// differ, since differing lengths are public information at every call
/// site in this crate (tag size is a compile-time constant).
#[inline]
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    bool::from(a.ct_eq(b))
}

/// Constant-time authentication tag comparison. Identical to [`ct_eq`], but
/// named separately to mark the call sites that matter most: any change
/// here widens the crate's most sensitive timing side channel.
#[inline]
pub fn ct_tag_eq(computed: &[u8], expected: &[u8]) -> bool {
    ct_eq(computed, expected)
}

/// Secure wipe: write zeros through a volatile write per byte so the
/// compiler cannot elide the store as dead code, then fence so the writes
/// are ordered before whatever happens next. Callers holding key material
/// directly in a [`crate::secure_memory::SecureArray`] get this for free via
/// its `Drop` impl; this function exists for contexts embedded in larger,
/// non-owning buffers.
#[inline]
pub fn ct_wipe(buf: &mut [u8]) {
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, aligned `&mut u8` for the duration of
        // the write; `write_volatile` prevents the store from being
        // optimized away even though `buf` is about to be dropped.
        unsafe { core::ptr::write_volatile(byte, 0) };
    }
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}
