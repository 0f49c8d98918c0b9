//! Size constants and the execution-plan value type.

/// AES-256 / ChaCha20 key size in bytes.
pub const KEY_SIZE: usize = 32;

/// Authentication tag size in bytes, for both GCM and Poly1305.
pub const TAG_SIZE: usize = 16;

/// Preferred (fast-path) IV/nonce length in bytes for both ciphers.
pub const IV_SIZE: usize = 12;

/// AES/GHASH block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Number of AES-256 round keys (14 rounds + 1 initial whitening key).
pub const AES256_ROUND_KEYS: usize = 15;

/// Number of H-powers precomputed for depth-16 batch GHASH (H¹…H¹⁶).
pub const MAX_H_POWERS: usize = 16;

/// Flattened byte length of the AES-256 round-key schedule
/// (`AES256_ROUND_KEYS * BLOCK_SIZE`), the size of the backing
/// [`crate::secure_memory::SecureArray`].
pub const ROUND_KEY_BYTES: usize = AES256_ROUND_KEYS * BLOCK_SIZE;

/// `2^39 - 256` bits, the GCM limit on total ciphertext length, expressed in
/// bytes (NIST SP 800-38D §5.2.1.1).
pub const MAX_CT_BYTES: u64 = ((1u64 << 39) - 256) / 8;

/// ChaCha20's limit on total ciphertext length: the block counter is a
/// 32-bit word starting at 1, so at most `2^32 - 2` 64-byte blocks can be
/// produced before it wraps (RFC 8439 §2.3).
pub const CHACHA_MAX_CT_BYTES: u64 = ((1u64 << 32) - 2) * 64;

/// Minimum declared size, in bytes, of an opaque caller-provided context
/// buffer (actual contexts are smaller; this is a conservative external
/// contract so future backends have room to grow without an ABI break).
pub const MIN_CONTEXT_SIZE: usize = 512;

/// Required alignment, in bytes, of a context's base address. `H_powers`
/// must be aligned to this boundary for SIMD loads.
pub const CONTEXT_ALIGNMENT: usize = 64;

/// Number of blocks processed per fused-kernel batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneDepth {
    /// 8 blocks (128 bytes) per batch.
    Eight,
    /// 16 blocks (256 bytes) per batch.
    Sixteen,
}

impl LaneDepth {
    /// Number of 16-byte blocks processed per fused-kernel call.
    pub const fn blocks(self) -> usize {
        match self {
            LaneDepth::Eight => 8,
            LaneDepth::Sixteen => 16,
        }
    }
}

/// Whether the fused kernel interleaves two adjacent batches to hide CLMUL
/// latency behind AES round instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// Single-pass: one batch at a time.
    None,
    /// Phase-locked AABB rhythm across batch pairs.
    PhaseLocked,
}

/// Whether ciphertext stores are routed through the cache hierarchy
/// normally or issued as non-temporal (streaming) stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// Ordinary, cached stores. Used for small/medium messages, where the
    /// ciphertext is likely to be read again soon.
    Cached,
    /// Non-temporal stores that bypass the cache. Used for large messages
    /// where re-reading the ciphertext soon is unlikely.
    Streaming,
}

/// An execution plan: the lane depth, overlap strategy, accumulator count,
/// and store mode selected once at `init`/`reset` time and then held fixed
/// for the life of the context.
///
/// Re-running plan selection on every `update` call is a measurable
/// throughput regression; treat this value as immutable once chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Blocks processed per fused-kernel batch.
    pub lane_depth: LaneDepth,
    /// Whether adjacent batches are phase-locked.
    pub overlap: Overlap,
    /// Independent Karatsuba accumulator chains (2, 3, or 4).
    pub accumulators: u8,
    /// Cached vs. streaming ciphertext stores.
    pub store_mode: StoreMode,
}

/// Threshold, in bytes, above which a message is considered "large" for the
/// purposes of lane-depth and store-mode selection.
const LARGE_MESSAGE_THRESHOLD: usize = 16 * 1024;

/// Threshold, in bytes, above which ciphertext stores switch to streaming.
const STREAMING_STORE_THRESHOLD: usize = 64 * 1024;

impl ExecutionPlan {
    /// Choose a plan for the scalar backend: always depth-8, no overlap
    /// (there's no hardware port contention to hide), two accumulators.
    pub const fn scalar() -> Self {
        ExecutionPlan {
            lane_depth: LaneDepth::Eight,
            overlap: Overlap::None,
            accumulators: 2,
            store_mode: StoreMode::Cached,
        }
    }

    /// Choose a plan given detected hardware capabilities and a rough
    /// workload size hint (total expected message length, if known).
    pub fn select(features: &crate::cpu::Features, expected_len: Option<usize>) -> Self {
        let large = expected_len.map(|n| n >= LARGE_MESSAGE_THRESHOLD).unwrap_or(false);
        let streaming = expected_len
            .map(|n| n >= STREAMING_STORE_THRESHOLD)
            .unwrap_or(false);

        if features.has_vaes_vpclmul() {
            let lane_depth = if large { LaneDepth::Sixteen } else { LaneDepth::Eight };
            let overlap = if large { Overlap::PhaseLocked } else { Overlap::None };
            let accumulators = if lane_depth == LaneDepth::Sixteen { 4 } else { 2 };
            ExecutionPlan {
                lane_depth,
                overlap,
                accumulators,
                store_mode: if streaming { StoreMode::Streaming } else { StoreMode::Cached },
            }
        } else if features.has_aesni_pclmul() || features.has_arm_crypto_pmull() {
            ExecutionPlan {
                lane_depth: LaneDepth::Eight,
                overlap: Overlap::None,
                accumulators: 2,
                store_mode: if streaming { StoreMode::Streaming } else { StoreMode::Cached },
            }
        } else {
            Self::scalar()
        }
    }
}
