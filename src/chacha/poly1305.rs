//! Poly1305 one-time message authenticator (RFC 8439 §2.5).
//!
//! The accumulator is kept as a little-endian base-2^32 big integer with
//! generous limb headroom, reduced modulo `p = 2^130 - 5` after every
//! multiply using the identity `2^130 ≡ 5 (mod p)`. This is the same
//! schoolbook reduction RFC 8439's reference pseudocode describes, just
//! carried out on fixed-width limb arrays instead of an arbitrary-precision
//! integer type, so it costs no allocation. It trades the tighter bit-packed
//! 44-bit-limb formulation found in most hand-tuned implementations for a
//! wider, more directly checkable one.

const LIMBS: usize = 12;

fn zero() -> [u32; LIMBS] {
    [0u32; LIMBS]
}

/// `p = 2^130 - 5`, as little-endian 32-bit limbs.
const P_LIMBS: [u32; LIMBS] = {
    let mut p = [0u32; LIMBS];
    p[0] = 0xFFFF_FFFB;
    p[1] = 0xFFFF_FFFF;
    p[2] = 0xFFFF_FFFF;
    p[3] = 0xFFFF_FFFF;
    p[4] = 0x0000_0003;
    p
};

fn bytes_to_limbs(bytes: &[u8]) -> [u32; LIMBS] {
    debug_assert!(bytes.len() <= LIMBS * 4);
    let mut limbs = zero();
    for (i, chunk) in bytes.chunks(4).enumerate() {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        limbs[i] = u32::from_le_bytes(word);
    }
    limbs
}

fn add(a: &[u32; LIMBS], b: &[u32; LIMBS]) -> [u32; LIMBS] {
    let mut out = zero();
    let mut carry: u64 = 0;
    for i in 0..LIMBS {
        let sum = a[i] as u64 + b[i] as u64 + carry;
        out[i] = sum as u32;
        carry = sum >> 32;
    }
    out
}

fn sub(a: &[u32; LIMBS], b: &[u32; LIMBS]) -> ([u32; LIMBS], u32) {
    let mut out = zero();
    let mut borrow: i64 = 0;
    for i in 0..LIMBS {
        let diff = a[i] as i64 - b[i] as i64 - borrow;
        if diff < 0 {
            out[i] = (diff + (1i64 << 32)) as u32;
            borrow = 1;
        } else {
            out[i] = diff as u32;
            borrow = 0;
        }
    }
    (out, borrow as u32)
}

/// Schoolbook multiply, truncated to `LIMBS` output limbs. Every value this
/// module multiplies (`a < 2^130`-ish, `r < 2^128`) produces a true product
/// well under `LIMBS * 32 = 384` bits, so the truncation never loses bits in
/// practice.
fn mul(a: &[u32; LIMBS], b: &[u32; LIMBS]) -> [u32; LIMBS] {
    let mut acc = [0u128; LIMBS];
    for i in 0..LIMBS {
        if a[i] == 0 {
            continue;
        }
        for j in 0..(LIMBS - i) {
            acc[i + j] += (a[i] as u128) * (b[j] as u128);
        }
    }
    let mut out = zero();
    let mut carry: u128 = 0;
    for k in 0..LIMBS {
        let v = acc[k] + carry;
        out[k] = v as u32;
        carry = v >> 32;
    }
    out
}

fn mul_small(x: &[u32; LIMBS], k: u32) -> [u32; LIMBS] {
    let mut out = zero();
    let mut carry: u64 = 0;
    for i in 0..LIMBS {
        let v = (x[i] as u64) * (k as u64) + carry;
        out[i] = v as u32;
        carry = v >> 32;
    }
    out
}

/// Split `x` into `(x mod 2^130, x >> 130)`.
fn split130(x: &[u32; LIMBS]) -> ([u32; LIMBS], [u32; LIMBS]) {
    let mut lo = *x;
    lo[4] &= 0x3;
    for limb in lo.iter_mut().skip(5) {
        *limb = 0;
    }

    let mut hi = zero();
    for k in 0..LIMBS {
        let src = k + 4;
        hi[k] = if src < LIMBS { x[src] } else { 0 };
    }
    let mut carry = 0u32;
    for limb in hi.iter_mut().rev() {
        let v = *limb;
        *limb = (v >> 2) | (carry << 30);
        carry = v & 0x3;
    }
    (lo, hi)
}

fn reduce_once(x: &[u32; LIMBS]) -> [u32; LIMBS] {
    let (lo, hi) = split130(x);
    let five_hi = mul_small(&hi, 5);
    add(&lo, &five_hi)
}

/// Reduce `x` modulo `p = 2^130 - 5`, returning a value in `[0, p)`.
fn reduce_mod_p(x: &[u32; LIMBS]) -> [u32; LIMBS] {
    let mut r = *x;
    for _ in 0..3 {
        r = reduce_once(&r);
    }
    let (diff, borrow) = sub(&r, &P_LIMBS);
    let use_diff = subtle::Choice::from((1 - borrow) as u8);
    let mut out = zero();
    for i in 0..LIMBS {
        out[i] = crate::constant_time::ct_select_u32(use_diff, diff[i], r[i]);
    }
    out
}

/// A Poly1305 instance, keyed once and fed data incrementally.
pub struct Poly1305 {
    r: [u32; LIMBS],
    acc: [u32; LIMBS],
    pad: [u32; LIMBS],
    buffer: [u8; 16],
    buffer_len: usize,
}

impl Poly1305 {
    /// `key` is the 32-byte one-time key: the first 16 bytes become `r`
    /// (clamped per RFC 8439 §2.5.1), the last 16 become the additive `s`.
    pub fn new(key: &[u8; 32]) -> Self {
        let mut r_bytes = [0u8; 16];
        r_bytes.copy_from_slice(&key[0..16]);
        r_bytes[3] &= 15;
        r_bytes[7] &= 15;
        r_bytes[11] &= 15;
        r_bytes[15] &= 15;
        r_bytes[4] &= 252;
        r_bytes[8] &= 252;
        r_bytes[12] &= 252;

        Poly1305 {
            r: bytes_to_limbs(&r_bytes),
            acc: zero(),
            pad: bytes_to_limbs(&key[16..32]),
            buffer: [0u8; 16],
            buffer_len: 0,
        }
    }

    fn absorb_block(&mut self, block: &[u8], pad_bit: bool) {
        debug_assert!(block.len() <= 16);
        let mut n = zero();
        for (i, chunk) in block.chunks(4).enumerate() {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            n[i] = u32::from_le_bytes(word);
        }
        if pad_bit {
            let byte_idx = block.len();
            let limb_idx = byte_idx / 4;
            let bit_idx = (byte_idx % 4) * 8;
            n[limb_idx] |= 1u32 << bit_idx;
        }
        self.acc = reduce_mod_p(&add(&self.acc, &n));
        self.acc = reduce_mod_p(&mul(&self.acc, &self.r));
    }

    /// Feed more message bytes into the running MAC.
    pub fn update(&mut self, mut data: &[u8]) {
        if self.buffer_len > 0 {
            let take = (16 - self.buffer_len).min(data.len());
            self.buffer[self.buffer_len..self.buffer_len + take].copy_from_slice(&data[..take]);
            self.buffer_len += take;
            data = &data[take..];
            if self.buffer_len == 16 {
                let block = self.buffer;
                self.absorb_block(&block, true);
                self.buffer_len = 0;
            }
        }
        while data.len() >= 16 {
            self.absorb_block(&data[..16], true);
            data = &data[16..];
        }
        if !data.is_empty() {
            self.buffer[..data.len()].copy_from_slice(data);
            self.buffer_len = data.len();
        }
    }

    /// Finish: absorb any trailing partial block, add `s`, and serialize the
    /// low 128 bits of the result as the 16-byte tag.
    pub fn finish(mut self) -> [u8; 16] {
        if self.buffer_len > 0 {
            let block = self.buffer;
            self.absorb_block(&block[..self.buffer_len], true);
        }
        let result = add(&self.acc, &self.pad);
        let mut out = [0u8; 16];
        for i in 0..4 {
            out[4 * i..4 * i + 4].copy_from_slice(&result[i].to_le_bytes());
        }
        out
    }

    /// One-shot helper: `key` then the full message in one call.
    pub fn mac(key: &[u8; 32], data: &[u8]) -> [u8; 16] {
        let mut mac = Poly1305::new(key);
        mac.update(data);
        mac.finish()
    }
}

impl Drop for Poly1305 {
    fn drop(&mut self) {
        self.r = zero();
        self.acc = zero();
        self.pad = zero();
        self.buffer = [0u8; 16];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduce_mod_p_matches_hand_computed_small_cases() {
        let mut seven = zero();
        seven[0] = 7;
        let (sum_p_7, _) = (add(&P_LIMBS, &seven), ());
        assert_eq!(reduce_mod_p(&P_LIMBS), zero());
        assert_eq!(reduce_mod_p(&sum_p_7), seven);

        let two_p = mul_small(&P_LIMBS, 2);
        let mut three = zero();
        three[0] = 3;
        let two_p_plus_3 = add(&two_p, &three);
        assert_eq!(reduce_mod_p(&two_p_plus_3), three);
    }

    #[test]
    fn mac_is_deterministic_and_sensitive_to_message() {
        let key = [0x01u8; 32];
        let tag1 = Poly1305::mac(&key, b"hello world");
        let tag2 = Poly1305::mac(&key, b"hello world");
        let tag3 = Poly1305::mac(&key, b"hello worlD");
        assert_eq!(tag1, tag2);
        assert_ne!(tag1, tag3);
    }

    #[test]
    fn mac_is_sensitive_to_key() {
        let tag1 = Poly1305::mac(&[0x01u8; 32], b"same message");
        let tag2 = Poly1305::mac(&[0x02u8; 32], b"same message");
        assert_ne!(tag1, tag2);
    }

    #[test]
    fn streaming_update_matches_one_shot() {
        let key = [0x7Au8; 32];
        let msg = b"Cryptographic Forum Research Group and then some more padding bytes";

        let one_shot = Poly1305::mac(&key, msg);

        let mut streamed = Poly1305::new(&key);
        for chunk in msg.chunks(7) {
            streamed.update(chunk);
        }
        let streamed = streamed.finish();

        assert_eq!(one_shot, streamed);
    }

    #[test]
    fn empty_message_produces_pad_as_tag() {
        let mut key = [0u8; 32];
        key[16..32].copy_from_slice(&[0xAAu8; 16]);
        let tag = Poly1305::mac(&key, b"");
        assert_eq!(tag, [0xAAu8; 16]);
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn streaming_matches_one_shot_for_arbitrary_chunking(
            key in proptest::array::uniform32(any::<u8>()),
            msg in proptest::collection::vec(any::<u8>(), 0..300),
            chunk_sizes in proptest::collection::vec(1usize..23, 1..30),
        ) {
            let one_shot = Poly1305::mac(&key, &msg);

            let mut streamed = Poly1305::new(&key);
            let mut offset = 0;
            for &size in &chunk_sizes {
                if offset >= msg.len() {
                    break;
                }
                let end = (offset + size).min(msg.len());
                streamed.update(&msg[offset..end]);
                offset = end;
            }
            if offset < msg.len() {
                streamed.update(&msg[offset..]);
            }

            prop_assert_eq!(one_shot, streamed.finish());
        }
    }
}
