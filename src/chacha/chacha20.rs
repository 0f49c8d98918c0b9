//! The ChaCha20 block function and keystream application (RFC 8439 §2.3-2.4).

const CONSTANTS: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

#[inline]
fn quarter_round(state: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(16);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(12);

    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(8);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(7);
}

/// Build the initial ChaCha20 state: 4 constant words, 8 key words, the
/// 32-bit block counter, and 3 nonce words.
fn initial_state(key: &[u8; 32], counter: u32, nonce: &[u8; 12]) -> [u32; 16] {
    let mut state = [0u32; 16];
    state[0..4].copy_from_slice(&CONSTANTS);
    for i in 0..8 {
        state[4 + i] = u32::from_le_bytes(key[4 * i..4 * i + 4].try_into().unwrap());
    }
    state[12] = counter;
    for i in 0..3 {
        state[13 + i] = u32::from_le_bytes(nonce[4 * i..4 * i + 4].try_into().unwrap());
    }
    state
}

/// The ChaCha20 block function: 20 rounds (10 column/diagonal double
/// rounds) over the initial state, then the initial state added back in
/// word-wise (mod 2^32), serialized little-endian.
pub fn block(key: &[u8; 32], counter: u32, nonce: &[u8; 12]) -> [u8; 64] {
    let initial = initial_state(key, counter, nonce);
    let mut state = initial;

    for _ in 0..10 {
        quarter_round(&mut state, 0, 4, 8, 12);
        quarter_round(&mut state, 1, 5, 9, 13);
        quarter_round(&mut state, 2, 6, 10, 14);
        quarter_round(&mut state, 3, 7, 11, 15);
        quarter_round(&mut state, 0, 5, 10, 15);
        quarter_round(&mut state, 1, 6, 11, 12);
        quarter_round(&mut state, 2, 7, 8, 13);
        quarter_round(&mut state, 3, 4, 9, 14);
    }

    for i in 0..16 {
        state[i] = state[i].wrapping_add(initial[i]);
    }

    let mut out = [0u8; 64];
    for i in 0..16 {
        out[4 * i..4 * i + 4].copy_from_slice(&state[i].to_le_bytes());
    }
    out
}

/// XOR `buf` in place with the ChaCha20 keystream, block counter starting at
/// `start_counter`. Returns the counter one past the last block consumed.
pub fn apply_keystream(key: &[u8; 32], nonce: &[u8; 12], start_counter: u32, buf: &mut [u8]) -> u32 {
    let mut counter = start_counter;
    let mut chunks = buf.chunks_exact_mut(64);
    for chunk in &mut chunks {
        let ks = block(key, counter, nonce);
        for (c, k) in chunk.iter_mut().zip(ks.iter()) {
            *c ^= k;
        }
        counter = counter.wrapping_add(1);
    }
    let rem = chunks.into_remainder();
    if !rem.is_empty() {
        let ks = block(key, counter, nonce);
        for (c, k) in rem.iter_mut().zip(ks.iter()) {
            *c ^= k;
        }
        counter = counter.wrapping_add(1);
    }
    counter
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn rfc8439_block_function_vector() {
        // RFC 8439 §2.3.2.
        let key = hex!("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f");
        let nonce = hex!("000000090000004a00000000");
        let expected = hex!(
            "10f1e7e4d13b5915500fdd1fa32071c4c7d1f4c733c068030422aa9ac3d46c4ed2826446079faa0914c2d705d98b02a2b5129cd1de164eb9cbd083e8a2503c4e"
        );
        assert_eq!(block(&key, 1, &nonce), expected);
    }

    #[test]
    fn keystream_roundtrips_via_xor() {
        let key = [0x42u8; 32];
        let nonce = [0x24u8; 12];
        let mut buf = [0u8; 130]; // two full blocks + a partial
        for (i, b) in buf.iter_mut().enumerate() {
            *b = i as u8;
        }
        let original = buf;
        let next = apply_keystream(&key, &nonce, 0, &mut buf);
        assert_ne!(buf, original);
        apply_keystream(&key, &nonce, 0, &mut buf);
        assert_eq!(buf, original);
        assert_eq!(next, 3);
    }

    #[test]
    fn different_counters_give_different_keystreams() {
        let key = [0x11u8; 32];
        let nonce = [0x22u8; 12];
        assert_ne!(block(&key, 0, &nonce), block(&key, 1, &nonce));
    }
}
