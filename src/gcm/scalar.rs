//! Scalar AES-256: key schedule and single-block encryption.
//!
//! This is the correctness oracle the rest of the crate is checked against
//! (§8's backend-equivalence property). The SBox is computed algebraically
//! — GF(2^8) multiplicative inverse by repeated squaring, then the AES
//! affine transform — rather than via a lookup table, so this path carries
//! no cache-timing side channel. Do not delete or let this module bit-rot
//! when adding faster backends; every hardware kernel is checked against it.

use crate::params::{AES256_ROUND_KEYS, BLOCK_SIZE};

/// GF(2^8) multiplication with the AES reduction polynomial x⁸+x⁴+x³+x+1
/// (0x11B), via the standard peasant's multiplication algorithm.
const fn gf28_mul(mut a: u8, mut b: u8) -> u8 {
    let mut p: u8 = 0;
    let mut i = 0;
    while i < 8 {
        if b & 1 != 0 {
            p ^= a;
        }
        let hi_bit = a & 0x80;
        a <<= 1;
        if hi_bit != 0 {
            a ^= 0x1B;
        }
        b >>= 1;
        i += 1;
    }
    p
}

/// GF(2^8) multiplicative inverse via `a^254` (since `a^255 = 1` for all
/// nonzero `a`), computed by repeated squaring and multiplication. `0` maps
/// to `0`, matching the AES SBox convention.
const fn gf28_inv(a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    // a^254 = a^(128+64+32+16+8+4+2) = ((((((a^2)^2)^2)^2)^2)^2)^2 * a^2 ... built by
    // repeated squaring with all but the lowest exponent bit set (254 = 0b11111110).
    let a2 = gf28_mul(a, a);
    let a4 = gf28_mul(a2, a2);
    let a8 = gf28_mul(a4, a4);
    let a16 = gf28_mul(a8, a8);
    let a32 = gf28_mul(a16, a16);
    let a64 = gf28_mul(a32, a32);
    let a128 = gf28_mul(a64, a64);
    // 254 = 128 + 64 + 32 + 16 + 8 + 4 + 2
    let mut r = gf28_mul(a128, a64);
    r = gf28_mul(r, a32);
    r = gf28_mul(r, a16);
    r = gf28_mul(r, a8);
    r = gf28_mul(r, a4);
    gf28_mul(r, a2)
}

/// The AES affine transformation applied after GF(2^8) inversion.
const fn affine_transform(b: u8) -> u8 {
    let mut x = b;
    let mut rotated = b;
    let mut out = 0u8;
    let mut i = 0;
    while i < 5 {
        out ^= rotated;
        rotated = rotated.rotate_left(1);
        i += 1;
    }
    x = out ^ 0x63;
    x
}

/// The AES SBox, computed algebraically: `Affine(Inverse(x))`.
#[inline]
const fn sbox(byte: u8) -> u8 {
    affine_transform(gf28_inv(byte))
}

#[inline]
fn sub_word(word: [u8; 4]) -> [u8; 4] {
    [sbox(word[0]), sbox(word[1]), sbox(word[2]), sbox(word[3])]
}

#[inline]
fn rot_word(word: [u8; 4]) -> [u8; 4] {
    [word[1], word[2], word[3], word[0]]
}

const RCON: [u8; 7] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40];

/// Expand a 32-byte key into 15 round keys (AES-256 key schedule, FIPS-197
/// §5.2): eight 32-bit words copied from the key; each subsequent word is
/// the previous word XORed with the word eight positions earlier, where the
/// previous word is first transformed by `RotWord . SubWord . Rcon` at
/// positions that are multiples of 8, or by `SubWord` alone at positions
/// congruent to 4 mod 8.
pub fn key_schedule(key: &[u8; 32]) -> [[u8; 16]; AES256_ROUND_KEYS] {
    const NK: usize = 8;
    const TOTAL_WORDS: usize = 4 * AES256_ROUND_KEYS;

    let mut w = [[0u8; 4]; TOTAL_WORDS];
    for i in 0..NK {
        w[i] = [key[4 * i], key[4 * i + 1], key[4 * i + 2], key[4 * i + 3]];
    }

    for i in NK..TOTAL_WORDS {
        let mut temp = w[i - 1];
        if i % NK == 0 {
            temp = sub_word(rot_word(temp));
            temp[0] ^= RCON[i / NK - 1];
        } else if i % NK == 4 {
            temp = sub_word(temp);
        }
        for b in 0..4 {
            w[i][b] = w[i - NK][b] ^ temp[b];
        }
    }

    let mut round_keys = [[0u8; 16]; AES256_ROUND_KEYS];
    for r in 0..AES256_ROUND_KEYS {
        for word in 0..4 {
            round_keys[r][4 * word..4 * word + 4].copy_from_slice(&w[4 * r + word]);
        }
    }
    round_keys
}

#[inline]
fn add_round_key(state: &mut [u8; 16], round_key: &[u8; 16]) {
    for i in 0..16 {
        state[i] ^= round_key[i];
    }
}

#[inline]
fn sub_bytes(state: &mut [u8; 16]) {
    for b in state.iter_mut() {
        *b = sbox(*b);
    }
}

/// ShiftRows over the column-major state: `state[4c + r]` holds row `r`,
/// column `c`. Row `r` is cyclically left-shifted by `r` positions.
#[inline]
fn shift_rows(state: &mut [u8; 16]) {
    let s = *state;
    for r in 1..4 {
        for c in 0..4 {
            state[4 * c + r] = s[4 * ((c + r) % 4) + r];
        }
    }
}

#[inline]
fn mix_single_column(col: &mut [u8; 4]) {
    let a = *col;
    col[0] = gf28_mul(a[0], 2) ^ gf28_mul(a[1], 3) ^ a[2] ^ a[3];
    col[1] = a[0] ^ gf28_mul(a[1], 2) ^ gf28_mul(a[2], 3) ^ a[3];
    col[2] = a[0] ^ a[1] ^ gf28_mul(a[2], 2) ^ gf28_mul(a[3], 3);
    col[3] = gf28_mul(a[0], 3) ^ a[1] ^ a[2] ^ gf28_mul(a[3], 2);
}

#[inline]
fn mix_columns(state: &mut [u8; 16]) {
    for c in 0..4 {
        let mut col = [state[4 * c], state[4 * c + 1], state[4 * c + 2], state[4 * c + 3]];
        mix_single_column(&mut col);
        state[4 * c..4 * c + 4].copy_from_slice(&col);
    }
}

/// Encrypt a single 16-byte block with the AES-256 round keys: initial
/// AddRoundKey, 13 rounds of (SubBytes, ShiftRows, MixColumns,
/// AddRoundKey), and a final round omitting MixColumns.
pub fn encrypt_block(
    round_keys: &[[u8; 16]; AES256_ROUND_KEYS],
    block: &[u8; BLOCK_SIZE],
) -> [u8; BLOCK_SIZE] {
    let mut state = *block;
    add_round_key(&mut state, &round_keys[0]);
    for round in 1..14 {
        sub_bytes(&mut state);
        shift_rows(&mut state);
        mix_columns(&mut state);
        add_round_key(&mut state, &round_keys[round]);
    }
    sub_bytes(&mut state);
    shift_rows(&mut state);
    add_round_key(&mut state, &round_keys[14]);
    state
}
