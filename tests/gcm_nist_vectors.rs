//! NIST SP 800-38D Galois/Counter Mode test vectors, exercised through the
//! public `AeadEngine` surface rather than any internal module.

use soliton_aead::gcm::Aes256GcmContext;
use soliton_aead::traits::AeadEngine;

/// Test case 13 (256-bit key family, scenario "A"): zero key, zero IV, empty
/// plaintext and AAD.
#[test]
fn scenario_a_empty_plaintext_and_aad() {
    let key = [0u8; 32];
    let iv = [0u8; 12];
    let mut ctx = Aes256GcmContext::init(&key, &iv).unwrap();
    let tag = ctx.encrypt_final().unwrap();

    let expected_tag: [u8; 16] = [
        0x53, 0x0f, 0x8a, 0xfb, 0xc7, 0x45, 0x36, 0xb9, 0xa9, 0x63, 0xb4, 0xf1, 0xc4, 0xcb, 0x73,
        0x8b,
    ];
    assert_eq!(tag, expected_tag);

    let mut ctx = Aes256GcmContext::init(&key, &iv).unwrap();
    ctx.decrypt_final(&expected_tag).unwrap();
}

/// Test case 14 (scenario "B"): zero key, zero IV, one all-zero plaintext
/// block and no AAD.
#[test]
fn scenario_b_one_zero_block() {
    let key = [0u8; 32];
    let iv = [0u8; 12];
    let mut ctx = Aes256GcmContext::init(&key, &iv).unwrap();
    let mut buf = [0u8; 16];
    ctx.encrypt_update(&mut buf).unwrap();
    let tag = ctx.encrypt_final().unwrap();

    let expected_ct: [u8; 16] = [
        0xce, 0xa7, 0x40, 0x3d, 0x4d, 0x60, 0x6b, 0x6e, 0x07, 0x4e, 0xc5, 0xd3, 0xba, 0xf3, 0x9d,
        0x18,
    ];
    let expected_tag: [u8; 16] = [
        0xd0, 0xd1, 0xc8, 0xa7, 0x99, 0x99, 0x6b, 0xf0, 0x26, 0x5b, 0x98, 0xb5, 0xd4, 0x8a, 0xb9,
        0x19,
    ];
    assert_eq!(buf, expected_ct);
    assert_eq!(tag, expected_tag);

    let mut ctx = Aes256GcmContext::init(&key, &iv).unwrap();
    ctx.decrypt_update(&mut buf).unwrap();
    ctx.decrypt_final(&expected_tag).unwrap();
    assert_eq!(buf, [0u8; 16]);
}

/// A tampered tag must never authenticate, regardless of how close it is to
/// the genuine value.
#[test]
fn scenario_b_tag_off_by_one_bit_fails() {
    let key = [0u8; 32];
    let iv = [0u8; 12];
    let mut ctx = Aes256GcmContext::init(&key, &iv).unwrap();
    let mut buf = [0u8; 16];
    ctx.encrypt_update(&mut buf).unwrap();
    let mut tag = ctx.encrypt_final().unwrap();
    tag[0] ^= 0x01;

    let mut ctx = Aes256GcmContext::init(&key, &iv).unwrap();
    ctx.decrypt_update(&mut buf).unwrap();
    assert!(ctx.decrypt_final(&tag).is_err());
}
