//! authcode — keyed reversible obfuscation codec.
//!
//! A salted, RC4-style permutation-box keystream XOR with an embedded
//! 10-digit expiry field and a 16-hex-char integrity tag, wire-compatible
//! with the classic "authcode" token format:
//! `salt(4 chars) ++ unpadded-base64(xor(payload))`.
//!
//! Decode fails closed: wrong key, expired token, tampered or malformed
//! input all collapse to an empty result, never a panic.

pub mod authcode;
pub mod shuffle_box;
pub mod wire;

pub const AUTHCODE_VERSION: &str = "1.0.0";

pub use crate::authcode::{decode, encode, encode_at, try_decode, try_decode_at, DEFAULT_KEY};
