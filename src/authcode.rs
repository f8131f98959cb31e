//! §1.1.0 Overview — authcode core (keyed reversible obfuscation)
//! - MD5 sub-key derivation: keya feeds the keystream, keyb binds the tag
//! - 4-char clock-derived salt → per-call crypt key → permutation-box XOR
//! - payload carries a 10-digit expiry field and a 16-hex integrity tag
//! - decode fails closed: any invalid input yields an empty result

/* =============================================================================
 * authcode — authcode.rs — Program v1.0.0
 * Numbering: Program=1.0.0, Sections=§1.X.0, Subsections=§1.X.Y
 * =============================================================================
 */

// ============================================================================
// §1.2.0 Imports & Crate Uses
// ============================================================================
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use md5::{Digest, Md5};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::shuffle_box::{box_schedule, box_xor};
use crate::wire::{PayloadHeader, HEADER_BYTES, SALT_BYTES, TAG_HEX_BYTES};

// ============================================================================
// §1.3.0 Constants & Primitives
// ============================================================================

/* §1.3.1 DEFAULT_KEY: used when the caller passes an empty master key */
pub const DEFAULT_KEY: &str = "8yD09jK787NU3OgDAS2brZ3mqAPfO1xE5A41KHG20FoXmKixZ3IPNuMDXD4OCAxS";

/* §1.3.2 B64: standard alphabet, unpadded encode, padding-indifferent decode */
// Encode strips padding (legacy wire format); decode must still accept
// tokens that were stored with their '=' padding intact.
const B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/* §1.3.3 md5_hex: lowercase hex digest */
#[inline]
fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/* §1.3.4 md5_hex_pair: digest of a ++ b without an intermediate concat */
#[inline]
fn md5_hex_pair(a: &[u8], b: &[u8]) -> String {
    let mut h = Md5::new();
    h.update(a);
    h.update(b);
    hex::encode(h.finalize())
}

// ============================================================================
// §1.4.0 Sub-key Derivation
// ============================================================================

/* §1.4.1 SubKeys struct + Drop */
pub struct SubKeys {
    /// 32 hex chars; feeds the per-call crypt key together with the salt.
    keya: String,
    /// 32 hex chars; binds the integrity tag to the master key.
    keyb: String,
}

impl Drop for SubKeys {
    fn drop(&mut self) {
        self.keya.zeroize();
        self.keyb.zeroize();
    }
}

/* §1.4.2 derive_subkeys: keya/keyb from the hashed master key */
pub fn derive_subkeys(master_key: &str) -> SubKeys {
    let key = if master_key.is_empty() { DEFAULT_KEY } else { master_key };
    let mut hashed = md5_hex(key.as_bytes());
    let keya = md5_hex(hashed[..16].as_bytes());
    let keyb = md5_hex(hashed[16..32].as_bytes());
    hashed.zeroize();
    SubKeys { keya, keyb }
}

/* §1.4.3 crypt_key: keya ++ md5(keya ++ salt), 64 bytes */
fn crypt_key(keys: &SubKeys, salt: &[u8]) -> Vec<u8> {
    let mut inner = md5_hex_pair(keys.keya.as_bytes(), salt);
    let mut out = Vec::with_capacity(64);
    out.extend_from_slice(keys.keya.as_bytes());
    out.extend_from_slice(inner.as_bytes());
    inner.zeroize();
    out
}

/* §1.4.4 message_tag: first 16 hex chars of md5(message ++ keyb) */
fn message_tag(message: &[u8], keys: &SubKeys) -> [u8; TAG_HEX_BYTES] {
    let digest = md5_hex_pair(message, keys.keyb.as_bytes());
    let mut tag = [0u8; TAG_HEX_BYTES];
    tag.copy_from_slice(&digest.as_bytes()[..TAG_HEX_BYTES]);
    tag
}

// ============================================================================
// §1.5.0 Encode Path
// ============================================================================

/* §1.5.1 encode (now) */
pub fn encode(message: &[u8], key: &str, expiry_secs: u64) -> String {
    let now_micros = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0);
    encode_at(message, key, expiry_secs, now_micros)
}

/* §1.5.2 encode_at: clock-injected */
pub fn encode_at(message: &[u8], key: &str, expiry_secs: u64, now_micros: u64) -> String {
    let keys = derive_subkeys(key);
    let now_secs = now_micros / 1_000_000;

    // Salt: last 4 hex chars of the hashed clock reading. Per-call keystream
    // diversity only; it travels in the clear at the front of the token.
    let clock_digest = md5_hex(
        format!("{}.{:06}", now_secs, now_micros % 1_000_000).as_bytes(),
    );
    let salt = &clock_digest[clock_digest.len() - SALT_BYTES..];

    let header = PayloadHeader {
        expires_at: if expiry_secs > 0 { expiry_secs + now_secs } else { 0 },
        tag: message_tag(message, &keys),
    };

    let mut payload = Vec::with_capacity(HEADER_BYTES + message.len());
    payload.extend_from_slice(&header.encode());
    payload.extend_from_slice(message);

    let mut ck = crypt_key(&keys, salt.as_bytes());
    let mixed = box_xor(box_schedule(&ck), &payload);
    ck.zeroize();
    payload.zeroize();

    let mut out = String::with_capacity(SALT_BYTES + (mixed.len() * 4).div_ceil(3));
    out.push_str(salt);
    out.push_str(&B64.encode(&mixed));
    out
}

// ============================================================================
// §1.6.0 Decode Path
// ============================================================================

/* §1.6.1 decode: legacy contract, empty result = invalid */
pub fn decode(data: &str, key: &str) -> Vec<u8> {
    try_decode(data, key).unwrap_or_default()
}

/* §1.6.2 try_decode (now) */
pub fn try_decode(data: &str, key: &str) -> Option<Vec<u8>> {
    let now_secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    try_decode_at(data, key, now_secs)
}

/* §1.6.3 try_decode_at: clock-injected; None = invalid/expired/tampered */
pub fn try_decode_at(data: &str, key: &str, now_secs: u64) -> Option<Vec<u8>> {
    let keys = derive_subkeys(key);
    let raw = data.as_bytes();

    // Salt is taken verbatim; inputs shorter than 4 bytes just yield an
    // empty body and fall through the length checks below.
    let split = raw.len().min(SALT_BYTES);
    let salt = &raw[..split];
    let body = &raw[split..];

    let mixed = B64.decode(body).ok()?;

    let mut ck = crypt_key(&keys, salt);
    let mut payload = box_xor(box_schedule(&ck), &mixed);
    ck.zeroize();

    let result = match PayloadHeader::parse(&payload) {
        None => None,
        Some((header, message)) => {
            let fresh = header.expires_at == 0 || header.expires_at > now_secs;
            let expected = message_tag(message, &keys);
            let tag_ok = ConstantTimeEq::ct_eq(&header.tag[..], &expected[..]).unwrap_u8() == 1;
            if fresh && tag_ok {
                Some(message.to_vec())
            } else {
                None
            }
        }
    };
    payload.zeroize();
    result
}

// ============================================================================
// §1.7.0 Tests
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    const NOW_MICROS: u64 = 1_700_000_000_123_456;
    const NOW_SECS: u64 = 1_700_000_000;

    #[test]
    fn round_trip_without_expiry() {
        let token = encode_at(b"hello world", "secret", 0, NOW_MICROS);
        let out = try_decode_at(&token, "secret", NOW_SECS + 1_000_000).unwrap();
        assert_eq!(out, b"hello world");
    }

    #[test]
    fn round_trip_with_expiry() {
        let token = encode_at(b"session:42", "secret", 3600, NOW_MICROS);
        let out = try_decode_at(&token, "secret", NOW_SECS + 10).unwrap();
        assert_eq!(out, b"session:42");
        // one second before the embedded expiry it is still valid
        assert!(try_decode_at(&token, "secret", NOW_SECS + 3599).is_some());
    }

    #[test]
    fn expired_token_rejected() {
        let token = encode_at(b"short-lived", "secret", 1, NOW_MICROS);
        assert!(try_decode_at(&token, "secret", NOW_SECS + 2).is_none());
        assert_eq!(decode(&token, "secret"), Vec::<u8>::new());
    }

    #[test]
    fn wrong_key_rejected() {
        let token = encode_at(b"payload", "keyA", 0, NOW_MICROS);
        assert!(try_decode_at(&token, "keyB", NOW_SECS).is_none());
        assert!(try_decode_at(&token, "keyA", NOW_SECS).is_some());
    }

    #[test]
    fn tampering_any_body_byte_rejected() {
        let token = encode_at(b"tamper-evident", "secret", 0, NOW_MICROS);
        let bytes = token.as_bytes();
        for i in SALT_BYTES..bytes.len() {
            let mut mangled = bytes.to_vec();
            mangled[i] ^= 0x01;
            let mangled = String::from_utf8_lossy(&mangled).into_owned();
            assert!(
                try_decode_at(&mangled, "secret", NOW_SECS).is_none(),
                "flip at {i} was accepted"
            );
        }
    }

    #[test]
    fn subkeys_are_deterministic() {
        let a = derive_subkeys("secret");
        let b = derive_subkeys("secret");
        assert_eq!(a.keya, b.keya);
        assert_eq!(a.keyb, b.keyb);
        assert_ne!(a.keya, a.keyb);
    }

    #[test]
    fn salts_diverge_but_all_decode() {
        let t1 = encode_at(b"same message", "k", 0, NOW_MICROS);
        let t2 = encode_at(b"same message", "k", 0, NOW_MICROS + 1);
        assert_ne!(t1, t2);
        assert_eq!(try_decode_at(&t1, "k", NOW_SECS).unwrap(), b"same message");
        assert_eq!(try_decode_at(&t2, "k", NOW_SECS).unwrap(), b"same message");
    }

    #[test]
    fn empty_key_uses_embedded_default() {
        let token = encode_at(b"default key path", "", 0, NOW_MICROS);
        assert_eq!(
            try_decode_at(&token, "", NOW_SECS).unwrap(),
            b"default key path"
        );
        let explicit = encode_at(b"default key path", DEFAULT_KEY, 0, NOW_MICROS);
        assert_eq!(
            try_decode_at(&explicit, "", NOW_SECS).unwrap(),
            b"default key path"
        );
    }

    #[test]
    fn empty_message_round_trips_as_some_empty() {
        let token = encode_at(b"", "k", 0, NOW_MICROS);
        // typed layer distinguishes a valid empty message from a reject
        assert_eq!(try_decode_at(&token, "k", NOW_SECS), Some(vec![]));
        assert!(try_decode_at(&token, "wrong", NOW_SECS).is_none());
    }

    #[test]
    fn binary_messages_survive() {
        let message: Vec<u8> = (0u8..=255).collect();
        let token = encode_at(&message, "bin", 0, NOW_MICROS);
        assert!(token.is_ascii());
        assert!(!token.contains('='));
        assert_eq!(try_decode_at(&token, "bin", NOW_SECS).unwrap(), message);
    }

    #[test]
    fn padded_legacy_tokens_still_decode() {
        let token = encode_at(b"hello", "secret", 0, NOW_MICROS);
        let body_len = token.len() - SALT_BYTES;
        let mut padded = token.clone();
        for _ in 0..(4 - body_len % 4) % 4 {
            padded.push('=');
        }
        assert_eq!(
            try_decode_at(&padded, "secret", NOW_SECS).unwrap(),
            b"hello"
        );
    }

    #[test]
    fn short_and_malformed_inputs_yield_empty() {
        for input in ["", "a", "abc", "abcd", "abcd!!!not-base64!!!", "日本語"] {
            assert_eq!(decode(input, "secret"), Vec::<u8>::new(), "input {input:?}");
        }
        // valid base64 body that decrypts to fewer than 26 payload bytes
        assert_eq!(decode("saltAAAA", "secret"), Vec::<u8>::new());
    }

    #[test]
    fn hello_secret_scenario() {
        let token = encode_at(b"hello", "secret", 0, NOW_MICROS);
        assert_eq!(try_decode_at(&token, "secret", NOW_SECS).unwrap(), b"hello");
        assert_eq!(decode(&token, "wrong"), Vec::<u8>::new());
    }
}
