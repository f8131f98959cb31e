// src/wire.rs
//
// Token and payload layout.
// Token   = salt(4 chars) ++ unpadded standard base64 of the XORed payload.
// Payload = expiry(10 ASCII digits, zero-padded) ++ tag(16 hex chars) ++ message.
//
// The expiry field is an absolute Unix timestamp, 0 = never expires; 10
// decimal digits hold timestamps until ~2286.

pub const SALT_BYTES: usize = 4;
pub const EXPIRY_DIGITS: usize = 10;
pub const TAG_HEX_BYTES: usize = 16;
pub const HEADER_BYTES: usize = EXPIRY_DIGITS + TAG_HEX_BYTES;

/// Plaintext prefix carried in front of the message inside the payload.
pub struct PayloadHeader {
    /// Absolute Unix expiry, 0 = never expires.
    pub expires_at: u64,
    /// First 16 hex chars of md5(message ++ keyb), as ASCII bytes.
    pub tag: [u8; TAG_HEX_BYTES],
}

impl PayloadHeader {
    /// Render the 26-byte prefix: zero-padded decimal expiry, then the tag.
    pub fn encode(&self) -> [u8; HEADER_BYTES] {
        let mut out = [0u8; HEADER_BYTES];
        let digits = format!("{:010}", self.expires_at);
        out[..EXPIRY_DIGITS].copy_from_slice(digits.as_bytes());
        out[EXPIRY_DIGITS..].copy_from_slice(&self.tag);
        out
    }

    /// Split a decrypted payload into header + message.
    ///
    /// `None` if the payload is shorter than the header or the expiry field
    /// is not a decimal number; both are bounds-checked so malformed input
    /// short-circuits to "invalid" instead of faulting.
    pub fn parse(payload: &[u8]) -> Option<(PayloadHeader, &[u8])> {
        if payload.len() < HEADER_BYTES {
            return None;
        }
        let expiry_str = std::str::from_utf8(&payload[..EXPIRY_DIGITS]).ok()?;
        let expires_at = expiry_str.parse::<u64>().ok()?;
        let mut tag = [0u8; TAG_HEX_BYTES];
        tag.copy_from_slice(&payload[EXPIRY_DIGITS..HEADER_BYTES]);
        Some((PayloadHeader { expires_at, tag }, &payload[HEADER_BYTES..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_round_trips() {
        let header = PayloadHeader {
            expires_at: 1_700_003_600,
            tag: *b"0123456789abcdef",
        };
        let mut payload = header.encode().to_vec();
        payload.extend_from_slice(b"hello");

        let (parsed, message) = PayloadHeader::parse(&payload).unwrap();
        assert_eq!(parsed.expires_at, 1_700_003_600);
        assert_eq!(parsed.tag, *b"0123456789abcdef");
        assert_eq!(message, b"hello");
    }

    #[test]
    fn zero_expiry_is_ten_zeros() {
        let header = PayloadHeader {
            expires_at: 0,
            tag: [b'0'; TAG_HEX_BYTES],
        };
        assert_eq!(&header.encode()[..EXPIRY_DIGITS], b"0000000000");
    }

    #[test]
    fn short_payload_rejected() {
        assert!(PayloadHeader::parse(b"").is_none());
        assert!(PayloadHeader::parse(&[0u8; HEADER_BYTES - 1]).is_none());
    }

    #[test]
    fn non_decimal_expiry_rejected() {
        let mut payload = vec![0xffu8; HEADER_BYTES + 3];
        assert!(PayloadHeader::parse(&payload).is_none());
        payload[..EXPIRY_DIGITS].copy_from_slice(b"12345abcde");
        assert!(PayloadHeader::parse(&payload).is_none());
    }

    #[test]
    fn header_only_payload_is_empty_message() {
        let header = PayloadHeader {
            expires_at: 0,
            tag: [b'a'; TAG_HEX_BYTES],
        };
        let payload = header.encode();
        let (_, message) = PayloadHeader::parse(&payload).unwrap();
        assert!(message.is_empty());
    }
}
