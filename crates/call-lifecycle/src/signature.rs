//! Webhook signature verification.
//!
//! The platform signs each delivery with HMAC-SHA256 over the raw request
//! body and sends the lowercase hex digest in a header. Verification must
//! run on the exact bytes received, before any JSON parsing.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify a webhook signature against the raw request body.
///
/// Returns `false` for any malformed input; never panics. Whether a
/// missing secret is a configuration error is decided by the caller.
pub fn verify_signature(raw_body: &[u8], signature: &str, secret: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(raw_body);
    let expected = hex::encode(mac.finalize().into_bytes());

    constant_time_compare(signature.trim(), &expected)
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
