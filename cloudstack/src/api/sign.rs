//! HMAC-SHA1 request signing

use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::error::{ApiError, Result};

type HmacSha1 = Hmac<Sha1>;

/// Signs an encoded parameter string with the account secret.
///
/// The input is lower-cased before hashing; the result is the standard
/// base64 encoding of the MAC, not yet URL-escaped.
pub fn sign(encoded_params: &str, secret: &str) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|e| ApiError::Signing(format!("Invalid HMAC key: {}", e)))?;
    mac.update(encoded_params.to_lowercase().as_bytes());
    Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}
