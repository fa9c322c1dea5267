use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::error::{AppError, AppResult};

/// URL-safe, unpadded base64 string of exactly `len` characters from the OS RNG.
pub fn random_string(len: usize) -> AppResult<String> {
    if len == 0 {
        return Ok(String::new());
    }

    let mut bytes = vec![0u8; (len * 3).div_ceil(4)];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::Internal(format!("secure random generation failed: {}", e)))?;

    let mut encoded = URL_SAFE_NO_PAD.encode(&bytes);
    if encoded.len() < len {
        return Err(AppError::Internal(format!(
            "random string too short: wanted {}, got {}",
            len,
            encoded.len()
        )));
    }
    encoded.truncate(len);
    Ok(encoded)
}

/// S256 challenge for a PKCE `code_verifier`.
pub fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
