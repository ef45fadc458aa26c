use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{AppError, Result};

/// Alphabet the retrieval secrets are drawn from.
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789@!?$&#<>";

/// Length of the secret returned to uploaders.
pub const SECRET_LEN: usize = 8;

/// Generate a random opaque secret of `len` characters from the fixed
/// alphabet. The secret is a bearer capability: whoever holds it can
/// download the file. Entropy failure is fatal to the request; there is
/// no retry.
pub fn generate(len: usize) -> Result<String> {
    let mut buf = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| AppError::Secret(e.to_string()))?;

    let secret = buf
        .iter()
        .map(|b| LETTERS[*b as usize % LETTERS.len()] as char)
        .collect();
    Ok(secret)
}
