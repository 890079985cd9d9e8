// ============================
// crates/backend-lib/src/auth/token_generator.rs
// ============================
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
/** Secure token generation for session identifiers
Tokens are opaque: they carry no data and are only meaningful
through a lookup in the session store. */
use rand::{rngs::OsRng, RngCore};

/// Default token size in bytes (32 bytes = 256 bits of entropy)
const DEFAULT_TOKEN_BYTES: usize = 32;

/// Smallest size accepted by `generate_secure_token_with_size` (128 bits)
pub const MIN_TOKEN_BYTES: usize = 16;

/** Generate a cryptographically secure random session token
# Returns
A base64 URL-safe encoded string without padding */
pub fn generate_secure_token() -> String {
    generate_secure_token_with_size(DEFAULT_TOKEN_BYTES)
}

/** Generate a token from `bytes` bytes of OS entropy, never fewer than `MIN_TOKEN_BYTES`
# Arguments
* `bytes` - The size of the random token in bytes */
pub fn generate_secure_token_with_size(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes.max(MIN_TOKEN_BYTES)];
    OsRng.fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_generation() {
        let token1 = generate_secure_token();
        let token2 = generate_secure_token();
        assert_ne!(token1, token2);

        // 32 bytes encode to 43 chars without padding
        assert_eq!(token1.len(), 43);
        assert!(token1
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_token_size_has_a_floor() {
        let tiny = generate_secure_token_with_size(1);
        let floor = generate_secure_token_with_size(MIN_TOKEN_BYTES);
        assert_eq!(tiny.len(), floor.len());
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..1000).map(|_| generate_secure_token()).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
