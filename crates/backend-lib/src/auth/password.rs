// ============================
// sessiongate-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use scrypt::{password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng}, Params, Scrypt};
use zeroize::Zeroize;

/// Hash a password using scrypt
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password(plain.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

/// Hash a password with explicit scrypt cost parameters
pub fn hash_password_with_params(plain: &str, params: Params) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password_customized(plain.as_bytes(), None, None, params, &salt)?
        .to_string();
    Ok(hash)
}

/// Verify a password against a PHC hash string; a malformed hash never verifies
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}

/// Securely hash a password and zeroize the original
pub fn hash_password_secure(plain: &mut String) -> anyhow::Result<String> {
    let hash = hash_password(plain);
    plain.zeroize();
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.starts_with("$scrypt$"));
        assert!(verify_password(&hash, "secret1"));
        assert!(!verify_password(&hash, "secret2"));
    }

    #[test]
    fn test_custom_params_are_encoded_in_hash() {
        let params = Params::new(4, 8, 1, 32).unwrap();
        let hash = hash_password_with_params("secret1", params).unwrap();
        assert!(hash.contains("ln=4"));
        assert!(verify_password(&hash, "secret1"));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("not-a-phc-string", "secret1"));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn test_secure_hash_clears_input() {
        let mut plain = "pa:ss:word".to_string();
        let hash = hash_password_secure(&mut plain).unwrap();
        assert!(plain.is_empty());
        assert!(verify_password(&hash, "pa:ss:word"));
    }
}
