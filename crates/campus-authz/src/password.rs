//! Password hashing service.
//!
//! Thin wrapper over `bcrypt` so callers never pick a cost on their own.
//! Both operations are CPU bound; async callers should run them on a blocking
//! thread.
use crate::AuthzResult;

/// Cost used for stored hashes unless configured otherwise.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash_password(&self, password: &str) -> AuthzResult<String> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Returns `Ok(false)` on mismatch; errors only for malformed hashes.
    pub fn verify_password(&self, password: &str, hash: &str) -> AuthzResult<bool> {
        Ok(bcrypt::verify(password, hash)?)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuthzError;

    #[test]
    fn hash_and_verify() {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash_password("s3cret!").expect("hash");
        assert_ne!(hash, "s3cret!");
        assert!(hasher.verify_password("s3cret!", &hash).expect("verify"));
        assert!(!hasher.verify_password("wrong", &hash).expect("verify"));
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = PasswordHasher::new(4);
        let first = hasher.hash_password("same").expect("hash");
        let second = hasher.hash_password("same").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let hasher = PasswordHasher::new(4);
        assert!(matches!(
            hasher.verify_password("pw", "not-a-bcrypt-hash"),
            Err(AuthzError::Password(_))
        ));
    }

    #[test]
    fn default_cost_matches_stored_hashes() {
        assert_eq!(PasswordHasher::default().cost(), DEFAULT_BCRYPT_COST);
    }
}
