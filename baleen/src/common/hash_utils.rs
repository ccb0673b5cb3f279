use sha2::{Digest, Sha256};

/// Returns the lowercase hex SHA-256 digest of `input`.
///
/// Used to derive stable version ids from migration names, so the same
/// migration always maps to the same id across runs and machines.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_is_deterministic() {
        assert_eq!(sha256_hex("app::V1Init"), sha256_hex("app::V1Init"));
        assert_ne!(sha256_hex("app::V1Init"), sha256_hex("app::V2Users"));
    }

    #[test]
    fn test_sha256_hex_known_value() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
