//! Random byte generation from the operating system CSPRNG.

use rand::{rngs::OsRng, RngCore};

/// Fill a fresh buffer of `len` random bytes.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate a random fixed-size array.
pub fn random_array<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes_length() {
        assert_eq!(random_bytes(0).len(), 0);
        assert_eq!(random_bytes(37).len(), 37);
    }

    #[test]
    fn test_random_array_differs() {
        let a: [u8; 16] = random_array();
        let b: [u8; 16] = random_array();

        assert_ne!(a, b);
    }
}
