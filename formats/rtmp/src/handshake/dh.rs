//! 1024-bit Diffie-Hellman key exchange for the complex handshake key block.
//!
//! The key block's public-key slot only needs to look like a real DH public
//! key to interoperate with clients that happen to validate it; the shared
//! secret itself is never consumed downstream since no RC4 encryption stage
//! is implemented.
use num_bigint::BigUint;

pub const DH_PUBLIC_KEY_SIZE: usize = 128;

/// RFC 2409, second Oakley group: 1024-bit MODP prime.
const DH_PRIME_HEX: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD",
    "129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519",
    "B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7",
    "EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F",
    "24117C4B1FE649286651ECE65381FFFFFFFFFFFFFFFF",
);
const DH_GENERATOR: u64 = 2;

pub struct DhKeyPair {
    private: BigUint,
    pub public: BigUint,
}

impl DhKeyPair {
    pub fn generate() -> Self {
        let prime = dh_prime();
        let generator = BigUint::from(DH_GENERATOR);

        let mut seed = [0u8; 128];
        utils::random::random_fill(&mut seed);
        let private = BigUint::from_bytes_be(&seed) % &prime;
        let public = generator.modpow(&private, &prime);

        Self { private, public }
    }

    pub fn public_key_bytes(&self) -> [u8; DH_PUBLIC_KEY_SIZE] {
        let raw = self.public.to_bytes_be();
        let mut out = [0u8; DH_PUBLIC_KEY_SIZE];
        let start = DH_PUBLIC_KEY_SIZE.saturating_sub(raw.len());
        out[start..].copy_from_slice(&raw[raw.len().saturating_sub(DH_PUBLIC_KEY_SIZE)..]);
        out
    }

    pub fn shared_secret(&self, peer_public: &[u8]) -> BigUint {
        let prime = dh_prime();
        BigUint::from_bytes_be(peer_public).modpow(&self.private, &prime)
    }
}

fn dh_prime() -> BigUint {
    BigUint::parse_bytes(DH_PRIME_HEX.as_bytes(), 16).expect("static DH prime is valid hex")
}

/// Splices a DH public key into the first half of a C1/S1 random-bytes
/// block, at an offset derived from the block's trailing 4 bytes, matching
/// the key-block layout used by the digest portion.
pub fn embed_public_key(random_bytes: &mut [u8; 1528], public_key: &[u8; DH_PUBLIC_KEY_SIZE]) {
    const KEY_BLOCK_SIZE: usize = 764;
    let offset_bytes = &random_bytes[KEY_BLOCK_SIZE - 4..KEY_BLOCK_SIZE];
    let offset = offset_bytes.iter().map(|b| *b as usize).sum::<usize>()
        % (KEY_BLOCK_SIZE - DH_PUBLIC_KEY_SIZE - 4);
    random_bytes[offset..offset + DH_PUBLIC_KEY_SIZE].copy_from_slice(public_key);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_public_key_of_expected_size() {
        let pair = DhKeyPair::generate();
        assert_eq!(pair.public_key_bytes().len(), DH_PUBLIC_KEY_SIZE);
    }

    #[test]
    fn two_peers_agree_on_shared_secret() {
        let a = DhKeyPair::generate();
        let b = DhKeyPair::generate();
        let secret_a = a.shared_secret(&b.public_key_bytes());
        let secret_b = b.shared_secret(&a.public_key_bytes());
        assert_eq!(secret_a, secret_b);
    }
}
