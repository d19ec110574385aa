//! Ed25519 snapshot signing (spec.md §4.9): the snapshot digest is signed,
//! never the raw JSON — signature records algorithm, base64 public key, and
//! base64 signature so a verifier can recompute the digest and check it
//! without re-deriving any Rust types from the snapshot.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use super::VmError;

pub const ALGORITHM: &str = "ed25519";

/// A snapshot's signature block (spec.md §4.9 `svms/1`).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SignatureBlock {
    pub algorithm: String,
    pub public_key_b64: String,
    pub signature_b64: String,
}

/// Loads a signing key from a raw 32-byte secret (callers own key
/// provisioning; this module never generates keys).
pub fn signing_key_from_bytes(bytes: &[u8; 32]) -> SigningKey {
    SigningKey::from_bytes(bytes)
}

pub fn sign_digest(digest_bytes: &[u8], key: &SigningKey) -> SignatureBlock {
    let signature: Signature = key.sign(digest_bytes);
    SignatureBlock {
        algorithm: ALGORITHM.to_string(),
        public_key_b64: B64.encode(key.verifying_key().to_bytes()),
        signature_b64: B64.encode(signature.to_bytes()),
    }
}

/// Verifies `block` against `digest_bytes`. Returns `false` on any malformed
/// base64/key/signature field rather than propagating a parse error — an
/// unverifiable signature is simply not valid.
pub fn verify_digest(digest_bytes: &[u8], block: &SignatureBlock) -> Result<bool, VmError> {
    if block.algorithm != ALGORITHM {
        return Ok(false);
    }
    let Ok(pk_bytes) = B64.decode(&block.public_key_b64) else { return Ok(false) };
    let Ok(pk_arr) = <[u8; 32]>::try_from(pk_bytes.as_slice()) else { return Ok(false) };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&pk_arr) else { return Ok(false) };
    let Ok(sig_bytes) = B64.decode(&block.signature_b64) else { return Ok(false) };
    let Ok(sig_arr) = <[u8; 64]>::try_from(sig_bytes.as_slice()) else { return Ok(false) };
    let signature = Signature::from_bytes(&sig_arr);
    Ok(verifying_key.verify(digest_bytes, &signature).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SigningKey {
        signing_key_from_bytes(&[7u8; 32])
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let key = test_key();
        let digest = b"some-canonical-digest-bytes";
        let block = sign_digest(digest, &key);
        assert!(verify_digest(digest, &block).unwrap());
    }

    #[test]
    fn tampered_digest_fails_verification() {
        let key = test_key();
        let block = sign_digest(b"original", &key);
        assert!(!verify_digest(b"tampered", &block).unwrap());
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let key = test_key();
        let mut block = sign_digest(b"data", &key);
        block.algorithm = "rsa".to_string();
        assert!(!verify_digest(b"data", &block).unwrap());
    }
}
