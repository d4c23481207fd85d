//! AES-256-GCM seal/open for note bodies
//!
//! Sealed blob: `[12-byte nonce][ciphertext][16-byte tag]`. A fresh
//! random nonce is drawn per seal; the 96-bit random draw is what keeps
//! nonces from repeating under the shared password-derived key.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use secrecy::SecretString;
use thiserror::Error;

use crate::kdf::{derive_note_key, KdfParams};
use crate::{NONCE_SIZE, TAG_SIZE};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Wrong password or corrupted data. Deliberately one variant: the
    /// caller must not learn which of the two it was.
    #[error("authentication failure: wrong password or corrupted data")]
    AuthenticationFailure,

    /// The cipher refused the plaintext (length beyond the GCM limit).
    /// Note size caps make this unreachable in practice.
    #[error("encryption failed: plaintext exceeds cipher limits")]
    SealFailure,
}

/// Encrypt a note body with a password.
///
/// Returns `[nonce][ciphertext][tag]` as one buffer. Pure function of
/// its inputs apart from the nonce draw; no I/O.
pub fn seal(
    plaintext: &[u8],
    password: &SecretString,
    params: &KdfParams,
) -> Result<Vec<u8>, CryptoError> {
    let key = derive_note_key(password, params);
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::SealFailure)?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypt a sealed note body with a password.
///
/// Fails with [`CryptoError::AuthenticationFailure`] when the tag does
/// not verify; truncated blobs fail the same way so the error does not
/// leak anything about the input.
pub fn open(blob: &[u8], password: &SecretString, params: &KdfParams) -> Result<Vec<u8>, CryptoError> {
    if blob.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::AuthenticationFailure);
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);

    let key = derive_note_key(password, params);
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params() -> KdfParams {
        KdfParams::fast_insecure()
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let password = SecretString::from("hunter2");
        let plaintext = b"hello, sealed world!";

        let blob = seal(plaintext, &password, &params()).unwrap();
        let opened = open(&blob, &password, &params()).unwrap();

        assert_eq!(&opened, plaintext);
    }

    #[test]
    fn test_seal_open_empty() {
        let password = SecretString::from("pw");

        let blob = seal(b"", &password, &params()).unwrap();
        let opened = open(&blob, &password, &params()).unwrap();

        assert_eq!(opened, b"");
    }

    #[test]
    fn test_wrong_password() {
        let blob = seal(b"secret note", &SecretString::from("right"), &params()).unwrap();
        let result = open(&blob, &SecretString::from("wrong"), &params());

        assert_eq!(result, Err(CryptoError::AuthenticationFailure));
    }

    #[test]
    fn test_tampered_blob() {
        let password = SecretString::from("pw");
        let blob = seal(b"secret note", &password, &params()).unwrap();

        // Every byte position must be covered by the tag, nonce included.
        for i in 0..blob.len() {
            let mut tampered = blob.clone();
            tampered[i] ^= 0x01;
            assert_eq!(
                open(&tampered, &password, &params()),
                Err(CryptoError::AuthenticationFailure),
                "flip at byte {i} must fail authentication"
            );
        }
    }

    #[test]
    fn test_truncated_blob() {
        let password = SecretString::from("pw");
        let blob = seal(b"secret note", &password, &params()).unwrap();

        assert_eq!(
            open(&blob[..NONCE_SIZE + TAG_SIZE - 1], &password, &params()),
            Err(CryptoError::AuthenticationFailure)
        );
        assert_eq!(
            open(b"", &password, &params()),
            Err(CryptoError::AuthenticationFailure)
        );
    }

    #[test]
    fn test_sealed_size() {
        let password = SecretString::from("pw");
        let blob = seal(&[0u8; 1000], &password, &params()).unwrap();

        // nonce (12) + plaintext (1000) + tag (16)
        assert_eq!(blob.len(), NONCE_SIZE + 1000 + TAG_SIZE);
    }

    #[test]
    fn test_nonce_is_fresh_per_seal() {
        let password = SecretString::from("pw");
        let a = seal(b"same input", &password, &params()).unwrap();
        let b = seal(b"same input", &password, &params()).unwrap();

        assert_ne!(a[..NONCE_SIZE], b[..NONCE_SIZE], "nonces must not repeat");
        assert_ne!(a, b);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn roundtrip_arbitrary_bytes(
            data in proptest::collection::vec(any::<u8>(), 0..=2048),
            password in "[a-zA-Z0-9 ]{1,24}",
        ) {
            let password = SecretString::from(password);
            let blob = seal(&data, &password, &params()).unwrap();
            let opened = open(&blob, &password, &params()).unwrap();
            prop_assert_eq!(opened, data);
        }
    }
}
