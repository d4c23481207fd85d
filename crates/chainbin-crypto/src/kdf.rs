//! Key derivation: PBKDF2-HMAC-SHA256 password → note key

use pbkdf2::pbkdf2_hmac_array;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::{KDF_SALT, KEY_SIZE};

/// A 256-bit symmetric key derived from a note password.
///
/// Zeroized on drop to prevent secrets lingering in memory.
#[derive(Clone)]
pub struct NoteKey {
    bytes: [u8; KEY_SIZE],
}

impl NoteKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for NoteKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for NoteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// PBKDF2 parameters.
///
/// The iteration count is fixed at one million in production (slow on
/// purpose, to resist brute force against short passwords); tests dial
/// it down.
#[derive(Debug, Clone)]
pub struct KdfParams {
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: 1_000_000,
        }
    }
}

impl KdfParams {
    /// Low-iteration parameters for tests.
    pub fn fast_insecure() -> Self {
        Self { iterations: 16 }
    }
}

/// Derive the note key from a password.
///
/// The salt is the fixed application constant, not per-note; see the
/// crate docs. Deterministic: same password, same key.
pub fn derive_note_key(password: &SecretString, params: &KdfParams) -> NoteKey {
    let key = pbkdf2_hmac_array::<Sha256, KEY_SIZE>(
        password.expose_secret().as_bytes(),
        KDF_SALT,
        params.iterations,
    );
    NoteKey::from_bytes(key)
}
