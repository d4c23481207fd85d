//! chainbin-crypto: password-based note-at-rest encryption
//!
//! Sealed blob format (binary):
//! ```text
//! [12 bytes: random nonce][N bytes: ciphertext][16 bytes: GCM tag]
//! ```
//!
//! The key is derived from the password with PBKDF2-HMAC-SHA256 and a
//! fixed application salt. The salt is deliberately not per-note: all
//! notes sealed with the same password share a key. That is the scheme
//! already-stored notes were written with, so it stays.

pub mod kdf;
pub mod seal;

pub use kdf::{derive_note_key, KdfParams, NoteKey};
pub use seal::{open, seal, CryptoError};

/// Size of a derived note key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an AES-GCM nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Fixed KDF salt, tied to the application name.
pub const KDF_SALT: &[u8] = b"Golem dPaste";
