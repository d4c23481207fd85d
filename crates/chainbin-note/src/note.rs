//! Note lifecycle: create → submit → fetch → decrypt-on-demand

use chainbin_chain::{EntityCreate, EntityReader};
use chainbin_core::config::ChainbinConfig;
use chainbin_core::{ChainbinError, ChainbinResult};
use chainbin_crypto::{open, seal, CryptoError, KdfParams};
use secrecy::{ExposeSecret, SecretString};

use crate::annotation::{AnnotationDraft, AnnotationRecord};
use crate::language::normalize_language;

/// Note body. Exactly one variant at a time; a stored entity is never
/// rewritten, only the local value transitions (see [`Note::decrypt`]).
#[derive(Debug, Clone)]
pub enum Payload {
    Plaintext(String),
    Encrypted(Vec<u8>),
}

/// Metadata phase tag: drafts carry a TTL and exist only before
/// submission; stored records carry the expiry block instead.
#[derive(Debug, Clone)]
pub enum Metadata {
    Draft(AnnotationDraft),
    Stored(AnnotationRecord),
}

impl Metadata {
    pub fn language(&self) -> &str {
        match self {
            Metadata::Draft(d) => &d.language,
            Metadata::Stored(r) => &r.language,
        }
    }

    pub fn encrypted(&self) -> bool {
        match self {
            Metadata::Draft(d) => d.encrypted,
            Metadata::Stored(r) => r.encrypted,
        }
    }

    pub fn created_at(&self) -> i64 {
        match self {
            Metadata::Draft(d) => d.created_at,
            Metadata::Stored(r) => r.created_at,
        }
    }

    /// Only stored records know when they expire.
    pub fn expires_at_block(&self) -> Option<u64> {
        match self {
            Metadata::Draft(_) => None,
            Metadata::Stored(r) => Some(r.expires_at_block),
        }
    }

    fn with_encrypted_cleared(&self) -> Metadata {
        match self {
            Metadata::Draft(d) => Metadata::Draft(AnnotationDraft {
                encrypted: false,
                ..d.clone()
            }),
            Metadata::Stored(r) => Metadata::Stored(AnnotationRecord {
                encrypted: false,
                ..r.clone()
            }),
        }
    }
}

/// Inputs for a new note. `ttl_secs` is wall-clock retention; it is
/// converted to storage periods (blocks) at creation time.
pub struct NewNote {
    pub text: String,
    pub ttl_secs: u64,
    pub language: String,
    pub password: Option<SecretString>,
}

#[derive(Debug, Clone)]
pub struct Note {
    pub payload: Payload,
    pub metadata: Metadata,
}

impl Note {
    /// Build a note for submission, sealing it when a password is given.
    ///
    /// Size and emptiness are checked against the UTF-8 plaintext before
    /// any key derivation happens.
    pub fn create(request: NewNote, config: &ChainbinConfig, kdf: &KdfParams) -> ChainbinResult<Note> {
        if request.text.is_empty() {
            return Err(ChainbinError::EmptyNote);
        }
        let size = request.text.len();
        let max = config.note.max_note_size;
        if size > max {
            return Err(ChainbinError::NoteTooLarge { size, max });
        }

        let ttl_blocks = request.ttl_secs / config.chain.block_interval_secs.max(1);

        let password = request
            .password
            .as_ref()
            .filter(|p| !p.expose_secret().is_empty());

        let (payload, encrypted) = match password {
            Some(password) => {
                let sealed = seal(request.text.as_bytes(), password, kdf)
                    .map_err(|e| ChainbinError::Other(anyhow::Error::new(e)))?;
                (Payload::Encrypted(sealed), true)
            }
            None => (Payload::Plaintext(request.text), false),
        };

        Ok(Note {
            payload,
            metadata: Metadata::Draft(AnnotationDraft::new(
                request.language,
                ttl_blocks,
                encrypted,
            )),
        })
    }

    /// Fetch a note by entity id.
    ///
    /// `Ok(None)` means the entity is absent or past its TTL, a normal
    /// state for the caller, not a fault. The payload is classified as
    /// encrypted or plaintext strictly from the metadata flag, never by
    /// inspecting the bytes; an unrecognized language degrades to the
    /// plaintext viewer instead of failing.
    pub async fn fetch<R: EntityReader + ?Sized>(
        reader: &R,
        id: &str,
    ) -> ChainbinResult<Option<Note>> {
        let Some(entity) = reader.entity(id).await? else {
            tracing::debug!(id, "entity not found");
            return Ok(None);
        };

        let mut record = AnnotationRecord::from_raw(
            &entity.string_annotations,
            &entity.numeric_annotations,
            entity.expires_at_block,
        )?;
        record.language = normalize_language(&record.language).to_string();

        let payload = if record.encrypted {
            Payload::Encrypted(entity.payload)
        } else {
            Payload::Plaintext(String::from_utf8_lossy(&entity.payload).into_owned())
        };

        Ok(Some(Note {
            payload,
            metadata: Metadata::Stored(record),
        }))
    }

    /// Decrypt an encrypted note, producing a new plaintext note with
    /// the metadata flag cleared. The original value is untouched, so a
    /// failed password attempt costs nothing and can be retried.
    pub fn decrypt(&self, password: &SecretString, kdf: &KdfParams) -> ChainbinResult<Note> {
        let Payload::Encrypted(blob) = &self.payload else {
            return Err(ChainbinError::NotEncrypted);
        };

        let plaintext = open(blob, password, kdf).map_err(|e| match e {
            CryptoError::AuthenticationFailure => ChainbinError::DecryptionFailed,
            other => ChainbinError::Other(anyhow::Error::new(other)),
        })?;

        Ok(Note {
            payload: Payload::Plaintext(String::from_utf8_lossy(&plaintext).into_owned()),
            metadata: self.metadata.with_encrypted_cleared(),
        })
    }

    /// The entity creation this note submits as.
    ///
    /// Only notes built by [`Note::create`] have a TTL; a fetched note
    /// cannot be resubmitted and fails with `MissingTtl`.
    pub fn to_submission(&self) -> ChainbinResult<EntityCreate> {
        let Metadata::Draft(draft) = &self.metadata else {
            return Err(ChainbinError::MissingTtl);
        };

        let payload = match &self.payload {
            Payload::Encrypted(blob) => blob.clone(),
            Payload::Plaintext(text) => text.as_bytes().to_vec(),
        };

        Ok(EntityCreate {
            payload,
            ttl_blocks: draft.ttl,
            string_annotations: draft.string_annotations(),
            numeric_annotations: draft.numeric_annotations(),
        })
    }

    /// The note body, if it is readable without a password.
    pub fn plaintext(&self) -> Option<&str> {
        match &self.payload {
            Payload::Plaintext(text) => Some(text),
            Payload::Encrypted(_) => None,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self.payload, Payload::Encrypted(_))
    }
}
