//! Versioned note metadata and its annotation wire format
//!
//! The store is schemaless key-value, so the key strings below are the
//! entire schema; reader and writer must agree on them byte for byte,
//! including for notes written by other deployments of this app.
//!
//! Metadata has two phases with different shapes. A draft is built
//! locally and always carries a TTL; a record is parsed from storage
//! and instead carries the block it expires at. The only way from one
//! to the other is through the wire format, never field assignment.

use chainbin_core::types::annotation_value;
use chainbin_core::{ChainbinError, ChainbinResult, KvPair};
use chrono::Utc;

/// Application namespace id, attached to every entity this app writes.
pub const APP_ID: &str = "59c2a455-ee2f-45cb-8e2c-cc74e79f6748";

/// The single metadata version this build reads and writes.
pub const NOTE_VERSION: &str = "1.0.0";

pub const KEY_APP_ID: &str = "app-id";
pub const KEY_CREATED_AT: &str = "io.golem-base.dpaste.created-at";
pub const KEY_LANGUAGE: &str = "io.golem-base.dpaste.language";
pub const KEY_VERSION: &str = "io.golem-base.dpaste.version";
pub const KEY_ENCRYPTED: &str = "io.golem-base.dpaste.encrypted";

/// Write-phase metadata: what a locally created note will submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationDraft {
    pub app_id: String,
    /// Unix seconds, stamped at construction and never modified.
    pub created_at: i64,
    pub language: String,
    pub version: String,
    /// Storage periods (blocks) to retain the entity.
    pub ttl: u64,
    pub encrypted: bool,
}

impl AnnotationDraft {
    pub fn new(language: impl Into<String>, ttl: u64, encrypted: bool) -> Self {
        Self {
            app_id: APP_ID.into(),
            created_at: Utc::now().timestamp(),
            language: language.into(),
            version: NOTE_VERSION.into(),
            ttl,
            encrypted,
        }
    }

    /// String-channel annotations, in the order the writer emits them.
    pub fn string_annotations(&self) -> Vec<KvPair<String>> {
        vec![
            KvPair::new(KEY_VERSION, self.version.clone()),
            KvPair::new(KEY_LANGUAGE, self.language.clone()),
            KvPair::new(KEY_APP_ID, self.app_id.clone()),
            KvPair::new(KEY_ENCRYPTED, self.encrypted.to_string()),
        ]
    }

    /// Numeric-channel annotations.
    pub fn numeric_annotations(&self) -> Vec<KvPair<u64>> {
        vec![KvPair::new(KEY_CREATED_AT, self.created_at as u64)]
    }
}

/// Read-phase metadata: what a fetched entity's annotations parse into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub app_id: String,
    pub created_at: i64,
    pub language: String,
    pub version: String,
    pub encrypted: bool,
    /// Block height at which the store drops the entity.
    pub expires_at_block: u64,
}

impl AnnotationRecord {
    /// Reconstruct metadata from the two flat annotation channels.
    ///
    /// The version gate is the only hard failure here. Other fields
    /// default loosely when absent; in particular an unknown or missing
    /// language is for the caller to substitute, not an error.
    pub fn from_raw(
        strings: &[KvPair<String>],
        numerics: &[KvPair<u64>],
        expires_at_block: u64,
    ) -> ChainbinResult<Self> {
        let version = annotation_value(strings, KEY_VERSION)
            .cloned()
            .unwrap_or_default();
        if version != NOTE_VERSION {
            tracing::warn!(got = %version, expected = NOTE_VERSION, "invalid note version");
            return Err(ChainbinError::InvalidVersion {
                expected: NOTE_VERSION.into(),
                got: version,
            });
        }

        Ok(Self {
            app_id: annotation_value(strings, KEY_APP_ID)
                .cloned()
                .unwrap_or_default(),
            created_at: annotation_value(numerics, KEY_CREATED_AT)
                .copied()
                .unwrap_or(0) as i64,
            language: annotation_value(strings, KEY_LANGUAGE)
                .cloned()
                .unwrap_or_default(),
            version,
            encrypted: annotation_value(strings, KEY_ENCRYPTED)
                .map(|v| v == "true")
                .unwrap_or(false),
            expires_at_block,
        })
    }
}
