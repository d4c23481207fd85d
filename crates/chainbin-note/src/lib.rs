//! chainbin-note: the note domain model
//!
//! A note is a payload (plaintext or password-sealed bytes) plus its
//! annotation metadata. Metadata lives in one of two phases with
//! different shapes: a draft built locally for submission (carries a
//! TTL) or a record parsed back from storage (carries the expiry
//! block). The phases convert one way only, through the annotation wire
//! format.

pub mod annotation;
pub mod language;
pub mod note;

pub use annotation::{AnnotationDraft, AnnotationRecord, APP_ID, NOTE_VERSION};
pub use language::normalize_language;
pub use note::{Metadata, NewNote, Note, Payload};
