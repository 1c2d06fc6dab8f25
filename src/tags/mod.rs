//! Tag vocabulary and per-video tag editing

pub mod dedupe;
pub mod editor;
pub mod vocabulary;

pub use dedupe::{canonical_tags, dedupe_tags};
pub use editor::{DEFAULT_DEBOUNCE, DebouncedTagEditor, TagField};
pub use vocabulary::{TagVocabulary, VocabularyDiff};
