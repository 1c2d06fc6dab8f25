//! Persisted client preferences
//!
//! Two values survive restarts independently of the route:
//! - `view_mode`: the grid/list layout, stored as its plain name
//! - `search_state`: the last mirrored search, bincode-encoded
//!
//! [`SledPreferences`] keeps them in a `prefs` tree of a sled database;
//! [`MemoryPreferences`] is the in-process equivalent.

pub mod error;

pub use error::PrefsError;

use std::path::Path;

use bincode::{Decode, Encode};
use parking_lot::Mutex;
use sled::{Db, Tree};

use crate::query::ViewMode;

const TREE: &str = "prefs";
const KEY_VIEW_MODE: &str = "view_mode";
const KEY_SEARCH_STATE: &str = "search_state";

/// Last search mirrored by a route-driven list
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct SavedSearch {
    /// Engine-owned query parameters, URL-encoded
    pub query: String,
    /// Milliseconds since the Unix epoch
    pub saved_at: i64,
}

/// Storage for preferences that outlive a session
pub trait PreferenceStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `PrefsError` if the store cannot be read or holds an unknown mode.
    fn view_mode(&self) -> Result<Option<ViewMode>, PrefsError>;

    /// # Errors
    ///
    /// Returns `PrefsError` if the value cannot be written.
    fn set_view_mode(&self, mode: ViewMode) -> Result<(), PrefsError>;

    /// # Errors
    ///
    /// Returns `PrefsError` if the store cannot be read or decoded.
    fn saved_search(&self) -> Result<Option<SavedSearch>, PrefsError>;

    /// # Errors
    ///
    /// Returns `PrefsError` if the value cannot be encoded or written.
    fn save_search(&self, search: &SavedSearch) -> Result<(), PrefsError>;

    /// Forget every stored preference
    ///
    /// # Errors
    ///
    /// Returns `PrefsError` if the store cannot be cleared.
    fn clear(&self) -> Result<(), PrefsError>;
}

/// Preferences stored in a sled database
pub struct SledPreferences {
    db: Db,
    prefs: Tree,
}

impl SledPreferences {
    /// Opens or creates the preference database at `path`
    ///
    /// # Errors
    ///
    /// Returns `PrefsError` if the database or its tree cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PrefsError> {
        let db = sled::open(path)?;
        let prefs = db.open_tree(TREE)?;
        Ok(Self { db, prefs })
    }

    /// Flush pending writes to disk
    ///
    /// # Errors
    ///
    /// Returns `PrefsError` if the flush fails.
    pub fn flush(&self) -> Result<(), PrefsError> {
        self.db.flush()?;
        Ok(())
    }
}

impl PreferenceStore for SledPreferences {
    fn view_mode(&self) -> Result<Option<ViewMode>, PrefsError> {
        let Some(raw) = self.prefs.get(KEY_VIEW_MODE)? else {
            return Ok(None);
        };
        let value = String::from_utf8_lossy(&raw);
        value
            .parse::<ViewMode>()
            .map(Some)
            .map_err(|_| PrefsError::InvalidValue {
                key: KEY_VIEW_MODE,
                value: value.into_owned(),
            })
    }

    fn set_view_mode(&self, mode: ViewMode) -> Result<(), PrefsError> {
        self.prefs.insert(KEY_VIEW_MODE, mode.as_str().as_bytes())?;
        self.flush()
    }

    fn saved_search(&self) -> Result<Option<SavedSearch>, PrefsError> {
        let Some(raw) = self.prefs.get(KEY_SEARCH_STATE)? else {
            return Ok(None);
        };
        let (search, _): (SavedSearch, usize) =
            bincode::decode_from_slice(&raw, bincode::config::standard())?;
        Ok(Some(search))
    }

    fn save_search(&self, search: &SavedSearch) -> Result<(), PrefsError> {
        let value = bincode::encode_to_vec(search, bincode::config::standard())?;
        self.prefs.insert(KEY_SEARCH_STATE, value)?;
        self.flush()
    }

    fn clear(&self) -> Result<(), PrefsError> {
        self.prefs.clear()?;
        self.flush()
    }
}

impl Drop for SledPreferences {
    fn drop(&mut self) {
        // Errors cannot be propagated from Drop
        let _ = self.db.flush();
    }
}

/// Preferences held in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    view_mode: Mutex<Option<ViewMode>>,
    search: Mutex<Option<SavedSearch>>,
}

impl PreferenceStore for MemoryPreferences {
    fn view_mode(&self) -> Result<Option<ViewMode>, PrefsError> {
        Ok(*self.view_mode.lock())
    }

    fn set_view_mode(&self, mode: ViewMode) -> Result<(), PrefsError> {
        *self.view_mode.lock() = Some(mode);
        Ok(())
    }

    fn saved_search(&self) -> Result<Option<SavedSearch>, PrefsError> {
        Ok(self.search.lock().clone())
    }

    fn save_search(&self, search: &SavedSearch) -> Result<(), PrefsError> {
        *self.search.lock() = Some(search.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), PrefsError> {
        *self.view_mode.lock() = None;
        *self.search.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TempPrefs;

    #[test]
    fn test_view_mode_round_trip() {
        let temp = TempPrefs::new();
        let prefs = temp.prefs();

        assert_eq!(prefs.view_mode().unwrap(), None);
        prefs.set_view_mode(ViewMode::List).unwrap();
        assert_eq!(prefs.view_mode().unwrap(), Some(ViewMode::List));
    }

    #[test]
    fn test_unknown_view_mode_is_an_error() {
        let temp = TempPrefs::new();
        let prefs = temp.prefs();
        prefs.prefs.insert(KEY_VIEW_MODE, "mosaic".as_bytes()).unwrap();

        assert!(matches!(
            prefs.view_mode(),
            Err(PrefsError::InvalidValue { key: "view_mode", .. })
        ));
    }

    #[test]
    fn test_saved_search_survives_reopen() {
        let temp = TempPrefs::new();
        let search = SavedSearch {
            query: "tags=3&sort=random&page=2".into(),
            saved_at: 1_700_000_000_000,
        };
        temp.prefs().save_search(&search).unwrap();

        let reopened = temp.reopen();
        assert_eq!(reopened.prefs().saved_search().unwrap(), Some(search));
    }

    #[test]
    fn test_clear_forgets_everything() {
        let temp = TempPrefs::new();
        let prefs = temp.prefs();
        prefs.set_view_mode(ViewMode::Grid).unwrap();
        prefs
            .save_search(&SavedSearch {
                query: "sort=size".into(),
                saved_at: 0,
            })
            .unwrap();

        prefs.clear().unwrap();

        assert_eq!(prefs.view_mode().unwrap(), None);
        assert_eq!(prefs.saved_search().unwrap(), None);
    }

    #[test]
    fn test_memory_preferences() {
        let prefs = MemoryPreferences::default();
        prefs.set_view_mode(ViewMode::List).unwrap();
        assert_eq!(prefs.view_mode().unwrap(), Some(ViewMode::List));
        prefs.clear().unwrap();
        assert_eq!(prefs.view_mode().unwrap(), None);
    }
}
