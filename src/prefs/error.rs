//! Preference storage errors

use thiserror::Error;

/// Errors raised while reading or writing persisted preferences
#[derive(Debug, Error)]
pub enum PrefsError {
    /// Represents a sled database error
    #[error("Preference store error: {0}")]
    SledError(#[from] sled::Error),

    /// Represents a bincode decoding error
    #[error("Error while decoding preference: {0}")]
    DecodeError(#[from] bincode::error::DecodeError),

    /// Represents a bincode encoding error
    #[error("Error while encoding preference: {0}")]
    EncodeError(#[from] bincode::error::EncodeError),

    /// A stored value is not valid for its key
    #[error("Invalid value stored under '{key}': {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_display() {
        let err = PrefsError::InvalidValue {
            key: "view_mode",
            value: "mosaic".into(),
        };
        assert_eq!(err.to_string(), "Invalid value stored under 'view_mode': mosaic");
    }
}
