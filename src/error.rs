//! Error type shared by the loader, renderer and storage layers.

use thiserror::Error;

/// Errors raised while turning a stored image into displayable bytes.
///
/// Every variant is terminal for the request that produced it: there is no
/// partial output and no retry.
#[derive(Error, Debug)]
pub enum TilesError {
    /// The location could not be read (missing file, missing or private
    /// object, network failure).
    #[error("not found: {location}")]
    NotFound {
        /// Display form of the unreadable location
        location: String,
    },

    /// No codec recognizes the extension, hint or file contents.
    #[error("unsupported format for {location}: {detail}")]
    UnsupportedFormat {
        /// Display form of the location
        location: String,
        /// What was tried
        detail: String,
    },

    /// Bytes were read but the codec rejected them.
    #[error("failed to decode {location}: {message}")]
    Decode {
        /// Display form of the location
        location: String,
        /// Codec error message
        message: String,
    },

    /// The render mode needs channels the buffer does not have.
    #[error("render mode '{mode}' needs {required} channels, image has {found}")]
    ChannelMismatch {
        /// Render mode name
        mode: &'static str,
        /// Minimum channel count the mode reads
        required: usize,
        /// Channel count of the decoded image
        found: usize,
    },

    /// The normalization is undefined for the delivered data.
    #[error("normalization '{mode}' cannot be applied: {reason}")]
    Normalization {
        /// Normalization mode name
        mode: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Re-encoding the rendered image failed.
    #[error("failed to encode rendered image: {0}")]
    Encode(#[from] image::ImageError),

    /// A location string uses a scheme no storage backend handles.
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    /// A render option value is not one of the known names.
    #[error("invalid value '{value}' for {name}")]
    InvalidOption {
        /// Option name (e.g. `render_mode`)
        name: &'static str,
        /// The rejected value
        value: String,
    },
}

impl TilesError {
    /// Create a not-found error for a location.
    pub fn not_found(location: impl ToString) -> Self {
        Self::NotFound {
            location: location.to_string(),
        }
    }

    /// Create a decode error for a location.
    pub fn decode(location: impl ToString, message: impl ToString) -> Self {
        Self::Decode {
            location: location.to_string(),
            message: message.to_string(),
        }
    }

    /// Create an unsupported-format error for a location.
    pub fn unsupported(location: impl ToString, detail: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            location: location.to_string(),
            detail: detail.into(),
        }
    }

    /// Create a normalization error.
    pub fn normalization(mode: &'static str, reason: impl Into<String>) -> Self {
        Self::Normalization {
            mode,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TilesError>;
