//! Share codec errors.

use thiserror::Error;

use planner_core::error::{AppError, ErrorKind};

/// Failures reported by the share codec and link parser.
#[derive(Debug, Error)]
pub enum ShareError {
    /// The record could not be turned into a token.
    #[error("could not generate link: {0}")]
    Encode(String),
    /// The token decoded but its expiry has passed.
    #[error("this link has expired")]
    Expired {
        /// Expiry embedded in the token, in ms since the epoch.
        expires_at: i64,
    },
    /// The token could not be decoded.
    #[error("this link is invalid or corrupted")]
    Corrupt,
    /// The URL does not have the `<type>/share/<token>` shape.
    #[error("not a share link: {0}")]
    InvalidLink(String),
}

impl From<ShareError> for AppError {
    fn from(err: ShareError) -> Self {
        let kind = match &err {
            ShareError::Encode(_) => ErrorKind::EncodeFailure,
            ShareError::Expired { .. } => ErrorKind::ShareExpired,
            ShareError::Corrupt | ShareError::InvalidLink(_) => ErrorKind::ShareCorrupt,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}
