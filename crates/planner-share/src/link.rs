//! Share URL construction and parsing.
//!
//! Links have the form `<origin>/<route-prefix>/<type>/share/<token>`.

use std::str::FromStr;

use planner_entity::share::ShareKind;

use crate::error::ShareError;

const SHARE_SEGMENT: &str = "share";

/// The routable parts of a share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    /// Kind of record carried by the token.
    pub kind: ShareKind,
    /// The encoded token.
    pub token: String,
}

impl ShareLink {
    pub fn new(kind: ShareKind, token: impl Into<String>) -> Self {
        Self {
            kind,
            token: token.into(),
        }
    }

    /// Render the full URL under `origin` and `route_prefix`.
    pub fn to_url(&self, origin: &str, route_prefix: &str) -> String {
        let origin = origin.trim_end_matches('/');
        let prefix = route_prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{origin}/{}/{SHARE_SEGMENT}/{}", self.kind, self.token)
        } else {
            format!(
                "{origin}/{prefix}/{}/{SHARE_SEGMENT}/{}",
                self.kind, self.token
            )
        }
    }

    /// Extract kind and token from a full URL or a bare path.
    ///
    /// Only the last three path segments matter; query strings and
    /// fragments are ignored.
    pub fn parse(input: &str) -> Result<Self, ShareError> {
        let path = input
            .split(['#', '?'])
            .next()
            .unwrap_or_default()
            .trim();

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let [.., kind, marker, token] = segments.as_slice() else {
            return Err(ShareError::InvalidLink(input.to_string()));
        };

        if *marker != SHARE_SEGMENT {
            return Err(ShareError::InvalidLink(input.to_string()));
        }

        let kind = ShareKind::from_str(kind).map_err(ShareError::InvalidLink)?;

        if !token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ShareError::InvalidLink(format!(
                "token contains characters outside the URL-safe alphabet: {input}"
            )));
        }

        Ok(Self::new(kind, *token))
    }
}
