//! Share discriminators and decoded shared records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Order, Protocol, Vendor};

/// Which kind of record a share link carries.
///
/// The lowercase name is both the `type` field inside the shared payload
/// and the `<type>` segment of the share URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareKind {
    Protocol,
    Vendor,
    Order,
}

impl ShareKind {
    /// The wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareKind::Protocol => "protocol",
            ShareKind::Vendor => "vendor",
            ShareKind::Order => "order",
        }
    }
}

impl fmt::Display for ShareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShareKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "protocol" => Ok(Self::Protocol),
            "vendor" => Ok(Self::Vendor),
            "order" => Ok(Self::Order),
            other => Err(format!("unknown share type '{other}'")),
        }
    }
}

/// A record reconstructed from a share link.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SharedRecord {
    Protocol(Protocol),
    Vendor(Vendor),
    Order(Order),
}

impl SharedRecord {
    /// The kind of record.
    pub fn kind(&self) -> ShareKind {
        match self {
            SharedRecord::Protocol(_) => ShareKind::Protocol,
            SharedRecord::Vendor(_) => ShareKind::Vendor,
            SharedRecord::Order(_) => ShareKind::Order,
        }
    }

    /// Display name of the record.
    pub fn title(&self) -> &str {
        match self {
            SharedRecord::Protocol(p) => &p.name,
            SharedRecord::Vendor(v) => &v.name,
            SharedRecord::Order(o) => &o.peptide,
        }
    }
}
