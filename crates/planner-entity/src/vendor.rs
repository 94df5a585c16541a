//! Vendor record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use planner_core::types::VendorId;

use crate::validation::{clean_optional, not_blank};

/// A supplier that orders are placed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    /// Unique vendor identifier.
    pub id: VendorId,
    /// Display name.
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    /// Storefront URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Contact handle or email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    /// Personal rating, 0 to 5.
    #[serde(default)]
    #[validate(range(max = 5, message = "rating must be between 0 and 5"))]
    pub rating: u8,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the vendor was added.
    pub created_at: DateTime<Utc>,
    /// When the vendor was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Data required to add a vendor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendor {
    pub name: String,
    pub website: Option<String>,
    pub contact: Option<String>,
    pub rating: u8,
    pub notes: Option<String>,
}

/// Partial update of a vendor. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVendor {
    pub name: Option<String>,
    pub website: Option<String>,
    pub contact: Option<String>,
    pub rating: Option<u8>,
    pub notes: Option<String>,
}

impl Vendor {
    /// Build a new vendor from creation data, stamped at `now`.
    pub fn create(data: CreateVendor, now: DateTime<Utc>) -> Self {
        Self {
            id: VendorId::new(),
            name: data.name.trim().to_string(),
            website: clean_optional(data.website),
            contact: clean_optional(data.contact),
            rating: data.rating,
            notes: clean_optional(data.notes),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update.
    pub fn apply(&mut self, update: UpdateVendor, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if update.website.is_some() {
            self.website = clean_optional(update.website);
        }
        if update.contact.is_some() {
            self.contact = clean_optional(update.contact);
        }
        if let Some(rating) = update.rating {
            self.rating = rating;
        }
        if update.notes.is_some() {
            self.notes = clean_optional(update.notes);
        }
        self.updated_at = now;
    }
}
