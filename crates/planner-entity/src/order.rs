//! Order record and status lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use planner_core::types::{OrderId, VendorId};

use crate::validation::{clean_optional, not_blank};

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, not yet shipped.
    #[default]
    Ordered,
    /// In transit.
    Shipped,
    /// Arrived; counts toward the stockpile.
    Received,
    /// Cancelled or refunded.
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Ordered => write!(f, "ordered"),
            OrderStatus::Shipped => write!(f, "shipped"),
            OrderStatus::Received => write!(f, "received"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ordered" => Ok(Self::Ordered),
            "shipped" => Ok(Self::Shipped),
            "received" => Ok(Self::Received),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(format!("unknown order status '{other}'")),
        }
    }
}

/// A purchase of one peptide from a vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Vendor the order was placed with, if it is tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<VendorId>,
    /// Vendor name as entered; kept when the vendor record is removed.
    #[serde(default)]
    pub vendor_name: String,
    /// Compound ordered.
    #[validate(custom(function = "not_blank"))]
    pub peptide: String,
    /// Number of vials.
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,
    /// Milligrams per vial.
    #[validate(range(exclusive_min = 0.0, message = "mg per vial must be positive"))]
    pub mg_per_vial: f64,
    /// Total price paid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "price cannot be negative"))]
    pub price: Option<f64>,
    /// Fulfilment status.
    #[serde(default)]
    pub status: OrderStatus,
    /// Date the order was placed.
    pub ordered_on: NaiveDate,
    /// Date the order arrived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_on: Option<NaiveDate>,
    /// Carrier tracking number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the order was recorded.
    pub created_at: DateTime<Utc>,
    /// When the order was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Data required to record an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub vendor_id: Option<VendorId>,
    pub vendor_name: String,
    pub peptide: String,
    pub quantity: u32,
    pub mg_per_vial: f64,
    pub price: Option<f64>,
    pub status: OrderStatus,
    pub ordered_on: NaiveDate,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
}

/// Partial update of an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrder {
    pub peptide: Option<String>,
    pub quantity: Option<u32>,
    pub mg_per_vial: Option<f64>,
    pub price: Option<f64>,
    pub ordered_on: Option<NaiveDate>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
}

impl Order {
    /// Build a new order from creation data, stamped at `now`.
    pub fn create(data: CreateOrder, now: DateTime<Utc>) -> Self {
        let received_on = (data.status == OrderStatus::Received).then(|| now.date_naive());
        Self {
            id: OrderId::new(),
            vendor_id: data.vendor_id,
            vendor_name: data.vendor_name.trim().to_string(),
            peptide: data.peptide.trim().to_string(),
            quantity: data.quantity,
            mg_per_vial: data.mg_per_vial,
            price: data.price,
            status: data.status,
            ordered_on: data.ordered_on,
            received_on,
            tracking_number: clean_optional(data.tracking_number),
            notes: clean_optional(data.notes),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update.
    pub fn apply(&mut self, update: UpdateOrder, now: DateTime<Utc>) {
        if let Some(peptide) = update.peptide {
            self.peptide = peptide.trim().to_string();
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(mg) = update.mg_per_vial {
            self.mg_per_vial = mg;
        }
        if update.price.is_some() {
            self.price = update.price;
        }
        if let Some(date) = update.ordered_on {
            self.ordered_on = date;
        }
        if update.tracking_number.is_some() {
            self.tracking_number = clean_optional(update.tracking_number);
        }
        if update.notes.is_some() {
            self.notes = clean_optional(update.notes);
        }
        self.updated_at = now;
    }

    /// Move the order to a new status. Receiving stamps `received_on` once.
    pub fn transition(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        if status == OrderStatus::Received && self.received_on.is_none() {
            self.received_on = Some(now.date_naive());
        }
        self.status = status;
        self.updated_at = now;
    }

    /// Total milligrams across all vials.
    pub fn total_mg(&self) -> f64 {
        f64::from(self.quantity) * self.mg_per_vial
    }
}
