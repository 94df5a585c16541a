//! Share service: creates share URLs for records and opens them again.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info};
use validator::Validate;

use planner_core::config::share::ShareConfig;
use planner_core::error::AppError;
use planner_core::result::AppResult;
use planner_core::traits::clock::Clock;
use planner_entity::{Order, Protocol, ShareKind, SharedRecord, Vendor};
use planner_share::codec::{EXPIRES_AT_FIELD, TYPE_FIELD};
use planner_share::{ShareCodec, ShareLink};

use crate::store::PlannerStore;

/// A record recovered from a live share link.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedShare {
    /// The shared record, exactly as the sender had it.
    pub record: SharedRecord,
    /// When the link stops working. `None` for links minted without one.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Builds and opens share links.
#[derive(Debug, Clone)]
pub struct ShareService {
    codec: ShareCodec<Arc<dyn Clock>>,
    origin: String,
    route_prefix: String,
}

impl ShareService {
    /// Create a share service from configuration.
    pub fn new(config: &ShareConfig, clock: Arc<dyn Clock>) -> Self {
        let ttl = Duration::from_secs(config.ttl_hours.saturating_mul(3600));
        Self {
            codec: ShareCodec::with_clock(clock).with_ttl(ttl),
            origin: config.origin.clone(),
            route_prefix: config.route_prefix.clone(),
        }
    }

    /// Build a share URL for any record.
    pub fn share(&self, record: &SharedRecord) -> AppResult<String> {
        let token = self.codec.encode_value(record)?;
        let url = ShareLink::new(record.kind(), token).to_url(&self.origin, &self.route_prefix);

        info!(kind = %record.kind(), title = record.title(), url_len = url.len(), "Share link created");
        Ok(url)
    }

    pub fn share_vendor(&self, vendor: &Vendor) -> AppResult<String> {
        self.share(&SharedRecord::Vendor(vendor.clone()))
    }

    pub fn share_protocol(&self, protocol: &Protocol) -> AppResult<String> {
        self.share(&SharedRecord::Protocol(protocol.clone()))
    }

    pub fn share_order(&self, order: &Order) -> AppResult<String> {
        self.share(&SharedRecord::Order(order.clone()))
    }

    /// Open a share URL (or bare `<type>/share/<token>` path).
    ///
    /// Fails with `SHARE_EXPIRED` once the link's window has passed and
    /// `SHARE_CORRUPT` for anything that does not decode to a valid record
    /// of the kind named in the URL.
    pub fn open(&self, url: &str) -> AppResult<OpenedShare> {
        let link = ShareLink::parse(url)?;
        self.open_token(link.kind, &link.token)
    }

    /// Open a bare token of a known kind.
    pub fn open_token(&self, kind: ShareKind, token: &str) -> AppResult<OpenedShare> {
        let mut payload = self.codec.decode(token).into_result()?;

        if let Some(tagged) = payload.remove(TYPE_FIELD) {
            if tagged.as_str() != Some(kind.as_str()) {
                debug!(%kind, payload_type = %tagged, "Share payload type does not match link");
                return Err(AppError::share_corrupt());
            }
        }

        let expires_at = payload
            .get(EXPIRES_AT_FIELD)
            .and_then(Value::as_f64)
            .and_then(|ms| Utc.timestamp_millis_opt(ms as i64).single());

        let record = match kind {
            ShareKind::Vendor => SharedRecord::Vendor(rebuild(payload)?),
            ShareKind::Order => SharedRecord::Order(rebuild(payload)?),
            ShareKind::Protocol => SharedRecord::Protocol(rebuild(payload)?),
        };

        debug!(%kind, title = record.title(), "Share link opened");
        Ok(OpenedShare { record, expires_at })
    }

    /// Open a share URL and save the record into `store` as a new record.
    pub async fn import(&self, store: &mut PlannerStore, url: &str) -> AppResult<SharedRecord> {
        let opened = self.open(url)?;
        let adopted = store.adopt(opened.record).await?;
        info!(kind = %adopted.kind(), title = adopted.title(), "Shared record imported");
        Ok(adopted)
    }
}

fn rebuild<T: DeserializeOwned + Validate>(payload: Map<String, Value>) -> AppResult<T> {
    let record: T = serde_json::from_value(Value::Object(payload)).map_err(|e| {
        debug!(error = %e, "Share payload is not a valid record");
        AppError::share_corrupt()
    })?;
    record.validate().map_err(|e| {
        debug!(error = %e, "Shared record failed validation");
        AppError::share_corrupt()
    })?;
    Ok(record)
}
