//! The planner record store.
//!
//! [`PlannerStore`] keeps every collection in memory and writes the whole
//! collection back to the key-value backend on each mutation. A mutation
//! builds every collection it changes, persists them all, and only then
//! swaps them in. A failed write leaves the in-memory state untouched, and
//! collections already written by the same mutation are put back.

pub mod keys;
pub mod snapshot;
pub mod stockpile;

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use validator::Validate;

use planner_core::error::{AppError, ErrorKind};
use planner_core::result::AppResult;
use planner_core::traits::clock::{Clock, SystemClock};
use planner_core::traits::storage::KeyValueStore;
use planner_core::types::{OrderId, ProtocolId, ScheduleEntryId, VendorId};
use planner_entity::{
    CreateOrder, CreateProtocol, CreateVendor, Order, OrderStatus, Protocol, ScheduleEntry,
    SharedRecord, StockpileItem, UpdateOrder, UpdateProtocol, UpdateVendor, Vendor,
};

pub use snapshot::{SNAPSHOT_VERSION, Snapshot};

/// Longest span `generate_schedule` will materialise in one call.
pub const MAX_SCHEDULE_DAYS: u32 = 730;

/// State container for all planner records.
#[derive(Debug)]
pub struct PlannerStore {
    backend: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    vendors: Vec<Vendor>,
    orders: Vec<Order>,
    protocols: Vec<Protocol>,
    schedule: Vec<ScheduleEntry>,
}

impl PlannerStore {
    /// Load every collection from `backend` using the system clock.
    pub async fn open(backend: Arc<dyn KeyValueStore>) -> AppResult<Self> {
        Self::open_with_clock(backend, Arc::new(SystemClock)).await
    }

    /// Load every collection from `backend`, stamping records with `clock`.
    ///
    /// Missing collections start empty. A collection that exists but does
    /// not parse is an error rather than silently discarded.
    pub async fn open_with_clock(
        backend: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let vendors = load(backend.as_ref(), keys::VENDORS).await?;
        let orders = load(backend.as_ref(), keys::ORDERS).await?;
        let protocols = load(backend.as_ref(), keys::PROTOCOLS).await?;
        let schedule = load(backend.as_ref(), keys::SCHEDULE).await?;

        let store = Self {
            backend,
            clock,
            vendors,
            orders,
            protocols,
            schedule,
        };

        info!(
            provider = store.backend.provider_type(),
            vendors = store.vendors.len(),
            orders = store.orders.len(),
            protocols = store.protocols.len(),
            schedule = store.schedule.len(),
            "Planner store opened"
        );
        Ok(store)
    }

    /// The clock used to stamp records.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    // ── Vendors ────────────────────────────────────────────────

    pub fn vendors(&self) -> &[Vendor] {
        &self.vendors
    }

    pub fn vendor(&self, id: VendorId) -> AppResult<&Vendor> {
        self.vendors
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| AppError::not_found(format!("Vendor not found: {id}")))
    }

    pub async fn add_vendor(&mut self, data: CreateVendor) -> AppResult<Vendor> {
        let vendor = Vendor::create(data, self.clock.now());
        vendor.validate()?;

        let mut vendors = self.vendors.clone();
        vendors.push(vendor.clone());
        self.save(keys::VENDORS, &vendors).await?;
        self.vendors = vendors;

        info!(vendor_id = %vendor.id, name = %vendor.name, "Vendor added");
        Ok(vendor)
    }

    /// Update a vendor. A rename is carried over to its orders.
    pub async fn update_vendor(&mut self, id: VendorId, update: UpdateVendor) -> AppResult<Vendor> {
        let index = self.vendor_index(id)?;
        let mut vendor = self.vendors[index].clone();
        vendor.apply(update, self.clock.now());
        vendor.validate()?;

        let mut writes = Vec::new();
        let orders = if vendor.name != self.vendors[index].name {
            let mut orders = self.orders.clone();
            for order in orders.iter_mut().filter(|o| o.vendor_id == Some(id)) {
                order.vendor_name = vendor.name.clone();
            }
            writes.push(stage(keys::ORDERS, &orders, &self.orders)?);
            Some(orders)
        } else {
            None
        };

        let mut vendors = self.vendors.clone();
        vendors[index] = vendor.clone();
        writes.push(stage(keys::VENDORS, &vendors, &self.vendors)?);

        self.commit(&writes).await?;
        if let Some(orders) = orders {
            self.orders = orders;
        }
        self.vendors = vendors;

        info!(vendor_id = %id, "Vendor updated");
        Ok(vendor)
    }

    /// Remove a vendor. Its orders are kept, detached from the vendor
    /// record but still carrying the vendor name.
    pub async fn remove_vendor(&mut self, id: VendorId) -> AppResult<Vendor> {
        let index = self.vendor_index(id)?;

        let mut writes = Vec::new();
        let orders = if self.orders.iter().any(|o| o.vendor_id == Some(id)) {
            let mut orders = self.orders.clone();
            for order in orders.iter_mut().filter(|o| o.vendor_id == Some(id)) {
                order.vendor_id = None;
            }
            writes.push(stage(keys::ORDERS, &orders, &self.orders)?);
            Some(orders)
        } else {
            None
        };

        let mut vendors = self.vendors.clone();
        let removed = vendors.remove(index);
        writes.push(stage(keys::VENDORS, &vendors, &self.vendors)?);

        self.commit(&writes).await?;
        if let Some(orders) = orders {
            self.orders = orders;
        }
        self.vendors = vendors;

        info!(vendor_id = %id, "Vendor removed");
        Ok(removed)
    }

    fn vendor_index(&self, id: VendorId) -> AppResult<usize> {
        self.vendors
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| AppError::not_found(format!("Vendor not found: {id}")))
    }

    // ── Orders ─────────────────────────────────────────────────

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn order(&self, id: OrderId) -> AppResult<&Order> {
        self.orders
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| AppError::not_found(format!("Order not found: {id}")))
    }

    /// Record an order. When linked to a vendor with no name given, the
    /// vendor's name is copied in.
    pub async fn add_order(&mut self, mut data: CreateOrder) -> AppResult<Order> {
        if let Some(vendor_id) = data.vendor_id {
            let vendor = self.vendor(vendor_id)?;
            if data.vendor_name.trim().is_empty() {
                data.vendor_name = vendor.name.clone();
            }
        }

        let order = Order::create(data, self.clock.now());
        order.validate()?;

        let mut orders = self.orders.clone();
        orders.push(order.clone());
        self.save(keys::ORDERS, &orders).await?;
        self.orders = orders;

        info!(order_id = %order.id, peptide = %order.peptide, status = %order.status, "Order added");
        Ok(order)
    }

    pub async fn update_order(&mut self, id: OrderId, update: UpdateOrder) -> AppResult<Order> {
        let index = self.order_index(id)?;
        let mut order = self.orders[index].clone();
        order.apply(update, self.clock.now());
        order.validate()?;
        self.replace_order(index, order).await
    }

    /// Move an order to `status`. Receiving stamps today's date once.
    pub async fn set_order_status(&mut self, id: OrderId, status: OrderStatus) -> AppResult<Order> {
        let index = self.order_index(id)?;
        let mut order = self.orders[index].clone();
        order.transition(status, self.clock.now());
        let order = self.replace_order(index, order).await?;
        info!(order_id = %id, %status, "Order status changed");
        Ok(order)
    }

    pub async fn remove_order(&mut self, id: OrderId) -> AppResult<Order> {
        let index = self.order_index(id)?;
        let mut orders = self.orders.clone();
        let removed = orders.remove(index);
        self.save(keys::ORDERS, &orders).await?;
        self.orders = orders;

        info!(order_id = %id, "Order removed");
        Ok(removed)
    }

    fn order_index(&self, id: OrderId) -> AppResult<usize> {
        self.orders
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| AppError::not_found(format!("Order not found: {id}")))
    }

    async fn replace_order(&mut self, index: usize, order: Order) -> AppResult<Order> {
        let mut orders = self.orders.clone();
        orders[index] = order.clone();
        self.save(keys::ORDERS, &orders).await?;
        self.orders = orders;
        Ok(order)
    }

    // ── Protocols ──────────────────────────────────────────────

    pub fn protocols(&self) -> &[Protocol] {
        &self.protocols
    }

    pub fn protocol(&self, id: ProtocolId) -> AppResult<&Protocol> {
        self.protocols
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::not_found(format!("Protocol not found: {id}")))
    }

    pub async fn add_protocol(&mut self, data: CreateProtocol) -> AppResult<Protocol> {
        let protocol = Protocol::create(data, self.clock.now());
        protocol.validate()?;

        let mut protocols = self.protocols.clone();
        protocols.push(protocol.clone());
        self.save(keys::PROTOCOLS, &protocols).await?;
        self.protocols = protocols;

        info!(protocol_id = %protocol.id, name = %protocol.name, "Protocol added");
        Ok(protocol)
    }

    /// Update a protocol. Pending schedule entries follow the new dose, and
    /// pending entries that no longer fall on a dosing day are dropped.
    /// Completed entries are history and stay as logged.
    pub async fn update_protocol(
        &mut self,
        id: ProtocolId,
        update: UpdateProtocol,
    ) -> AppResult<Protocol> {
        let index = self.protocol_index(id)?;
        let mut protocol = self.protocols[index].clone();
        protocol.apply(update, self.clock.now());
        protocol.validate()?;

        let schedule: Vec<ScheduleEntry> = self
            .schedule
            .iter()
            .filter(|e| e.protocol_id != id || e.completed || protocol.is_due(e.date))
            .cloned()
            .map(|mut e| {
                if e.protocol_id == id && !e.completed {
                    e.dose_mcg = protocol.dose_mcg;
                }
                e
            })
            .collect();
        let mut writes = Vec::new();
        let schedule = if schedule != self.schedule {
            writes.push(stage(keys::SCHEDULE, &schedule, &self.schedule)?);
            Some(schedule)
        } else {
            None
        };

        let mut protocols = self.protocols.clone();
        protocols[index] = protocol.clone();
        writes.push(stage(keys::PROTOCOLS, &protocols, &self.protocols)?);

        self.commit(&writes).await?;
        if let Some(schedule) = schedule {
            self.schedule = schedule;
        }
        self.protocols = protocols;

        info!(protocol_id = %id, "Protocol updated");
        Ok(protocol)
    }

    pub async fn set_protocol_active(&mut self, id: ProtocolId, active: bool) -> AppResult<Protocol> {
        let index = self.protocol_index(id)?;
        let mut protocol = self.protocols[index].clone();
        protocol.active = active;
        protocol.updated_at = self.clock.now();

        let mut protocols = self.protocols.clone();
        protocols[index] = protocol.clone();
        self.save(keys::PROTOCOLS, &protocols).await?;
        self.protocols = protocols;

        info!(protocol_id = %id, active, "Protocol activation changed");
        Ok(protocol)
    }

    /// Remove a protocol together with its schedule entries.
    pub async fn remove_protocol(&mut self, id: ProtocolId) -> AppResult<Protocol> {
        let index = self.protocol_index(id)?;

        let mut writes = Vec::new();
        let schedule = if self.schedule.iter().any(|e| e.protocol_id == id) {
            let schedule: Vec<ScheduleEntry> = self
                .schedule
                .iter()
                .filter(|e| e.protocol_id != id)
                .cloned()
                .collect();
            writes.push(stage(keys::SCHEDULE, &schedule, &self.schedule)?);
            Some(schedule)
        } else {
            None
        };

        let mut protocols = self.protocols.clone();
        let removed = protocols.remove(index);
        writes.push(stage(keys::PROTOCOLS, &protocols, &self.protocols)?);

        self.commit(&writes).await?;
        if let Some(schedule) = schedule {
            self.schedule = schedule;
        }
        self.protocols = protocols;

        info!(protocol_id = %id, "Protocol removed");
        Ok(removed)
    }

    fn protocol_index(&self, id: ProtocolId) -> AppResult<usize> {
        self.protocols
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| AppError::not_found(format!("Protocol not found: {id}")))
    }

    // ── Schedule ───────────────────────────────────────────────

    pub fn schedule(&self) -> &[ScheduleEntry] {
        &self.schedule
    }

    /// Materialise dosing days for `days` days from the protocol's start
    /// date. Dates that already have an entry are skipped, so calling this
    /// again only fills gaps. Returns the entries created.
    pub async fn generate_schedule(
        &mut self,
        protocol_id: ProtocolId,
        days: u32,
    ) -> AppResult<Vec<ScheduleEntry>> {
        if days == 0 || days > MAX_SCHEDULE_DAYS {
            return Err(AppError::validation(format!(
                "days must be between 1 and {MAX_SCHEDULE_DAYS}"
            )));
        }

        let protocol = self.protocol(protocol_id)?;
        if !protocol.active {
            return Err(AppError::validation(format!(
                "Protocol '{}' is paused; resume it before scheduling doses",
                protocol.name
            )));
        }

        let created: Vec<ScheduleEntry> = (0..u64::from(days))
            .filter_map(|offset| protocol.start_date.checked_add_days(Days::new(offset)))
            .filter(|date| protocol.is_due(*date))
            .filter(|date| {
                !self
                    .schedule
                    .iter()
                    .any(|e| e.protocol_id == protocol_id && e.date == *date)
            })
            .map(|date| ScheduleEntry::planned(protocol_id, date, protocol.dose_mcg))
            .collect();

        if created.is_empty() {
            return Ok(created);
        }

        let mut schedule = self.schedule.clone();
        schedule.extend(created.iter().cloned());
        schedule.sort_by_key(|e| e.date);
        self.save(keys::SCHEDULE, &schedule).await?;
        self.schedule = schedule;

        info!(%protocol_id, created = created.len(), "Schedule generated");
        Ok(created)
    }

    /// Mark a scheduled dose taken or not taken.
    pub async fn mark_dose(
        &mut self,
        entry_id: ScheduleEntryId,
        completed: bool,
    ) -> AppResult<ScheduleEntry> {
        let index = self
            .schedule
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or_else(|| AppError::not_found(format!("Schedule entry not found: {entry_id}")))?;

        let mut schedule = self.schedule.clone();
        schedule[index].mark(completed, self.clock.now());
        let entry = schedule[index].clone();
        self.save(keys::SCHEDULE, &schedule).await?;
        self.schedule = schedule;

        info!(%entry_id, completed, "Dose marked");
        Ok(entry)
    }

    /// Entries planned for one day.
    pub fn schedule_for(&self, date: NaiveDate) -> Vec<&ScheduleEntry> {
        self.schedule_between(date, date)
    }

    /// Entries planned between two days, inclusive, ordered by date.
    pub fn schedule_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<&ScheduleEntry> {
        let mut entries: Vec<&ScheduleEntry> = self
            .schedule
            .iter()
            .filter(|e| e.date >= from && e.date <= to)
            .collect();
        entries.sort_by_key(|e| e.date);
        entries
    }

    /// Entries planned for today.
    pub fn schedule_today(&self) -> Vec<&ScheduleEntry> {
        self.schedule_for(self.today())
    }

    // ── Derived data ───────────────────────────────────────────

    /// Per-peptide stock from received orders and completed doses.
    pub fn stockpile(&self) -> Vec<StockpileItem> {
        stockpile::compute(&self.orders, &self.protocols, &self.schedule)
    }

    // ── Backup / restore ───────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            exported_at: self.clock.now(),
            vendors: self.vendors.clone(),
            orders: self.orders.clone(),
            protocols: self.protocols.clone(),
            schedule: self.schedule.clone(),
        }
    }

    /// Serialize every collection as pretty JSON.
    pub fn export_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Replace every collection with the contents of an export.
    ///
    /// All records are validated before anything is written. Schedule
    /// entries pointing at protocols missing from the export are dropped.
    pub async fn import_json(&mut self, json: &str) -> AppResult<()> {
        let snapshot: Snapshot = serde_json::from_str(json).map_err(|e| {
            AppError::with_source(ErrorKind::Serialization, format!("Invalid export: {e}"), e)
        })?;
        self.restore(snapshot).await
    }

    pub async fn restore(&mut self, snapshot: Snapshot) -> AppResult<()> {
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(AppError::validation(format!(
                "Export version {} is newer than supported version {SNAPSHOT_VERSION}",
                snapshot.version
            )));
        }

        for vendor in &snapshot.vendors {
            vendor.validate()?;
        }
        for order in &snapshot.orders {
            order.validate()?;
        }
        for protocol in &snapshot.protocols {
            protocol.validate()?;
        }

        let total = snapshot.schedule.len();
        let schedule: Vec<ScheduleEntry> = snapshot
            .schedule
            .into_iter()
            .filter(|e| snapshot.protocols.iter().any(|p| p.id == e.protocol_id))
            .collect();
        if schedule.len() != total {
            warn!(
                dropped = total - schedule.len(),
                "Dropped schedule entries for unknown protocols"
            );
        }

        let writes = [
            stage(keys::VENDORS, &snapshot.vendors, &self.vendors)?,
            stage(keys::ORDERS, &snapshot.orders, &self.orders)?,
            stage(keys::PROTOCOLS, &snapshot.protocols, &self.protocols)?,
            stage(keys::SCHEDULE, &schedule, &self.schedule)?,
        ];
        self.commit(&writes).await?;

        self.vendors = snapshot.vendors;
        self.orders = snapshot.orders;
        self.protocols = snapshot.protocols;
        self.schedule = schedule;

        info!(
            vendors = self.vendors.len(),
            orders = self.orders.len(),
            protocols = self.protocols.len(),
            schedule = self.schedule.len(),
            "Planner data imported"
        );
        Ok(())
    }

    /// Delete every planner key from the backend.
    pub async fn clear(&mut self) -> AppResult<()> {
        for key in self.backend.keys().await? {
            if keys::is_planner_key(&key) {
                self.backend.remove(&key).await?;
            }
        }
        self.vendors.clear();
        self.orders.clear();
        self.protocols.clear();
        self.schedule.clear();

        info!("Planner data cleared");
        Ok(())
    }

    // ── Shared records ─────────────────────────────────────────

    /// Save a record received through a share link as a new local record.
    ///
    /// The record gets a fresh id and timestamps. An order's link to the
    /// sender's vendor is dropped; its vendor name is kept.
    pub async fn adopt(&mut self, record: SharedRecord) -> AppResult<SharedRecord> {
        let adopted = match record {
            SharedRecord::Vendor(v) => SharedRecord::Vendor(
                self.add_vendor(CreateVendor {
                    name: v.name,
                    website: v.website,
                    contact: v.contact,
                    rating: v.rating,
                    notes: v.notes,
                })
                .await?,
            ),
            SharedRecord::Order(o) => SharedRecord::Order(
                self.add_order(CreateOrder {
                    vendor_id: None,
                    vendor_name: o.vendor_name,
                    peptide: o.peptide,
                    quantity: o.quantity,
                    mg_per_vial: o.mg_per_vial,
                    price: o.price,
                    status: o.status,
                    ordered_on: o.ordered_on,
                    tracking_number: o.tracking_number,
                    notes: o.notes,
                })
                .await?,
            ),
            SharedRecord::Protocol(p) => SharedRecord::Protocol(
                self.add_protocol(CreateProtocol {
                    name: p.name,
                    peptide: p.peptide,
                    dose_mcg: p.dose_mcg,
                    frequency: p.frequency,
                    start_date: p.start_date,
                    end_date: p.end_date,
                    notes: p.notes,
                })
                .await?,
            ),
        };
        Ok(adopted)
    }

    async fn save<T: Serialize + Sync>(&self, key: &str, items: &[T]) -> AppResult<()> {
        let json = serde_json::to_string(items)?;
        self.backend.set(key, &json).await
    }

    /// Write several collections as one mutation. If a write fails, the
    /// collections already written are put back before the error returns.
    async fn commit(&self, writes: &[StagedWrite]) -> AppResult<()> {
        for (done, write) in writes.iter().enumerate() {
            if let Err(e) = self.backend.set(write.key, &write.json).await {
                for applied in writes[..done].iter().rev() {
                    if let Err(rollback) = self.backend.set(applied.key, &applied.previous).await {
                        warn!(
                            key = applied.key,
                            error = %rollback,
                            "Could not restore planner collection after failed write"
                        );
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

/// A pending collection write and the stored value it replaces.
struct StagedWrite {
    key: &'static str,
    json: String,
    previous: String,
}

fn stage<T: Serialize>(key: &'static str, next: &[T], current: &[T]) -> AppResult<StagedWrite> {
    Ok(StagedWrite {
        key,
        json: serde_json::to_string(next)?,
        previous: serde_json::to_string(current)?,
    })
}

async fn load<T: DeserializeOwned>(backend: &dyn KeyValueStore, key: &str) -> AppResult<Vec<T>> {
    match backend.get(key).await? {
        Some(json) => serde_json::from_str(&json).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Stored collection '{key}' is unreadable: {e}"),
                e,
            )
        }),
        None => Ok(Vec::new()),
    }
}
