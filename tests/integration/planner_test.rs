//! End-to-end store workflows on the local file backend.

use planner_entity::{Frequency, OrderStatus};

use crate::helpers::{self, TestApp, date};

#[tokio::test]
async fn test_full_workflow_survives_restart() {
    let app = TestApp::new();
    let mut store = app.store().await;

    let vendor = store.add_vendor(helpers::vendor("Acme Labs")).await.unwrap();
    let mut data = helpers::order("BPC-157", 2, 5.0, OrderStatus::Ordered);
    data.vendor_id = Some(vendor.id);
    let order = store.add_order(data).await.unwrap();
    store
        .set_order_status(order.id, OrderStatus::Received)
        .await
        .unwrap();

    let protocol = store
        .add_protocol(helpers::protocol("BPC-157", 500.0, Frequency::Daily))
        .await
        .unwrap();
    let created = store.generate_schedule(protocol.id, 14).await.unwrap();
    assert_eq!(created.len(), 14);

    for entry in created.iter().take(4) {
        store.mark_dose(entry.id, true).await.unwrap();
    }

    drop(store);
    let store = app.store().await;

    assert_eq!(store.vendors().len(), 1);
    assert_eq!(store.orders()[0].status, OrderStatus::Received);
    assert_eq!(store.orders()[0].received_on, Some(date(2026, 3, 2)));
    assert_eq!(store.schedule().iter().filter(|e| e.completed).count(), 4);

    let stock = store.stockpile();
    assert_eq!(stock.len(), 1);
    assert_eq!(stock[0].total_mg, 10.0);
    assert_eq!(stock[0].used_mg, 2.0);
    assert_eq!(stock[0].remaining_mg, 8.0);
    assert_eq!(stock[0].days_of_supply, Some(16.0));
}

#[tokio::test]
async fn test_collections_are_stored_as_escaped_json_files() {
    let app = TestApp::new();
    let mut store = app.store().await;
    store.add_vendor(helpers::vendor("Acme Labs")).await.unwrap();

    let path = app.data_dir().join("planner_3Avendors.json");
    let raw = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed[0]["name"], "Acme Labs");
    assert!(parsed[0].get("createdAt").is_some());
}

#[tokio::test]
async fn test_unreadable_collection_fails_open() {
    let app = TestApp::new();
    app.store().await;
    std::fs::write(app.data_dir().join("planner_3Aorders.json"), "[{").unwrap();

    let backend = planner_storage::create_store(&app.config.storage)
        .await
        .unwrap();
    let err = planner_service::PlannerStore::open(backend).await.unwrap_err();
    assert_eq!(err.kind, planner_core::error::ErrorKind::Serialization);
}

#[tokio::test]
async fn test_export_moves_data_between_installations() {
    let source = TestApp::new();
    let mut store = source.store().await;
    store.add_vendor(helpers::vendor("Acme Labs")).await.unwrap();
    store
        .add_order(helpers::order("TB-500", 1, 10.0, OrderStatus::Received))
        .await
        .unwrap();
    let protocol = store
        .add_protocol(helpers::protocol(
            "TB-500",
            2000.0,
            Frequency::DaysOfWeek {
                days: vec![chrono::Weekday::Mon, chrono::Weekday::Thu],
            },
        ))
        .await
        .unwrap();
    store.generate_schedule(protocol.id, 14).await.unwrap();
    let export = store.export_json().unwrap();

    let target = TestApp::new();
    let mut restored = target.store().await;
    restored.import_json(&export).await.unwrap();
    drop(restored);

    let restored = target.store().await;
    assert_eq!(restored.vendors(), store.vendors());
    assert_eq!(restored.orders(), store.orders());
    assert_eq!(restored.protocols(), store.protocols());
    assert_eq!(restored.schedule().len(), 4);
    assert_eq!(restored.stockpile(), store.stockpile());
}

#[tokio::test]
async fn test_clear_removes_files() {
    let app = TestApp::new();
    let mut store = app.store().await;
    store.add_vendor(helpers::vendor("Acme Labs")).await.unwrap();
    store.clear().await.unwrap();

    let remaining: Vec<_> = std::fs::read_dir(app.data_dir())
        .unwrap()
        .filter_map(Result::ok)
        .collect();
    assert!(remaining.is_empty());
    assert!(app.store().await.vendors().is_empty());
}
