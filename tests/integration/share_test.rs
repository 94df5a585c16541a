//! Share links between two planner installations.

use planner_core::error::ErrorKind;
use planner_core::traits::clock::Clock;
use planner_entity::{Frequency, OrderStatus, SharedRecord};
use planner_share::{ShareCodec, ShareLink};

use crate::helpers::{self, TestApp};

#[tokio::test]
async fn test_protocol_shared_and_imported() {
    let sender = TestApp::new();
    let receiver = TestApp::with_clock(sender.clock.clone());

    let mut store = sender.store().await;
    let protocol = store
        .add_protocol(helpers::protocol("BPC-157", 250.0, Frequency::EveryOtherDay))
        .await
        .unwrap();
    let url = sender.share_service().share_protocol(&protocol).unwrap();
    assert!(url.starts_with("https://planner.example/planner/protocol/share/"));

    let mut inbox = receiver.store().await;
    let imported = receiver
        .share_service()
        .import(&mut inbox, &url)
        .await
        .unwrap();
    let SharedRecord::Protocol(imported) = imported else {
        panic!("expected a protocol");
    };
    assert_eq!(imported.name, protocol.name);
    assert_eq!(imported.frequency, Frequency::EveryOtherDay);
    assert_ne!(imported.id, protocol.id);

    drop(inbox);
    assert_eq!(receiver.store().await.protocols().len(), 1);
}

#[tokio::test]
async fn test_vendor_link_expires_after_a_day() {
    let app = TestApp::new();
    let mut store = app.store().await;
    let vendor = store.add_vendor(helpers::vendor("Acme Labs")).await.unwrap();
    let service = app.share_service();
    let url = service.share_vendor(&vendor).unwrap();

    app.clock.advance_hours(23);
    assert!(service.open(&url).is_ok());

    app.clock.advance_hours(2);
    let err = service.open(&url).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ShareExpired);
    assert_eq!(err.message, "this link has expired");
}

#[tokio::test]
async fn test_order_token_carries_type_and_expiry() {
    let app = TestApp::new();
    let mut store = app.store().await;
    let order = store
        .add_order(helpers::order("BPC-157", 3, 5.0, OrderStatus::Shipped))
        .await
        .unwrap();
    let url = app.share_service().share_order(&order).unwrap();

    let link = ShareLink::parse(&url).unwrap();
    assert!(
        link.token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    );

    let codec = ShareCodec::with_clock(app.clock.clone());
    let payload = codec.decode(&link.token).live().expect("token should be live");
    assert_eq!(payload["type"], "order");
    assert_eq!(payload["peptide"], "BPC-157");
    assert_eq!(
        payload["expiresAt"].as_i64(),
        Some(app.clock.now_millis() + 24 * 3_600_000)
    );

    app.clock.advance_hours(25);
    assert!(codec.decode(&link.token).is_expired());
}

#[tokio::test]
async fn test_tampered_link_is_corrupt() {
    let app = TestApp::new();
    let mut store = app.store().await;
    let vendor = store.add_vendor(helpers::vendor("Acme Labs")).await.unwrap();
    let service = app.share_service();
    let url = service.share_vendor(&vendor).unwrap();

    let truncated = &url[..url.len() - 6];
    let err = service.open(truncated).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ShareCorrupt);
    assert_eq!(err.message, "this link is invalid or corrupted");

    let mut inbox = app.store().await;
    assert!(service.import(&mut inbox, truncated).await.is_err());
    assert_eq!(inbox.vendors().len(), 1);
}
