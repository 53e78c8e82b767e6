//! End-to-end behaviour of the monitoring service against injected failures.

use chrono::Utc;
use std::time::Duration;

use endpoint_watch::health::HealthStatus;
use endpoint_watch::registry::StoreError;

mod common;
use common::{service_with, ssh, website, ProbeMode};

#[tokio::test]
async fn test_sorted_view_orders_by_order_field() {
    let a = website("a", "https://a.example", 2);
    let b = website("b", "https://b.example", 1);
    let (service, _, _) = service_with(vec![a.clone(), b.clone()], ProbeMode::Online, Duration::from_secs(1));

    assert!(service.load().await);

    let ids: Vec<_> = service.sorted_view().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}

#[tokio::test]
async fn test_sorted_view_is_stable_for_ties() {
    let records: Vec<_> = (0..6).map(|i| website(&format!("c{}", i), "https://x.example", i % 2)).collect();
    let (service, _, _) = service_with(records.clone(), ProbeMode::Online, Duration::from_secs(1));
    service.load().await;

    let names: Vec<_> = service.sorted_view().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["c0", "c2", "c4", "c1", "c3", "c5"]);
    // The underlying set keeps store order.
    let raw: Vec<_> = service.registry().snapshot().iter().map(|c| c.name.clone()).collect();
    assert_eq!(raw, vec!["c0", "c1", "c2", "c3", "c4", "c5"]);
}

#[tokio::test]
async fn test_failed_load_empties_registry() {
    let (service, store, _) = service_with(vec![website("a", "https://a.example", 0)], ProbeMode::Online, Duration::from_secs(1));
    assert!(service.load().await);
    assert_eq!(service.sorted_view().len(), 1);

    store.fail(true);
    assert!(!service.load().await);

    assert!(service.sorted_view().is_empty());
    assert!(!service.registry().is_synced());
}

#[tokio::test]
async fn test_failed_reorder_leaves_view_unchanged() {
    let a = website("a", "https://a.example", 0);
    let b = website("b", "https://b.example", 1);
    let (service, store, _) = service_with(vec![a.clone(), b.clone()], ProbeMode::Online, Duration::from_secs(1));
    service.load().await;
    let before = service.sorted_view();

    store.fail(true);
    let err = service.reorder_connections(&[b.id, a.id]).await.unwrap_err();

    assert!(matches!(err.store_error(), StoreError::Io(_)));
    assert_eq!(service.sorted_view(), before);
}

#[tokio::test]
async fn test_reorder_reloads_new_order() {
    let a = website("a", "https://a.example", 0);
    let b = website("b", "https://b.example", 1);
    let (service, _, _) = service_with(vec![a.clone(), b.clone()], ProbeMode::Online, Duration::from_secs(1));
    service.load().await;

    service.reorder_connections(&[b.id, a.id]).await.unwrap();

    let ids: Vec<_> = service.sorted_view().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}

#[tokio::test]
async fn test_failed_save_propagates_and_keeps_view() {
    let (service, store, _) = service_with(vec![], ProbeMode::Online, Duration::from_secs(1));
    service.load().await;

    store.fail(true);
    let result = service.save_connection(ssh("box", "10.0.0.9", 22, 0)).await;

    assert!(result.is_err());
    assert!(service.sorted_view().is_empty());
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn test_transport_error_yields_unknown() {
    let x = website("x", "https://x.example", 0);
    let (service, _, _) = service_with(vec![x.clone()], ProbeMode::TransportError, Duration::from_secs(1));
    service.load().await;

    let returned = service.check_one(&x).await;
    let cached = service.get_health(x.id).expect("result cached");

    assert_eq!(cached, returned);
    assert_eq!(cached.status, HealthStatus::Unknown);
    assert!(!cached.error.unwrap_or_default().is_empty());
    assert!(Utc::now() - cached.checked_at < chrono::Duration::seconds(5));
}

#[tokio::test]
async fn test_hanging_probe_times_out_to_unknown() {
    let x = ssh("x", "10.0.0.1", 22, 0);
    let (service, _, _) = service_with(vec![x.clone()], ProbeMode::Hang, Duration::from_millis(100));

    let result = tokio::time::timeout(Duration::from_secs(2), service.check_one(&x))
        .await
        .expect("dispatch bounded by its own timeout");

    assert_eq!(result.status, HealthStatus::Unknown);
    assert!(result.error.is_some());
}

#[tokio::test]
async fn test_check_all_never_fails() {
    let records = vec![website("a", "https://a.example", 0), ssh("b", "10.0.0.2", 22, 1)];
    let (service, _, prober) = service_with(records.clone(), ProbeMode::TransportError, Duration::from_secs(1));

    let results = service.check_all(&records).await;

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.status == HealthStatus::Unknown));
    assert_eq!(prober.total_calls(), 2);
    assert_eq!(service.health_snapshot().len(), 2);
}

#[tokio::test]
async fn test_polling_fan_out_count() {
    let records = vec![website("a", "https://a.example", 0), website("b", "https://b.example", 1)];
    let (service, _, prober) = service_with(records.clone(), ProbeMode::Online, Duration::from_secs(1));

    service.start_polling(records.clone(), Duration::from_millis(100));
    tokio::time::sleep(Duration::from_millis(250)).await;
    service.stop_polling();

    for connection in &records {
        let calls = prober.calls(connection.id);
        assert!((2..=3).contains(&calls), "{} probed {} times", connection.name, calls);
        assert_eq!(service.get_health(connection.id).map(|r| r.status), Some(HealthStatus::Online));
    }
}

#[tokio::test]
async fn test_restart_does_not_stack_timers() {
    let records = vec![website("a", "https://a.example", 0)];
    let (service, _, prober) = service_with(records.clone(), ProbeMode::Online, Duration::from_secs(1));

    service.start_polling(records.clone(), Duration::from_millis(100));
    service.start_polling(records.clone(), Duration::from_millis(100));
    service.start_polling(records.clone(), Duration::from_millis(100));
    tokio::time::sleep(Duration::from_millis(250)).await;
    service.stop_polling();

    let calls = prober.calls(records[0].id);
    assert!((2..=3).contains(&calls), "probed {} times", calls);
}

#[tokio::test]
async fn test_stop_is_idempotent_and_halts_ticks() {
    let records = vec![website("a", "https://a.example", 0)];
    let (service, _, prober) = service_with(records.clone(), ProbeMode::Online, Duration::from_secs(1));

    assert!(!service.stop_polling());
    service.start_polling(records.clone(), Duration::from_millis(50));
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(service.stop_polling());
    assert!(!service.stop_polling());

    tokio::time::sleep(Duration::from_millis(20)).await;
    let settled = prober.total_calls();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(prober.total_calls(), settled);
}

#[tokio::test]
async fn test_manual_check_while_polling() {
    let records = vec![ssh("a", "10.0.0.3", 22, 0)];
    let (service, _, _) = service_with(records.clone(), ProbeMode::Online, Duration::from_secs(1));

    service.start_polling(records.clone(), Duration::from_secs(60));
    let result = service.check_one(&records[0]).await;
    service.stop_polling();

    assert_eq!(result.status, HealthStatus::Online);
}
