//! Tests for SlotManager - initialize, update, promote, probability.

mod common;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use canary_gateway::models::{
    CanaryProbability, LoadError, ServingSnapshot, SlotKind, SlotManager, VersionId,
};
use canary_gateway::{ErrorKind, GatewayError, ValidationError};
use common::{versioned_store, FlakyStore, StalledStore, MODEL};

async fn initialized_manager() -> SlotManager {
    let manager = SlotManager::new(versioned_store().await, MODEL);
    manager.initialize(VersionId::latest()).await.unwrap();
    manager
}

#[tokio::test]
async fn test_new_manager_is_unloaded() {
    let manager = SlotManager::new(versioned_store().await, MODEL);
    let snapshot = manager.snapshot();

    assert_eq!(snapshot.generation, 0);
    assert!(!snapshot.stable_loaded);
    assert!(!snapshot.canary_loaded);
    assert_eq!(snapshot.stable_version, None);
    assert_eq!(snapshot.probability, 0.0);
}

#[tokio::test]
async fn test_initialize_loads_both_slots() {
    let manager = initialized_manager().await;

    assert_eq!(
        manager.snapshot(),
        ServingSnapshot {
            generation: 1,
            stable_version: Some(VersionId::latest()),
            canary_version: Some(VersionId::latest()),
            probability: 0.0,
            stable_loaded: true,
            canary_loaded: true,
        }
    );

    let state = manager.current();
    let stable = state.stable().model().unwrap();
    let canary = state.canary().model().unwrap();
    assert!(stable.handle().same_model(canary.handle()));
}

#[tokio::test]
async fn test_initialize_failure_leaves_state_unloaded() {
    let manager = SlotManager::new(versioned_store().await, MODEL);

    let err = manager.initialize(9u64).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Load);
    assert!(matches!(err, GatewayError::Load(LoadError::NotFound { .. })));
    let snapshot = manager.snapshot();
    assert!(!snapshot.stable_loaded && !snapshot.canary_loaded);
    assert_eq!(snapshot.generation, 0);
}

#[tokio::test]
async fn test_update_canary_replaces_only_canary() {
    let manager = initialized_manager().await;

    let version = manager.update_canary(1u64).await.unwrap();

    assert_eq!(version, VersionId::Number(1));
    let snapshot = manager.snapshot();
    assert_eq!(snapshot.canary_version, Some(VersionId::Number(1)));
    assert_eq!(snapshot.canary_version.as_ref().unwrap().to_string(), "1");
    assert_eq!(snapshot.stable_version, Some(VersionId::latest()));
    assert_eq!(snapshot.generation, 2);
}

#[tokio::test]
async fn test_update_canary_rejected_version_keeps_canary() {
    let manager = initialized_manager().await;
    manager.update_canary(1u64).await.unwrap();
    let before = manager.snapshot();

    let err = manager.update_canary(42u64).await.unwrap_err();

    assert!(matches!(err, GatewayError::Load(LoadError::NotFound { .. })));
    assert_eq!(manager.snapshot(), before);
}

#[tokio::test]
async fn test_update_canary_store_unreachable_keeps_canary() {
    let store = Arc::new(FlakyStore {
        inner: versioned_store().await,
        unreachable: AtomicBool::new(false),
    });
    let manager = SlotManager::new(store.clone(), MODEL);
    manager.initialize(1u64).await.unwrap();

    store.unreachable.store(true, std::sync::atomic::Ordering::SeqCst);
    let err = manager.update_canary(2u64).await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(manager.snapshot().canary_version, Some(VersionId::Number(1)));
}

#[tokio::test]
async fn test_update_then_promote() {
    let manager = initialized_manager().await;
    manager.update_canary(1u64).await.unwrap();

    let stable = manager.promote_canary().unwrap();

    assert_eq!(stable, VersionId::Number(1));
    let snapshot = manager.snapshot();
    assert_eq!(snapshot.stable_version, Some(VersionId::Number(1)));
    assert_eq!(snapshot.canary_version, Some(VersionId::Number(1)));

    let state = manager.current();
    let stable = state.stable().model().unwrap();
    let canary = state.canary().model().unwrap();
    assert!(stable.handle().same_model(canary.handle()));
}

#[tokio::test]
async fn test_promote_keeps_probability() {
    let manager = initialized_manager().await;
    manager.update_canary(1u64).await.unwrap();
    manager.set_canary_probability(0.3).unwrap();

    manager.promote_canary().unwrap();

    assert_eq!(manager.snapshot().probability, 0.3);
}

#[tokio::test]
async fn test_promote_before_initialize_fails() {
    let manager = SlotManager::new(versioned_store().await, MODEL);

    let err = manager.promote_canary().unwrap_err();

    assert!(matches!(err, GatewayError::ServiceUnavailable { slot: SlotKind::Canary }));
    assert_eq!(manager.snapshot().generation, 0);
}

#[tokio::test]
async fn test_set_probability_rejects_out_of_range() {
    let manager = initialized_manager().await;
    manager.set_canary_probability(0.2).unwrap();

    for p in [-0.1, 1.1, f64::NAN] {
        let err = manager.set_canary_probability(p).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Validation(ValidationError::ProbabilityOutOfRange(_))
        ));
        assert_eq!(manager.snapshot().probability, 0.2);
    }
}

#[tokio::test]
async fn test_set_probability_accepts_bounds() {
    let manager = initialized_manager().await;

    manager.set_canary_probability(1.0).unwrap();
    assert_eq!(manager.snapshot().probability, 1.0);
    manager.set_canary_probability(0.0).unwrap();
    assert_eq!(manager.snapshot().probability, 0.0);
}

#[tokio::test]
async fn test_initial_probability() {
    let manager = SlotManager::new(versioned_store().await, MODEL)
        .with_initial_probability(CanaryProbability::new(0.5).unwrap());

    assert_eq!(manager.snapshot().probability, 0.5);
}

#[tokio::test]
async fn test_load_timeout_keeps_state() {
    let store = Arc::new(StalledStore { delay: Duration::from_secs(30) });
    let manager =
        SlotManager::new(store, MODEL).with_load_timeout(Duration::from_millis(50));

    let err = manager.update_canary(1u64).await.unwrap_err();

    assert!(matches!(err, GatewayError::Load(LoadError::Timeout(_))));
    assert!(err.is_retryable());
    assert!(!manager.snapshot().canary_loaded);
}

#[tokio::test]
async fn test_cancelled_update_publishes_nothing() {
    let manager = Arc::new(SlotManager::new(
        Arc::new(StalledStore { delay: Duration::from_secs(30) }),
        MODEL,
    ));

    let pending = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.update_canary(1u64).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    pending.abort();
    assert!(pending.await.unwrap_err().is_cancelled());

    let snapshot = manager.snapshot();
    assert_eq!(snapshot.generation, 0);
    assert!(!snapshot.canary_loaded);
}

#[tokio::test]
async fn test_control_ops_are_counted() {
    let manager = initialized_manager().await;
    manager.update_canary(1u64).await.unwrap();
    let _ = manager.update_canary(7u64).await;
    manager.promote_canary().unwrap();
    let _ = manager.set_canary_probability(2.0);

    let metrics = manager.metrics().snapshot();
    assert_eq!(metrics.counter("gateway_control_ops_total.initialize.ok"), 1);
    assert_eq!(metrics.counter("gateway_control_ops_total.update_canary.ok"), 1);
    assert_eq!(metrics.counter("gateway_control_ops_total.update_canary.error"), 1);
    assert_eq!(metrics.counter("gateway_control_ops_total.promote_canary.ok"), 1);
    assert_eq!(metrics.counter("gateway_control_ops_total.set_probability.error"), 1);
}
