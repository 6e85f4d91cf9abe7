mod common;

use common::{gate_over, store_over, BrokenStorage, HeldStorage};
use crm_access::{Destination, GateState, GateView, MemoryStorage, SessionStorage};
use std::sync::Arc;

#[tokio::test]
async fn test_checking_until_restore_completes() {
    let storage = Arc::new(HeldStorage::default());
    let store = store_over(storage.clone());
    let gate = gate_over(&store);
    assert_eq!(gate.state(), GateState::Unknown);
    assert_eq!(gate.view(), GateView::Waiting);

    let mounting = {
        let gate = gate.clone();
        tokio::spawn(async move { gate.mount().await })
    };

    while gate.state() != GateState::Checking {
        tokio::task::yield_now().await;
    }
    for _ in 0..10 {
        tokio::task::yield_now().await;
        assert_eq!(gate.view(), GateView::Waiting);
        assert!(gate.pending_redirect().is_none());
    }

    storage.release.notify_one();

    assert_eq!(
        mounting.await.unwrap(),
        GateView::Redirect(Destination::Login)
    );
    assert_eq!(gate.state(), GateState::Redirecting(Destination::Login));
}

#[tokio::test]
async fn test_login_then_mount_renders() {
    let store = store_over(Arc::new(MemoryStorage::new()));
    let gate = gate_over(&store);

    let session = store.login("a@b.com", "secret").await.unwrap();
    assert!(session.authenticated && session.resolved);

    assert_eq!(gate.mount().await, GateView::Render);
    assert_eq!(gate.state(), GateState::Authenticated);
}

#[tokio::test]
async fn test_persisted_flag_renders_after_checking() {
    let storage = Arc::new(HeldStorage::default());
    storage
        .inner
        .set(crm_access::DEFAULT_SESSION_KEY, "true")
        .await
        .unwrap();
    storage.release.notify_one();

    let store = store_over(storage);
    let gate = gate_over(&store);

    assert_eq!(gate.mount().await, GateView::Render);
}

#[tokio::test]
async fn test_login_cancels_pending_redirect() {
    let store = store_over(Arc::new(MemoryStorage::new()));
    let gate = gate_over(&store);

    assert_eq!(gate.mount().await, GateView::Redirect(Destination::Login));
    let token = gate.pending_redirect().unwrap();

    store.login("a@b.com", "secret").await.unwrap();

    assert!(token.is_cancelled());
    assert_eq!(gate.state(), GateState::Authenticated);
    assert_eq!(gate.complete_redirect(), None);
    assert_eq!(gate.view(), GateView::Render);
}

#[tokio::test]
async fn test_complete_redirect_once() {
    let store = store_over(Arc::new(MemoryStorage::new()));
    let gate = gate_over(&store);
    gate.mount().await;

    assert_eq!(gate.complete_redirect(), Some(Destination::Login));
    assert_eq!(gate.complete_redirect(), None);
    assert_eq!(gate.state(), GateState::Unauthenticated);

    // Next navigation re-arms the redirect.
    assert_eq!(gate.mount().await, GateView::Redirect(Destination::Login));
    assert!(gate.pending_redirect().is_some());
}

#[tokio::test]
async fn test_logout_redirects_mounted_gate() {
    let store = store_over(Arc::new(MemoryStorage::new()));
    let gate = gate_over(&store);
    store.login("a@b.com", "secret").await.unwrap();
    gate.mount().await;

    let destination = store.logout().await;

    assert_eq!(destination, Destination::Login);
    assert_eq!(gate.view(), GateView::Redirect(Destination::Login));
}

#[tokio::test]
async fn test_unmounted_gate_ignores_broadcasts() {
    let store = store_over(Arc::new(MemoryStorage::new()));
    let gate = gate_over(&store);

    store.login("a@b.com", "secret").await.unwrap();

    assert_eq!(gate.state(), GateState::Unknown);
}

#[tokio::test]
async fn test_storage_failure_routes_to_login() {
    let store = store_over(Arc::new(BrokenStorage));
    let gate = gate_over(&store);

    assert_eq!(gate.mount().await, GateView::Redirect(Destination::Login));
}

#[tokio::test]
async fn test_login_view_sends_signed_in_user_home() {
    let store = store_over(Arc::new(MemoryStorage::new()));
    let gate = gate_over(&store);
    assert_eq!(gate.login_view(), GateView::Render);

    store.login("a@b.com", "secret").await.unwrap();

    assert_eq!(
        gate.login_view(),
        GateView::Redirect(Destination::ProtectedRoot)
    );
}

#[tokio::test]
async fn test_dropping_gate_unsubscribes() {
    let store = store_over(Arc::new(MemoryStorage::new()));
    let gate = gate_over(&store);
    gate.mount().await;
    assert_eq!(store.subscriber_count(), 1);

    drop(gate);

    assert_eq!(store.subscriber_count(), 0);
    store.login("a@b.com", "secret").await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mount_racing_login_settles_authenticated() {
    for _ in 0..200 {
        let store = store_over(Arc::new(MemoryStorage::new()));
        let gate = gate_over(&store);

        let mounting = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.mount().await })
        };
        let logging_in = {
            let store = store.clone();
            tokio::spawn(async move { store.login("a@b.com", "secret").await })
        };

        logging_in.await.unwrap().unwrap();
        mounting.await.unwrap();

        assert_eq!(gate.state(), GateState::Authenticated);
        assert_eq!(gate.view(), GateView::Render);
        assert!(gate.pending_redirect().is_none());
    }
}
