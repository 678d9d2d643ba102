mod common;

use common::{auto_mesh, ManualMesh, Recorder};
use lamport_lock::{engine::CycleState, queue::RequestRecord};
use std::{sync::Arc, time::Duration};
use tokio::time::timeout;

const DEADLINE: Duration = Duration::from_secs(10);

#[tokio::test]
async fn two_peers_each_lock_once() {
    let engines = auto_mesh(2);
    let recorder = Arc::new(Recorder::default());

    let handles: Vec<_> = engines
        .iter()
        .cloned()
        .map(|engine| {
            let recorder = recorder.clone();
            tokio::spawn(async move { engine.lock(20, recorder.as_ref()).await })
        })
        .collect();

    for handle in handles {
        timeout(DEADLINE, handle)
            .await
            .expect("every peer should get the lock")
            .unwrap();
    }

    let mut entries = recorder.entries();
    entries.sort_unstable();
    assert_eq!(entries, vec![0, 1]);
    assert!(!recorder.overlapped());

    for engine in &engines {
        assert!(engine.queue().is_empty().await);
        assert_eq!(engine.state().await, CycleState::Idle);
    }
}

#[tokio::test]
async fn many_peers_many_cycles_never_overlap() {
    const PEERS: usize = 5;
    const CYCLES: usize = 3;

    let engines = auto_mesh(PEERS);
    let recorder = Arc::new(Recorder::default());

    let handles: Vec<_> = engines
        .iter()
        .cloned()
        .map(|engine| {
            let recorder = recorder.clone();
            tokio::spawn(async move {
                let mut clocks = Vec::new();
                for _ in 0..CYCLES {
                    engine.lock(2, recorder.as_ref()).await;
                    clocks.push(engine.clock().now().await);
                }
                clocks
            })
        })
        .collect();

    for handle in handles {
        let clocks = timeout(DEADLINE, handle)
            .await
            .expect("every cycle should complete")
            .unwrap();
        assert!(clocks.windows(2).all(|w| w[0] <= w[1]));
    }

    let entries = recorder.entries();
    assert_eq!(entries.len(), PEERS * CYCLES);
    for peer in 0..PEERS {
        assert_eq!(entries.iter().filter(|entry| **entry == peer).count(), CYCLES);
    }
    assert!(!recorder.overlapped());
}

#[tokio::test]
async fn equal_timestamps_go_to_the_lower_peer_id() {
    let mesh = ManualMesh::new(2);
    let (e0, e1) = (&mesh.engines[0], &mesh.engines[1]);

    let r1 = e1.request().await;
    let r0 = e0.request().await;
    assert_eq!(r0.timestamp, r1.timestamp);
    mesh.pump().await;

    for engine in &mesh.engines {
        assert_eq!(engine.queue().snapshot().await, vec![r0, r1]);
    }
    assert!(e0.is_granted(r0).await);
    assert!(!e1.is_granted(r1).await);

    e0.wait_for_grant(r0).await;
    e0.release(r0).await;
    mesh.pump().await;

    assert!(e1.is_granted(r1).await);
    assert_eq!(e1.queue().snapshot().await, vec![r1]);
}

#[tokio::test]
async fn grant_follows_logical_order_not_peer_id() {
    let mesh = ManualMesh::new(3);
    let (e0, e2) = (&mesh.engines[0], &mesh.engines[2]);

    let early = e2.request().await;
    mesh.pump().await;
    let late = e0.request().await;
    mesh.pump().await;

    assert!(late.timestamp > early.timestamp);
    for engine in &mesh.engines {
        assert_eq!(engine.queue().head().await, Some(early));
    }
    assert!(e2.is_granted(early).await);
    assert!(!e0.is_granted(late).await);

    e2.release(early).await;
    mesh.pump().await;
    assert!(e0.is_granted(late).await);
}

#[tokio::test]
async fn wait_unblocks_on_release_not_on_request() {
    let mesh = ManualMesh::new(2);
    let (e0, e1) = (mesh.engines[0].clone(), mesh.engines[1].clone());

    let r0 = e0.request().await;
    mesh.pump().await;
    timeout(DEADLINE, e0.wait_for_grant(r0)).await.unwrap();
    e0.release(r0).await;
    mesh.pump().await;

    let since = e0.releases().snapshot(1).await;
    let waiter = {
        let e0 = e0.clone();
        tokio::spawn(async move { e0.wait_for_release_since(1, since).await })
    };

    let r1 = e1.request().await;
    mesh.pump().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished(), "a request alone must not release the waiter");
    assert_eq!(e0.queue().head().await, Some(r1));

    timeout(DEADLINE, e1.wait_for_grant(r1)).await.unwrap();
    e1.release(r1).await;
    mesh.pump().await;

    timeout(DEADLINE, waiter)
        .await
        .expect("the release should wake the waiter")
        .unwrap();
}

#[tokio::test]
async fn wait_after_the_only_release_blocks() {
    let mesh = ManualMesh::new(2);
    let (e0, e1) = (&mesh.engines[0], &mesh.engines[1]);

    let r1 = e1.request().await;
    mesh.pump().await;
    e1.wait_for_grant(r1).await;
    e1.release(r1).await;
    mesh.pump().await;

    let blocked = timeout(Duration::from_millis(100), e0.wait_for_release(1)).await;
    assert!(blocked.is_err());
}

#[tokio::test]
async fn lost_request_delays_but_never_grants() {
    let mesh = ManualMesh::new(2);
    let (e0, e1) = (&mesh.engines[0], &mesh.engines[1]);

    let r0 = e0.request().await;
    assert_eq!(mesh.lose_all(), 1);

    assert!(e1.queue().is_empty().await);
    assert!(!e0.is_granted(r0).await);
    assert!(timeout(Duration::from_millis(50), e0.wait_for_grant(r0))
        .await
        .is_err());
    assert_eq!(e0.state().await, CycleState::WaitingForGrant);
}

#[tokio::test]
async fn stale_release_is_harmless() {
    let mesh = ManualMesh::new(2);
    let (e0, e1) = (&mesh.engines[0], &mesh.engines[1]);

    let r0 = e0.request().await;
    mesh.pump().await;
    e1.handle(lamport_lock::message::Message::Release {
        timestamp: 1,
        released: RequestRecord::new(99, 0),
    })
    .await;

    assert_eq!(e1.queue().snapshot().await, vec![r0]);
    assert!(e0.is_granted(r0).await);
}
