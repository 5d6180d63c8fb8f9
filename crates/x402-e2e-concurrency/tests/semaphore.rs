//! Invariant 6 (spec.md §8): at any time the number of combos whose
//! execute-body has started but not returned is ≤ the configured
//! concurrency. Exercised here against the semaphore directly, under
//! paused time so the waits are deterministic rather than wall-clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use x402_e2e_concurrency::Semaphore;

#[tokio::test]
async fn acquire_without_contention_succeeds_immediately() {
    let sem = Semaphore::new(2);
    let p1 = sem.acquire().await;
    assert_eq!(sem.available_permits(), 1);
    let p2 = sem.acquire().await;
    assert_eq!(sem.available_permits(), 0);
    drop(p1);
    assert_eq!(sem.available_permits(), 1);
    drop(p2);
    assert_eq!(sem.available_permits(), 2);
}

#[tokio::test(start_paused = true)]
async fn release_wakes_exactly_one_waiter() {
    let sem = Semaphore::new(1);
    let permit = sem.acquire().await;

    let sem2 = Arc::clone(&sem);
    let woke = Arc::new(AtomicUsize::new(0));
    let woke2 = Arc::clone(&woke);
    let handle = tokio::spawn(async move {
        let _p = sem2.acquire().await;
        woke2.fetch_add(1, Ordering::SeqCst);
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(woke.load(Ordering::SeqCst), 0, "waiter must stay suspended");

    drop(permit);
    handle.await.unwrap();
    assert_eq!(woke.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn at_most_n_holders_at_any_time() {
    let sem = Semaphore::new(2);
    let concurrent = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let sem = Arc::clone(&sem);
        let concurrent = Arc::clone(&concurrent);
        let max_seen = Arc::clone(&max_seen);
        handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await;
            let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
            max_seen.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            concurrent.fetch_sub(1, Ordering::SeqCst);
        }));
    }
    for h in handles {
        h.await.unwrap();
    }
    assert!(max_seen.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn manual_release_then_drop_does_not_double_release() {
    let sem = Semaphore::new(1);
    let permit = sem.acquire().await;
    permit.release();
    assert_eq!(sem.available_permits(), 1);
}

/// Invariant 6 end to end: with `concurrency = N`, a burst of tasks never
/// shows more than `N` permits held simultaneously, recorded independently
/// of the bound used to construct the semaphore.
#[tokio::test(start_paused = true)]
async fn bounded_concurrency_holds_across_a_larger_burst() {
    const CONCURRENCY: usize = 3;
    let sem = Semaphore::new(CONCURRENCY);
    let concurrent = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let sem = Arc::clone(&sem);
        let concurrent = Arc::clone(&concurrent);
        let max_seen = Arc::clone(&max_seen);
        handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await;
            let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
            max_seen.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            concurrent.fetch_sub(1, Ordering::SeqCst);
        }));
    }
    for h in handles {
        h.await.unwrap();
    }
    assert!(max_seen.load(Ordering::SeqCst) <= CONCURRENCY);
}
