//! Tests for the expiration scheduler.

use plebiscite_interface::MessageId;
use plebiscite_vote::ExpirationScheduler;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn counting(counter: &Arc<AtomicUsize>) -> impl FnOnce() -> std::future::Ready<()> + Send + 'static {
    let counter = Arc::clone(counter);
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
        std::future::ready(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_timer_fires_after_delay_and_clears_entry() {
    let scheduler = ExpirationScheduler::new();
    let fired = Arc::new(AtomicUsize::new(0));

    scheduler.schedule(MessageId(1), Duration::from_secs(300), counting(&fired));
    assert!(scheduler.is_scheduled(MessageId(1)));

    tokio::time::sleep(Duration::from_secs(299)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(scheduler.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_timer_never_fires() {
    let scheduler = ExpirationScheduler::new();
    let fired = Arc::new(AtomicUsize::new(0));

    scheduler.schedule(MessageId(1), Duration::from_secs(10), counting(&fired));
    assert!(scheduler.cancel(MessageId(1)));
    assert!(!scheduler.cancel(MessageId(1)));

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_rescheduling_replaces_previous_timer() {
    let scheduler = ExpirationScheduler::new();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    scheduler.schedule(MessageId(1), Duration::from_secs(10), counting(&first));
    scheduler.schedule(MessageId(1), Duration::from_secs(30), counting(&second));
    assert_eq!(scheduler.len(), 1);

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert!(scheduler.is_scheduled(MessageId(1)));

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(second.load(Ordering::SeqCst), 1);
    assert!(scheduler.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_aborts_everything() {
    let scheduler = ExpirationScheduler::new();
    let fired = Arc::new(AtomicUsize::new(0));

    for id in 1..=3 {
        scheduler.schedule(MessageId(id), Duration::from_secs(id * 10), counting(&fired));
    }
    let mut scheduled = scheduler.scheduled();
    scheduled.sort();
    assert_eq!(scheduled, vec![MessageId(1), MessageId(2), MessageId(3)]);

    assert_eq!(scheduler.shutdown(), 3);
    assert!(scheduler.is_empty());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}
