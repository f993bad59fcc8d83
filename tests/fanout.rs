//! Fan-out bus behavior: lossless per-subscriber FIFO delivery,
//! self-unsubscribe from a handler, drain-then-shutdown, and the
//! registration lifecycle around `shutdown()`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};

use topicbus::{Bus, FanoutBus, Message, Subscriber, SubscriberFn, SubscriptionHandle};

async fn wait_until(what: &str, cond: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        sleep(Duration::from_millis(2)).await;
    }
}

/// Grace period for verifying that something does *not* happen.
async fn settle() {
    sleep(Duration::from_millis(50)).await;
}

fn counting(name: &'static str, counter: Arc<AtomicUsize>) -> Arc<dyn Subscriber> {
    SubscriberFn::arc(name, move |_m: &Message, _h: &SubscriptionHandle| {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

#[tokio::test]
async fn hundred_subscribers_each_see_hundred_messages() {
    let bus = FanoutBus::new();
    let total = Arc::new(AtomicUsize::new(0));
    let mut counters = Vec::new();

    for _ in 0..100 {
        let per_sub = Arc::new(AtomicUsize::new(0));
        counters.push(Arc::clone(&per_sub));
        let total = Arc::clone(&total);
        let sub = SubscriberFn::arc("counter", move |_m: &Message, _h: &SubscriptionHandle| {
            per_sub.fetch_add(1, Ordering::SeqCst);
            total.fetch_add(1, Ordering::SeqCst);
        });
        bus.subscribe("hello", sub).await;
    }
    assert_eq!(bus.subscriber_count(), 100);

    for _ in 0..100 {
        bus.publish(Message::new("hello", b"world".as_slice())).await;
    }

    wait_until("10_000 total deliveries", || {
        total.load(Ordering::SeqCst) == 10_000
    })
    .await;
    for c in &counters {
        assert_eq!(c.load(Ordering::SeqCst), 100);
    }
    bus.shutdown().await;
}

#[tokio::test]
async fn handler_unsubscribes_itself_after_fifth_message() {
    let bus = FanoutBus::new();
    let seen = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&seen);
    let sub = SubscriberFn::arc("five-then-out", move |_m: &Message, h: &SubscriptionHandle| {
        if counter.fetch_add(1, Ordering::SeqCst) + 1 == 5 {
            h.unsubscribe();
        }
    });
    bus.subscribe("hello", sub).await;

    for _ in 0..10 {
        bus.publish(Message::new("hello", b"x".as_slice())).await;
    }

    wait_until("five deliveries", || seen.load(Ordering::SeqCst) >= 5).await;
    settle().await;
    assert_eq!(seen.load(Ordering::SeqCst), 5);
    bus.shutdown().await;
}

#[tokio::test]
async fn delivery_preserves_publish_order() {
    let bus = FanoutBus::new();
    let seen: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    let sub = SubscriberFn::arc("ordered", move |m: &Message, _h: &SubscriptionHandle| {
        sink.lock().unwrap().push(m.body[0]);
    });
    bus.subscribe("seq", sub).await;

    for i in 0..50u8 {
        bus.publish(Message::new("seq", vec![i])).await;
    }

    wait_until("50 deliveries", || seen.lock().unwrap().len() == 50).await;
    let got = seen.lock().unwrap().clone();
    let expected: Vec<u8> = (0..50).collect();
    assert_eq!(got, expected);
    bus.shutdown().await;
}

#[tokio::test]
async fn wildcard_pattern_filters_topics() {
    let bus = FanoutBus::new();
    let notes = Arc::new(AtomicUsize::new(0));
    let wrong = Arc::new(AtomicBool::new(false));

    let notes_c = Arc::clone(&notes);
    let wrong_c = Arc::clone(&wrong);
    let sub = SubscriberFn::arc("notes-only", move |m: &Message, _h: &SubscriptionHandle| {
        if m.topic.starts_with("note.") {
            notes_c.fetch_add(1, Ordering::SeqCst);
        } else {
            wrong_c.store(true, Ordering::SeqCst);
        }
    });
    bus.subscribe("note.*", sub).await;

    for _ in 0..5 {
        bus.publish(Message::new("note.1", b"n".as_slice())).await;
        bus.publish(Message::new("thing.1", b"t".as_slice())).await;
    }

    wait_until("five note deliveries", || notes.load(Ordering::SeqCst) == 5).await;
    settle().await;
    assert_eq!(notes.load(Ordering::SeqCst), 5);
    assert!(!wrong.load(Ordering::SeqCst), "received a non-matching topic");
    bus.shutdown().await;
}

#[tokio::test]
async fn unsubscribe_stops_delivery_and_is_idempotent() {
    let bus = FanoutBus::new();
    let seen = Arc::new(AtomicUsize::new(0));
    let handle = bus.subscribe("hello", counting("c", Arc::clone(&seen))).await;

    for _ in 0..3 {
        bus.publish(Message::new("hello", b"x".as_slice())).await;
    }
    wait_until("three deliveries", || seen.load(Ordering::SeqCst) == 3).await;

    handle.unsubscribe();
    handle.unsubscribe();
    assert!(!handle.is_active());
    assert_eq!(bus.subscriber_count(), 0);

    for _ in 0..3 {
        bus.publish(Message::new("hello", b"x".as_slice())).await;
    }
    settle().await;
    assert_eq!(seen.load(Ordering::SeqCst), 3);
    bus.shutdown().await;
}

/// A deliberately slow consumer: sleeps inside the handler so messages pile
/// up in its queue.
struct SlowCollector {
    seen: Arc<AtomicUsize>,
    shutdowns: Arc<AtomicUsize>,
}

#[async_trait]
impl Subscriber for SlowCollector {
    async fn on_message(&self, _msg: &Message, _handle: &SubscriptionHandle) {
        sleep(Duration::from_millis(2)).await;
        self.seen.fetch_add(1, Ordering::SeqCst);
    }

    async fn on_shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "slow-collector"
    }
}

#[tokio::test]
async fn shutdown_drains_buffered_messages_then_fires_on_shutdown() {
    let bus = FanoutBus::new();
    let seen = Arc::new(AtomicUsize::new(0));
    let shutdowns = Arc::new(AtomicUsize::new(0));
    bus.subscribe(
        "hello",
        Arc::new(SlowCollector {
            seen: Arc::clone(&seen),
            shutdowns: Arc::clone(&shutdowns),
        }),
    )
    .await;

    for _ in 0..10 {
        bus.publish(Message::new("hello", b"x".as_slice())).await;
    }
    // All ten are enqueued; the slow worker has barely started.
    bus.shutdown().await;

    wait_until("on_shutdown", || shutdowns.load(Ordering::SeqCst) == 1).await;
    assert_eq!(seen.load(Ordering::SeqCst), 10, "queue must drain before shutdown");
}

#[tokio::test]
async fn one_slow_subscriber_does_not_delay_a_fast_one() {
    let bus = FanoutBus::new();
    let slow_seen = Arc::new(AtomicUsize::new(0));
    let fast_seen = Arc::new(AtomicUsize::new(0));

    bus.subscribe(
        "hello",
        Arc::new(SlowCollector {
            seen: Arc::clone(&slow_seen),
            shutdowns: Arc::new(AtomicUsize::new(0)),
        }),
    )
    .await;
    bus.subscribe("hello", counting("fast", Arc::clone(&fast_seen))).await;

    for _ in 0..20 {
        bus.publish(Message::new("hello", b"x".as_slice())).await;
    }

    // The fast subscriber finishes while the slow one is still working
    // through its private queue.
    wait_until("fast subscriber done", || {
        fast_seen.load(Ordering::SeqCst) == 20
    })
    .await;
    assert!(slow_seen.load(Ordering::SeqCst) < 20);

    // The slow one still gets everything eventually (lossless).
    wait_until("slow subscriber done", || {
        slow_seen.load(Ordering::SeqCst) == 20
    })
    .await;
    bus.shutdown().await;
}

#[tokio::test]
async fn shutdown_fires_on_shutdown_exactly_once_and_nothing_after() {
    let bus = FanoutBus::new();
    let shutdowns = Arc::new(AtomicUsize::new(0));
    let late_message = Arc::new(AtomicBool::new(false));

    let shut = Arc::clone(&shutdowns);
    let late = Arc::clone(&late_message);
    let shut2 = Arc::clone(&shutdowns);
    let sub = SubscriberFn::new("lifecycle", move |_m: &Message, _h: &SubscriptionHandle| {
        if shut.load(Ordering::SeqCst) > 0 {
            late.store(true, Ordering::SeqCst);
        }
    })
    .with_shutdown(move || {
        shut2.fetch_add(1, Ordering::SeqCst);
    })
    .into_arc();
    bus.subscribe("hello", sub).await;

    bus.publish(Message::new("hello", b"x".as_slice())).await;
    bus.shutdown().await;

    wait_until("on_shutdown", || shutdowns.load(Ordering::SeqCst) == 1).await;

    // Publish after shutdown is a silent no-op.
    bus.publish(Message::new("hello", b"x".as_slice())).await;
    settle().await;
    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    assert!(!late_message.load(Ordering::SeqCst), "on_message after on_shutdown");
}

#[tokio::test]
async fn subscribe_after_shutdown_terminates_immediately() {
    let bus = FanoutBus::new();
    bus.shutdown().await;

    let seen = Arc::new(AtomicUsize::new(0));
    let shutdowns = Arc::new(AtomicUsize::new(0));
    let shut = Arc::clone(&shutdowns);
    let seen_c = Arc::clone(&seen);
    let sub = SubscriberFn::new("late", move |_m: &Message, _h: &SubscriptionHandle| {
        seen_c.fetch_add(1, Ordering::SeqCst);
    })
    .with_shutdown(move || {
        shut.fetch_add(1, Ordering::SeqCst);
    })
    .into_arc();

    bus.subscribe("hello", sub).await;
    wait_until("immediate shutdown", || shutdowns.load(Ordering::SeqCst) == 1).await;

    bus.publish(Message::new("hello", b"x".as_slice())).await;
    settle().await;
    assert_eq!(seen.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn publish_with_no_subscribers_is_a_silent_noop() {
    let bus = FanoutBus::new();
    for _ in 0..1000 {
        bus.publish(Message::new("hello", b"world".as_slice())).await;
    }
    bus.shutdown().await;
}

#[tokio::test]
async fn panicking_handler_does_not_kill_its_subscription() {
    let bus = FanoutBus::new();
    let seen = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&seen);
    let sub = SubscriberFn::arc("flaky", move |m: &Message, _h: &SubscriptionHandle| {
        if m.body.as_ref() == b"boom" {
            panic!("handler exploded");
        }
        counter.fetch_add(1, Ordering::SeqCst);
    });
    bus.subscribe("hello", sub).await;

    bus.publish(Message::new("hello", b"ok".as_slice())).await;
    bus.publish(Message::new("hello", b"boom".as_slice())).await;
    bus.publish(Message::new("hello", b"ok".as_slice())).await;

    wait_until("two surviving deliveries", || seen.load(Ordering::SeqCst) == 2).await;
    bus.shutdown().await;
}
