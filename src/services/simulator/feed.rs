//! Snapshot publication and the tick loop.

use super::MarketSimulator;
use crate::types::MarketSnapshot;
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Broadcast channel capacity. Slow receivers skip ahead.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Source of "now" for the tick loop.
pub trait Clock: Send + Sync {
    /// Current time as a Unix timestamp in milliseconds.
    fn now_ms(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    pub fn advance(&self, by_ms: i64) -> i64 {
        self.now.fetch_add(by_ms, Ordering::SeqCst) + by_ms
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Event pushed to feed subscribers.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// A new snapshot was published.
    Tick(Arc<MarketSnapshot>),
    /// Ticking was paused or resumed.
    Status { running: bool, tick: u64 },
}

/// Shared, read-mostly view of the simulation.
///
/// Exactly one task writes (the tick loop); readers clone the current
/// `Arc<MarketSnapshot>` and never see a half-updated batch.
pub struct MarketFeed {
    current: RwLock<Arc<MarketSnapshot>>,
    running: AtomicBool,
    tx: broadcast::Sender<FeedEvent>,
}

impl MarketFeed {
    /// Create a running feed that starts at `initial`.
    pub fn new(initial: Arc<MarketSnapshot>) -> Arc<Self> {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            current: RwLock::new(initial),
            running: AtomicBool::new(true),
            tx,
        })
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<MarketSnapshot> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the current snapshot and notify subscribers.
    pub fn publish(&self, snapshot: Arc<MarketSnapshot>) {
        {
            let mut current = self
                .current
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *current = snapshot.clone();
        }
        // No receivers is fine.
        let _ = self.tx.send(FeedEvent::Tick(snapshot));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop ticking. Returns false if already paused.
    pub fn pause(&self) -> bool {
        self.set_running(false)
    }

    /// Resume ticking from the current state. Returns false if already running.
    pub fn resume(&self) -> bool {
        self.set_running(true)
    }

    fn set_running(&self, running: bool) -> bool {
        let changed = self.running.swap(running, Ordering::SeqCst) != running;
        if changed {
            let tick = self.snapshot().tick;
            info!("Simulation {} at tick {}", if running { "resumed" } else { "paused" }, tick);
            let _ = self.tx.send(FeedEvent::Status { running, tick });
        }
        changed
    }

    /// Run one tick if the feed is running. Returns the published snapshot.
    pub fn step<R: Rng>(
        &self,
        simulator: &mut MarketSimulator<R>,
        clock: &dyn Clock,
    ) -> Option<Arc<MarketSnapshot>> {
        if !self.is_running() {
            return None;
        }
        let snapshot = simulator.tick(clock.now_ms());
        self.publish(snapshot.clone());
        Some(snapshot)
    }

    /// Spawn the periodic tick loop. The loop owns the simulator.
    pub fn spawn<R>(
        self: &Arc<Self>,
        mut simulator: MarketSimulator<R>,
        clock: Arc<dyn Clock>,
        period: Duration,
    ) -> JoinHandle<()>
    where
        R: Rng + Send + 'static,
    {
        let feed = self.clone();
        info!("Starting market simulation ({}ms tick)", period.as_millis());

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick completes immediately; skip it so the
            // seeded state is visible for one full period.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Some(snapshot) = feed.step(&mut simulator, clock.as_ref()) {
                    if snapshot.tick % 120 == 0 {
                        debug!("Simulation tick {} ({} pairs)", snapshot.tick, snapshot.pairs.len());
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::types::{PairSeed, SeedOrigin};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup() -> (Arc<MarketFeed>, MarketSimulator<StdRng>) {
        let simulator = MarketSimulator::new(
            &[PairSeed::new("EUR/USD OTC", 1.0542)],
            SeedOrigin::Fallback,
            &SimulatorConfig::default(),
            0,
            StdRng::seed_from_u64(1),
        );
        let feed = MarketFeed::new(simulator.snapshot());
        (feed, simulator)
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1000);
        assert_eq!(clock.now_ms(), 1000);
        assert_eq!(clock.advance(500), 1500);
        clock.set(42);
        assert_eq!(clock.now_ms(), 42);
    }

    #[test]
    fn test_step_publishes_snapshot() {
        let (feed, mut sim) = setup();
        let clock = ManualClock::new(500);
        let snapshot = feed.step(&mut sim, &clock).unwrap();
        assert_eq!(snapshot.tick, 1);
        assert_eq!(feed.snapshot().tick, 1);
        assert_eq!(feed.snapshot().timestamp, 500);
    }

    #[test]
    fn test_paused_feed_does_not_tick_or_reset() {
        let (feed, mut sim) = setup();
        let clock = ManualClock::new(500);
        feed.step(&mut sim, &clock);

        assert!(feed.pause());
        assert!(!feed.pause());
        assert!(feed.step(&mut sim, &clock).is_none());
        assert_eq!(feed.snapshot().tick, 1);

        assert!(feed.resume());
        clock.advance(500);
        assert_eq!(feed.step(&mut sim, &clock).unwrap().tick, 2);
    }

    #[tokio::test]
    async fn test_subscribers_receive_ticks_and_status() {
        let (feed, mut sim) = setup();
        let mut rx = feed.subscribe();
        let clock = ManualClock::new(500);

        feed.step(&mut sim, &clock);
        feed.pause();

        match rx.recv().await.unwrap() {
            FeedEvent::Tick(snapshot) => assert_eq!(snapshot.tick, 1),
            other => panic!("unexpected event: {:?}", other),
        }
        match rx.recv().await.unwrap() {
            FeedEvent::Status { running, tick } => {
                assert!(!running);
                assert_eq!(tick, 1);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_spawned_loop_ticks_on_interval() {
        let (feed, sim) = setup();
        let mut rx = feed.subscribe();
        let handle = feed.spawn(sim, Arc::new(SystemClock), Duration::from_millis(20));

        match rx.recv().await.unwrap() {
            FeedEvent::Tick(snapshot) => assert_eq!(snapshot.tick, 1),
            other => panic!("unexpected event: {:?}", other),
        }
        handle.abort();
    }
}
