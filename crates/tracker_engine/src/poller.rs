use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracker_logging::{tracker_debug, tracker_info};

use crate::badge::{recompute_badge, BadgeSurface};
use crate::{BackgroundMessage, BadgeTrigger, ItemStore, StoreEvent};

pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(180 * 60);
/// How often the persisted list is compared against what this process last saw.
pub const DEFAULT_CHANGE_CHECK: Duration = Duration::from_secs(2);

/// Periodic refresh signal plus badge upkeep.
///
/// Each tick broadcasts [`BackgroundMessage::RefreshAll`] to whoever is
/// listening and recomputes the badge from the store. The badge is also
/// recomputed at start, whenever the store reports a write, and whenever
/// the periodic change check finds the list was rewritten elsewhere.
pub struct Poller {
    store: Arc<ItemStore>,
    badge: Arc<dyn BadgeSurface>,
    signals: broadcast::Sender<BackgroundMessage>,
    period: Duration,
    change_check: Duration,
}

impl Poller {
    pub fn new(store: Arc<ItemStore>, badge: Arc<dyn BadgeSurface>, period: Duration) -> Self {
        let (signals, _) = broadcast::channel(8);
        Self {
            store,
            badge,
            signals,
            period: period.max(Duration::from_millis(1)),
            change_check: DEFAULT_CHANGE_CHECK,
        }
    }

    pub fn with_change_check(mut self, every: Duration) -> Self {
        self.change_check = every.max(Duration::from_millis(1));
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Listeners only see signals sent after they subscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<BackgroundMessage> {
        self.signals.subscribe()
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        // Subscribe before the first badge so no write slips between the two.
        let mut store_events = self.store.subscribe();

        let trigger = match self.store.has_data() {
            Ok(false) => BadgeTrigger::Installed,
            _ => BadgeTrigger::Startup,
        };
        tracker_info!(
            "Poller started ({:?}), period {:?}, store {}",
            trigger,
            self.period,
            self.store.describe()
        );
        self.refresh_badge(trigger);

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut change_check = interval(self.change_check);
        change_check.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.broadcast_refresh();
                    self.refresh_badge(BadgeTrigger::Tick);
                }
                _ = change_check.tick() => {
                    // A detected change comes back through `store_events`.
                    if let Err(err) = self.store.check_external() {
                        tracker_debug!("Change check on {} failed: {}", self.store.describe(), err);
                    }
                }
                event = store_events.recv() => match event {
                    Ok(StoreEvent::Changed | StoreEvent::ExternalChange)
                    | Err(RecvError::Lagged(_)) => {
                        self.refresh_badge(BadgeTrigger::StoreChanged);
                    }
                    Err(RecvError::Closed) => return,
                },
            }
        }
    }

    fn broadcast_refresh(&self) {
        match self.signals.send(BackgroundMessage::RefreshAll) {
            Ok(listeners) => tracker_debug!("Sent REFRESH_ALL to {} listener(s)", listeners),
            Err(_) => tracker_debug!("REFRESH_ALL sent with no listeners"),
        }
    }

    fn refresh_badge(&self, trigger: BadgeTrigger) {
        recompute_badge(&self.store, self.badge.as_ref(), trigger);
    }
}
