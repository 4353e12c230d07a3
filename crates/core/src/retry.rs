//! Bounded retry with a fixed interval, a total deadline and cancellation.
//!
//! [`poll_until`] repeats a probe until it yields a value, the deadline
//! passes, or its [`Cancellation`] fires. It knows nothing about what is
//! being probed: the anchor scroller uses it to wait for an element to be
//! rendered, the CLI uses it to wait for a deep link target to appear.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};

/// Timing of a polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Gap between attempts.
    pub interval: Duration,
    /// Total time budget, measured from the call to [`poll_until`].
    pub deadline: Duration,
    /// Probe at once, or wait one interval before the first attempt.
    pub probe_immediately: bool,
}

impl PollPolicy {
    /// 100 ms polling for at most 2 s, used for fragment scrolling.
    pub const ANCHOR_SCROLL: Self = Self {
        interval: Duration::from_millis(100),
        deadline: Duration::from_millis(2000),
        probe_immediately: true,
    };

    /// Same timing, but skip the attempt at time zero because the caller has
    /// already made it.
    #[must_use]
    pub const fn after_first_attempt(self) -> Self {
        Self {
            probe_immediately: false,
            ..self
        }
    }
}

/// How a polling loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The probe produced a value.
    Ready { value: T, attempts: u32 },
    /// The deadline passed without a value.
    TimedOut { attempts: u32 },
    /// The loop was cancelled.
    Cancelled { attempts: u32 },
}

impl<T> PollOutcome<T> {
    /// Number of times the probe ran.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Ready { attempts, .. } | Self::TimedOut { attempts } | Self::Cancelled { attempts } => {
                *attempts
            }
        }
    }

    /// The produced value, if any.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Ready { value, .. } => Some(value),
            Self::TimedOut { .. } | Self::Cancelled { .. } => None,
        }
    }
}

/// Create a linked cancel handle and token.
#[must_use]
pub fn cancellation() -> (CancelHandle, Cancellation) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, Cancellation { rx })
}

/// Owner side of a cancellation. Dropping it cancels as well.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal every linked [`Cancellation`].
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observer side of a cancellation.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    /// Whether cancellation has been requested or the handle is gone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolve once cancellation has been requested.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Run `probe` on a fixed schedule until it returns `Some`.
///
/// Attempts happen at `0, interval, 2 * interval, ...` (without the first
/// one when [`PollPolicy::probe_immediately`] is unset) as long as they fall
/// within `deadline`. A probe that overruns its slot moves the next attempt
/// to the first slot still ahead, so attempts never start closer together
/// than `interval` and no attempt starts after the deadline.
pub async fn poll_until<T, F, Fut>(
    mut probe: F,
    policy: PollPolicy,
    cancel: &Cancellation,
) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let start = Instant::now();
    let deadline = start + policy.deadline;
    let mut cancel = cancel.clone();
    let mut attempts: u32 = 0;
    let mut slot: u32 = u32::from(!policy.probe_immediately);

    loop {
        let at = start + policy.interval * slot;
        if at > deadline || Instant::now() > deadline {
            return PollOutcome::TimedOut { attempts };
        }
        if at > Instant::now() {
            tokio::select! {
                () = cancel.cancelled() => return PollOutcome::Cancelled { attempts },
                () = sleep_until(at) => {}
            }
        }
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled { attempts };
        }

        attempts += 1;
        if let Some(value) = probe().await {
            return PollOutcome::Ready { value, attempts };
        }
        slot = next_slot(slot, start.elapsed(), policy.interval);
    }
}

/// First slot after `slot` that has not started yet at `elapsed`.
fn next_slot(slot: u32, elapsed: Duration, interval: Duration) -> u32 {
    let step = interval.as_nanos().max(1);
    let passed = u32::try_from(elapsed.as_nanos() / step).unwrap_or(u32::MAX);
    passed.saturating_add(1).max(slot.saturating_add(1))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    fn ready_on(attempt: u32, counter: &Cell<u32>) -> impl Future<Output = Option<u32>> + use<> {
        counter.set(counter.get() + 1);
        let n = counter.get();
        async move { (n >= attempt).then_some(n) }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_first_attempt_does_not_wait() {
        let (_handle, cancel) = cancellation();
        let counter = Cell::new(0);
        let start = Instant::now();

        let outcome = poll_until(|| ready_on(1, &counter), PollPolicy::ANCHOR_SCROLL, &cancel).await;

        assert_eq!(outcome, PollOutcome::Ready { value: 1, attempts: 1 });
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_after_some_intervals() {
        let (_handle, cancel) = cancellation();
        let counter = Cell::new(0);
        let start = Instant::now();

        let outcome = poll_until(|| ready_on(5, &counter), PollPolicy::ANCHOR_SCROLL, &cancel).await;

        assert_eq!(outcome.attempts(), 5);
        assert_eq!(start.elapsed(), Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_at_deadline() {
        let (_handle, cancel) = cancellation();
        let counter = Cell::new(0);
        let start = Instant::now();

        let outcome = poll_until(|| ready_on(u32::MAX, &counter), PollPolicy::ANCHOR_SCROLL, &cancel).await;

        // Attempts at 0, 100, ..., 2000 ms.
        assert_eq!(outcome, PollOutcome::TimedOut { attempts: 21 });
        assert_eq!(start.elapsed(), Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_first_attempt() {
        let (_handle, cancel) = cancellation();
        let counter = Cell::new(0);
        let start = Instant::now();
        let policy = PollPolicy::ANCHOR_SCROLL.after_first_attempt();

        let outcome = poll_until(|| ready_on(u32::MAX, &counter), policy, &cancel).await;

        assert_eq!(outcome.attempts(), 20);
        assert_eq!(start.elapsed(), Duration::from_millis(2000));

        let counter = Cell::new(0);
        let start = Instant::now();
        let outcome = poll_until(|| ready_on(1, &counter), policy, &cancel).await;
        assert_eq!(outcome.into_value(), Some(1));
        assert_eq!(start.elapsed(), Duration::from_millis(100));
    }

    /// Probe that records when each attempt starts and takes `busy` to fail.
    fn slow_probe(
        busy: Duration,
        start: Instant,
        starts: &RefCell<Vec<Duration>>,
    ) -> impl Future<Output = Option<()>> + use<> {
        starts.borrow_mut().push(start.elapsed());
        async move {
            tokio::time::sleep(busy).await;
            None
        }
    }

    fn assert_spaced(starts: &[Duration], interval: Duration) {
        for pair in starts.windows(2) {
            assert!(
                pair[1] - pair[0] >= interval,
                "attempts at {:?} and {:?} are closer than {interval:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_probe_stops_at_deadline() {
        let (_handle, cancel) = cancellation();
        let starts = RefCell::new(Vec::new());
        let busy = Duration::from_millis(550);
        let policy = PollPolicy::ANCHOR_SCROLL;
        let start = Instant::now();

        let outcome = poll_until(|| slow_probe(busy, start, &starts), policy, &cancel).await;

        // Attempts at 0, 600, 1200 and 1800 ms; the next free slot is past 2000 ms.
        assert_eq!(outcome, PollOutcome::TimedOut { attempts: 4 });
        assert!(start.elapsed() <= policy.deadline + busy);
        assert_eq!(
            *starts.borrow(),
            [0, 600, 1200, 1800].map(Duration::from_millis).to_vec()
        );
        assert_spaced(&starts.borrow(), policy.interval);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_shorter_than_interval_keeps_schedule() {
        let (_handle, cancel) = cancellation();
        let starts = RefCell::new(Vec::new());
        let busy = Duration::from_millis(30);
        let policy = PollPolicy::ANCHOR_SCROLL;
        let start = Instant::now();

        let outcome = poll_until(|| slow_probe(busy, start, &starts), policy, &cancel).await;

        assert_eq!(outcome, PollOutcome::TimedOut { attempts: 21 });
        assert!(start.elapsed() <= policy.deadline + busy);
        assert_eq!(starts.borrow().last(), Some(&policy.deadline));
        assert_spaced(&starts.borrow(), policy.interval);
    }

    #[test]
    fn test_next_slot_skips_missed_slots() {
        let interval = Duration::from_millis(100);
        assert_eq!(next_slot(3, Duration::from_millis(300), interval), 4);
        assert_eq!(next_slot(3, Duration::from_millis(330), interval), 4);
        assert_eq!(next_slot(0, Duration::from_millis(550), interval), 6);
        assert_eq!(next_slot(2, Duration::ZERO, Duration::ZERO), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_between_attempts() {
        let (handle, cancel) = cancellation();
        let counter = Cell::new(0);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            handle.cancel();
        });

        let outcome = poll_until(|| ready_on(u32::MAX, &counter), PollPolicy::ANCHOR_SCROLL, &cancel).await;

        // Attempts at 0, 100 and 200 ms, cancelled before 300 ms.
        assert_eq!(outcome, PollOutcome::Cancelled { attempts: 3 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels() {
        let (handle, cancel) = cancellation();
        drop(handle);
        assert!(cancel.is_cancelled());

        let counter = Cell::new(0);
        let outcome = poll_until(|| ready_on(1, &counter), PollPolicy::ANCHOR_SCROLL, &cancel).await;
        assert_eq!(outcome, PollOutcome::Cancelled { attempts: 0 });
    }
}
