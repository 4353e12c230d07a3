//! Scroll to the element named by a location's fragment once it exists.
//!
//! Sections above the target may still be loading when a deep link lands, so
//! the element might not exist yet. [`DeferredAnchorScroll`] tries once right
//! away, then keeps trying on [`PollPolicy::ANCHOR_SCROLL`] timing and gives
//! up silently at the deadline. A newer navigation, or dropping the scroller,
//! cancels whatever is still pending so a stale target is never scrolled to.
//!
//! Nothing in the server or the CLI drives a scroller: the server never sees
//! fragments, and the CLI only needs the underlying [`poll_until`]. The type
//! is for client runtimes that own a [`Viewport`], and is exercised here by
//! the tests against a fake viewport.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::location::Location;
use crate::retry::{CancelHandle, PollOutcome, PollPolicy, cancellation, poll_until};

/// Scroll animation requested from the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// The rendered document as seen by the scroller.
pub trait Viewport: Send + Sync + 'static {
    /// Scroll the element with `element_id` into view.
    ///
    /// Returns `false`, without scrolling, when no such element exists.
    fn scroll_into_view(&self, element_id: &str, behavior: ScrollBehavior) -> bool;
}

/// What happened when a location was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorArrival {
    /// The location has no fragment.
    NoFragment,
    /// The target existed and was scrolled to.
    Scrolled,
    /// The target is missing; polling has started.
    Deferred,
}

struct Pending {
    _cancel: CancelHandle,
    task: JoinHandle<PollOutcome<()>>,
}

/// Fragment scroller bound to one viewport.
pub struct DeferredAnchorScroll<V> {
    viewport: Arc<V>,
    policy: PollPolicy,
    pending: Option<Pending>,
}

impl<V: Viewport> DeferredAnchorScroll<V> {
    /// Scroller with the standard 100 ms / 2 s timing.
    #[must_use]
    pub const fn new(viewport: Arc<V>) -> Self {
        Self::with_policy(viewport, PollPolicy::ANCHOR_SCROLL)
    }

    /// Scroller with custom timing.
    #[must_use]
    pub const fn with_policy(viewport: Arc<V>, policy: PollPolicy) -> Self {
        Self {
            viewport,
            policy,
            pending: None,
        }
    }

    /// Apply a newly arrived location.
    ///
    /// Cancels polling left over from the previous location first. When the
    /// target is missing the poll runs as a Tokio task, so this must be called
    /// from within a runtime.
    pub fn navigate(&mut self, location: &Location) -> AnchorArrival {
        self.cancel();

        let Some(element_id) = location.fragment() else {
            return AnchorArrival::NoFragment;
        };

        if self
            .viewport
            .scroll_into_view(element_id, ScrollBehavior::Smooth)
        {
            return AnchorArrival::Scrolled;
        }

        let (handle, cancel) = cancellation();
        let viewport = Arc::clone(&self.viewport);
        let element_id = element_id.to_string();
        let policy = self.policy.after_first_attempt();

        let task = tokio::spawn(async move {
            let outcome = poll_until(
                || {
                    let found = viewport.scroll_into_view(&element_id, ScrollBehavior::Smooth);
                    async move { found.then_some(()) }
                },
                policy,
                &cancel,
            )
            .await;

            match &outcome {
                PollOutcome::Ready { attempts, .. } => {
                    tracing::debug!(%element_id, attempts, "Scrolled to deferred anchor");
                }
                PollOutcome::TimedOut { attempts } => {
                    tracing::debug!(%element_id, attempts, "Anchor never appeared, giving up");
                }
                PollOutcome::Cancelled { .. } => {
                    tracing::trace!(%element_id, "Anchor poll cancelled");
                }
            }
            outcome
        });

        self.pending = Some(Pending {
            _cancel: handle,
            task,
        });
        AnchorArrival::Deferred
    }

    /// Cancel pending polling, if any.
    pub fn cancel(&mut self) {
        // Dropping the handle wakes the task and ends its loop.
        self.pending = None;
    }

    /// Whether a poll is still running.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.task.is_finished())
    }

    /// Wait for the pending poll to finish and return how it ended.
    pub async fn settle(&mut self) -> Option<PollOutcome<()>> {
        let pending = self.pending.as_mut()?;
        let outcome = (&mut pending.task).await.ok();
        self.pending = None;
        outcome
    }
}

impl<V> std::fmt::Debug for DeferredAnchorScroll<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredAnchorScroll")
            .field("policy", &self.policy)
            .field("pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}
