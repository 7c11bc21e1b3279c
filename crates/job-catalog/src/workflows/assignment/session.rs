use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::domain::{AssignmentPreview, MatchCriteria};
use super::matcher::{EligibilityMatcher, PreviewPlan};
use super::query::EligibilityQuery;
use crate::workflows::roster::RosterSnapshot;

/// What a form observes: the latest preview for the current generation, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewState {
    pub generation: u64,
    pub checking: bool,
    pub preview: Option<AssignmentPreview>,
}

struct SessionShared {
    generation: AtomicU64,
    state: watch::Sender<PreviewState>,
}

impl SessionShared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    fn mark_checking(&self, generation: u64) -> bool {
        self.state.send_if_modified(|state| {
            if state.generation == generation && self.is_current(generation) {
                state.checking = true;
                true
            } else {
                false
            }
        })
    }

    fn publish(&self, generation: u64, preview: AssignmentPreview) -> bool {
        self.state.send_if_modified(|state| {
            if state.generation == generation && self.is_current(generation) {
                state.checking = false;
                state.preview = Some(preview);
                true
            } else {
                false
            }
        })
    }
}

/// Per-form preview driver: debounced, cancellable, and last-request-wins.
///
/// Every trigger bumps a generation counter; a result is only published if its
/// generation is still the latest when it completes.
pub struct PreviewSession<Q: ?Sized> {
    matcher: Arc<EligibilityMatcher<Q>>,
    debounce: Duration,
    shared: Arc<SessionShared>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<Q> PreviewSession<Q>
where
    Q: EligibilityQuery + ?Sized + 'static,
{
    pub fn new(matcher: Arc<EligibilityMatcher<Q>>) -> Self {
        let debounce = matcher.config().debounce;
        Self::with_debounce(matcher, debounce)
    }

    pub fn with_debounce(matcher: Arc<EligibilityMatcher<Q>>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(PreviewState::default());
        Self {
            matcher,
            debounce,
            shared: Arc::new(SessionShared {
                generation: AtomicU64::new(0),
                state,
            }),
            pending: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PreviewState> {
        self.shared.state.subscribe()
    }

    pub fn current(&self) -> PreviewState {
        self.shared.state.borrow().clone()
    }

    /// Invalidates the visible preview and recomputes after the quiet period.
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, criteria: MatchCriteria, roster: Arc<RosterSnapshot>) -> u64 {
        // Held until the new handle is stored so concurrent triggers cannot orphan a task.
        let mut pending = self.lock_pending();
        let generation = self.begin(&mut pending);
        let matcher = self.matcher.clone();
        let shared = self.shared.clone();
        let debounce = self.debounce;

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            run_generation(&matcher, &shared, generation, &criteria, &roster).await;
        }));
        generation
    }

    /// Recomputes immediately. Returns `None` when a newer trigger superseded this one.
    pub async fn refresh(
        &self,
        criteria: &MatchCriteria,
        roster: &RosterSnapshot,
    ) -> Option<AssignmentPreview> {
        let generation = {
            let mut pending = self.lock_pending();
            self.begin(&mut pending)
        };
        run_generation(&self.matcher, &self.shared, generation, criteria, roster).await
    }

    /// Discards the preview and any in-flight work (form closed or submitted).
    pub fn close(&self) {
        let mut pending = self.lock_pending();
        self.begin(&mut pending);
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, pending: &mut Option<JoinHandle<()>>) -> u64 {
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.shared.state.send_modify(|state| {
            state.generation = generation;
            state.checking = false;
            state.preview = None;
        });
        generation
    }
}

impl<Q: ?Sized> Drop for PreviewSession<Q> {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

async fn run_generation<Q>(
    matcher: &EligibilityMatcher<Q>,
    shared: &SessionShared,
    generation: u64,
    criteria: &MatchCriteria,
    roster: &RosterSnapshot,
) -> Option<AssignmentPreview>
where
    Q: EligibilityQuery + ?Sized,
{
    let preview = match matcher.plan(criteria, roster) {
        PreviewPlan::Settled(preview) => preview,
        PreviewPlan::Query(request) => {
            if !shared.mark_checking(generation) {
                debug!(generation, "preview superseded before query");
                return None;
            }
            matcher.execute(request).await
        }
    };

    if shared.publish(generation, preview.clone()) {
        Some(preview)
    } else {
        debug!(generation, "discarding superseded preview result");
        None
    }
}
