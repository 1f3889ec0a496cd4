use crate::effects::{EffectScheduler, EffectState, Millis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, sleep_until};
use tracing::{debug, info};

/// Identifies one open page. Issued when the page is rendered.
pub type ViewId = u64;

/// Wall-clock owner of the effect scheduler. While active, a driver task
/// fires scheduler deadlines as they come due.
#[derive(Clone)]
pub struct EffectView {
    inner: Arc<Mutex<ViewInner>>,
    wake: Arc<Notify>,
}

struct ViewInner {
    scheduler: EffectScheduler<StdRng>,
    epoch: Instant,
    driver: Option<JoinHandle<()>>,
}

impl ViewInner {
    fn now(&self) -> Millis {
        self.epoch.elapsed().as_millis() as Millis
    }

    fn catch_up(&mut self) {
        let now = self.now();
        for event in self.scheduler.advance(now) {
            debug!(?event, "effect");
        }
    }
}

impl Default for EffectView {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectView {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ViewInner {
                scheduler: EffectScheduler::new(StdRng::from_entropy()),
                epoch: Instant::now(),
                driver: None,
            })),
            wake: Arc::new(Notify::new()),
        }
    }

    pub async fn is_active(&self) -> bool {
        self.inner.lock().await.driver.is_some()
    }

    /// Starts the strobe loop and its driver. No-op if already active.
    pub async fn activate(&self) {
        let mut inner = self.inner.lock().await;
        if inner.driver.is_some() {
            return;
        }
        inner.epoch = Instant::now();
        inner.scheduler.start(0);
        inner.driver = Some(tokio::spawn(drive(
            Arc::clone(&self.inner),
            Arc::clone(&self.wake),
        )));
        info!("effect view activated");
    }

    /// Aborts the driver and cancels every pending effect timer.
    pub async fn deactivate(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(driver) = inner.driver.take() {
            driver.abort();
            info!("effect view deactivated");
        }
        inner.scheduler.stop();
    }

    /// Starts the entry celebration. Has no effect while the view is
    /// inactive, since nothing would be left to tear it down.
    pub async fn celebrate(&self) -> EffectState {
        let mut inner = self.inner.lock().await;
        if inner.driver.is_some() {
            inner.catch_up();
            let now = inner.now();
            inner.scheduler.celebrate(now);
            self.wake.notify_one();
        }
        inner.scheduler.state()
    }

    pub async fn snapshot(&self) -> EffectState {
        let mut inner = self.inner.lock().await;
        inner.catch_up();
        inner.scheduler.state()
    }
}

/// One `EffectView` per open page. A view exists only while its page
/// reports itself visible, so hiding one page never touches another.
#[derive(Clone, Default)]
pub struct ViewRegistry {
    views: Arc<Mutex<HashMap<ViewId, EffectView>>>,
    next_id: Arc<AtomicU64>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue_id(&self) -> ViewId {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Creates the page's view on first use and starts its strobe loop.
    pub async fn activate(&self, id: ViewId) -> EffectView {
        let view = self.views.lock().await.entry(id).or_default().clone();
        view.activate().await;
        view
    }

    /// Tears the page's view down and forgets it.
    pub async fn deactivate(&self, id: ViewId) {
        let removed = self.views.lock().await.remove(&id);
        if let Some(view) = removed {
            view.deactivate().await;
        }
    }

    pub async fn get(&self, id: ViewId) -> Option<EffectView> {
        self.views.lock().await.get(&id).cloned()
    }

    pub async fn active_count(&self) -> usize {
        self.views.lock().await.len()
    }

    pub async fn shutdown(&self) {
        let views: Vec<_> = self.views.lock().await.drain().map(|(_, view)| view).collect();
        for view in views {
            view.deactivate().await;
        }
    }
}

async fn drive(inner: Arc<Mutex<ViewInner>>, wake: Arc<Notify>) {
    loop {
        let next = {
            let mut guard = inner.lock().await;
            guard.catch_up();
            guard
                .scheduler
                .next_deadline()
                .map(|at| guard.epoch + Duration::from_millis(at))
        };

        match next {
            Some(at) => {
                tokio::select! {
                    _ = sleep_until(at) => {}
                    _ = wake.notified() => {}
                }
            }
            None => wake.notified().await,
        }
    }
}
