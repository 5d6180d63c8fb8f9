//! Eager-start, lazy-await facilitator lifecycle (spec.md §4.10).
//!
//! `start` + the health gate begin the moment a manager is constructed, so
//! N facilitators can warm up concurrently while the orchestrator proceeds
//! with the rest of setup; `ready()` only awaits (and caches) the outcome.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use x402_e2e_discovery::{FacilitatorConfig, FacilitatorProxy};
use x402_e2e_proxy::{wait_for_health, HealthPollOptions};

enum ReadyState {
    Pending(JoinHandle<Option<String>>),
    Ready(Option<String>),
}

pub struct FacilitatorManager {
    proxy: Arc<dyn FacilitatorProxy>,
    state: Mutex<ReadyState>,
}

impl FacilitatorManager {
    /// Spawns `start` + the health gate immediately.
    pub fn new(name: String, proxy: Arc<dyn FacilitatorProxy>, config: FacilitatorConfig) -> Self {
        let task_proxy = Arc::clone(&proxy);
        let handle = tokio::spawn(async move {
            if let Err(err) = task_proxy.start(config).await {
                tracing::warn!(facilitator = %name, %err, "facilitator failed to start");
                return None;
            }
            let options = HealthPollOptions::facilitator_default(name.clone());
            let healthy = wait_for_health(&options, || async { task_proxy.health().await.success }).await;
            if !healthy {
                tracing::warn!(facilitator = %name, "facilitator never became healthy");
                return None;
            }
            Some(task_proxy.get_url())
        });

        Self {
            proxy,
            state: Mutex::new(ReadyState::Pending(handle)),
        }
    }

    /// Awaits the stored start+health operation exactly once; subsequent
    /// calls return the cached outcome.
    pub async fn ready(&self) -> Option<String> {
        let mut state = self.state.lock().await;
        match &*state {
            ReadyState::Ready(url) => url.clone(),
            ReadyState::Pending(_) => {
                let ReadyState::Pending(handle) = std::mem::replace(
                    &mut *state,
                    ReadyState::Ready(None),
                ) else {
                    unreachable!()
                };
                let url = handle.await.unwrap_or(None);
                *state = ReadyState::Ready(url.clone());
                url
            }
        }
    }

    pub async fn stop(&self) {
        self.proxy.stop().await;
    }
}
