//! Exponentially-bounded... in practice, fixed-interval polling of a health
//! probe until success or attempts exhausted (spec.md §4.7). Never raises:
//! a probe error is treated the same as a failed probe.

use std::future::Future;
use std::time::Duration;

/// Options controlling one [`wait_for_health`] call.
#[derive(Debug, Clone)]
pub struct HealthPollOptions {
    pub max_attempts: u32,
    pub interval: Duration,
    pub initial_delay: Duration,
    pub label: String,
}

impl Default for HealthPollOptions {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_millis(2000),
            initial_delay: Duration::ZERO,
            label: String::new(),
        }
    }
}

impl HealthPollOptions {
    /// Server health gate (spec.md §4.11 step 3): initial delay 100ms,
    /// interval 500ms, max 20 attempts — up to ~10s total.
    pub fn server_default(label: impl Into<String>) -> Self {
        Self {
            max_attempts: 20,
            interval: Duration::from_millis(500),
            initial_delay: Duration::from_millis(100),
            label: label.into(),
        }
    }

    /// Facilitator health gate (spec.md §6's ~20s timeout budget):
    /// default 10 attempts at 2s.
    pub fn facilitator_default(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

/// Awaits `options.initial_delay`, then probes up to `options.max_attempts`
/// times, sleeping `options.interval` between attempts (but never after the
/// final attempt). Returns `true` on the first successful probe, `false` on
/// exhaustion.
pub async fn wait_for_health<F, Fut>(options: &HealthPollOptions, probe: F) -> bool
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    if !options.initial_delay.is_zero() {
        tokio::time::sleep(options.initial_delay).await;
    }

    for attempt in 1..=options.max_attempts {
        if probe().await {
            tracing::debug!(label = %options.label, attempt, "health check succeeded");
            return true;
        }
        tracing::debug!(label = %options.label, attempt, max = options.max_attempts, "health check failed");
        if attempt < options.max_attempts {
            tokio::time::sleep(options.interval).await;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_first_attempt_without_sleeping() {
        let options = HealthPollOptions {
            max_attempts: 5,
            interval: Duration::from_secs(1),
            initial_delay: Duration::ZERO,
            label: "t".into(),
        };
        let ok = wait_for_health(&options, || async { true }).await;
        assert!(ok);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_n_failed_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = Arc::clone(&calls);
        let options = HealthPollOptions {
            max_attempts: 5,
            interval: Duration::from_millis(10),
            initial_delay: Duration::ZERO,
            label: "t".into(),
        };
        let ok = wait_for_health(&options, || {
            let calls = Arc::clone(&calls2);
            async move { calls.fetch_add(1, Ordering::SeqCst) + 1 >= 3 }
        })
        .await;
        assert!(ok);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_false_on_exhaustion_never_panics() {
        let options = HealthPollOptions {
            max_attempts: 3,
            interval: Duration::from_millis(10),
            initial_delay: Duration::ZERO,
            label: "t".into(),
        };
        let ok = wait_for_health(&options, || async { false }).await;
        assert!(!ok);
    }

    #[tokio::test(start_paused = true)]
    async fn no_sleep_follows_the_final_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = Arc::clone(&calls);
        let options = HealthPollOptions {
            max_attempts: 1,
            interval: Duration::from_secs(3600),
            initial_delay: Duration::ZERO,
            label: "t".into(),
        };
        // With start_paused, if the implementation slept after the final
        // attempt this call would never resolve within the test timeout.
        let ok = tokio::time::timeout(Duration::from_millis(50), wait_for_health(&options, || {
            calls2.fetch_add(1, Ordering::SeqCst);
            async { false }
        }))
        .await
        .expect("must not sleep after the final attempt");
        assert!(!ok);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
