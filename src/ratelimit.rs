use crate::config::RateBudgetConfig;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Quota contract of one source class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateBudget {
    /// Calls permitted per window
    pub max_calls: u32,

    /// Window length
    pub window: Duration,
}

impl From<RateBudgetConfig> for RateBudget {
    fn from(config: RateBudgetConfig) -> Self {
        Self {
            max_calls: config.max_calls,
            window: Duration::from_secs(config.window_secs),
        }
    }
}

/// Sliding-window call log for one class. One mutex per class so that
/// independent classes never serialize each other.
struct ClassState {
    budget: RateBudget,
    calls: Mutex<VecDeque<Instant>>,
}

impl ClassState {
    fn new(budget: RateBudget) -> Self {
        Self {
            budget,
            calls: Mutex::new(VecDeque::new()),
        }
    }

    /// Drop call instants that have slid out of the window
    fn prune(calls: &mut VecDeque<Instant>, window: Duration, now: Instant) {
        while let Some(first) = calls.front() {
            if now.duration_since(*first) > window {
                calls.pop_front();
            } else {
                break;
            }
        }
    }

    fn try_reserve(&self, now: Instant) -> bool {
        let mut calls = self.calls.lock();
        Self::prune(&mut calls, self.budget.window, now);

        if calls.len() < self.budget.max_calls as usize {
            calls.push_back(now);
            true
        } else {
            false
        }
    }

    fn remaining(&self, now: Instant) -> u32 {
        let mut calls = self.calls.lock();
        Self::prune(&mut calls, self.budget.window, now);
        self.budget.max_calls.saturating_sub(calls.len() as u32)
    }
}

/// Per-source-class rate limiter enforcing external quota contracts.
///
/// Budgets are declared once at construction; class state is lazily
/// initialized on first use. Classes without a declared budget are
/// unlimited; a budget only exists where a quota contract exists.
pub struct RateLimiter {
    budgets: HashMap<String, RateBudget>,
    classes: DashMap<String, Arc<ClassState>>,
}

impl RateLimiter {
    pub fn new(budgets: HashMap<String, RateBudgetConfig>) -> Self {
        Self {
            budgets: budgets
                .into_iter()
                .map(|(class, config)| (class, RateBudget::from(config)))
                .collect(),
            classes: DashMap::new(),
        }
    }

    fn class_state(&self, class: &str, budget: RateBudget) -> Arc<ClassState> {
        self.classes
            .entry(class.to_string())
            .or_insert_with(|| {
                trace!(class = %class, "Initializing rate-limit window");
                Arc::new(ClassState::new(budget))
            })
            .clone()
    }

    /// Check whether a call may proceed right now, and if so reserve it
    /// against the class budget. Never errors.
    pub fn allow(&self, class: &str) -> bool {
        let Some(budget) = self.budgets.get(class) else {
            return true;
        };

        let allowed = self.class_state(class, *budget).try_reserve(Instant::now());
        if !allowed {
            debug!(class = %class, "Rate budget exhausted");
        }
        allowed
    }

    /// Bounded blocking variant: poll for a slot until `max_wait` elapses.
    /// Returns false when the class is still saturated at the deadline.
    pub async fn wait_for_slot(&self, class: &str, max_wait: Duration) -> bool {
        let deadline = Instant::now() + max_wait;
        loop {
            if self.allow(class) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let nap = (deadline - now).min(Duration::from_millis(50));
            tokio::time::sleep(nap).await;
        }
    }

    /// Calls left in the current window, or `None` for an unlimited class
    pub fn remaining(&self, class: &str) -> Option<u32> {
        let budget = self.budgets.get(class)?;
        Some(self.class_state(class, *budget).remaining(Instant::now()))
    }

    /// Declared budgets, for quota introspection
    pub fn budgets(&self) -> impl Iterator<Item = (&str, &RateBudget)> {
        self.budgets
            .iter()
            .map(|(class, budget)| (class.as_str(), budget))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter_with(class: &str, max_calls: u32, window_secs: u64) -> RateLimiter {
        let mut budgets = HashMap::new();
        budgets.insert(
            class.to_string(),
            RateBudgetConfig {
                max_calls,
                window_secs,
            },
        );
        RateLimiter::new(budgets)
    }

    #[test]
    fn test_allow_boundary() {
        let limiter = limiter_with("ip-geo", 3, 1);

        let results: Vec<bool> = (0..4).map(|_| limiter.allow("ip-geo")).collect();
        assert_eq!(results, vec![true, true, true, false]);
    }

    #[tokio::test]
    async fn test_window_elapses() {
        let limiter = limiter_with("ip-geo", 2, 1);

        assert!(limiter.allow("ip-geo"));
        assert!(limiter.allow("ip-geo"));
        assert!(!limiter.allow("ip-geo"));

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(limiter.allow("ip-geo"));
    }

    #[test]
    fn test_unconfigured_class_is_unlimited() {
        let limiter = RateLimiter::new(HashMap::new());

        for _ in 0..100 {
            assert!(limiter.allow("anything"));
        }
        assert_eq!(limiter.remaining("anything"), None);
    }

    #[test]
    fn test_identical_budgets_stay_independent() {
        let mut budgets = HashMap::new();
        budgets.insert(
            "whois".to_string(),
            RateBudgetConfig {
                max_calls: 1,
                window_secs: 60,
            },
        );
        budgets.insert(
            "threat-intel".to_string(),
            RateBudgetConfig {
                max_calls: 1,
                window_secs: 60,
            },
        );
        let limiter = RateLimiter::new(budgets);

        assert!(limiter.allow("whois"));
        // Exhausting one class leaves the other untouched
        assert!(!limiter.allow("whois"));
        assert!(limiter.allow("threat-intel"));
    }

    #[test]
    fn test_remaining() {
        let limiter = limiter_with("ip-geo", 3, 60);

        assert_eq!(limiter.remaining("ip-geo"), Some(3));
        limiter.allow("ip-geo");
        limiter.allow("ip-geo");
        assert_eq!(limiter.remaining("ip-geo"), Some(1));
    }

    #[tokio::test]
    async fn test_wait_for_slot_bounded() {
        let limiter = limiter_with("ip-geo", 1, 60);

        assert!(limiter.allow("ip-geo"));
        // Saturated for a full minute; the wait must give up at its deadline
        let start = Instant::now();
        let got_slot = limiter
            .wait_for_slot("ip-geo", Duration::from_millis(80))
            .await;

        assert!(!got_slot);
        assert!(start.elapsed() >= Duration::from_millis(80));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_wait_for_slot_succeeds_when_window_slides() {
        let limiter = limiter_with("ip-geo", 1, 0);

        assert!(limiter.allow("ip-geo"));
        assert!(
            limiter
                .wait_for_slot("ip-geo", Duration::from_millis(500))
                .await
        );
    }
}
