use std::sync::Mutex;

/// Counters for fetch traffic and simulation ticks, shown in the status
/// panel and logged by the simulator.
#[derive(Debug, Default)]
pub struct DashboardMetrics {
    inner: Mutex<Counters>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    list_fetches: usize,
    detail_fetches: usize,
    ticks: usize,
    errors: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub list_fetches: usize,
    pub detail_fetches: usize,
    pub ticks: usize,
    pub errors: usize,
}

impl DashboardMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_list_fetch(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.list_fetches += 1;
        }
    }

    pub fn record_detail_fetch(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.detail_fetches += 1;
        }
    }

    pub fn record_tick(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.ticks += 1;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.errors += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self
            .inner
            .lock()
            .map(|guard| *guard)
            .unwrap_or_default();
        MetricsSnapshot {
            list_fetches: counters.list_fetches,
            detail_fetches: counters.detail_fetches,
            ticks: counters.ticks,
            errors: counters.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let metrics = DashboardMetrics::new();
        metrics.record_list_fetch();
        metrics.record_detail_fetch();
        metrics.record_detail_fetch();
        metrics.record_tick();
        metrics.record_error();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.list_fetches, 1);
        assert_eq!(snapshot.detail_fetches, 2);
        assert_eq!(snapshot.ticks, 1);
        assert_eq!(snapshot.errors, 1);
    }
}
