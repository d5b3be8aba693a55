//! Prometheus metrics for the cutout request pipeline

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

/// Metrics for cutout request handling.
///
/// Registered against a per-instance registry so that independent
/// service instances (and parallel tests) do not collide in the
/// process-global default registry.
#[derive(Clone)]
pub struct ServiceMetrics {
    registry: Registry,

    /// Total requests by negotiated format and outcome
    pub requests_total: IntCounterVec,

    /// Requests answered straight from the cache
    pub cache_hits_total: IntCounter,

    /// Requests that had to compute a fresh cutout
    pub cache_misses_total: IntCounter,

    /// Cache writes that failed after a successful compute
    pub cache_store_failures_total: IntCounter,

    /// Duration of the compute path (resolve, fetch, encode) in seconds
    pub compute_duration_seconds: Histogram,
}

impl ServiceMetrics {
    /// Create and register the pipeline metrics
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("sis_requests_total", "Total cutout requests"),
            &["format", "outcome"], // outcome: hit, miss, error
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let cache_hits_total = IntCounter::new(
            "sis_cache_hits_total",
            "Requests served from the cutout cache",
        )?;
        registry.register(Box::new(cache_hits_total.clone()))?;

        let cache_misses_total = IntCounter::new(
            "sis_cache_misses_total",
            "Requests that computed a fresh cutout",
        )?;
        registry.register(Box::new(cache_misses_total.clone()))?;

        let cache_store_failures_total = IntCounter::new(
            "sis_cache_store_failures_total",
            "Cache writes that failed after a successful compute",
        )?;
        registry.register(Box::new(cache_store_failures_total.clone()))?;

        let compute_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "sis_compute_duration_seconds",
                "Duration of resolve-fetch-encode on cache misses",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        registry.register(Box::new(compute_duration_seconds.clone()))?;

        Ok(ServiceMetrics {
            registry,
            requests_total,
            cache_hits_total,
            cache_misses_total,
            cache_store_failures_total,
            compute_duration_seconds,
        })
    }

    /// The registry holding this instance's metrics, for scraping
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_independently() {
        // Two instances must not collide on metric names.
        let first = ServiceMetrics::new().unwrap();
        let second = ServiceMetrics::new().unwrap();
        first.cache_hits_total.inc();
        assert_eq!(first.cache_hits_total.get(), 1);
        assert_eq!(second.cache_hits_total.get(), 0);
    }

    #[test]
    fn test_request_counter_labels() {
        let metrics = ServiceMetrics::new().unwrap();
        metrics
            .requests_total
            .with_label_values(&["jpeg", "miss"])
            .inc();
        assert_eq!(
            metrics
                .requests_total
                .with_label_values(&["jpeg", "miss"])
                .get(),
            1
        );
    }

    #[test]
    fn test_registry_gathers_families() {
        let metrics = ServiceMetrics::new().unwrap();
        metrics.cache_misses_total.inc();
        let families = metrics.registry().gather();
        assert!(families
            .iter()
            .any(|family| family.get_name() == "sis_cache_misses_total"));
    }
}
