use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Registration / verification throughput
// - Projection processing (per event type, with latency)
// - Event-store concurrency conflicts
//
// All metrics are registered with Prometheus and scraped via /metrics.
//
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    pub users_registered: IntCounter,
    pub emails_verified: IntCounter,

    pub events_processed: IntCounterVec,
    pub events_failed: IntCounterVec,
    pub projection_duration: HistogramVec,

    pub concurrency_conflicts: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let users_registered = IntCounter::new(
            "users_registered_total",
            "Total users registered successfully",
        )?;
        registry.register(Box::new(users_registered.clone()))?;

        let emails_verified = IntCounter::new(
            "user_emails_verified_total",
            "Total user email addresses verified",
        )?;
        registry.register(Box::new(emails_verified.clone()))?;

        let events_processed = IntCounterVec::new(
            Opts::new(
                "user_events_processed_total",
                "Domain events projected successfully",
            ),
            &["event_type"],
        )?;
        registry.register(Box::new(events_processed.clone()))?;

        let events_failed = IntCounterVec::new(
            Opts::new(
                "user_events_failed_total",
                "Domain events whose projection failed",
            ),
            &["event_type"],
        )?;
        registry.register(Box::new(events_failed.clone()))?;

        let projection_duration = HistogramVec::new(
            HistogramOpts::new(
                "user_event_projection_duration_seconds",
                "Projection handler duration",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["event_type"],
        )?;
        registry.register(Box::new(projection_duration.clone()))?;

        let concurrency_conflicts = IntCounter::new(
            "event_store_concurrency_conflicts_total",
            "Appends rejected by the optimistic version check",
        )?;
        registry.register(Box::new(concurrency_conflicts.clone()))?;

        Ok(Self {
            registry,
            users_registered,
            emails_verified,
            events_processed,
            events_failed,
            projection_duration,
            concurrency_conflicts,
        })
    }

    /// Registry handle for the /metrics exposition endpoint
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_registration(&self) {
        self.users_registered.inc();
    }

    pub fn record_verification(&self) {
        self.emails_verified.inc();
    }

    pub fn record_projection(&self, event_type: &str, duration_secs: f64, success: bool) {
        if success {
            self.events_processed.with_label_values(&[event_type]).inc();
        } else {
            self.events_failed.with_label_values(&[event_type]).inc();
        }
        self.projection_duration
            .with_label_values(&[event_type])
            .observe(duration_secs);
    }

    pub fn record_conflict(&self) {
        self.concurrency_conflicts.inc();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
