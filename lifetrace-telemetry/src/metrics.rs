//! ## lifetrace-telemetry::metrics
//! **Prometheus lifecycle counters**

use lifetrace_core::ledger::{Construction, LifecycleEvent, LifecycleObserver};
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub lifecycle_events: IntCounterVec,
    pub live_resources: IntGauge,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let lifecycle_events = IntCounterVec::new(
            Opts::new(
                "lifetrace_lifecycle_events_total",
                "Resource lifecycle events by kind",
            ),
            &["kind"],
        )?;
        let live_resources = IntGauge::new(
            "lifetrace_live_resources",
            "Resources constructed and not yet destroyed",
        )?;

        registry.register(Box::new(lifecycle_events.clone()))?;
        registry.register(Box::new(live_resources.clone()))?;

        Ok(Self {
            registry,
            lifecycle_events,
            live_resources,
        })
    }

    /// Renders every registered metric in the text exposition format.
    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn events_of_kind(&self, kind: &str) -> u64 {
        self.lifecycle_events.with_label_values(&[kind]).get()
    }
}

impl LifecycleObserver for MetricsRecorder {
    fn observe(&self, event: &LifecycleEvent) {
        self.lifecycle_events
            .with_label_values(&[event.kind()])
            .inc();
        match event {
            // The delegating notice follows a construction already counted.
            LifecycleEvent::Constructed { via, .. } if *via != Construction::Delegated => {
                self.live_resources.inc()
            }
            LifecycleEvent::Destroyed { .. } => self.live_resources.dec(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifetrace_core::{Ledger, Resource};
    use std::rc::Rc;

    #[test]
    fn records_lifecycle_through_a_ledger() {
        let metrics = Rc::new(MetricsRecorder::new().unwrap());
        let ledger = Ledger::new(metrics.clone());
        {
            let mut first = Resource::with_default(&ledger);
            let _moved = first.take();
            assert_eq!(metrics.live_resources.get(), 2);
        }

        assert_eq!(metrics.events_of_kind("construct"), 1);
        assert_eq!(metrics.events_of_kind("construct_delegated"), 1);
        assert_eq!(metrics.events_of_kind("move"), 1);
        assert_eq!(metrics.events_of_kind("destroy"), 2);
        assert_eq!(metrics.live_resources.get(), 0);
    }

    #[test]
    fn renders_text_exposition() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.observe(&LifecycleEvent::RawReleased { address: 1 });

        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("lifetrace_lifecycle_events_total{kind=\"raw_release\"} 1"));
        assert!(text.contains("lifetrace_live_resources 0"));
    }
}
