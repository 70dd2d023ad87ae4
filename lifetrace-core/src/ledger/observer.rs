//! ## lifetrace-core::ledger::observer
//! **External observers of resource lifecycle events**
//!
//! Observers are diagnostic only. Counting happens in the ledger before an
//! observer is notified, so an observer can never affect correctness.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// How a resource came into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construction {
    /// Built from an explicit value and tag.
    Direct,
    /// Built by the default constructor forwarding to the direct one.
    Delegated,
    /// Duplicated from another live resource.
    Copied,
    /// State relocated out of another resource.
    Moved,
}

impl Construction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Construction::Direct => "direct",
            Construction::Delegated => "delegated",
            Construction::Copied => "copied",
            Construction::Moved => "moved",
        }
    }
}

impl fmt::Display for Construction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single observable lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Constructed {
        tag: String,
        value: i32,
        via: Construction,
    },
    /// Carries the tag and value held at the moment of destruction, so a
    /// moved-from resource reports its emptied tag.
    Destroyed { tag: String, value: i32 },
    RawAllocated { bytes: usize, address: usize },
    RawReleased { address: usize },
}

impl LifecycleEvent {
    /// Short label used for metric dimensions and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            LifecycleEvent::Constructed { via, .. } => match via {
                Construction::Direct => "construct",
                Construction::Delegated => "construct_delegated",
                Construction::Copied => "copy",
                Construction::Moved => "move",
            },
            LifecycleEvent::Destroyed { .. } => "destroy",
            LifecycleEvent::RawAllocated { .. } => "raw_alloc",
            LifecycleEvent::RawReleased { .. } => "raw_release",
        }
    }

    /// Tag of the resource the event refers to, if any.
    pub fn tag(&self) -> Option<&str> {
        match self {
            LifecycleEvent::Constructed { tag, .. } | LifecycleEvent::Destroyed { tag, .. } => {
                Some(tag)
            }
            _ => None,
        }
    }
}

/// Receives lifecycle events from a [`Ledger`](super::Ledger).
pub trait LifecycleObserver {
    fn observe(&self, event: &LifecycleEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl LifecycleObserver for NullObserver {
    fn observe(&self, _event: &LifecycleEvent) {}
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: RefCell<Vec<LifecycleEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every event seen so far.
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.borrow().clone()
    }

    /// Events whose resource carried `tag` at the time of the event.
    pub fn events_tagged(&self, tag: &str) -> Vec<LifecycleEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|event| event.tag() == Some(tag))
            .cloned()
            .collect()
    }

    /// Number of events with the given [`LifecycleEvent::kind`].
    pub fn count(&self, kind: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| event.kind() == kind)
            .count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl LifecycleObserver for RecordingObserver {
    fn observe(&self, event: &LifecycleEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

/// Forwards each event to every registered observer in registration order.
#[derive(Default, Clone)]
pub struct Fanout {
    observers: Vec<Rc<dyn LifecycleObserver>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: Rc<dyn LifecycleObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn push(&mut self, observer: Rc<dyn LifecycleObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl LifecycleObserver for Fanout {
    fn observe(&self, event: &LifecycleEvent) {
        for observer in &self.observers {
            observer.observe(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constructed(tag: &str, value: i32) -> LifecycleEvent {
        LifecycleEvent::Constructed {
            tag: tag.to_string(),
            value,
            via: Construction::Direct,
        }
    }

    #[test]
    fn recording_observer_keeps_order() {
        let recorder = RecordingObserver::new();
        recorder.observe(&constructed("stack", 2));
        recorder.observe(&LifecycleEvent::Destroyed {
            tag: "stack".into(),
            value: 2,
        });

        let events = recorder.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind(), "construct");
        assert_eq!(events[1].kind(), "destroy");
        assert_eq!(recorder.events_tagged("stack").len(), 2);
        assert!(recorder.events_tagged("heap").is_empty());
    }

    #[test]
    fn fanout_reaches_every_observer() {
        let first = Rc::new(RecordingObserver::new());
        let second = Rc::new(RecordingObserver::new());
        let fanout = Fanout::new().with(first.clone()).with(second.clone());

        fanout.observe(&LifecycleEvent::RawReleased { address: 0x10 });

        assert_eq!(fanout.len(), 2);
        assert_eq!(first.count("raw_release"), 1);
        assert_eq!(second.count("raw_release"), 1);
    }

    #[test]
    fn raw_events_have_no_tag() {
        let event = LifecycleEvent::RawAllocated {
            bytes: 48,
            address: 0x1000,
        };
        assert_eq!(event.tag(), None);
        assert_eq!(event.kind(), "raw_alloc");
    }
}
