//! Relocation scenario: one relocation per type of the policy chain.

use std::rc::Rc;

use lifetrace_core::relocation::{
    relocate, DropOnlyDerived, MoveRestoredDerived, Relocatable, RelocationPolicy,
};
use lifetrace_core::resource::pass_by_value;
use lifetrace_core::{CounterSnapshot, Resource};
use tracing::{info, instrument};

use crate::engine::Harness;

/// What one relocation did to its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationStep {
    pub type_name: &'static str,
    pub policy: RelocationPolicy,
    pub source_tag_before: String,
    pub source_tag_after: String,
    pub destination_tag: String,
    /// Constructions caused by the relocation itself.
    pub allocations: u64,
}

impl RelocationStep {
    /// True when the source no longer carries its tag.
    pub fn source_emptied(&self) -> bool {
        self.source_tag_after.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationOutcome {
    pub steps: Vec<RelocationStep>,
    pub counters: CounterSnapshot,
}

#[instrument(level = "info", name = "relocation_scenario", skip_all)]
pub fn run_relocation_scenario(harness: &Harness) -> RelocationOutcome {
    let ledger = harness.ledger();
    let start = ledger.snapshot();
    let mut steps = Vec::with_capacity(3);
    {
        // Base type: built by default, passed through by value, then moved.
        let mut a1 = pass_by_value(Resource::with_default(ledger));
        let (_a2, step) = relocate_recorded(&mut a1);
        steps.push(step);

        // Destructor only: the move falls back to a copy.
        let mut b1 = DropOnlyDerived::with_default(ledger);
        let (_b2, step) = relocate_recorded(&mut b1);
        steps.push(step);

        // Destructor plus defaulted move: moves again.
        let mut c1 = MoveRestoredDerived::with_default(ledger);
        let (_c2, step) = relocate_recorded(&mut c1);
        steps.push(step);
    }

    RelocationOutcome {
        steps,
        counters: ledger.snapshot().since(&start),
    }
}

fn relocate_recorded<T>(source: &mut T) -> (T, RelocationStep)
where
    T: Relocatable + AsRef<Resource>,
{
    let ledger = Rc::clone(source.as_ref().ledger());
    let source_tag_before = source.as_ref().tag().to_owned();
    info!(type_name = T::NAME, tag = ?source_tag_before, "before relocation");

    let before = ledger.snapshot();
    let destination = relocate(source);
    let allocations = ledger.snapshot().since(&before).allocated;

    let step = RelocationStep {
        type_name: T::NAME,
        policy: T::POLICY,
        source_tag_before,
        source_tag_after: source.as_ref().tag().to_owned(),
        destination_tag: destination.as_ref().tag().to_owned(),
        allocations,
    };
    info!(
        type_name = T::NAME,
        policy = ?step.policy,
        tag = ?step.source_tag_after,
        "after relocation"
    );
    (destination, step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifetrace_core::ledger::RecordingObserver;

    fn run() -> (RelocationOutcome, Rc<RecordingObserver>) {
        let recorder = Rc::new(RecordingObserver::new());
        let harness = Harness::new(recorder.clone());
        (run_relocation_scenario(&harness), recorder)
    }

    #[test]
    fn chain_resolves_move_copy_move() {
        let (outcome, _) = run();
        let policies: Vec<_> = outcome.steps.iter().map(|s| s.policy).collect();
        assert_eq!(
            policies,
            [
                RelocationPolicy::Move,
                RelocationPolicy::Copy,
                RelocationPolicy::Move
            ]
        );
    }

    #[test]
    fn sources_are_emptied_only_by_moves() {
        let (outcome, _) = run();
        let [base, drop_only, restored] = &outcome.steps[..] else {
            panic!("expected three steps");
        };

        assert!(base.source_emptied());
        assert_eq!(base.destination_tag, "default");

        assert!(!drop_only.source_emptied());
        assert_eq!(drop_only.source_tag_after, "default");
        assert_eq!(drop_only.destination_tag, "default");

        assert!(restored.source_emptied());
        assert_eq!(restored.source_tag_before, "default");
    }

    #[test]
    fn each_relocation_counts_exactly_one_construction() {
        let (outcome, recorder) = run();
        assert!(outcome.steps.iter().all(|s| s.allocations == 1));
        // Three default constructions, one pass-by-value move, three relocations.
        assert_eq!(outcome.counters.allocated, 7);
        assert!(outcome.counters.is_balanced());
        assert_eq!(recorder.count("copy"), 1);
        assert_eq!(recorder.count("move"), 3);
    }
}
