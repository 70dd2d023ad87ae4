use lifetrace_engine::EngineError;

/// Maps an unbalanced teardown report to the engine error the CLI exits with.
pub fn check_balance(snapshot: lifetrace_core::CounterSnapshot) -> Result<(), EngineError> {
    if snapshot.is_balanced() {
        Ok(())
    } else {
        Err(EngineError::Unbalanced {
            allocated: snapshot.allocated,
            deallocated: snapshot.deallocated,
        })
    }
}
