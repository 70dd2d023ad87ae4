use thiserror::Error;

/// Failures surfaced by the allocation strategies.
///
/// Only storage exhaustion is reported at runtime. Construct/destroy pairing
/// mistakes are `unsafe` contracts and never show up here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HarnessError {
    #[error("Out of memory: backing allocator could not provide {bytes} bytes")]
    OutOfMemory { bytes: usize },
}
