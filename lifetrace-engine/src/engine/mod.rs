mod error;
mod harness;

pub use self::{error::EngineError, harness::Harness};

pub mod prelude {
    pub use super::{EngineError, Harness};
}
