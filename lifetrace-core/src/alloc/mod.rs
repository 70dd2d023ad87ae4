//! ## lifetrace-core::alloc
//! **Storage that separates "get memory" from "construct a value in it"**
//!
//! ### Key Submodules:
//! - `pool/`: fixed-block slot pool with a free-list, grown chunk by chunk
//! - `raw/`: a single raw heap block driven through four independent steps
//!
//! Neither allocator knows whether its storage currently holds a value. The
//! caller pairs construction with destruction; the `unsafe` signatures carry
//! that contract.

pub mod pool;
pub mod raw;
