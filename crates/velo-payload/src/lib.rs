//! Synthetic payload generation for throughput measurement.
//!
//! Payloads are produced deterministically for the `compressible` and
//! `incompressible` patterns and from a CSPRNG for `random`, then memoized
//! in a bounded LRU cache so repeated transfers of the same shape never pay
//! the generation cost twice.
//!
//! # Key Features
//!
//! - **Exact sizing**: a buffer's length always equals the requested byte
//!   count, `mb * 1024 * 1024` truncated to whole bytes
//! - **Reference-stable**: cache hits hand out clones of the same `Bytes`
//!   allocation
//! - **Bounded**: entry-capped LRU eviction instead of an ambient unbounded map

pub use self::pattern::PayloadPattern;
pub use self::store::{PayloadKey, PayloadStore, generate, size_mb_to_bytes};

mod pattern;
mod store;
