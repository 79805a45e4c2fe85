//! Seeded pseudo-random sources.
//!
//! Everything that feeds the generation pipeline draws from an explicitly seeded
//! [`LcgRandom`]; the process-wide [`LcgRandom::shared`] instance exists only for
//! interactive "pick me a seed" actions.

mod fnv;
mod lcg;

pub use fnv::fnv_hash3;
pub use lcg::{LcgError, LcgRandom};
