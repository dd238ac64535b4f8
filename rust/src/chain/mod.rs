//! Critical chain selection and feeding chain identification.
//!
//! Both operate on the path set produced by [`crate::paths::enumerate_paths`]
//! and are full recomputations: nothing from a previous run is consulted.

mod feeding;
mod selection;

pub use feeding::{identify_feeding_chains, FeedingChain};
pub use selection::{critical_flags, path_duration, select_critical_chain, CriticalChain};
