//! Supervised learning stage.
//!
//! - build the next-close feature table from an enriched series
//! - split it chronologically
//! - fit and score the regressors

pub mod features;
pub mod split;
pub mod trainer;

pub use features::*;
pub use split::*;
pub use trainer::*;
