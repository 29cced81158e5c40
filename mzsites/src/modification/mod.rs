//! Declared modifications, classification of observed modifications, and counting of their
//! possible placements

mod aggregate;
mod combinations;
mod pool;
mod resolve;
mod spec;

pub use aggregate::*;
pub use combinations::*;
pub use pool::*;
pub use resolve::*;
pub use spec::*;
