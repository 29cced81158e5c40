//! Read the peptides and modification declarations from search engine result files

#[cfg(feature = "discoverer")]
mod discoverer;
#[cfg(feature = "mascot")]
mod mascot;

#[cfg(feature = "discoverer")]
pub use discoverer::*;
#[cfg(feature = "mascot")]
pub use mascot::*;
