pub mod classify;
pub mod error;
pub mod stats;
pub mod traits;
pub mod types;

#[cfg(test)]
mod stats_tests;

pub use classify::*;
pub use error::*;
pub use traits::*;
pub use types::*;
