//! Helpers shared by the loader crate and the `digiskr` binary.

pub mod env;
pub mod utils;
