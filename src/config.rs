//! Configuration schema and loading.
//!
//! Settings drive the sampler grid size, import filters and playback
//! timing; they come from a TOML file with environment overrides.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
