pub mod cli;
pub mod config;
pub mod license;
pub mod markdown;
pub mod model;
pub mod versions;

mod api;

pub use api::{ModVersions, ModVersionsBuilder};
