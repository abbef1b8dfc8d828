// Record module - profile record access scoped to a connected session

mod profile;

pub use profile::*;
