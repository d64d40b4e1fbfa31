pub mod config;
pub mod open;
pub mod probe;
pub mod profile;
pub mod serve;
