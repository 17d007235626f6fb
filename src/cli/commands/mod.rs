pub mod config;
pub mod exists;
pub mod scan;
