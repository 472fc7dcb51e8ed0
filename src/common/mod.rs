pub mod checksum;
pub mod config;
pub mod error;
pub mod interfaces;
pub mod logging;
