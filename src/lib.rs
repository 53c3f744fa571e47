pub mod config;
pub mod contacts;
pub mod description;
pub mod error;
pub mod extraction;
pub mod logging;
pub mod sync;
pub mod transport;
pub mod types;
