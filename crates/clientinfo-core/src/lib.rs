pub mod client;
pub mod config;
pub mod device;
pub mod signature;
