pub mod area;
pub mod body;
pub mod error;
pub mod geo;
pub mod headers;
pub mod resolver;
pub mod user_agent;

pub use clientinfo_core::client::{ClientInfo, ScreenHint};
pub use clientinfo_core::config::Config;
pub use clientinfo_core::device::{DeviceClass, DeviceRules};
pub use error::ClientInfoError;
pub use headers::ClientRequest;
pub use resolver::ClientInfoResolver;
