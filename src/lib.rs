pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::AipConfig;
pub use crate::core::client::AipClient;
pub use crate::core::tools;
pub use crate::utils::error::{AipError, Result};
