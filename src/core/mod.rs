pub mod client;
pub mod handlers;
pub mod tools;

pub use crate::domain::model::{AgentRecord, Page, PriceRecord, RunEvent, RunResult, UserRecord};
pub use crate::utils::error::Result;
