//! Handlers 模块

pub mod callback;
pub mod health;
pub mod metrics;
pub mod presence;

pub use callback::*;
pub use health::*;
pub use metrics::*;
pub use presence::*;
