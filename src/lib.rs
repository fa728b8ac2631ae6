pub mod config;
pub mod constants;
pub mod error;
pub mod handler;
pub mod index;
pub mod logging;
pub mod processor;
pub mod report;
pub mod settings;

pub use error::{EstError, Result};
pub use handler::{Handler, HandlerRegistry, HandlerState, HandlerStatus, Message, MessageLevel};
pub use index::{HandlerIndex, HandlerKey};
pub use processor::{ApplyOutcome, Processor};
pub use report::StatisticsSummary;
