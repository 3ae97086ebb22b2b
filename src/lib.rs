pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod notifier;
pub mod status;
pub mod telegram;
pub mod worker;

#[cfg(test)]
mod test_support;

pub use error::Error;
pub use worker::{monitor_homework, start};
