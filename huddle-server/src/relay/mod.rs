mod config;
mod observer;
mod relay;
mod relay_command;

pub use config::*;
pub use observer::*;
pub use relay::*;
pub use relay_command::*;
