mod bot;
mod command;

pub use bot::{Bot, Reply, USAGE};
pub use command::Command;
