pub mod command;

pub use self::command::*;
