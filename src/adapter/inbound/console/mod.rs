//! Line-oriented operator console used by `keygrab run`.

pub mod command;
pub mod dispatch;
pub mod render;

pub use command::{parse, ConsoleCommand, ParseError};
pub use dispatch::{Console, Reply};
