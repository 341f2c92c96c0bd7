//! Application layer use cases for the console frontend.
//!
//! - **`console`** – The `:`-prefixed console grammar: parses one input line
//!   into an [`console::Action`]. Pure string handling, no I/O.
//!
//! - **`dispatch`** – Maps each action that sends debugger commands to the
//!   exact command lines, resolving templates from the current
//!   `CommandConfig`. The lines go into an injected [`dispatch::CommandSink`]
//!   so the logic is testable without a socket.

pub mod console;
pub mod dispatch;
