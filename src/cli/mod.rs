pub mod app;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod info;
pub mod list;
pub mod runtime;
pub mod send;
pub mod serve;

pub use list::{cmd_list, ListArgs};
pub use send::{cmd_send, SendArgs};
pub use serve::{cmd_serve, ServeArgs};
