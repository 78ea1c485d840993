pub mod client;
pub mod context;
pub mod dialogue;
pub mod menu;

pub use client::*;
pub use context::*;
pub use dialogue::*;
pub use menu::{Button, Keyboard, Reply};
