pub mod client;
pub mod common;
pub mod content;
pub mod payment;
pub mod subscription;
pub mod support;
pub mod user;

pub use client::*;
pub use common::*;
pub use content::*;
pub use payment::*;
pub use subscription::*;
pub use support::*;
pub use user::*;
