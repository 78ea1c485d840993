pub mod admin;
pub mod cors;

pub use admin::*;
pub use cors::*;
