pub mod client_service;
pub mod consent_service;
pub mod content_service;
pub mod payment_service;
pub mod subscription_service;
pub mod support_service;
pub mod user_service;

pub use client_service::*;
pub use consent_service::*;
pub use content_service::*;
pub use payment_service::*;
pub use subscription_service::*;
pub use support_service::*;
pub use user_service::*;
