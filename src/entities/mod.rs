pub mod advice;
pub mod chat_sessions;
pub mod client_cards;
pub mod consents;
pub mod feedback;
pub mod gifted_subscriptions;
pub mod materials;
pub mod methods;
pub mod payment_methods;
pub mod payments;
pub mod subscription_plans;
pub mod support_messages;
pub mod support_sessions;
pub mod user_cards;
pub mod user_subscriptions;
pub mod users;

pub use advice as advice_entity;
pub use chat_sessions as chat_session_entity;
pub use client_cards as client_card_entity;
pub use consents as consent_entity;
pub use feedback as feedback_entity;
pub use gifted_subscriptions as gifted_subscription_entity;
pub use materials as material_entity;
pub use methods as method_entity;
pub use payment_methods as payment_method_entity;
pub use payments as payment_entity;
pub use subscription_plans as subscription_plan_entity;
pub use support_messages as support_message_entity;
pub use support_sessions as support_session_entity;
pub use user_cards as user_card_entity;
pub use user_subscriptions as user_subscription_entity;
pub use users as user_entity;

pub use materials::MaterialType;
pub use payments::PaymentStatus;
