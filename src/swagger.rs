use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{MaterialType, PaymentStatus};
use crate::handlers;
use crate::middlewares::ADMIN_TOKEN_HEADER;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ADMIN_TOKEN_HEADER))),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::user::register,
        handlers::user::get_profile,
        handlers::user::get_statistics,
        handlers::user::add_card,
        handlers::consent::get_consent,
        handlers::consent::set_consent,
        handlers::consent::consent_status,
        handlers::subscription::list_plans,
        handlers::subscription::subscribe,
        handlers::subscription::gift_subscription,
        handlers::subscription::subscription_status,
        handlers::payment::list_methods,
        handlers::payment::make_payment,
        handlers::payment::payment_status,
        handlers::support::start_session,
        handlers::support::send_message,
        handlers::support::get_messages,
        handlers::content::list_advice,
        handlers::content::list_methods,
        handlers::content::get_method,
        handlers::content::list_materials,
        handlers::content::get_material,
        handlers::client::get_client_card,
        handlers::client::create_client_card,
        handlers::client::save_chat_session,
        handlers::client::submit_feedback,
        handlers::admin::update_payment_status,
    ),
    components(
        schemas(
            ApiError,
            RegisterRequest,
            RegisterResponse,
            UserResponse,
            ProfileResponse,
            StatisticsResponse,
            AddCardRequest,
            UserCardResponse,
            ConsentResponse,
            ConsentStatusResponse,
            SetConsentRequest,
            SubscriptionPlanResponse,
            UserSubscriptionResponse,
            SubscribeRequest,
            GiftSubscriptionRequest,
            GiftSubscriptionResponse,
            SubscriptionStatusResponse,
            PaymentMethodResponse,
            MakePaymentRequest,
            PaymentResponse,
            PaymentStatus,
            UpdatePaymentStatusRequest,
            StartSessionResponse,
            SendMessageRequest,
            SupportMessageResponse,
            SupportMessagesResponse,
            AdviceResponse,
            AdviceListResponse,
            MethodResponse,
            MaterialResponse,
            MaterialType,
            ClientCardRequest,
            ClientCardResponse,
            ChatSessionRequest,
            ChatSessionResponse,
            FeedbackRequest,
            FeedbackResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "user", description = "Registration and account views"),
        (name = "consent", description = "Terms acceptance"),
        (name = "subscription", description = "Plans, purchases and gifts"),
        (name = "payment", description = "Payments and balance top-ups"),
        (name = "support", description = "Support chat sessions"),
        (name = "content", description = "Advice, methods and materials"),
        (name = "client", description = "Client cards, chat sessions and feedback"),
        (name = "admin", description = "Payment reconciliation"),
    ),
    info(
        title = "Wellness Backend API",
        version = "1.0.0",
        description = "Subscription, payment and support REST API used by the Telegram bot"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
