use crate::config::BotConfig;
use crate::entities::MaterialType;
use crate::error::{AppError, AppResult};
use crate::models::*;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// The backend operations the conversation driver relies on.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn register(
        &self,
        telegram_id: &str,
        username: Option<&str>,
    ) -> AppResult<RegisterResponse>;
    async fn set_consent(&self, telegram_id: &str, given: bool) -> AppResult<ConsentResponse>;
    async fn subscription_plans(&self) -> AppResult<Vec<SubscriptionPlanResponse>>;
    async fn payment_methods(&self) -> AppResult<Vec<PaymentMethodResponse>>;
    async fn make_payment(
        &self,
        telegram_id: &str,
        request: &MakePaymentRequest,
    ) -> AppResult<PaymentResponse>;
    async fn gift_subscription(
        &self,
        telegram_id: &str,
        request: &GiftSubscriptionRequest,
    ) -> AppResult<GiftSubscriptionResponse>;
    async fn start_support_session(&self, telegram_id: &str) -> AppResult<StartSessionResponse>;
    async fn send_support_message(
        &self,
        request: &SendMessageRequest,
    ) -> AppResult<SupportMessageResponse>;
    async fn material(&self, material_type: MaterialType) -> AppResult<MaterialResponse>;
    async fn create_client_card(
        &self,
        telegram_id: &str,
        request: &ClientCardRequest,
    ) -> AppResult<ClientCardResponse>;
    async fn submit_feedback(&self, request: &FeedbackRequest) -> AppResult<FeedbackResponse>;
    async fn profile(&self, telegram_id: &str) -> AppResult<ProfileResponse>;
}

/// HTTP client for the `/api/v1` surface.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BotConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.backend_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        decode(response).await
    }

    async fn post<B: Serialize + ?Sized + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        decode(response).await
    }
}

/// Unwraps the `{"success", "data", "error"}` envelope. Non-2xx statuses
/// carry the backend's own error message.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
            .ok()
            .and_then(|r| r.error)
            .map(|e| e.message)
            .unwrap_or_else(|| format!("backend responded with {status}"));
        return Err(AppError::ExternalApiError(message));
    }

    let envelope: ApiResponse<T> = serde_json::from_str(&body)?;
    envelope
        .data
        .ok_or_else(|| AppError::ExternalApiError("backend response has no data".to_string()))
}

#[async_trait]
impl BackendApi for BackendClient {
    async fn register(
        &self,
        telegram_id: &str,
        username: Option<&str>,
    ) -> AppResult<RegisterResponse> {
        let body = RegisterRequest {
            telegram_id: Some(telegram_id.into()),
            username: username.map(str::to_string),
        };
        self.post("/register/", &body).await
    }

    async fn set_consent(&self, telegram_id: &str, given: bool) -> AppResult<ConsentResponse> {
        let body = SetConsentRequest {
            consent_given: given,
        };
        self.post(&format!("/consent/{telegram_id}/"), &body).await
    }

    async fn subscription_plans(&self) -> AppResult<Vec<SubscriptionPlanResponse>> {
        self.get("/subscription-plans/").await
    }

    async fn payment_methods(&self) -> AppResult<Vec<PaymentMethodResponse>> {
        self.get("/payment-methods/").await
    }

    async fn make_payment(
        &self,
        telegram_id: &str,
        request: &MakePaymentRequest,
    ) -> AppResult<PaymentResponse> {
        self.post(&format!("/make-payment/{telegram_id}/"), request).await
    }

    async fn gift_subscription(
        &self,
        telegram_id: &str,
        request: &GiftSubscriptionRequest,
    ) -> AppResult<GiftSubscriptionResponse> {
        self.post(&format!("/gift-subscription/{telegram_id}/"), request).await
    }

    async fn start_support_session(&self, telegram_id: &str) -> AppResult<StartSessionResponse> {
        self.post(
            &format!("/support/start-session/{telegram_id}/"),
            &serde_json::json!({}),
        )
        .await
    }

    async fn send_support_message(
        &self,
        request: &SendMessageRequest,
    ) -> AppResult<SupportMessageResponse> {
        self.post("/support/send-message/", request).await
    }

    async fn material(&self, material_type: MaterialType) -> AppResult<MaterialResponse> {
        self.get(&format!("/materials/{material_type}/")).await
    }

    async fn create_client_card(
        &self,
        telegram_id: &str,
        request: &ClientCardRequest,
    ) -> AppResult<ClientCardResponse> {
        self.post(&format!("/client-cards/{telegram_id}/"), request).await
    }

    async fn submit_feedback(&self, request: &FeedbackRequest) -> AppResult<FeedbackResponse> {
        self.post("/feedback/", request).await
    }

    async fn profile(&self, telegram_id: &str) -> AppResult<ProfileResponse> {
        self.get(&format!("/profile/{telegram_id}/")).await
    }
}
