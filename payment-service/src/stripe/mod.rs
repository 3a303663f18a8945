//! Stripe integration via REST API (no SDK dependency)

mod webhook;

pub use webhook::{
    EventData, EventObject, SIGNATURE_TOLERANCE_SECS, WebhookEvent, verify_signature_at,
    verify_webhook_signature,
};

use async_trait::async_trait;
use serde_json::Value;
use shared::collaborator::{join_url, unavailable};
use shared::error::{AppError, AppResult};

const COLLABORATOR: &str = "payment";

/// Parameters of a new payment intent
#[derive(Debug, Clone, Copy)]
pub struct IntentRequest<'a> {
    /// Smallest currency unit (cents)
    pub amount_minor: i64,
    pub currency: &'a str,
    pub order_id: &'a str,
    pub user_id: &'a str,
}

/// The parts of a provider intent the service keeps
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create an intent. A refusal is `PaymentProviderError`, an unreachable
    /// provider is `CollaboratorUnavailable`.
    async fn create_intent(&self, req: &IntentRequest<'_>) -> AppResult<PaymentIntent>;
}

/// Stripe payment intents over the REST API
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(
        http: reqwest::Client,
        api_base: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("api_base", &self.api_base)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_intent(&self, req: &IntentRequest<'_>) -> AppResult<PaymentIntent> {
        let url = join_url(&self.api_base, "/v1/payment_intents");
        let amount = req.amount_minor.to_string();
        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&[
                ("amount", amount.as_str()),
                ("currency", req.currency),
                ("metadata[orderId]", req.order_id),
                ("metadata[userId]", req.user_id),
            ])
            .send()
            .await
            .map_err(|e| unavailable(COLLABORATOR, &e))?;

        let status = resp.status();
        if status.is_server_error() {
            tracing::warn!(%status, "Stripe unavailable");
            return Err(AppError::collaborator_unavailable(
                COLLABORATOR,
                format!("payment provider responded with {status}"),
            ));
        }

        if status.is_client_error() {
            // Non-JSON rejections get the generic message
            let body = resp.json::<Value>().await.unwrap_or(Value::Null);
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("Payment provider rejected the request");
            tracing::warn!(%status, reason = message, "Stripe create_intent refused");
            return Err(AppError::payment_provider(message).with_detail("status", status.as_u16()));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| unavailable(COLLABORATOR, &e))?;

        match (body["id"].as_str(), body["client_secret"].as_str()) {
            (Some(id), Some(secret)) => Ok(PaymentIntent {
                id: id.to_string(),
                client_secret: secret.to_string(),
            }),
            _ => Err(AppError::payment_provider(format!(
                "Stripe create_intent failed: {body}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Form, Json, Router};
    use serde_json::json;
    use shared::error::ErrorCode;
    use std::collections::HashMap;
    use std::time::Duration;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base: &str) -> StripeClient {
        let http = shared::collaborator::http_client(Duration::from_millis(500)).unwrap();
        StripeClient::new(http, base, "sk_test_123")
    }

    fn request() -> IntentRequest<'static> {
        IntentRequest {
            amount_minor: 1999,
            currency: "usd",
            order_id: "o1",
            user_id: "u1",
        }
    }

    #[tokio::test]
    async fn sends_form_and_parses_intent() {
        let app = Router::new().route(
            "/v1/payment_intents",
            post(
                |headers: HeaderMap, Form(form): Form<HashMap<String, String>>| async move {
                    let auth = headers["authorization"].to_str().unwrap().to_string();
                    assert!(auth.starts_with("Basic "));
                    assert_eq!(form["amount"], "1999");
                    assert_eq!(form["currency"], "usd");
                    assert_eq!(form["metadata[orderId]"], "o1");
                    assert_eq!(form["metadata[userId]"], "u1");
                    Json(json!({"id": "pi_1", "client_secret": "pi_1_secret_x"}))
                },
            ),
        );
        let base = serve(app).await;

        let intent = client(&base).create_intent(&request()).await.unwrap();
        assert_eq!(
            intent,
            PaymentIntent {
                id: "pi_1".into(),
                client_secret: "pi_1_secret_x".into()
            }
        );
    }

    #[tokio::test]
    async fn card_error_is_provider_error() {
        let app = Router::new().route(
            "/v1/payment_intents",
            post(|| async {
                (
                    StatusCode::PAYMENT_REQUIRED,
                    Json(json!({"error": {"message": "Your card was declined."}})),
                )
            }),
        );
        let base = serve(app).await;

        let err = client(&base).create_intent(&request()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentProviderError);
        assert_eq!(err.message, "Your card was declined.");
    }

    #[tokio::test]
    async fn plain_text_rejection_is_provider_error() {
        let app = Router::new().route(
            "/v1/payment_intents",
            post(|| async { (StatusCode::BAD_REQUEST, "bad request") }),
        );
        let base = serve(app).await;

        let err = client(&base).create_intent(&request()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentProviderError);
        assert_eq!(err.message, "Payment provider rejected the request");
        assert_eq!(err.details.unwrap()["status"], 400);
    }

    #[tokio::test]
    async fn server_error_is_unavailable() {
        let app = Router::new().route(
            "/v1/payment_intents",
            post(|| async { StatusCode::BAD_GATEWAY }),
        );
        let base = serve(app).await;

        let err = client(&base).create_intent(&request()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CollaboratorUnavailable);
    }

    #[tokio::test]
    async fn unreachable_is_unavailable() {
        let err = client("http://127.0.0.1:9")
            .create_intent(&request())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CollaboratorUnavailable);
    }

    #[test]
    fn debug_hides_secret_key() {
        let out = format!("{:?}", client("http://localhost"));
        assert!(!out.contains("sk_test_123"));
    }
}
