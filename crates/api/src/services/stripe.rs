//! Stripe API client for hosted checkout.
//!
//! Only the two calls the checkout workflow needs: creating a Checkout
//! Session and retrieving one to confirm payment. Requests are form-encoded
//! per the Stripe API convention.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::StripeConfig;

/// Errors that can occur when talking to Stripe.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build or parse a request/response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A line to charge, in display units.
#[derive(Debug, Clone)]
pub struct ChargeLine {
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

/// A created or retrieved Checkout Session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Session identifier (`cs_...`).
    pub id: String,
    /// Hosted payment page URL. Absent once the session completes.
    #[serde(default)]
    pub url: Option<String>,
    /// `paid`, `unpaid`, or `no_payment_required`.
    pub payment_status: String,
    /// `open`, `complete`, or `expired`.
    pub status: String,
}

impl CheckoutSession {
    /// Whether the buyer completed payment.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    api_base: String,
}

impl StripeClient {
    /// Create a new Stripe API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| StripeError::Parse(format!("invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
        })
    }

    /// Create a hosted Checkout Session for the given lines.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Stripe rejects it.
    pub async fn create_checkout_session(
        &self,
        lines: &[ChargeLine],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, StripeError> {
        let params = session_form(lines, success_url, cancel_url)?;

        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.api_base))
            .form(&params)
            .send()
            .await?;

        Self::read_session(response).await
    }

    /// Retrieve an existing Checkout Session by id.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the session doesn't exist.
    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, StripeError> {
        let response = self
            .client
            .get(format!("{}/checkout/sessions/{session_id}", self.api_base))
            .send()
            .await?;

        Self::read_session(response).await
    }

    async fn read_session(response: reqwest::Response) -> Result<CheckoutSession, StripeError> {
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<CheckoutSession>()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))
    }
}

/// Convert a display-unit price to integer cents.
fn to_cents(price: Decimal) -> Option<i64> {
    (price * Decimal::from(100)).round_dp(0).to_i64()
}

/// Build the form parameters for session creation.
fn session_form(
    lines: &[ChargeLine],
    success_url: &str,
    cancel_url: &str,
) -> Result<Vec<(String, String)>, StripeError> {
    let mut params = vec![
        ("mode".to_owned(), "payment".to_owned()),
        ("success_url".to_owned(), success_url.to_owned()),
        ("cancel_url".to_owned(), cancel_url.to_owned()),
    ];

    for (i, line) in lines.iter().enumerate() {
        let cents = to_cents(line.unit_price)
            .ok_or_else(|| StripeError::Parse(format!("price out of range: {}", line.unit_price)))?;

        params.push((format!("line_items[{i}][quantity]"), line.quantity.to_string()));
        params.push((
            format!("line_items[{i}][price_data][currency]"),
            "usd".to_owned(),
        ));
        params.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            cents.to_string(),
        ));
        params.push((
            format!("line_items[{i}][price_data][product_data][name]"),
            line.name.clone(),
        ));
    }

    Ok(params)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_to_cents() {
        assert_eq!(to_cents(dec!(5.50)), Some(550));
        assert_eq!(to_cents(dec!(10.00)), Some(1000));
        assert_eq!(to_cents(dec!(0.01)), Some(1));
    }

    #[test]
    fn test_session_form_layout() {
        let lines = vec![
            ChargeLine {
                name: "Eco Tote".to_owned(),
                unit_price: dec!(10.00),
                quantity: 2,
            },
            ChargeLine {
                name: "Steel Bottle".to_owned(),
                unit_price: dec!(5.50),
                quantity: 1,
            },
        ];

        let params = session_form(&lines, "https://s/ok", "https://s/cancel").unwrap();

        let get = |k: &str| {
            params
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("success_url"), Some("https://s/ok"));
        assert_eq!(get("line_items[0][quantity]"), Some("2"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("1000"));
        assert_eq!(
            get("line_items[1][price_data][product_data][name]"),
            Some("Steel Bottle")
        );
        assert_eq!(get("line_items[1][price_data][unit_amount]"), Some("550"));
    }

    #[test]
    fn test_session_parse() {
        let json = r#"{
            "id": "cs_test_123",
            "url": "https://checkout.stripe.com/c/pay/cs_test_123",
            "payment_status": "unpaid",
            "status": "open"
        }"#;
        let session: CheckoutSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.id, "cs_test_123");
        assert!(!session.is_paid());
    }

    #[test]
    fn test_completed_session_without_url() {
        let json = r#"{"id": "cs_1", "payment_status": "paid", "status": "complete"}"#;
        let session: CheckoutSession = serde_json::from_str(json).unwrap();
        assert!(session.is_paid());
        assert!(session.url.is_none());
    }
}
