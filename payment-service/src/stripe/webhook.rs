//! Webhook events and signature verification

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

/// Events older (or newer) than this are rejected
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Stripe event envelope, reduced to what reconciliation reads
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: EventData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub object: EventObject,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventObject {
    #[serde(default)]
    pub id: Option<String>,
}

impl WebhookEvent {
    /// Id of the payment intent the event is about
    pub fn intent_id(&self) -> Option<&str> {
        self.data.object.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Verify Stripe webhook signature (HMAC-SHA256)
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), &'static str> {
    verify_signature_at(payload, sig_header, secret, chrono::Utc::now().timestamp())
}

/// Same as [`verify_webhook_signature`] with an explicit clock (unix seconds)
pub fn verify_signature_at(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    now: i64,
) -> Result<(), &'static str> {
    let mut timestamp = "";
    let mut signatures = Vec::new();
    for part in sig_header.split(',').map(str::trim) {
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }

    if timestamp.is_empty() || signatures.is_empty() {
        return Err("Invalid Stripe-Signature header");
    }

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    // Stripe sends one v1 entry per active secret during rotation
    let matched = signatures.iter().any(|sig| {
        hex::decode(sig).is_ok_and(|bytes| mac.clone().verify_slice(&bytes).is_ok())
    });
    if !matched {
        return Err("Webhook signature mismatch");
    }

    let ts: i64 = timestamp.parse().map_err(|_| "Invalid timestamp")?;
    if (now - ts).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err("Webhook timestamp too old");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const BODY: &[u8] = br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_1"}}}"#;

    fn sign(payload: &[u8], ts: i64) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("{ts}.").as_bytes());
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_valid_signature() {
        let header = format!("t=1000,v1={}", sign(BODY, 1000));
        assert!(verify_signature_at(BODY, &header, SECRET, 1100).is_ok());
    }

    #[test]
    fn accepts_any_matching_v1() {
        let header = format!("t=1000, v1={}, v1={}", "00".repeat(32), sign(BODY, 1000));
        assert!(verify_signature_at(BODY, &header, SECRET, 1000).is_ok());
    }

    #[test]
    fn rejects_tampered_body() {
        let header = format!("t=1000,v1={}", sign(BODY, 1000));
        let tampered = br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_2"}}}"#;
        assert_eq!(
            verify_signature_at(tampered, &header, SECRET, 1000),
            Err("Webhook signature mismatch")
        );
    }

    #[test]
    fn rejects_wrong_secret() {
        let header = format!("t=1000,v1={}", sign(BODY, 1000));
        assert!(verify_signature_at(BODY, &header, "whsec_other", 1000).is_err());
    }

    #[test]
    fn rejects_stale_timestamp() {
        let header = format!("t=1000,v1={}", sign(BODY, 1000));
        assert_eq!(
            verify_signature_at(BODY, &header, SECRET, 1000 + SIGNATURE_TOLERANCE_SECS + 1),
            Err("Webhook timestamp too old")
        );
    }

    #[test]
    fn rejects_malformed_header() {
        assert!(verify_signature_at(BODY, "", SECRET, 0).is_err());
        assert!(verify_signature_at(BODY, "t=1000", SECRET, 1000).is_err());
        assert!(verify_signature_at(BODY, "v1=abcd", SECRET, 1000).is_err());
        assert!(verify_signature_at(BODY, "t=1000,v1=zz", SECRET, 1000).is_err());
    }

    #[test]
    fn event_intent_id() {
        let event: WebhookEvent = serde_json::from_slice(BODY).unwrap();
        assert_eq!(event.event_type, "payment_intent.succeeded");
        assert_eq!(event.intent_id(), Some("pi_1"));

        let bare: WebhookEvent = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(bare.intent_id(), None);
    }
}
