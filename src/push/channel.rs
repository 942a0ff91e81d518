use async_trait::async_trait;
use web_push::{
    ContentEncoding, HyperWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
    WebPushError, WebPushMessageBuilder, URL_SAFE_NO_PAD,
};

use super::repo::PushSubscription;
use crate::config::PushConfig;

/// Outcome of a failed delivery. The sweep prunes subscriptions on
/// permanent failures and merely logs transient ones.
#[derive(Debug, thiserror::Error)]
pub enum PushDeliveryError {
    #[error("push endpoint permanently gone: {0}")]
    EndpointGone(String),
    #[error("push delivery failed: {0}")]
    Transient(String),
}

impl PushDeliveryError {
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::EndpointGone(_))
    }
}

/// Wire-level push delivery. Production uses Web Push with VAPID signing;
/// tests substitute a recording fake.
#[async_trait]
pub trait PushChannel: Send + Sync {
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        payload: &str,
    ) -> Result<(), PushDeliveryError>;
}

pub struct WebPushChannel {
    client: HyperWebPushClient,
    vapid_private_key: String,
    vapid_subject: String,
}

impl WebPushChannel {
    pub fn new(config: &PushConfig) -> Self {
        Self {
            client: HyperWebPushClient::new(),
            vapid_private_key: config.vapid_private_key.clone(),
            vapid_subject: config.vapid_subject.clone(),
        }
    }
}

#[async_trait]
impl PushChannel for WebPushChannel {
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        payload: &str,
    ) -> Result<(), PushDeliveryError> {
        let info = SubscriptionInfo::new(
            subscription.endpoint.clone(),
            subscription.p256dh.clone(),
            subscription.auth.clone(),
        );

        let mut sig_builder =
            VapidSignatureBuilder::from_base64(&self.vapid_private_key, URL_SAFE_NO_PAD, &info)
                .map_err(|e| PushDeliveryError::Transient(e.to_string()))?;
        sig_builder.add_claim("sub", self.vapid_subject.clone());
        let signature = sig_builder
            .build()
            .map_err(|e| PushDeliveryError::Transient(e.to_string()))?;

        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_vapid_signature(signature);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload.as_bytes());
        let message = builder
            .build()
            .map_err(|e| PushDeliveryError::Transient(e.to_string()))?;

        self.client.send(message).await.map_err(map_send_error)
    }
}

fn map_send_error(e: WebPushError) -> PushDeliveryError {
    match e {
        WebPushError::EndpointNotFound | WebPushError::EndpointNotValid => {
            PushDeliveryError::EndpointGone(e.to_string())
        }
        other => PushDeliveryError::Transient(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gone_is_permanent() {
        assert!(PushDeliveryError::EndpointGone("410".into()).is_permanent());
        assert!(!PushDeliveryError::Transient("timeout".into()).is_permanent());
    }

    #[test]
    fn endpoint_errors_map_to_permanent_everything_else_transient() {
        assert!(map_send_error(WebPushError::EndpointNotFound).is_permanent());
        assert!(map_send_error(WebPushError::EndpointNotValid).is_permanent());
        assert!(!map_send_error(WebPushError::Unspecified).is_permanent());
        assert!(!map_send_error(WebPushError::InvalidUri).is_permanent());
    }
}
