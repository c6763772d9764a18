use reqwest::Client;
use serde_json::json;

/// Push notifications through an IFTTT webhook.
///
/// Strictly fire-and-forget: a failed or slow delivery must never block or
/// fail trading logic, so errors are logged and swallowed here.
#[derive(Clone)]
pub struct IftttNotifier {
    client: Client,
    base_url: String,
    key: String,
}

const IFTTT_BASE: &str = "https://maker.ifttt.com";

impl IftttNotifier {
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_base_url(IFTTT_BASE, key)
    }

    pub fn with_base_url(base_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            key: key.into(),
        }
    }

    pub async fn notify(&self, message: &str) {
        let url = format!("{}/trigger/cc/with/key/{}", self.base_url, self.key);
        let result = self
            .client
            .post(&url)
            .json(&json!({ "value1": message }))
            .send()
            .await;

        if let Err(e) = result {
            tracing::warn!(error = %e, "notification delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notify_posts_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/trigger/cc/with/key/testkey")
            .match_body(mockito::Matcher::Json(
                serde_json::json!({"value1": "bought eth_jpy"}),
            ))
            .with_status(200)
            .create_async()
            .await;

        let notifier = IftttNotifier::with_base_url(server.url(), "testkey");
        notifier.notify("bought eth_jpy").await;
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_notify_swallows_failure() {
        // Unroutable port: the send fails, notify must still return.
        let notifier = IftttNotifier::with_base_url("http://127.0.0.1:9", "testkey");
        notifier.notify("unreachable").await;
    }
}
