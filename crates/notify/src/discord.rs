use aprwatch_core::common::tls::ensure_crypto_provider;
use aprwatch_core::notify::error::NotifyError;
use aprwatch_core::notify::message::AprChange;
use aprwatch_core::notify::port::Notifier;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// # Summary
/// A notifier implementation that posts an embed to a Discord webhook.
///
/// # Invariants
/// * `webhook_url` is the full webhook URL, token included.
pub struct DiscordNotifier {
    /// The webhook endpoint.
    webhook_url: String,
    /// The HTTP client used for requests.
    client: reqwest::Client,
}

/// # Summary
/// Body of a webhook execution carrying a single embed.
#[derive(Serialize, Debug)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

#[derive(Serialize, Debug)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
    pub url: String,
}

#[derive(Serialize, Debug)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Serialize, Debug)]
pub struct EmbedFooter {
    pub text: String,
}

impl WebhookPayload {
    /// # Summary
    /// Builds the change embed: title with direction emoji, old/new values in
    /// the description, signed change and new value as inline fields.
    pub fn from_change(change: &AprChange) -> Self {
        let market = &change.market;
        let embed = Embed {
            title: format!(
                "{} {} Supply APR Changed on {}",
                change.emoji(),
                market.asset,
                market.protocol
            ),
            description: format!(
                "The supply APR has changed from **{}%** to **{}%**",
                change.previous, change.current
            ),
            color: change.color(),
            fields: vec![
                EmbedField {
                    name: "Change".to_string(),
                    value: change.signed_change(),
                    inline: true,
                },
                EmbedField {
                    name: "New APR".to_string(),
                    value: format!("{}%", change.current),
                    inline: true,
                },
            ],
            footer: EmbedFooter {
                text: change.checked_at_text(),
            },
            url: market.page_url.clone(),
        };
        Self {
            embeds: vec![embed],
        }
    }
}

impl DiscordNotifier {
    /// # Summary
    /// Creates a new `DiscordNotifier`.
    ///
    /// # Arguments
    /// * `webhook_url` - The Discord webhook URL.
    /// * `timeout` - Timeout for the whole request.
    ///
    /// # Returns
    /// * A new instance, or `NotifyError::Config` if the HTTP client cannot be built.
    pub fn new(webhook_url: String, timeout: Duration) -> Result<Self, NotifyError> {
        ensure_crypto_provider();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            webhook_url,
            client,
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn channel(&self) -> &'static str {
        "discord"
    }

    /// # Summary
    /// Posts the change embed to the webhook.
    ///
    /// # Returns
    /// * `Ok(())` on any 2xx response (Discord answers 204).
    /// * `Err(NotifyError)` on transport failure or a non-success status.
    async fn notify(&self, change: &AprChange) -> Result<(), NotifyError> {
        let payload = WebhookPayload::from_change(change);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NotifyError::Platform(format!(
                "Discord webhook error ({}): {}",
                status, error_text
            )));
        }

        Ok(())
    }
}
