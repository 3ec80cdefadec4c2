use aprwatch_core::common::tls::ensure_crypto_provider;
use aprwatch_core::notify::error::NotifyError;
use aprwatch_core::notify::message::AprChange;
use aprwatch_core::notify::port::Notifier;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Default Bot API endpoint.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// # Summary
/// A notifier implementation that sends messages via Telegram Bot API.
///
/// # Invariants
/// * `bot_token` must be valid.
/// * `chat_id` must be accessible by the bot.
pub struct TelegramNotifier {
    /// The Bot API token.
    bot_token: String,
    /// The target Chat ID.
    chat_id: String,
    /// Bot API base URL, without trailing slash.
    api_base: String,
    /// The HTTP client used for requests.
    client: reqwest::Client,
}

/// # Summary
/// Payload structure for Telegram `sendMessage` API.
#[derive(Serialize, Debug)]
pub struct TelegramMessage {
    pub chat_id: String,
    pub text: String,
    pub parse_mode: String,
}

/// # Summary
/// Formats a change as a Telegram Markdown message.
///
/// # Logic
/// 1. Bold headline with the direction emoji.
/// 2. Old, new and signed change as inline code.
/// 3. A link back to the rate page.
pub fn format_message(change: &AprChange) -> String {
    format!(
        "{} *{} Supply APR Changed*\n\nOld APR: `{}%`\nNew APR: `{}%`\nChange: `{}`\n\n[View on {}]({})\n",
        change.emoji(),
        change.market.asset,
        change.previous,
        change.current,
        change.signed_change(),
        change.market.site_name,
        change.market.page_url,
    )
}

impl TelegramNotifier {
    /// # Summary
    /// Creates a new `TelegramNotifier`.
    ///
    /// # Logic
    /// Initializes the struct with provided credentials and an HTTP client
    /// bounded by `timeout`.
    ///
    /// # Arguments
    /// * `bot_token` - The Telegram Bot API token.
    /// * `chat_id` - The target chat ID to send messages to.
    /// * `timeout` - Timeout for the whole request.
    ///
    /// # Returns
    /// * A new instance of `TelegramNotifier`, or `NotifyError::Config` if
    ///   the HTTP client cannot be built.
    pub fn new(bot_token: String, chat_id: String, timeout: Duration) -> Result<Self, NotifyError> {
        ensure_crypto_provider();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            bot_token,
            chat_id,
            api_base: TELEGRAM_API_BASE.to_string(),
            client,
        })
    }

    /// Points the notifier at another Bot API server (local bot API, test double).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn channel(&self) -> &'static str {
        "telegram"
    }

    /// # Summary
    /// Sends a notification to the configured Telegram chat.
    ///
    /// # Logic
    /// 1. Constructs the Telegram API URL.
    /// 2. Formats the change as Markdown.
    /// 3. Sends a POST request to the Telegram API.
    /// 4. Checks the response status and returns success or failure.
    ///
    /// # Returns
    /// * `Ok(())` if the message was sent successfully.
    /// * `Err(NotifyError)` if a network error occurs or the API returns a non-success status.
    async fn notify(&self, change: &AprChange) -> Result<(), NotifyError> {
        let payload = TelegramMessage {
            chat_id: self.chat_id.clone(),
            text: format_message(change),
            parse_mode: "Markdown".to_string(),
        };

        let response = self
            .client
            .post(self.send_message_url())
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NotifyError::Platform(format!(
                "Telegram API error: {}",
                error_text
            )));
        }

        Ok(())
    }
}
