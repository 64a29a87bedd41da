use serde::{Deserialize, Serialize};

use scenario_types::{Method, TelegramMessage};

/// A flat inline-keyboard description: rows of `(label, callback_data)`
/// pairs. The methods that accept a keyboard only need this much of the
/// markup catalog — an exhaustive DTO catalog is out of scope.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReplyMarkup {
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl SendMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self { chat_id, text: text.into(), reply_markup: None }
    }

    pub fn with_reply_markup(mut self, markup: ReplyMarkup) -> Self {
        self.reply_markup = Some(markup);
        self
    }
}

impl Method for SendMessage {
    type Response = TelegramMessage;

    fn name(&self) -> &'static str {
        "sendMessage"
    }
}
