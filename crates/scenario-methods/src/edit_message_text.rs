use serde::Serialize;

use scenario_types::{Method, TelegramMessage};

use crate::ReplyMarkup;

#[derive(Debug, Clone, Serialize)]
pub struct EditMessageText {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl EditMessageText {
    pub fn new(chat_id: i64, message_id: i64, text: impl Into<String>) -> Self {
        Self { chat_id, message_id, text: text.into(), reply_markup: None }
    }
}

impl Method for EditMessageText {
    type Response = TelegramMessage;

    fn name(&self) -> &'static str {
        "editMessageText"
    }
}
