use serde::Serialize;

use scenario_types::{Method, TelegramMessage};

use crate::ReplyMarkup;

#[derive(Debug, Clone, Serialize)]
pub struct EditMessageReplyMarkup {
    pub chat_id: i64,
    pub message_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl EditMessageReplyMarkup {
    pub fn new(chat_id: i64, message_id: i64, reply_markup: Option<ReplyMarkup>) -> Self {
        Self { chat_id, message_id, reply_markup }
    }
}

impl Method for EditMessageReplyMarkup {
    type Response = TelegramMessage;

    fn name(&self) -> &'static str {
        "editMessageReplyMarkup"
    }
}
