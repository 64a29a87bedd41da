use serde::Serialize;

use scenario_types::Method;

#[derive(Debug, Clone, Serialize)]
pub struct AnswerCallbackQuery {
    pub callback_query_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub show_alert: bool,
}

impl AnswerCallbackQuery {
    pub fn new(callback_query_id: impl Into<String>) -> Self {
        Self { callback_query_id: callback_query_id.into(), text: None, show_alert: false }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn alert(mut self) -> Self {
        self.show_alert = true;
        self
    }
}

impl Method for AnswerCallbackQuery {
    type Response = bool;

    fn name(&self) -> &'static str {
        "answerCallbackQuery"
    }
}
