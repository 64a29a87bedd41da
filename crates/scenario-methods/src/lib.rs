//! Concrete [`scenario_types::Method`] implementations for the subset of
//! the external API this engine needs. Deliberately not an exhaustive DTO
//! catalog — see `DESIGN.md` for what was left out and why.

mod answer_callback_query;
mod edit_message_reply_markup;
mod edit_message_text;
mod get_updates;
mod send_chat_action;
mod send_message;

pub use answer_callback_query::AnswerCallbackQuery;
pub use edit_message_reply_markup::EditMessageReplyMarkup;
pub use edit_message_text::EditMessageText;
pub use get_updates::GetUpdates;
pub use send_chat_action::{ChatAction, SendChatAction};
pub use send_message::{InlineButton, ReplyMarkup, SendMessage};
