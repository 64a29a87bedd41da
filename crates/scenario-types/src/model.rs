use serde::{Deserialize, Serialize};

/// Discriminates the kind of chat a message arrived on.
///
/// The core only ever branches on this to tell a channel post apart from an
/// ordinary message; it never interprets anything else about a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub kind: ChatKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

/// A message, opaque except for the handful of fields the core and user
/// predicates need: which chat it's on, who sent it, and its text (if any).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub data: Option<String>,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineQuery {
    pub id: String,
    pub from: User,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChosenInlineResult {
    pub result_id: String,
    pub from: User,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,
    pub question: String,
    pub is_closed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingQuery {
    pub id: String,
    pub from: User,
    pub invoice_payload: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreCheckoutQuery {
    pub id: String,
    pub from: User,
    pub invoice_payload: String,
    pub total_amount: i64,
}

/// The payload carried by an [`Update`], one variant per messaging event
/// kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UpdateKind {
    ReceivedMessage(TelegramMessage),
    EditedMessage(TelegramMessage),
    ChannelPost(TelegramMessage),
    EditedChannelPost(TelegramMessage),
    PollUpdate(Poll),
    ReceivedInlineQuery(InlineQuery),
    ReceivedChosenInlineResult(ChosenInlineResult),
    ReceivedCallbackQuery(CallbackQuery),
    ReceivedShippingQuery(ShippingQuery),
    ReceivedPreCheckoutQuery(PreCheckoutQuery),
}

/// One externally delivered event.
///
/// `update_id` is monotonically non-decreasing within a session; update
/// sources must never replay a processed id. `raw` carries the original
/// JSON payload through unchanged, an escape
/// hatch for fields the typed model above doesn't surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub kind: UpdateKind,
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl Update {
    pub fn new(update_id: i64, kind: UpdateKind) -> Self {
        Self { update_id, kind, raw: serde_json::Value::Null }
    }
}
