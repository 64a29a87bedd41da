use serde::Serialize;

use scenario_types::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    Typing,
    UploadPhoto,
    RecordVideo,
    UploadVideo,
    RecordVoice,
    UploadVoice,
    UploadDocument,
    FindLocation,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendChatAction {
    pub chat_id: i64,
    pub action: ChatAction,
}

impl SendChatAction {
    pub fn new(chat_id: i64, action: ChatAction) -> Self {
        Self { chat_id, action }
    }
}

impl Method for SendChatAction {
    type Response = bool;

    fn name(&self) -> &'static str {
        "sendChatAction"
    }
}
