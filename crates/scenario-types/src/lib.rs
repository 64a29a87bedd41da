mod error;
mod expect;
mod method;
mod model;
pub mod pipes;

pub use error::ScenarioError;
pub use expect::Expect;
pub use method::{ApiResponse, ByteSource, InputFile, Method};
pub use model::{
    CallbackQuery, Chat, ChatKind, ChosenInlineResult, InlineQuery, Poll, PreCheckoutQuery,
    ShippingQuery, TelegramMessage, Update, UpdateKind, User,
};
