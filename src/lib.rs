//! A compositional scenario engine for building multi-step, per-chat
//! conversational bots against a hosted messaging-bot HTTP API.
//!
//! A [`Scenario`] describes one conversation as a small monadic program —
//! wait for a trigger, evaluate an API call, branch on what came back,
//! repeat — without touching any transport concern. [`Bot`] drives any
//! number of registered scenario kinds against a live update stream, at
//! most one instance per chat per kind at a time.
//!
//! ```no_run
//! use scenario_bot::{pipes, pure, start, Bot};
//!
//! # async fn run() {
//! let mut bot = Bot::new();
//! bot.register("greet", pipes::command("start"), || {
//!     start(pipes::command("start")).bind(|_| pure(()))
//! });
//! # }
//! ```

pub use scenario_config::{load as load_config, Config, ConfigError};
pub use scenario_core::{bind, done, drive, eval, handle_error_with, next, pure, raise, repeat, Outcome, Scenario};
pub use scenario_methods::{
    AnswerCallbackQuery, ChatAction, EditMessageReplyMarkup, EditMessageText, GetUpdates,
    InlineButton, ReplyMarkup, SendChatAction, SendMessage,
};
pub use scenario_runtime::{Bot, BotHandle};
pub use scenario_transport::{
    poll_updates, webhook_source, with_webhook_route, HttpRpcClient, MockRpcClient, PollingConfig,
    RpcClient, WebhookState,
};
pub use scenario_types::{
    pipes, ApiResponse, ByteSource, CallbackQuery, Chat, ChatKind, ChosenInlineResult, Expect,
    InlineQuery, InputFile, Method, Poll, PreCheckoutQuery, ScenarioError, ShippingQuery,
    TelegramMessage, Update, UpdateKind, User,
};

/// Install a `tracing` subscriber reading `RUST_LOG` (or `info` if unset).
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
