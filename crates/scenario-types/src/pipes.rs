//! Update classifiers: total-to-partial projections `Update -> Option<T>`,
//! one per variant. Pure functions — no I/O, no state.
//! Used both internally (the fan-out runtime's [`messages`] pipe finds
//! triggering chats) and by user code building [`crate::Expect`] values.

use crate::{
    CallbackQuery, Chat, ChatKind, ChosenInlineResult, Expect, InlineQuery, Poll,
    PreCheckoutQuery, ShippingQuery, TelegramMessage, Update, UpdateKind,
};

pub fn received_message(u: &Update) -> Option<TelegramMessage> {
    match &u.kind {
        UpdateKind::ReceivedMessage(m) => Some(m.clone()),
        _ => None,
    }
}

pub fn edited_message(u: &Update) -> Option<TelegramMessage> {
    match &u.kind {
        UpdateKind::EditedMessage(m) => Some(m.clone()),
        _ => None,
    }
}

pub fn channel_post(u: &Update) -> Option<TelegramMessage> {
    match &u.kind {
        UpdateKind::ChannelPost(m) => Some(m.clone()),
        _ => None,
    }
}

pub fn edited_channel_post(u: &Update) -> Option<TelegramMessage> {
    match &u.kind {
        UpdateKind::EditedChannelPost(m) => Some(m.clone()),
        _ => None,
    }
}

pub fn poll_update(u: &Update) -> Option<Poll> {
    match &u.kind {
        UpdateKind::PollUpdate(p) => Some(p.clone()),
        _ => None,
    }
}

pub fn inline_query(u: &Update) -> Option<InlineQuery> {
    match &u.kind {
        UpdateKind::ReceivedInlineQuery(q) => Some(q.clone()),
        _ => None,
    }
}

pub fn chosen_inline_result(u: &Update) -> Option<ChosenInlineResult> {
    match &u.kind {
        UpdateKind::ReceivedChosenInlineResult(r) => Some(r.clone()),
        _ => None,
    }
}

pub fn callback_query(u: &Update) -> Option<CallbackQuery> {
    match &u.kind {
        UpdateKind::ReceivedCallbackQuery(q) => Some(q.clone()),
        _ => None,
    }
}

pub fn shipping_query(u: &Update) -> Option<ShippingQuery> {
    match &u.kind {
        UpdateKind::ReceivedShippingQuery(q) => Some(q.clone()),
        _ => None,
    }
}

pub fn pre_checkout_query(u: &Update) -> Option<PreCheckoutQuery> {
    match &u.kind {
        UpdateKind::ReceivedPreCheckoutQuery(q) => Some(q.clone()),
        _ => None,
    }
}

/// Any update that carries a message body (new, edited, channel post, or
/// edited channel post). This is the pipe the fan-out runtime uses to find
/// each update's triggering chat.
pub fn messages(u: &Update) -> Option<TelegramMessage> {
    received_message(u)
        .or_else(|| edited_message(u))
        .or_else(|| channel_post(u))
        .or_else(|| edited_channel_post(u))
}

/// A message-bearing update with non-empty text.
pub fn text(u: &Update) -> Option<(TelegramMessage, String)> {
    let m = messages(u)?;
    let t = m.text.clone()?;
    Some((m, t))
}

/// The chat id of any update that can be attributed to a chat, used by the
/// fan-out runtime to key its per-scenario registry.
pub fn chat_id(u: &Update) -> Option<i64> {
    messages(u).map(|m| m.chat.id)
}

/// Matches a leading `/name` (optionally `@botname`-suffixed) token in a
/// message's text and yields the remaining argument string.
///
/// The single most common trigger predicate in bot scenarios — most start
/// with `start(command("..."))`.
pub fn command(name: &str) -> Expect<String> {
    let name = name.to_string();
    Expect::new(move |u: &Update| {
        let (_, t) = text(u)?;
        let mut parts = t.trim_start().splitn(2, char::is_whitespace);
        let head = parts.next()?;
        let rest = parts.next().unwrap_or("").trim_start().to_string();
        let head = head.strip_prefix('/')?;
        let cmd = head.split('@').next().unwrap_or(head);
        if cmd == name {
            Some(rest)
        } else {
            None
        }
    })
}
