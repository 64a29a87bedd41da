//! HTTP webhook update source: an `axum` state + handler pair that decodes
//! one JSON body per request and forwards it down an unbounded channel,
//! acking with `200 OK` as soon as the update is queued.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::warn;

use scenario_types::Update;

#[derive(Clone)]
pub struct WebhookState {
    tx: mpsc::UnboundedSender<Update>,
}

/// Build a fresh webhook receiver: an `axum` state to mount on a router and
/// the `Update` stream it feeds. The caller picks the route path and port;
/// this only owns the decode-and-forward handler.
pub fn webhook_source() -> (WebhookState, impl Stream<Item = Update> + Send) {
    let (tx, rx) = mpsc::unbounded_channel();
    (WebhookState { tx }, UnboundedReceiverStream::new(rx))
}

/// Mount the webhook handler at `path` on `router`.
pub fn with_webhook_route(router: Router, path: &str, state: WebhookState) -> Router {
    router.route(path, post(webhook_handler)).with_state(state)
}

async fn webhook_handler(State(state): State<WebhookState>, Json(update): Json<Update>) -> StatusCode {
    if state.tx.send(update).is_err() {
        warn!("webhook receiver channel closed, dropping update");
    }
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use scenario_types::{Chat, ChatKind, TelegramMessage, UpdateKind};

    #[tokio::test]
    async fn forwarded_update_surfaces_on_stream() {
        let (state, mut stream) = webhook_source();
        let update = Update::new(
            1,
            UpdateKind::ReceivedMessage(TelegramMessage {
                message_id: 1,
                chat: Chat { id: 1, kind: ChatKind::Private },
                from: None,
                text: Some("hi".into()),
            }),
        );
        state.tx.send(update.clone()).unwrap();
        let received = stream.next().await.unwrap();
        assert_eq!(received, update);
    }
}
