//! Long-polling update source. Commits its `offset` only once every update
//! in a fetched batch has been handed downstream, so a crash mid-batch
//! redelivers at worst — it never skips an `update_id`.

use std::collections::VecDeque;
use std::time::Duration;

use futures::stream::{self, Stream};
use rand::Rng;
use tokio::time::sleep;
use tracing::warn;

use scenario_methods::GetUpdates;
use scenario_types::Update;

use crate::client::RpcClient;

#[derive(Debug, Clone)]
pub struct PollingConfig {
    pub initial_offset: i64,
    pub limit: i32,
    pub timeout_seconds: i32,
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_offset: 0,
            limit: 100,
            timeout_seconds: 30,
            backoff_base_ms: 1000,
            backoff_cap_ms: 30_000,
        }
    }
}

struct State<C> {
    client: C,
    cfg: PollingConfig,
    offset: i64,
    buffered: VecDeque<Update>,
    pending_offset: Option<i64>,
    failures: u32,
}

/// Long-poll `getUpdates` forever, yielding one update at a time. Empty
/// batches and transport failures never end the stream — only a genuine
/// stream-termination condition upstream (there is none here; a live
/// source runs for the life of the process) would.
pub fn poll_updates<C>(client: C, cfg: PollingConfig) -> impl Stream<Item = Update> + Send
where
    C: RpcClient + Send + Sync + 'static,
{
    let initial = State {
        offset: cfg.initial_offset,
        client,
        cfg,
        buffered: VecDeque::new(),
        pending_offset: None,
        failures: 0,
    };
    stream::unfold(initial, |mut state| async move {
        loop {
            if let Some(update) = state.buffered.pop_front() {
                if state.buffered.is_empty() {
                    if let Some(next_offset) = state.pending_offset.take() {
                        state.offset = next_offset;
                    }
                }
                return Some((update, state));
            }

            let request = GetUpdates {
                offset: state.offset,
                limit: state.cfg.limit,
                timeout: state.cfg.timeout_seconds,
            };
            match state.client.execute(request).await {
                Ok(updates) if updates.is_empty() => {
                    state.failures = 0;
                    continue;
                }
                Ok(updates) => {
                    state.failures = 0;
                    let highest = updates.iter().map(|u| u.update_id).max();
                    state.pending_offset = highest.map(|id| id + 1);
                    state.buffered.extend(updates);
                    continue;
                }
                Err(e) => {
                    state.failures += 1;
                    let delay = backoff_delay(&state.cfg, state.failures);
                    warn!(
                        error = %e,
                        failures = state.failures,
                        delay_ms = delay.as_millis() as u64,
                        "getUpdates failed, backing off",
                    );
                    sleep(delay).await;
                    continue;
                }
            }
        }
    })
}

fn backoff_delay(cfg: &PollingConfig, failures: u32) -> Duration {
    let exponent = failures.saturating_sub(1).min(20);
    let exp = cfg.backoff_base_ms.saturating_mul(1u64 << exponent);
    let capped = exp.min(cfg.backoff_cap_ms);
    let jitter = rand::thread_rng().gen_range(0..=(capped / 4 + 1));
    Duration::from_millis(capped / 2 + jitter)
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use scenario_types::{Chat, ChatKind, TelegramMessage, UpdateKind};

    use crate::mock::MockRpcClient;

    use super::*;

    #[test]
    fn backoff_grows_and_saturates_at_cap() {
        let cfg = PollingConfig { backoff_base_ms: 1000, backoff_cap_ms: 10_000, ..Default::default() };
        let d1 = backoff_delay(&cfg, 1);
        let d5 = backoff_delay(&cfg, 5);
        let d50 = backoff_delay(&cfg, 50);
        assert!(d1.as_millis() <= d5.as_millis());
        assert!(d50.as_millis() as u64 <= cfg.backoff_cap_ms);
    }

    fn update(id: i64) -> Update {
        Update::new(
            id,
            UpdateKind::ReceivedMessage(TelegramMessage {
                message_id: id,
                chat: Chat { id: 1, kind: ChatKind::Private },
                from: None,
                text: None,
            }),
        )
    }

    /// After a batch with ids `[5,6,7]`, the next `getUpdates` call uses
    /// `offset=8`; an empty batch leaves it unchanged.
    #[tokio::test(start_paused = true)]
    async fn offset_advances_only_once_the_batch_is_fully_drained() {
        let client = MockRpcClient::new();
        client.push_ok("getUpdates", vec![update(5), update(6), update(7)]).await;
        client.push_ok("getUpdates", Vec::<Update>::new()).await;

        let cfg = PollingConfig { initial_offset: 0, ..Default::default() };
        let mut stream = Box::pin(poll_updates(client.clone(), cfg));

        for expected_id in [5, 6, 7] {
            let u = stream.next().await.expect("buffered update");
            assert_eq!(u.update_id, expected_id);
        }

        // The whole buffered batch was drained by one `getUpdates` call.
        let calls = client.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1["offset"], 0);

        // Draining the empty batch issues the second call at offset 8, and
        // doesn't resolve until a further response is queued, so park it
        // behind a generous paused-clock timeout rather than block forever.
        let pulled = tokio::time::timeout(Duration::from_secs(3600), stream.next());
        tokio::pin!(pulled);
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(
            futures::poll!(&mut pulled).is_pending(),
            "no further update queued yet"
        );

        let calls = client.calls().await;
        assert_eq!(calls.len(), 2, "second getUpdates call made once the first batch drained");
        assert_eq!(calls[1].1["offset"], 8, "offset advanced past the highest drained id");
    }
}
