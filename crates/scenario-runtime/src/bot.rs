//! The fan-out runtime: one raw update stream is broadcast to every
//! registered scenario kind; each chat gets at most one live instance of a
//! given kind at a time.
//!
//! A cheap handle in front of a task that owns all the shared state,
//! specialized to graceful shutdown rather than command dispatch, since
//! there is no per-call reply to wait on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::{future, stream, Stream, StreamExt};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::warn;

use scenario_core::{drive, Outcome, Scenario};
use scenario_types::{pipes, Expect, Update, UpdateKind};

const TOPIC_CAPACITY: usize = 1024;

type RegistryKey = (&'static str, IsolationKey);

/// The single ordered consumer of the raw topic (the trigger loop) owns the
/// live half of every instance's queue, keyed the same way the "at most one
/// live instance" registry is. An instance is "live" exactly when its key
/// has an entry here.
type Registry = Arc<Mutex<HashMap<RegistryKey, mpsc::UnboundedSender<Update>>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum IsolationKey {
    Chat(i64),
    Unscoped(u64),
}

static UNSCOPED_SEQ: AtomicU64 = AtomicU64::new(0);

/// The chat a scenario instance can be de-duplicated on, or `Unscoped` for
/// updates that carry no chat (inline queries, shipping/pre-checkout
/// queries, and callback queries whose originating message is unknown) —
/// each of those always gets its own fresh instance, since there is no
/// chat to key re-entry protection on.
fn isolation_key(update: &Update) -> IsolationKey {
    if let Some(chat_id) = pipes::chat_id(update) {
        return IsolationKey::Chat(chat_id);
    }
    if let UpdateKind::ReceivedCallbackQuery(cb) = &update.kind {
        if let Some(m) = &cb.message {
            return IsolationKey::Chat(m.chat.id);
        }
    }
    IsolationKey::Unscoped(UNSCOPED_SEQ.fetch_add(1, Ordering::Relaxed))
}

struct Registration {
    name: &'static str,
    trigger: Expect<()>,
    factory: Arc<dyn Fn() -> Scenario<()> + Send + Sync>,
}

/// A registry of scenario kinds, driven against one update stream.
///
/// Each call to [`Bot::register`] adds a scenario kind: a `trigger`
/// (usually the same [`Expect`] its own `start` opens with) that decides
/// which updates may spawn a fresh instance, and a `factory` that builds
/// one. Building is cheap and side-effect free — a fresh, single-use
/// [`Scenario`] tree per chat, since a Rust future cannot be replayed the
/// way a reusable effect value could be.
pub struct Bot {
    registrations: Vec<Registration>,
    topic: broadcast::Sender<Update>,
}

impl Default for Bot {
    fn default() -> Self {
        Self::new()
    }
}

impl Bot {
    pub fn new() -> Self {
        let (topic, _) = broadcast::channel(TOPIC_CAPACITY);
        Self { registrations: Vec::new(), topic }
    }

    pub fn register<T, F>(&mut self, name: &'static str, trigger: Expect<T>, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn() -> Scenario<()> + Send + Sync + 'static,
    {
        let trigger = trigger.map(|_| ());
        self.registrations.push(Registration { name, trigger, factory: Arc::new(factory) });
    }

    /// Subscribe to the raw update topic before [`Bot::run`] starts, so no
    /// update published once the ingest task starts running can be missed
    /// by a subscriber set up ahead of time.
    pub fn subscribe(&self) -> broadcast::Receiver<Update> {
        self.topic.subscribe()
    }

    /// Start fanning `updates` out to every registered scenario kind.
    /// Returns a [`BotHandle`] that can be used to shut the runtime down.
    pub fn run<S>(self, updates: S) -> BotHandle
    where
        S: Stream<Item = Update> + Send + Unpin + 'static,
    {
        let topic_tx = self.topic;
        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        let registrations = Arc::new(self.registrations);
        let registry: Registry = Arc::new(Mutex::new(HashMap::new()));

        // Subscribed before the ingest task starts publishing, so the
        // trigger loop is the single ordered consumer of every update from
        // the very first one — no update can slip past it the way a
        // per-instance `topic.subscribe()` created after the fact could.
        let trigger_incoming = topic_tx.subscribe();

        let ingest =
            tokio::spawn(run_ingest(updates, topic_tx.clone(), shutdown_tx.clone()));
        let trigger = tokio::spawn(run_trigger_loop(
            registrations,
            registry,
            trigger_incoming,
            shutdown_tx.subscribe(),
        ));

        BotHandle { shutdown_tx, topic: topic_tx, ingest, trigger }
    }
}

/// A handle to a running [`Bot`]. Dropping it leaves the runtime running;
/// call [`BotHandle::shutdown`] to stop it and wait for in-flight work to
/// observe the signal.
///
/// Mirrors `ControlService`'s `AgentHandle`: a cheap handle in front of the
/// task that owns the shared state, with [`BotHandle::subscribe`] playing
/// the same role as `AgentHandle::subscribe` does for control events.
pub struct BotHandle {
    shutdown_tx: broadcast::Sender<()>,
    topic: broadcast::Sender<Update>,
    ingest: JoinHandle<()>,
    trigger: JoinHandle<()>,
}

impl BotHandle {
    /// Observe every update the bot ingests, in source order, same as
    /// every registered scenario's trigger loop does. A subscription only
    /// sees updates published after it is created — late subscribers do
    /// not get a replay.
    pub fn subscribe(&self) -> broadcast::Receiver<Update> {
        self.topic.subscribe()
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.ingest.await;
        let _ = self.trigger.await;
    }
}

/// Drain `updates`, publishing each into `topic` and re-emitting it so
/// downstream observers still see it. When the source itself ends, fires
/// `shutdown_tx` so the trigger loop (and, transitively, every instance
/// task driven off it) winds down too — exhaustion of the update source is
/// a clean termination of the whole bot, not just of this task.
async fn run_ingest<S>(
    updates: S,
    topic: broadcast::Sender<Update>,
    shutdown_tx: broadcast::Sender<()>,
) where
    S: Stream<Item = Update> + Send + Unpin,
{
    let mut shutdown = shutdown_tx.subscribe();
    tokio::pin!(updates);
    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            item = updates.next() => match item {
                Some(update) => { let _ = topic.send(update); }
                None => {
                    let _ = shutdown_tx.send(());
                    break;
                }
            },
        }
    }
}

/// The single ordered consumer of the raw topic. For every update it either
/// forwards it to the queue of an already-live instance for that
/// `(scenario, key)` pair, or — if none is live and the update matches that
/// scenario's trigger — spawns a fresh instance and registers its queue.
///
/// Doing both jobs from the same consumer is what keeps every update
/// delivered: there is no window between "an instance is live" and "that
/// instance is subscribed" in which a message for its chat can be
/// published and lost, because the instance never subscribes to the topic
/// at all — it only ever reads from the queue this loop feeds it.
async fn run_trigger_loop(
    registrations: Arc<Vec<Registration>>,
    registry: Registry,
    mut incoming: broadcast::Receiver<Update>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        let update = tokio::select! {
            _ = shutdown.recv() => break,
            item = incoming.recv() => match item {
                Ok(update) => update,
                Err(broadcast::error::RecvError::Closed) => break,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "trigger loop lagged behind the update topic");
                    continue;
                }
            },
        };

        let key_value = isolation_key(&update);
        for reg in registrations.iter() {
            let key = (reg.name, key_value);
            let mut guard = registry.lock().await;
            if let Some(tx) = guard.get(&key) {
                if tx.send(update.clone()).is_ok() {
                    // Routed to the live instance; this update is not also
                    // a fresh trigger for the same scenario kind.
                    continue;
                }
                // The instance finished (or was cancelled) between our
                // lookup and the send; its key is stale, so drop it and
                // fall through to trigger matching below for this update.
                guard.remove(&key);
            }

            if reg.trigger.eval(&update).is_none() {
                continue;
            }

            let (queue_tx, queue_rx) = mpsc::unbounded_channel::<Update>();
            guard.insert(key, queue_tx);
            drop(guard);

            spawn_instance(reg.factory.clone(), reg.name, update.clone(), queue_rx, registry.clone(), key);
        }
    }
}

fn spawn_instance(
    factory: Arc<dyn Fn() -> Scenario<()> + Send + Sync>,
    name: &'static str,
    first: Update,
    queue_rx: mpsc::UnboundedReceiver<Update>,
    registry: Registry,
    key: RegistryKey,
) {
    tokio::spawn(async move {
        let mut joined =
            stream::once(future::ready(first)).chain(UnboundedReceiverStream::new(queue_rx));
        let scenario = factory();
        match drive(scenario, &mut joined).await {
            Outcome::Failed(e) => warn!(scenario = name, error = %e, "scenario instance failed"),
            Outcome::Completed(()) | Outcome::FellThrough => {}
        }

        registry.lock().await.remove(&key);
    });
}
