use std::any::Any;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use scenario_types::{Expect, ScenarioError};

/// A value matched or produced somewhere in a scenario, erased to its
/// dynamic type. The erasure is an implementation detail: every place one
/// is constructed and every place one is downcast are paired by the typed
/// public API below, so the dynamic type always matches.
pub(crate) type AnyBox = Box<dyn Any + Send>;

pub(crate) type EvalFuture = Pin<Box<dyn Future<Output = Result<AnyBox, ScenarioError>> + Send>>;

/// The tagged variant underlying a scenario: `Start | Next | Eval | Pure |
/// Done | Raise | Bind | HandleError`. `Bind`'s continuation and
/// `HandleError`'s recovery are boxed `FnOnce`s rather than a generic field
/// holding `Scenario<A>` for some existential `A` — that's how this sum
/// type is expressed at all in Rust without a GADT encoding; the public
/// [`Scenario<T>`] wrapper is what keeps construction type-safe.
pub(crate) enum Node {
    Start(Expect<AnyBox>),
    Next(Expect<AnyBox>),
    Eval(EvalFuture),
    Pure(AnyBox),
    Done,
    Raise(ScenarioError),
    Bind(Box<Node>, Box<dyn FnOnce(AnyBox) -> Node + Send>),
    HandleError(Box<Node>, Box<dyn FnOnce(ScenarioError) -> Node + Send>),
}

/// A composable, suspendable description of a conversational interaction.
/// Building one (via [`start`], [`next`], [`eval`], …,
/// and [`Scenario::bind`]) performs no I/O; running it against a stream of
/// updates is a separate step (see `scenario-core::interpreter`).
pub struct Scenario<T> {
    pub(crate) node: Node,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Scenario<T> {
    pub(crate) fn from_node(node: Node) -> Self {
        Self { node, _marker: PhantomData }
    }
}

// `Expect::map` requires `T: Send + Sync + 'static` on both ends, but
// `AnyBox = Box<dyn Any + Send>` is not `Sync`. Build the erased closure
// directly instead; `Expect<T>` is `Send + Sync` regardless of `T` (the
// bound lives on the trait object it wraps), so capturing `e` here is fine.
fn erase_expect<T: Send + 'static>(e: Expect<T>) -> Expect<AnyBox> {
    Expect::new(move |u| e.eval(u).map(|v| Box::new(v) as AnyBox))
}

/// Consume updates from the driving stream until one matches `e`; yield the
/// match. If the stream ends first, the scenario ends without producing a
/// value — that is normal fall-through, not an error.
pub fn start<T: Send + 'static>(e: Expect<T>) -> Scenario<T> {
    Scenario::from_node(Node::Start(erase_expect(e)))
}

/// Consume exactly the next update; if it matches `e`, yield it; otherwise
/// the scenario falls through silently.
pub fn next<T: Send + 'static>(e: Expect<T>) -> Scenario<T> {
    Scenario::from_node(Node::Next(erase_expect(e)))
}

/// Run a client effect (an RPC call future); yield its value. A failed
/// future raises in the scenario.
pub fn eval<T, Fut>(effect: Fut) -> Scenario<T>
where
    T: Send + 'static,
    Fut: Future<Output = Result<T, ScenarioError>> + Send + 'static,
{
    let boxed: EvalFuture = Box::pin(async move { effect.await.map(|v| Box::new(v) as AnyBox) });
    Scenario::from_node(Node::Eval(boxed))
}

/// No updates consumed; yields `v`.
pub fn pure<T: Send + 'static>(v: T) -> Scenario<T> {
    Scenario::from_node(Node::Pure(Box::new(v)))
}

/// Terminates the scenario silently without yielding a value.
pub fn done<T: Send + 'static>() -> Scenario<T> {
    Scenario::from_node(Node::Done)
}

/// Raises `err` in the scenario. Recoverable via [`Scenario::handle_error_with`].
pub fn raise<T: Send + 'static>(err: ScenarioError) -> Scenario<T> {
    Scenario::from_node(Node::Raise(err))
}

/// Sequential composition: run `s`, then run `k(a)`. Free-function form;
/// `Scenario::bind` is the same thing as a method.
pub fn bind<A, B, F>(s: Scenario<A>, k: F) -> Scenario<B>
where
    A: Send + 'static,
    B: Send + 'static,
    F: FnOnce(A) -> Scenario<B> + Send + 'static,
{
    s.bind(k)
}

/// If `s` raises, run `r(err)`; otherwise yield `s`'s value. Free-function
/// form of [`Scenario::handle_error_with`].
pub fn handle_error_with<T, F>(s: Scenario<T>, r: F) -> Scenario<T>
where
    T: Send + 'static,
    F: FnOnce(ScenarioError) -> Scenario<T> + Send + 'static,
{
    s.handle_error_with(r)
}

/// Run `make()` repeatedly, folding each iteration onto the next with
/// `bind` so a long-running conversation never recurses on the Rust call
/// stack to build it — each iteration's continuation is only invoked by
/// the interpreter once the previous one has actually completed.
/// Stops (without error) the first time an iteration falls through, and
/// propagates the first raised error, exactly like any other `bind` chain.
pub fn repeat<T, F>(mut make: F) -> Scenario<()>
where
    T: Send + 'static,
    F: FnMut() -> Scenario<T> + Send + 'static,
{
    let body = make();
    body.bind(move |_| repeat(make))
}

impl<T: Send + 'static> Scenario<T> {
    /// Sequential composition: run `self`, then run `k(a)` with the
    /// produced value.
    pub fn bind<U, F>(self, k: F) -> Scenario<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Scenario<U> + Send + 'static,
    {
        let k2 = move |v: AnyBox| {
            let t = *v.downcast::<T>().unwrap_or_else(|_| {
                unreachable!("scenario type erasure invariant violated: bind downcast mismatch")
            });
            k(t).node
        };
        Scenario::from_node(Node::Bind(Box::new(self.node), Box::new(k2)))
    }

    /// Transform a produced value. Built from `bind` + `pure`, not a new
    /// interpreter case.
    pub fn map<U, F>(self, f: F) -> Scenario<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.bind(move |v| pure(f(v)))
    }

    /// If `self` raises, run `r(err)`; otherwise yield `self`'s value.
    pub fn handle_error_with<F>(self, r: F) -> Scenario<T>
    where
        F: FnOnce(ScenarioError) -> Scenario<T> + Send + 'static,
    {
        let r2 = move |e| r(e).node;
        Scenario::from_node(Node::HandleError(Box::new(self.node), Box::new(r2)))
    }

    /// Non-raising variant of [`Scenario::handle_error_with`]: reifies a
    /// raised error as `Err` instead of unwinding further.
    pub fn attempt(self) -> Scenario<Result<T, ScenarioError>> {
        self.map(Ok).handle_error_with(|e| pure(Err(e)))
    }
}
