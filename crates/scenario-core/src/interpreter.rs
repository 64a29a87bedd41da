//! The stack-safe interpreter for [`crate::Scenario`].
//!
//! A scenario is a tree of `Bind`/`HandleError` nodes that can be
//! arbitrarily deep — a scenario built with [`crate::repeat`] grows one
//! `Bind` per iteration of a conversation that may run for the lifetime of
//! a chat. Interpreting it with ordinary recursive calls would eventually
//! blow the native stack, so [`drive`] instead walks an explicit
//! continuation stack (`Vec<Frame>`), the trampoline pattern.

use futures::{Stream, StreamExt};

use scenario_types::{ScenarioError, Update};

use crate::scenario::{AnyBox, Node};
use crate::Scenario;

enum Frame {
    /// A pending `Bind` continuation: applied to a produced value.
    Cont(Box<dyn FnOnce(AnyBox) -> Node + Send>),
    /// A pending `HandleError` recovery: applied to a propagating error.
    /// Passed through untouched when a value, rather than an error, is
    /// unwinding through it.
    Catch(Box<dyn FnOnce(ScenarioError) -> Node + Send>),
}

/// The result of driving a scenario to completion against an update
/// stream.
pub enum Outcome<T> {
    /// The scenario produced a final value.
    Completed(T),
    /// The scenario (or the update stream) ended without producing a
    /// value. This is not an error — it is the normal way a scenario
    /// declines to continue (e.g. `next` not matching, or the update
    /// source being exhausted).
    FellThrough,
    /// The scenario raised an error that was never recovered by a
    /// `handle_error_with` upstream.
    Failed(ScenarioError),
}

enum Step {
    Value(AnyBox),
    Error(ScenarioError),
    FellThrough,
}

/// Run `scenario` to completion, pulling updates from `updates` as needed.
/// Each `Start`/`Next` leaf consumes updates one at a time; `Eval` leaves
/// await their effect future in place. The function returns once the
/// scenario produces a value, falls through, or raises unrecovered.
pub async fn drive<T, S>(scenario: Scenario<T>, updates: &mut S) -> Outcome<T>
where
    T: Send + 'static,
    S: Stream<Item = Update> + Unpin + Send,
{
    let mut stack: Vec<Frame> = Vec::new();
    let mut current = scenario.node;

    loop {
        let step = match current {
            Node::Start(expect) => {
                let mut found = None;
                while let Some(u) = updates.next().await {
                    if let Some(v) = expect.eval(&u) {
                        found = Some(v);
                        break;
                    }
                }
                match found {
                    Some(v) => Step::Value(v),
                    None => Step::FellThrough,
                }
            }
            Node::Next(expect) => match updates.next().await {
                Some(u) => match expect.eval(&u) {
                    Some(v) => Step::Value(v),
                    None => Step::FellThrough,
                },
                None => Step::FellThrough,
            },
            Node::Eval(fut) => match fut.await {
                Ok(v) => Step::Value(v),
                Err(e) => Step::Error(e),
            },
            Node::Pure(v) => Step::Value(v),
            Node::Done => Step::FellThrough,
            Node::Raise(e) => Step::Error(e),
            Node::Bind(inner, k) => {
                stack.push(Frame::Cont(k));
                current = *inner;
                continue;
            }
            Node::HandleError(inner, r) => {
                stack.push(Frame::Catch(r));
                current = *inner;
                continue;
            }
        };

        match step {
            Step::FellThrough => {
                // Fall-through discards every pending continuation and
                // error handler unconditionally — it is not an error
                // unwinding through `Catch` frames, it is the scenario
                // ending.
                return Outcome::FellThrough;
            }
            Step::Value(v) => {
                let mut unwound = None;
                loop {
                    match stack.pop() {
                        None => {
                            let boxed = v.downcast::<T>().unwrap_or_else(|_| {
                                unreachable!(
                                    "scenario type erasure invariant violated: drive downcast mismatch"
                                )
                            });
                            return Outcome::Completed(*boxed);
                        }
                        Some(Frame::Catch(_)) => continue,
                        Some(Frame::Cont(k)) => {
                            unwound = Some(k(v));
                            break;
                        }
                    }
                }
                current = unwound.unwrap_or_else(|| unreachable!());
            }
            Step::Error(e) => {
                let mut unwound = None;
                loop {
                    match stack.pop() {
                        None => return Outcome::Failed(e),
                        Some(Frame::Cont(_)) => continue,
                        Some(Frame::Catch(r)) => {
                            unwound = Some(r(e));
                            break;
                        }
                    }
                }
                current = unwound.unwrap_or_else(|| unreachable!());
            }
        }
    }
}
