//! The scenario algebra: a small monadic language for describing
//! multi-step conversations, plus the stack-safe interpreter that runs one
//! against a stream of updates.

mod interpreter;
mod scenario;

pub use interpreter::{drive, Outcome};
pub use scenario::{bind, done, eval, handle_error_with, next, pure, raise, repeat, start, Scenario};

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use scenario_types::{pipes, Chat, ChatKind, Expect, ScenarioError, TelegramMessage, Update, UpdateKind};

    fn text_update(id: i64, chat_id: i64, text: &str) -> Update {
        Update::new(
            id,
            UpdateKind::ReceivedMessage(TelegramMessage {
                message_id: id,
                chat: Chat { id: chat_id, kind: ChatKind::Private },
                from: None,
                text: Some(text.to_string()),
            }),
        )
    }

    fn any_text() -> Expect<String> {
        Expect::new(|u: &Update| pipes::text(u).map(|(_, t)| t))
    }

    async fn run<T: Send + 'static>(s: Scenario<T>, updates: Vec<Update>) -> Outcome<T> {
        let mut st = stream::iter(updates);
        drive(s, &mut st).await
    }

    #[tokio::test]
    async fn pure_completes_without_consuming_updates() {
        let outcome = run(pure(42), vec![]).await;
        assert!(matches!(outcome, Outcome::Completed(42)));
    }

    #[tokio::test]
    async fn done_falls_through() {
        let outcome: Outcome<()> = run(done(), vec![text_update(1, 1, "hi")]).await;
        assert!(matches!(outcome, Outcome::FellThrough));
    }

    #[tokio::test]
    async fn start_skips_non_matching_updates_until_match() {
        let s = start(any_text());
        let updates = vec![text_update(1, 1, "hi")];
        let outcome = run(s, updates).await;
        match outcome {
            Outcome::Completed(t) => assert_eq!(t, "hi"),
            _ => panic!("expected completion"),
        }
    }

    #[tokio::test]
    async fn start_falls_through_when_stream_exhausted() {
        let s = start(any_text());
        let outcome = run(s, vec![]).await;
        assert!(matches!(outcome, Outcome::FellThrough));
    }

    #[tokio::test]
    async fn next_falls_through_on_immediate_mismatch() {
        let no_match: Expect<String> = Expect::new(|_: &Update| None);
        let s = next(no_match);
        let outcome = run(s, vec![text_update(1, 1, "hi")]).await;
        assert!(matches!(outcome, Outcome::FellThrough));
    }

    #[tokio::test]
    async fn bind_threads_value_through_continuation() {
        let s = pure(1).bind(|v| pure(v + 1)).bind(|v| pure(v * 10));
        let outcome = run(s, vec![]).await;
        match outcome {
            Outcome::Completed(v) => assert_eq!(v, 20),
            _ => panic!("expected completion"),
        }
    }

    #[tokio::test]
    async fn left_identity_law() {
        let f = |v: i32| pure(v + 1);
        let direct = run(f(5), vec![]).await;
        let bound = run(pure(5).bind(f), vec![]).await;
        match (direct, bound) {
            (Outcome::Completed(a), Outcome::Completed(b)) => assert_eq!(a, b),
            _ => panic!("expected both to complete"),
        }
    }

    #[tokio::test]
    async fn right_identity_law() {
        let s = pure(7).bind(pure);
        let outcome = run(s, vec![]).await;
        match outcome {
            Outcome::Completed(v) => assert_eq!(v, 7),
            _ => panic!("expected completion"),
        }
    }

    #[tokio::test]
    async fn associativity_law() {
        let f = |v: i32| pure(v + 1);
        let g = |v: i32| pure(v * 2);
        let left = pure(3).bind(f).bind(g);
        let right = pure(3).bind(move |v| f(v).bind(g));
        let (lo, ro) = (run(left, vec![]).await, run(right, vec![]).await);
        match (lo, ro) {
            (Outcome::Completed(a), Outcome::Completed(b)) => assert_eq!(a, b),
            _ => panic!("expected both to complete"),
        }
    }

    #[tokio::test]
    async fn fall_through_short_circuits_past_pending_binds_and_catches() {
        let s = done::<i32>()
            .handle_error_with(|_| pure(-1))
            .bind(|v| pure(v + 1));
        let outcome = run(s, vec![]).await;
        assert!(matches!(outcome, Outcome::FellThrough));
    }

    #[tokio::test]
    async fn raised_error_propagates_past_pending_binds_to_handler() {
        let s = raise::<i32>(ScenarioError::raised("boom"))
            .bind(|v| pure(v + 1))
            .handle_error_with(|_| pure(99));
        let outcome = run(s, vec![]).await;
        match outcome {
            Outcome::Completed(v) => assert_eq!(v, 99),
            _ => panic!("expected recovery"),
        }
    }

    #[tokio::test]
    async fn unhandled_error_surfaces_as_failed() {
        let s = raise::<i32>(ScenarioError::raised("boom"));
        let outcome = run(s, vec![]).await;
        assert!(matches!(outcome, Outcome::Failed(_)));
    }

    #[tokio::test]
    async fn attempt_reifies_error_as_result() {
        let s = raise::<i32>(ScenarioError::raised("boom")).attempt();
        let outcome = run(s, vec![]).await;
        match outcome {
            Outcome::Completed(Err(_)) => {}
            _ => panic!("expected reified error"),
        }
    }

    #[tokio::test]
    async fn repeat_runs_until_a_fall_through() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let count = Arc::new(AtomicUsize::new(0));
        let updates = vec![
            text_update(1, 1, "/ping"),
            text_update(2, 1, "/ping"),
            text_update(3, 1, "/stop"),
        ];

        let c = count.clone();
        let s = repeat(move || {
            let c = c.clone();
            start(pipes::command("ping")).map(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            })
        });

        let outcome = run(s, updates).await;
        assert!(matches!(outcome, Outcome::FellThrough));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn eval_surfaces_effect_value() {
        let s = eval(async { Ok::<_, ScenarioError>(5) }).bind(|v| pure(v + 1));
        let outcome = run(s, vec![]).await;
        match outcome {
            Outcome::Completed(v) => assert_eq!(v, 6),
            _ => panic!("expected completion"),
        }
    }

    #[tokio::test]
    async fn eval_failure_raises() {
        let s: Scenario<i32> = eval(async { Err(ScenarioError::raised("down")) });
        let outcome = run(s, vec![]).await;
        assert!(matches!(outcome, Outcome::Failed(_)));
    }
}
