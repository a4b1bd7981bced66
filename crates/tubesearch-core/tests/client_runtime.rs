use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;
use tubesearch_core::adapters::{AdapterResult, SearchService};
use tubesearch_core::identity::{IdentityProvider, SignInPrompt, StaticIdentity};
use tubesearch_core::models::{
    BackendDescriptor, BackendVariant, CoreError, CoreErrorKind, ResultList, SearchRequest,
    SearchResultItem, Session, SessionUser, SignInAttempt,
};
use tubesearch_core::orchestration::{CancellationToken, ClientRuntime, RuntimeEvent};
use tubesearch_core::registry::backend_descriptor;
use tubesearch_core::session::SessionContext;
use tubesearch_core::view::{ResultsPane, SearchView, ViewPhase};

const EVENT_WAIT: Duration = Duration::from_secs(5);

/// Echoes the query back as a single item; queries starting with `slow` take
/// noticeably longer than the rest.
#[derive(Default)]
struct EchoService {
    calls: AtomicUsize,
}

impl SearchService for EchoService {
    fn descriptor(&self) -> &BackendDescriptor {
        backend_descriptor(BackendVariant::Agent)
    }

    fn search(&self, request: &SearchRequest) -> AdapterResult<ResultList> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.query.starts_with("slow") {
            std::thread::sleep(Duration::from_millis(300));
        }
        Ok(ResultList::new(vec![SearchResultItem {
            id: request.query.clone(),
            title: request.query.clone(),
            description: String::new(),
            channel: None,
            channel_id: None,
        }]))
    }
}

/// Never confirms on its own; only cancellation ends the flow.
struct PendingIdentity;

impl IdentityProvider for PendingIdentity {
    fn provider_id(&self) -> &str {
        "pending"
    }

    fn begin_sign_in(&self) -> AdapterResult<SignInPrompt> {
        Ok(SignInPrompt::Ready)
    }

    fn complete_sign_in(
        &self,
        _prompt: &SignInPrompt,
        cancel: &CancellationToken,
    ) -> AdapterResult<Session> {
        if cancel.wait_timeout(Duration::from_secs(30)) {
            Err(CoreError::new(CoreErrorKind::Cancelled, "cancelled"))
        } else {
            Err(CoreError::new(CoreErrorKind::Timeout, "never confirmed"))
        }
    }

    fn sign_out(&self, _session: &Session) -> AdapterResult<()> {
        Ok(())
    }
}

/// Blocks inside a poll that does not look at the cancellation token. The
/// first attempt comes back cancelled after 300ms, later attempts sign in
/// after 600ms.
#[derive(Default)]
struct SlowPollIdentity {
    attempts: AtomicUsize,
}

impl IdentityProvider for SlowPollIdentity {
    fn provider_id(&self) -> &str {
        "slow-poll"
    }

    fn begin_sign_in(&self) -> AdapterResult<SignInPrompt> {
        Ok(SignInPrompt::Ready)
    }

    fn complete_sign_in(
        &self,
        _prompt: &SignInPrompt,
        _cancel: &CancellationToken,
    ) -> AdapterResult<Session> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            std::thread::sleep(Duration::from_millis(300));
            return Err(CoreError::new(CoreErrorKind::Cancelled, "cancelled"));
        }
        std::thread::sleep(Duration::from_millis(600));
        Ok(Session::new(
            "slow-poll",
            SessionUser {
                name: "Ada".to_string(),
                image: None,
            },
            Some("tok".to_string()),
        ))
    }

    fn sign_out(&self, _session: &Session) -> AdapterResult<()> {
        Ok(())
    }
}

fn static_identity() -> Arc<dyn IdentityProvider> {
    Arc::new(StaticIdentity::new("Ada", None, Some("tok".to_string())))
}

async fn next_event(receiver: &mut UnboundedReceiver<RuntimeEvent>) -> RuntimeEvent {
    timeout(EVENT_WAIT, receiver.recv())
        .await
        .expect("timed out waiting for runtime event")
        .expect("runtime event channel closed")
}

async fn sign_in(runtime: &ClientRuntime, receiver: &mut UnboundedReceiver<RuntimeEvent>, view: &mut SearchView) {
    let attempt = view.begin_sign_in().expect("sign-in should start from the gate");
    runtime.dispatch_sign_in(attempt);
    loop {
        match next_event(receiver).await {
            RuntimeEvent::SignInPrompt { attempt, prompt } => view.show_sign_in_prompt(attempt, prompt),
            RuntimeEvent::SignInFinished { attempt, outcome } => {
                view.finish_sign_in(attempt, outcome);
                break;
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn static_sign_in_reaches_logged_in() {
    let (runtime, mut receiver) =
        ClientRuntime::new(Handle::current(), Arc::new(EchoService::default()), static_identity());
    let context = Arc::new(SessionContext::new());
    let mut view = SearchView::new(context.clone());

    sign_in(&runtime, &mut receiver, &mut view).await;

    assert_eq!(view.phase(), ViewPhase::LoggedIn);
    let session = context.get().unwrap().unwrap();
    assert_eq!(session.user.name, "Ada");
    assert_eq!(session.bearer_token(), Some("tok"));
}

#[tokio::test(flavor = "multi_thread")]
async fn only_latest_overlapping_search_is_applied() {
    let service = Arc::new(EchoService::default());
    let (runtime, mut receiver) =
        ClientRuntime::new(Handle::current(), service.clone(), static_identity());
    let mut view = SearchView::new(Arc::new(SessionContext::new()));
    sign_in(&runtime, &mut receiver, &mut view).await;

    view.set_query("slow first");
    runtime.dispatch_search(view.submit().unwrap());
    view.set_query("fast second");
    runtime.dispatch_search(view.submit().unwrap());

    let mut applied = Vec::new();
    for _ in 0..2 {
        let RuntimeEvent::SearchFinished { seq, outcome } = next_event(&mut receiver).await else {
            panic!("expected a search result");
        };
        applied.push(view.apply(seq, outcome));
    }

    assert_eq!(service.calls.load(Ordering::SeqCst), 2);
    assert_eq!(applied.iter().filter(|applied| **applied).count(), 1);
    let ResultsPane::Results(results) = view.pane() else {
        panic!("expected results");
    };
    assert_eq!(results.ids().collect::<Vec<_>>(), vec!["fast second"]);
    assert!(!view.is_searching());
}

#[tokio::test(flavor = "multi_thread")]
async fn logout_discards_late_response() {
    let (runtime, mut receiver) =
        ClientRuntime::new(Handle::current(), Arc::new(EchoService::default()), static_identity());
    let context = Arc::new(SessionContext::new());
    let mut view = SearchView::new(context.clone());
    sign_in(&runtime, &mut receiver, &mut view).await;

    view.set_query("slow query");
    runtime.dispatch_search(view.submit().unwrap());
    let session = view.logout().unwrap();
    runtime.dispatch_sign_out(session);

    let mut saw_search = false;
    for _ in 0..2 {
        match next_event(&mut receiver).await {
            RuntimeEvent::SearchFinished { seq, outcome } => {
                saw_search = true;
                assert!(!view.apply(seq, outcome));
            }
            RuntimeEvent::SignedOut(outcome) => assert!(outcome.is_ok()),
            other => panic!("unexpected event {other:?}"),
        }
    }

    assert!(saw_search);
    assert_eq!(view.phase(), ViewPhase::LoggedOut);
    assert_eq!(view.pane(), &ResultsPane::Empty);
    assert!(!context.is_authenticated());
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelled_sign_in_stays_logged_out() {
    let (runtime, mut receiver) = ClientRuntime::new(
        Handle::current(),
        Arc::new(EchoService::default()),
        Arc::new(PendingIdentity),
    );
    let mut view = SearchView::new(Arc::new(SessionContext::new()));

    let attempt = view.begin_sign_in().unwrap();
    runtime.dispatch_sign_in(attempt);
    let RuntimeEvent::SignInPrompt { attempt, prompt } = next_event(&mut receiver).await else {
        panic!("expected a prompt");
    };
    view.show_sign_in_prompt(attempt, prompt);

    view.cancel_sign_in();
    runtime.cancel_sign_in();

    let RuntimeEvent::SignInFinished { attempt, outcome } = next_event(&mut receiver).await else {
        panic!("expected sign-in to finish");
    };
    assert_eq!(outcome.as_ref().unwrap_err().kind, CoreErrorKind::Cancelled);
    view.finish_sign_in(attempt, outcome);
    assert_eq!(view.phase(), ViewPhase::LoggedOut);
}

#[tokio::test(flavor = "multi_thread")]
async fn late_result_of_cancelled_sign_in_does_not_end_the_retry() {
    let (runtime, mut receiver) = ClientRuntime::new(
        Handle::current(),
        Arc::new(EchoService::default()),
        Arc::new(SlowPollIdentity::default()),
    );
    let context = Arc::new(SessionContext::new());
    let mut view = SearchView::new(context.clone());

    let first = view.begin_sign_in().unwrap();
    runtime.dispatch_sign_in(first);
    let RuntimeEvent::SignInPrompt { attempt, prompt } = next_event(&mut receiver).await else {
        panic!("expected a prompt");
    };
    view.show_sign_in_prompt(attempt, prompt);

    view.cancel_sign_in();
    runtime.cancel_sign_in();
    let second = view.begin_sign_in().unwrap();
    runtime.dispatch_sign_in(second);

    let mut finished = Vec::<SignInAttempt>::new();
    while finished.len() < 2 {
        match next_event(&mut receiver).await {
            RuntimeEvent::SignInPrompt { attempt, prompt } => {
                view.show_sign_in_prompt(attempt, prompt)
            }
            RuntimeEvent::SignInFinished { attempt, outcome } => {
                finished.push(attempt);
                view.finish_sign_in(attempt, outcome);
                if attempt == first {
                    assert_eq!(view.phase(), ViewPhase::SigningIn);
                }
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    assert_eq!(finished, vec![first, second]);
    assert_eq!(view.phase(), ViewPhase::LoggedIn);
    assert!(context.is_authenticated());
}
