use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::adapters::{AdapterResult, SearchService, search_with_validation};
use crate::identity::{IdentityProvider, SignInPrompt};
use crate::models::{
    CoreError, CoreErrorKind, Operation, RequestSeq, ResultList, SearchTicket, Session,
    SignInAttempt,
};
use crate::orchestration::CancellationToken;
use crate::request_context::with_request_seq;

/// Completion notices delivered back to the UI thread.
#[derive(Debug)]
pub enum RuntimeEvent {
    SearchFinished {
        seq: RequestSeq,
        outcome: AdapterResult<ResultList>,
    },
    SignInPrompt {
        attempt: SignInAttempt,
        prompt: SignInPrompt,
    },
    SignInFinished {
        attempt: SignInAttempt,
        outcome: AdapterResult<Session>,
    },
    SignedOut(AdapterResult<()>),
}

/// Runs blocking backend and identity calls off the UI thread.
///
/// Every dispatch returns immediately; results arrive as [`RuntimeEvent`]s on
/// the receiver handed out by [`ClientRuntime::new`]. Ordering between
/// dispatches is not guaranteed, which is why searches carry a sequence.
pub struct ClientRuntime {
    handle: Handle,
    service: Arc<dyn SearchService>,
    identity: Arc<dyn IdentityProvider>,
    events: UnboundedSender<RuntimeEvent>,
    sign_in_cancel: Mutex<Option<CancellationToken>>,
}

impl ClientRuntime {
    pub fn new(
        handle: Handle,
        service: Arc<dyn SearchService>,
        identity: Arc<dyn IdentityProvider>,
    ) -> (Self, UnboundedReceiver<RuntimeEvent>) {
        let (events, receiver) = unbounded_channel();
        let runtime = Self {
            handle,
            service,
            identity,
            events,
            sign_in_cancel: Mutex::new(None),
        };
        (runtime, receiver)
    }

    pub fn dispatch_search(&self, ticket: SearchTicket) {
        let service = self.service.clone();
        let events = self.events.clone();
        let SearchTicket { seq, request } = ticket;
        let variant = service.descriptor().variant;

        tracing::debug!(request_seq = seq.0, backend = variant.as_str(), "dispatching search");
        let worker = self.handle.spawn_blocking(move || {
            with_request_seq(seq, || search_with_validation(service.as_ref(), &request))
        });

        self.handle.spawn(async move {
            let outcome = worker.await.unwrap_or_else(|join_error| {
                Err(join_failure(Operation::Search, join_error).backend(variant))
            });
            match &outcome {
                Ok(items) => {
                    tracing::info!(request_seq = seq.0, results = items.len(), "search finished")
                }
                Err(error) => {
                    tracing::warn!(request_seq = seq.0, kind = ?error.kind, error = %error.message, "search failed")
                }
            }
            deliver(&events, RuntimeEvent::SearchFinished { seq, outcome });
        });
    }

    /// Starts sign-in. Emits `SignInPrompt` once the provider knows what the
    /// user has to do, then `SignInFinished` when the flow ends. Both carry
    /// `attempt` so a cancelled attempt that reports late can be told apart.
    pub fn dispatch_sign_in(&self, attempt: SignInAttempt) {
        let cancel = CancellationToken::new();
        if let Some(previous) = self.replace_sign_in_cancel(Some(cancel.clone())) {
            previous.cancel();
        }

        let identity = self.identity.clone();
        let events = self.events.clone();
        let provider = identity.provider_id().to_string();
        tracing::info!(provider = %provider, %attempt, "sign-in started");

        let prompt_events = events.clone();
        let worker = self.handle.spawn_blocking(move || {
            let prompt = identity.begin_sign_in()?;
            deliver(
                &prompt_events,
                RuntimeEvent::SignInPrompt {
                    attempt,
                    prompt: prompt.clone(),
                },
            );
            identity.complete_sign_in(&prompt, &cancel)
        });

        self.handle.spawn(async move {
            let outcome = worker
                .await
                .unwrap_or_else(|join_error| Err(join_failure(Operation::SignIn, join_error)));
            match &outcome {
                Ok(session) => tracing::info!(provider = %provider, %attempt, user = %session.user.name, "signed in"),
                Err(error) => tracing::warn!(provider = %provider, %attempt, kind = ?error.kind, error = %error.message, "sign-in did not complete"),
            }
            deliver(&events, RuntimeEvent::SignInFinished { attempt, outcome });
        });
    }

    pub fn cancel_sign_in(&self) {
        if let Some(cancel) = self.replace_sign_in_cancel(None) {
            tracing::info!("sign-in cancelled by user");
            cancel.cancel();
        }
    }

    /// Revokes the session with its provider. Local state is expected to be
    /// cleared already; this only reports the provider's answer.
    pub fn dispatch_sign_out(&self, session: Session) {
        let identity = self.identity.clone();
        let events = self.events.clone();

        let worker = self
            .handle
            .spawn_blocking(move || identity.sign_out(&session));

        self.handle.spawn(async move {
            let outcome = worker
                .await
                .unwrap_or_else(|join_error| Err(join_failure(Operation::SignOut, join_error)));
            if let Err(error) = &outcome {
                tracing::warn!(kind = ?error.kind, error = %error.message, "sign-out revocation failed");
            }
            deliver(&events, RuntimeEvent::SignedOut(outcome));
        });
    }

    fn replace_sign_in_cancel(&self, next: Option<CancellationToken>) -> Option<CancellationToken> {
        match self.sign_in_cancel.lock() {
            Ok(mut slot) => std::mem::replace(&mut *slot, next),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), next),
        }
    }
}

fn deliver(events: &UnboundedSender<RuntimeEvent>, event: RuntimeEvent) {
    if events.send(event).is_err() {
        tracing::debug!("runtime event dropped; receiver closed");
    }
}

fn join_failure(operation: Operation, join_error: tokio::task::JoinError) -> CoreError {
    CoreError::new(
        CoreErrorKind::Internal,
        format!("blocking task join failure: {join_error}"),
    )
    .operation(operation)
}
