//! UI-independent state for the search screen.
//!
//! The terminal front end owns one [`SearchView`] on its event loop thread and
//! feeds it keystrokes and [`crate::orchestration::RuntimeEvent`]s. Everything
//! that decides *whether* a network call happens, or whether its answer is
//! shown, lives here so it can be tested without a terminal.

use std::sync::Arc;

use crate::adapters::AdapterResult;
use crate::identity::SignInPrompt;
use crate::models::{
    RequestSeq, ResultList, SearchRequest, SearchTicket, Session, SignInAttempt, is_blank_query,
};
use crate::session::SessionContext;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ViewPhase {
    LoggedOut,
    SigningIn,
    LoggedIn,
}

/// What the results area currently shows.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum ResultsPane {
    #[default]
    Empty,
    Results(ResultList),
    Message(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct Outstanding {
    seq: RequestSeq,
    query: String,
}

pub struct SearchView {
    session: Arc<SessionContext>,
    signed_in: Option<Session>,
    phase: ViewPhase,
    sign_in_prompt: Option<SignInPrompt>,
    last_attempt: u64,
    current_attempt: Option<SignInAttempt>,
    query: String,
    pane: ResultsPane,
    last_seq: u64,
    outstanding: Option<Outstanding>,
}

impl SearchView {
    pub fn new(session: Arc<SessionContext>) -> Self {
        let signed_in = match session.get() {
            Ok(current) => current,
            Err(error) => {
                tracing::warn!(error = %error, "session unavailable; starting logged out");
                None
            }
        };
        let phase = if signed_in.is_some() {
            ViewPhase::LoggedIn
        } else {
            ViewPhase::LoggedOut
        };

        Self {
            session,
            signed_in,
            phase,
            sign_in_prompt: None,
            last_attempt: 0,
            current_attempt: None,
            query: String::new(),
            pane: ResultsPane::Empty,
            last_seq: 0,
            outstanding: None,
        }
    }

    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&Session> {
        self.signed_in.as_ref()
    }

    pub fn sign_in_prompt(&self) -> Option<&SignInPrompt> {
        self.sign_in_prompt.as_ref()
    }

    pub fn pane(&self) -> &ResultsPane {
        &self.pane
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_searching(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Query text of the search currently in flight, if any.
    pub fn pending_query(&self) -> Option<&str> {
        self.outstanding.as_ref().map(|pending| pending.query.as_str())
    }

    /// Starts a new attempt. `None` when sign-in cannot start from the
    /// current phase.
    pub fn begin_sign_in(&mut self) -> Option<SignInAttempt> {
        if self.phase != ViewPhase::LoggedOut {
            return None;
        }
        self.last_attempt += 1;
        let attempt = SignInAttempt(self.last_attempt);
        self.phase = ViewPhase::SigningIn;
        self.sign_in_prompt = None;
        self.current_attempt = Some(attempt);
        Some(attempt)
    }

    fn is_current_attempt(&self, attempt: SignInAttempt) -> bool {
        self.phase == ViewPhase::SigningIn && self.current_attempt == Some(attempt)
    }

    pub fn show_sign_in_prompt(&mut self, attempt: SignInAttempt, prompt: SignInPrompt) {
        if self.is_current_attempt(attempt) {
            self.sign_in_prompt = Some(prompt);
        } else {
            tracing::debug!(%attempt, "ignoring prompt from a superseded sign-in");
        }
    }

    /// Failures fall back to the login gate without surfacing a message.
    /// Outcomes of superseded or cancelled attempts are ignored.
    pub fn finish_sign_in(&mut self, attempt: SignInAttempt, outcome: AdapterResult<Session>) {
        if !self.is_current_attempt(attempt) {
            tracing::debug!(%attempt, "ignoring result from a superseded sign-in");
            return;
        }
        self.sign_in_prompt = None;
        self.current_attempt = None;

        let session = match outcome {
            Ok(session) => session,
            Err(error) => {
                tracing::warn!(kind = ?error.kind, error = %error.message, "sign-in failed");
                self.phase = ViewPhase::LoggedOut;
                return;
            }
        };

        if let Err(error) = self.session.set(session.clone()) {
            tracing::warn!(error = %error, "could not store session");
            self.phase = ViewPhase::LoggedOut;
            return;
        }
        self.signed_in = Some(session);
        self.phase = ViewPhase::LoggedIn;
    }

    pub fn cancel_sign_in(&mut self) {
        if self.phase == ViewPhase::SigningIn {
            self.phase = ViewPhase::LoggedOut;
            self.sign_in_prompt = None;
            self.current_attempt = None;
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn push_char(&mut self, ch: char) {
        self.query.push(ch);
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
    }

    /// Commits the current query. `None` means no request should be sent.
    pub fn submit(&mut self) -> Option<SearchTicket> {
        if self.phase != ViewPhase::LoggedIn || is_blank_query(&self.query) {
            return None;
        }

        let token = self
            .signed_in
            .as_ref()
            .and_then(|session| session.bearer_token())
            .map(str::to_string);

        self.last_seq += 1;
        let seq = RequestSeq(self.last_seq);
        self.outstanding = Some(Outstanding {
            seq,
            query: self.query.clone(),
        });

        Some(SearchTicket {
            seq,
            request: SearchRequest::new(self.query.clone(), token),
        })
    }

    /// Applies a search outcome. Returns `false` when the outcome belongs to a
    /// superseded or invalidated request and was discarded.
    pub fn apply(&mut self, seq: RequestSeq, outcome: AdapterResult<ResultList>) -> bool {
        let current = self
            .outstanding
            .as_ref()
            .is_some_and(|pending| pending.seq == seq);
        if !current || self.phase != ViewPhase::LoggedIn {
            tracing::debug!(request_seq = seq.0, "discarding stale search response");
            return false;
        }

        self.outstanding = None;
        self.pane = match outcome {
            Ok(items) => ResultsPane::Results(items),
            Err(error) => ResultsPane::Message(error.message),
        };
        true
    }

    /// Returns to the login gate. Any in-flight search is invalidated.
    pub fn logout(&mut self) -> Option<Session> {
        self.query.clear();
        self.pane = ResultsPane::Empty;
        self.outstanding = None;
        self.sign_in_prompt = None;
        self.current_attempt = None;
        self.phase = ViewPhase::LoggedOut;
        self.signed_in = None;

        match self.session.clear() {
            Ok(removed) => removed,
            Err(error) => {
                tracing::warn!(error = %error, "could not clear session");
                None
            }
        }
    }
}
