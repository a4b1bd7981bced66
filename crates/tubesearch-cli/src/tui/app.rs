use std::time::Duration;

use time::UtcOffset;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;
use tubesearch_core::identity::GOOGLE_PROVIDER_ID;
use tubesearch_core::models::BackendVariant;
use tubesearch_core::orchestration::{ClientRuntime, RuntimeEvent};
use tubesearch_core::view::{SearchView, ViewPhase};

use super::events::{Action, poll_event};
use super::render::{RenderState, render_ui};
use super::terminal::TuiTerminal;
use crate::error::CliError;

const TICK: Duration = Duration::from_millis(100);

/// Event loop glue between the terminal, the view state and the runtime.
pub struct App {
    view: SearchView,
    client: ClientRuntime,
    events: UnboundedReceiver<RuntimeEvent>,
    backend: BackendVariant,
    provider: &'static str,
    local_offset: UtcOffset,
    scroll: u16,
    should_quit: bool,
}

impl App {
    pub fn new(
        view: SearchView,
        client: ClientRuntime,
        events: UnboundedReceiver<RuntimeEvent>,
    ) -> Self {
        Self {
            view,
            client,
            events,
            backend: BackendVariant::Agent,
            provider: GOOGLE_PROVIDER_ID,
            local_offset: UtcOffset::UTC,
            scroll: 0,
            should_quit: false,
        }
    }

    pub fn backend(mut self, backend: BackendVariant) -> Self {
        self.backend = backend;
        self
    }

    /// Identity provider id shown on the login gate.
    pub fn provider(mut self, provider: &'static str) -> Self {
        self.provider = provider;
        self
    }

    pub fn local_offset(mut self, offset: UtcOffset) -> Self {
        self.local_offset = offset;
        self
    }

    pub fn run(&mut self, terminal: &mut TuiTerminal) -> Result<(), CliError> {
        while !self.should_quit {
            self.drain_runtime_events();

            terminal.draw(|frame| {
                let state = RenderState {
                    view: &self.view,
                    backend: self.backend,
                    provider: self.provider,
                    scroll: self.scroll,
                    local_offset: self.local_offset,
                };
                render_ui(frame, &state);
            })?;

            let action = poll_event(TICK)?;
            self.handle_action(action);
        }

        self.client.cancel_sign_in();
        Ok(())
    }

    fn drain_runtime_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.handle_runtime_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("runtime event channel closed");
                    break;
                }
            }
        }
    }

    fn handle_runtime_event(&mut self, event: RuntimeEvent) {
        match event {
            RuntimeEvent::SearchFinished { seq, outcome } => {
                if self.view.apply(seq, outcome) {
                    self.scroll = 0;
                }
            }
            RuntimeEvent::SignInPrompt { attempt, prompt } => {
                self.view.show_sign_in_prompt(attempt, prompt)
            }
            RuntimeEvent::SignInFinished { attempt, outcome } => {
                self.view.finish_sign_in(attempt, outcome)
            }
            // Local state was already cleared; the runtime logs revocation failures.
            RuntimeEvent::SignedOut(_) => {}
        }
    }

    fn handle_action(&mut self, action: Action) {
        match (self.view.phase(), action) {
            (_, Action::Quit) => self.should_quit = true,

            (ViewPhase::LoggedOut, Action::Confirm) => {
                if let Some(attempt) = self.view.begin_sign_in() {
                    self.client.dispatch_sign_in(attempt);
                }
            }
            (ViewPhase::LoggedOut, Action::Insert('q') | Action::Cancel) => {
                self.should_quit = true;
            }

            (ViewPhase::SigningIn, Action::Cancel) => {
                self.view.cancel_sign_in();
                self.client.cancel_sign_in();
            }

            (ViewPhase::LoggedIn, Action::Insert(ch)) => self.view.push_char(ch),
            (ViewPhase::LoggedIn, Action::DeleteChar) => self.view.pop_char(),
            (ViewPhase::LoggedIn, Action::Cancel) => self.view.set_query(String::new()),
            (ViewPhase::LoggedIn, Action::Confirm) => {
                if let Some(ticket) = self.view.submit() {
                    self.client.dispatch_search(ticket);
                }
            }
            (ViewPhase::LoggedIn, Action::Logout) => {
                self.scroll = 0;
                if let Some(session) = self.view.logout() {
                    self.client.dispatch_sign_out(session);
                }
            }
            (ViewPhase::LoggedIn, Action::ScrollUp) => self.scroll = self.scroll.saturating_sub(1),
            (ViewPhase::LoggedIn, Action::ScrollDown) => self.scroll = self.scroll.saturating_add(1),

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::runtime::Handle;
    use tubesearch_core::adapters::{AdapterResult, SearchService};
    use tubesearch_core::identity::StaticIdentity;
    use tubesearch_core::models::{
        BackendDescriptor, ResultList, SearchRequest, SearchResultItem,
    };
    use tubesearch_core::registry::backend_descriptor;
    use tubesearch_core::session::SessionContext;
    use tubesearch_core::view::ResultsPane;

    use super::*;

    struct OneHitService;

    impl SearchService for OneHitService {
        fn descriptor(&self) -> &BackendDescriptor {
            backend_descriptor(BackendVariant::ToolInvoke)
        }

        fn search(&self, request: &SearchRequest) -> AdapterResult<ResultList> {
            Ok(ResultList::new(vec![SearchResultItem {
                id: "1".to_string(),
                title: request.query.clone(),
                description: String::new(),
                channel: None,
                channel_id: None,
            }]))
        }
    }

    fn app() -> App {
        let (client, events) = ClientRuntime::new(
            Handle::current(),
            Arc::new(OneHitService),
            Arc::new(StaticIdentity::new("Ada", None, None)),
        );
        App::new(SearchView::new(Arc::new(SessionContext::new())), client, events)
    }

    async fn settle(app: &mut App, until: impl Fn(&App) -> bool) {
        for _ in 0..50 {
            app.drain_runtime_events();
            if until(app) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("app never reached the expected state");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn q_on_gate_quits() {
        let mut app = app();
        app.handle_action(Action::Insert('q'));
        assert!(app.should_quit);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn login_type_search_logout() {
        let mut app = app();

        app.handle_action(Action::Confirm);
        assert_eq!(app.view.phase(), ViewPhase::SigningIn);
        settle(&mut app, |app| app.view.phase() == ViewPhase::LoggedIn).await;

        for ch in "quiet".chars() {
            app.handle_action(Action::Insert(ch));
        }
        assert!(!app.should_quit);
        app.handle_action(Action::DeleteChar);
        assert_eq!(app.view.query(), "quie");

        app.handle_action(Action::Confirm);
        settle(&mut app, |app| !app.view.is_searching()).await;
        assert!(matches!(app.view.pane(), ResultsPane::Results(results) if results.len() == 1));

        app.handle_action(Action::Logout);
        assert_eq!(app.view.phase(), ViewPhase::LoggedOut);
        assert_eq!(app.view.query(), "");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn escape_then_enter_starts_a_fresh_sign_in() {
        let mut app = app();

        app.handle_action(Action::Confirm);
        app.handle_action(Action::Cancel);
        assert_eq!(app.view.phase(), ViewPhase::LoggedOut);
        app.handle_action(Action::Confirm);
        assert_eq!(app.view.phase(), ViewPhase::SigningIn);

        settle(&mut app, |app| app.view.phase() == ViewPhase::LoggedIn).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn blank_enter_dispatches_nothing() {
        let mut app = app();
        app.handle_action(Action::Confirm);
        settle(&mut app, |app| app.view.phase() == ViewPhase::LoggedIn).await;

        app.handle_action(Action::Insert(' '));
        app.handle_action(Action::Confirm);
        assert!(!app.view.is_searching());
    }
}
