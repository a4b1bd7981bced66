use std::time::SystemTime;

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tubesearch_core::identity::{GOOGLE_PROVIDER_ID, STATIC_PROVIDER_ID, SignInPrompt};
use tubesearch_core::models::{BackendVariant, ResultList, SearchResultItem, Session};
use tubesearch_core::registry::backend_descriptor;
use tubesearch_core::view::{ResultsPane, SearchView, ViewPhase};

use super::layout::{SearchLayout, centered};

const MUTED: Color = Color::Rgb(113, 113, 122);
const ACCENT: Color = Color::Rgb(16, 185, 129);
const ERROR: Color = Color::Rgb(239, 68, 68);
const STATUS_BG: Color = Color::Rgb(24, 24, 27);

pub struct RenderState<'a> {
    pub view: &'a SearchView,
    pub backend: BackendVariant,
    pub provider: &'a str,
    pub scroll: u16,
    pub local_offset: UtcOffset,
}

pub fn render_ui(frame: &mut Frame, state: &RenderState<'_>) {
    match state.view.phase() {
        ViewPhase::LoggedOut => render_gate(frame, state.provider),
        ViewPhase::SigningIn => render_sign_in(frame, state.view.sign_in_prompt()),
        ViewPhase::LoggedIn => render_search(frame, state),
    }
}

fn gate_headline(provider: &str) -> String {
    match provider {
        GOOGLE_PROVIDER_ID => "Login with Google to search".to_string(),
        STATIC_PROVIDER_ID => "Sign in as the configured user".to_string(),
        other => format!("Login with {} to search", sanitize(other)),
    }
}

fn render_gate(frame: &mut Frame, provider: &str) {
    let area = centered(frame.area(), 44, 7);
    let text = Text::from(vec![
        Line::from(""),
        Line::from(Span::styled(
            gate_headline(provider),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("[Enter] Login   [q] Quit", Style::default().fg(MUTED))),
    ]);

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(bordered(" tubesearch "));
    frame.render_widget(paragraph, area);
}

fn render_sign_in(frame: &mut Frame, prompt: Option<&SignInPrompt>) {
    let area = centered(frame.area(), 60, 10);
    let mut lines = vec![Line::from("")];

    match prompt {
        Some(SignInPrompt::Device(authorization)) => {
            lines.push(Line::from("Open this page in a browser:"));
            lines.push(Line::from(Span::styled(
                sanitize(&authorization.verification_url),
                Style::default().fg(ACCENT),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from("and enter the code"));
            lines.push(Line::from(Span::styled(
                sanitize(&authorization.user_code),
                Style::default().add_modifier(Modifier::BOLD),
            )));
        }
        Some(SignInPrompt::Ready) | None => {
            lines.push(Line::from("Contacting identity provider…"));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("[Esc] Cancel", Style::default().fg(MUTED))));

    let paragraph = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .block(bordered(" Sign in "));
    frame.render_widget(paragraph, area);
}

fn render_search(frame: &mut Frame, state: &RenderState<'_>) {
    let layout = SearchLayout::new(frame.area());

    if let Some(session) = state.view.session() {
        render_header(frame, layout.header_area, session, state.local_offset);
    }
    render_input(frame, layout.input_area, state.view.query());
    render_results(frame, layout.results_area, state.view.pane(), state.scroll);
    render_status_bar(frame, layout.status_area, state);
}

fn render_header(frame: &mut Frame, area: Rect, session: &Session, offset: UtcOffset) {
    let mut details = vec![Span::styled(
        format!("signed in {}", format_signed_in(session.established_at, offset)),
        Style::default().fg(MUTED),
    )];
    if let Some(image) = &session.user.image {
        details.push(Span::styled(
            format!(" · {}", sanitize(image)),
            Style::default().fg(MUTED),
        ));
    }

    let text = Text::from(vec![
        Line::from(vec![
            Span::raw("Welcome, "),
            Span::styled(
                sanitize(&session.user.name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(details),
    ]);
    frame.render_widget(Paragraph::new(text), area);
}

fn render_input(frame: &mut Frame, area: Rect, query: &str) {
    let paragraph = Paragraph::new(sanitize(query)).block(bordered(" Search "));
    frame.render_widget(paragraph, area);

    let cursor_x = area.x + 1 + (query.chars().count() as u16).min(area.width.saturating_sub(3));
    frame.set_cursor_position((cursor_x, area.y + 1));
}

fn render_results(frame: &mut Frame, area: Rect, pane: &ResultsPane, scroll: u16) {
    let text = match pane {
        ResultsPane::Empty => Text::from(Line::from(Span::styled(
            "Type a query and press Enter",
            Style::default().fg(MUTED),
        ))),
        ResultsPane::Results(results) => result_cards(results),
        ResultsPane::Message(message) => Text::from(Span::styled(
            sanitize(message),
            Style::default().fg(ERROR),
        )),
    };

    let paragraph = Paragraph::new(text)
        .block(bordered(" Results "))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn result_cards(results: &ResultList) -> Text<'static> {
    if results.is_empty() {
        return Text::from(Line::from(Span::styled(
            "no results",
            Style::default().fg(MUTED).add_modifier(Modifier::DIM),
        )));
    }

    let mut lines = Vec::new();
    for (index, item) in results.iter().enumerate() {
        if index > 0 {
            lines.push(Line::from(""));
        }
        lines.extend(card_lines(item));
    }
    Text::from(lines)
}

fn card_lines(item: &SearchResultItem) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            sanitize(&item.title),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(sanitize(&item.description)),
    ];
    if let Some(channel) = &item.channel {
        lines.push(Line::from(Span::styled(
            format!("Channel: {}", sanitize(channel)),
            Style::default().fg(MUTED),
        )));
    }
    lines
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &RenderState<'_>) {
    let mut parts = Vec::new();

    if let Some(query) = state.view.pending_query() {
        parts.push(format!("searching \"{}\"…", sanitize(query)));
    } else if let ResultsPane::Results(results) = state.view.pane() {
        parts.push(match results.len() {
            1 => "1 result".to_string(),
            count => format!("{count} results"),
        });
    }
    parts.push(format!("backend: {}", backend_descriptor(state.backend).display_name));
    parts.push("Enter: search".to_string());
    parts.push("Ctrl+O: logout".to_string());
    parts.push("Ctrl+C: quit".to_string());

    let paragraph = Paragraph::new(format!(" {} ", parts.join(" | ")))
        .style(Style::default().fg(Color::Rgb(250, 250, 250)).bg(STATUS_BG));
    frame.render_widget(paragraph, area);
}

fn bordered(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED))
        .title(title)
}

fn format_signed_in(at: SystemTime, offset: UtcOffset) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    OffsetDateTime::from(at)
        .to_offset(offset)
        .format(format)
        .unwrap_or_else(|_| "just now".to_string())
}

/// Remote text is untrusted; control characters would corrupt the terminal.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect()
}
