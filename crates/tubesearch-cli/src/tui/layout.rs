use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Logged-in screen: header, query box, results, status row.
pub struct SearchLayout {
    pub header_area: Rect,
    pub input_area: Rect,
    pub results_area: Rect,
    pub status_area: Rect,
}

impl SearchLayout {
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        Self {
            header_area: chunks[0],
            input_area: chunks[1],
            results_area: chunks[2],
            status_area: chunks[3],
        }
    }
}

/// A box of at most `width` x `height` centred in `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
