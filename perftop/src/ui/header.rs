//! Top header with collector URL, refresh status and key hints, plus the error banner.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::error::{ErrorInfo, ErrorKind};
use crate::sync::{Phase, SyncState};

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, st: &SyncState, base_url: &str) {
    let status = match st.phase {
        _ if st.loading => "loading…",
        Phase::Refreshing => "refreshing…",
        Phase::RefreshFailed => "last refresh failed",
        Phase::Idle => "up to date",
    };
    let auto = if st.auto_refresh_enabled { "on (5s)" } else { "off" };
    let updated = st
        .latest
        .as_ref()
        .map(|s| s.timestamp.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "—".into());
    let title = format!(
        "perftop — {base_url} | {status} | sample: {updated} | auto-refresh: {auto}  ([r] refresh  [a] auto  [q] quit)"
    );
    f.render_widget(Block::default().title(title).borders(Borders::BOTTOM), area);
}

pub fn draw_error_banner(f: &mut ratatui::Frame<'_>, area: Rect, err: &ErrorInfo) {
    let label = match err.kind {
        ErrorKind::Transport => "Connection error",
        ErrorKind::Server | ErrorKind::NotFound => "Server error",
        ErrorKind::Malformed => "Bad response",
    };
    let line = Line::from(vec![
        Span::styled(
            format!("{label}: "),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(err.message.clone()),
    ]);
    let p = Paragraph::new(line)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title("Error"),
        );
    f.render_widget(p, area);
}
