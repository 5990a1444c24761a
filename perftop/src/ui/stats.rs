//! Window statistics strip.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::types::Stats;
use crate::ui::theme;
use crate::view::{stat_rows, stats_title};

pub fn draw_stats(f: &mut ratatui::Frame<'_>, area: Rect, stats: Option<&Stats>) {
    let Some(st) = stats else {
        f.render_widget(Block::default().borders(Borders::ALL).title("Statistics"), area);
        return;
    };
    let mut spans = Vec::new();
    for row in stat_rows(st) {
        spans.push(Span::styled(format!("{}: ", row.label), Style::default().fg(theme::DIM)));
        spans.push(Span::styled(row.value, Style::default().add_modifier(Modifier::BOLD)));
        spans.push(Span::raw("   "));
    }
    let p = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(stats_title(st)));
    f.render_widget(p, area);
}
