//! Metric cards: CPU and memory gauges, cumulative network counters.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::types::Sample;
use crate::ui::theme;
use crate::view::{describe_delta, metric_cards, MetricCard, NetDelta};

pub fn draw_cards(f: &mut ratatui::Frame<'_>, area: Rect, latest: &Sample, delta: Option<NetDelta>) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);
    let [cpu, mem, sent, recv] = metric_cards(latest);

    draw_gauge_card(f, cols[0], &cpu, latest.cpu_percent, theme::CPU);
    draw_gauge_card(f, cols[1], &mem, latest.memory_percent, theme::MEMORY);

    let sent_note = delta.map(|d| describe_delta(d.sent));
    let recv_note = delta.map(|d| describe_delta(d.recv));
    draw_text_card(f, cols[2], &sent, sent_note, theme::NET_SENT);
    draw_text_card(f, cols[3], &recv, recv_note, theme::NET_RECV);
}

fn draw_gauge_card(f: &mut ratatui::Frame<'_>, area: Rect, card: &MetricCard, pct: f64, color: Color) {
    let g = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!("{} — {}", card.title, card.subtitle)),
        )
        .gauge_style(Style::default().fg(color))
        .percent(pct.clamp(0.0, 100.0).round() as u16)
        .label(card.value.clone());
    f.render_widget(g, area);
}

fn draw_text_card(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    card: &MetricCard,
    note: Option<String>,
    color: Color,
) {
    let mut lines = vec![
        Line::from(Span::styled(
            card.value.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(card.subtitle.clone(), Style::default().fg(theme::DIM))),
    ];
    if let Some(n) = note {
        lines.push(Line::from(Span::styled(n, Style::default().fg(theme::DIM))));
    }
    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(card.title),
    );
    f.render_widget(p, area);
}
