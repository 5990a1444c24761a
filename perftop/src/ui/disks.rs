//! Disk cards with per-device gauge and title line.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Gauge},
};

use crate::format::{derive_disk_rows, disk_icon, format_bytes, severity, truncate_middle};
use crate::types::Sample;
use crate::ui::theme::severity_color;

pub fn draw_disks(f: &mut ratatui::Frame<'_>, area: Rect, latest: Option<&Sample>) {
    f.render_widget(Block::default().borders(Borders::ALL).title("Disk Usage by Drive"), area);
    let Some(s) = latest else { return; };
    let rows = derive_disk_rows(&s.disk_usage);

    let inner = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };
    if inner.height < 3 { return; }

    let per_disk_h = 3u16;
    let max_cards = (inner.height / per_disk_h).min(rows.len() as u16) as usize;

    let constraints: Vec<Constraint> = (0..max_cards).map(|_| Constraint::Length(per_disk_h)).collect();
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (d, slot) in rows.iter().zip(slots.iter()) {
        let color = severity_color(severity(d.percent));
        let name = match &d.mountpoint {
            Some(mp) if mp != &d.device => format!("{} ({mp})", d.device),
            _ => d.device.clone(),
        };

        let title = format!(
            "{} {}   {:.1}%   Used: {}  Free: {}  Total: {}",
            disk_icon(&d.device),
            truncate_middle(&name, (slot.width.saturating_sub(6)) as usize / 3),
            d.percent,
            format_bytes(d.used_bytes),
            format_bytes(d.free_bytes),
            format_bytes(d.total_bytes),
        );

        let card = Block::default().borders(Borders::ALL).title(title);
        f.render_widget(card, *slot);

        let inner_card = Rect {
            x: slot.x + 1,
            y: slot.y + 1,
            width: slot.width.saturating_sub(2),
            height: slot.height.saturating_sub(2),
        };
        if inner_card.height == 0 { continue; }

        let g = Gauge::default()
            .percent(d.percent.clamp(0.0, 100.0).round() as u16)
            .gauge_style(Style::default().fg(color));
        f.render_widget(g, inner_card);
    }
}
