//! CPU & memory over time (line chart) and the CPU trend sparkline.

use ratatui::{
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Sparkline},
};

use crate::ui::theme;
use crate::window::SeriesPoint;

pub fn draw_usage_chart(f: &mut ratatui::Frame<'_>, area: Rect, series: &[SeriesPoint]) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("CPU & Memory Usage Over Time");
    if series.is_empty() {
        f.render_widget(block, area);
        return;
    }

    let cpu: Vec<(f64, f64)> = series.iter().enumerate().map(|(i, p)| (i as f64, p.cpu)).collect();
    let mem: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.memory))
        .collect();

    let datasets = vec![
        Dataset::default()
            .name("CPU %")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::CPU))
            .data(&cpu),
        Dataset::default()
            .name("Memory %")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::MEMORY))
            .data(&mem),
    ];

    // first and last clock labels; the middle one only when there is room
    let first = series.first().map(|p| p.time.as_str()).unwrap_or_default();
    let last = series.last().map(|p| p.time.as_str()).unwrap_or_default();
    let mut x_labels = vec![Span::raw(first.to_string())];
    if series.len() > 2 && area.width > 60 {
        x_labels.push(Span::raw(series[series.len() / 2].time.clone()));
    }
    if series.len() > 1 {
        x_labels.push(Span::raw(last.to_string()));
    }

    let x_max = (series.len().saturating_sub(1)).max(1) as f64;
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(theme::DIM))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("%")
                .style(Style::default().fg(theme::DIM))
                .bounds([0.0, 100.0])
                .labels(vec![Span::raw("0"), Span::raw("50"), Span::raw("100")]),
        );
    f.render_widget(chart, area);
}

pub fn draw_cpu_trend(f: &mut ratatui::Frame<'_>, area: Rect, series: &[SeriesPoint]) {
    let title = match series.last() {
        Some(p) => format!("CPU Usage Trend (now: {:>5.1}%)", p.cpu),
        None => "CPU Usage Trend".into(),
    };
    let max_points = area.width.saturating_sub(2) as usize;
    let start = series.len().saturating_sub(max_points);
    let data: Vec<u64> = series
        .iter()
        .skip(start)
        .map(|p| p.cpu.clamp(0.0, 100.0).round() as u64)
        .collect();
    let spark = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(&data)
        .max(100)
        .style(Style::default().fg(theme::CPU));
    f.render_widget(spark, area);
}
