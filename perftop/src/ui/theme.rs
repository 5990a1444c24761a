//! Shared UI theme constants.

use ratatui::style::Color;

use crate::format::Severity;

pub const CPU: Color = Color::Rgb(59, 130, 246);
pub const MEMORY: Color = Color::Rgb(16, 185, 129);
pub const NET_SENT: Color = Color::Rgb(245, 158, 11);
pub const NET_RECV: Color = Color::Rgb(239, 68, 68);
pub const DIM: Color = Color::Rgb(170, 170, 180);

pub fn severity_color(s: Severity) -> Color {
    match s {
        Severity::Normal => Color::Rgb(16, 185, 129),
        Severity::Warning => Color::Rgb(245, 158, 11),
        Severity::Critical => Color::Rgb(239, 68, 68),
    }
}
