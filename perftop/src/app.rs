//! App state and main loop: input handling, refresh triggers, and drawing.

use std::{io, time::Duration};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::info;

use crate::client::MetricsApi;
use crate::config::Settings;
use crate::sync::{SyncController, SyncState};
use crate::ui::{
    cards::draw_cards,
    charts::{draw_cpu_trend, draw_usage_chart},
    disks::draw_disks,
    header::{draw_error_banner, draw_header},
    stats::draw_stats,
};
use crate::view::latest_net_delta;
use crate::window::window_series;

pub struct App<A> {
    controller: SyncController<A>,
    state: watch::Receiver<SyncState>,
    base_url: String,
    max_points: usize,

    // Quit flag
    should_quit: bool,
}

impl<A: MetricsApi> App<A> {
    pub fn new(controller: SyncController<A>, settings: &Settings) -> Self {
        let state = controller.subscribe();
        Self {
            controller,
            state,
            base_url: settings.base_url.to_string(),
            max_points: settings.max_points,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        // First cycle runs in the background so the loading screen can draw
        let starter = self.controller.clone();
        let first = tokio::spawn(async move { starter.start().await });

        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Main loop
        let res = self.event_loop(&mut terminal).await;

        // Teardown
        self.controller.stop();
        first.abort();
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> anyhow::Result<()> {
        let mut dirty = true;
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                match event::read()? {
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        self.handle_key(k.code);
                        dirty = true;
                    }
                    Event::Resize(_, _) => dirty = true,
                    _ => {}
                }
            }
            if self.should_quit {
                break;
            }

            if self.state.has_changed().unwrap_or(false) {
                dirty = true;
            }
            if dirty {
                let st = self.state.borrow_and_update().clone();
                terminal.draw(|f| self.draw(f, &st))?;
                dirty = false;
            }

            // Tick rate
            sleep(Duration::from_millis(100)).await;
        }

        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') | KeyCode::Char('R') => {
                // outcome lands in the watch channel
                drop(self.controller.refresh_now());
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                let enabled = !self.state.borrow().auto_refresh_enabled;
                info!(enabled, "auto-refresh toggled");
                self.controller.set_auto_refresh(enabled);
            }
            _ => {}
        }
    }

    pub fn draw(&self, f: &mut ratatui::Frame<'_>, st: &SyncState) {
        let area = f.area();

        if st.loading && st.latest.is_none() && st.error.is_none() {
            let p = Paragraph::new("Loading system metrics...")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("perftop"));
            f.render_widget(p, area);
            return;
        }

        let banner_h = if st.error.is_some() { 3 } else { 0 };
        // Root rows: header, error banner, cards, stats, charts, disks
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(banner_h),
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Percentage(30),
            ])
            .split(area);

        draw_header(f, rows[0], st, &self.base_url);
        if let Some(err) = &st.error {
            draw_error_banner(f, rows[1], err);
        }

        let Some(latest) = st.latest.as_ref() else {
            let p = Paragraph::new("No metrics collected yet")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(p, rows[2]);
            return;
        };

        draw_cards(f, rows[2], latest, latest_net_delta(&st.history));
        draw_stats(f, rows[3], st.stats.as_ref());

        let series = window_series(&st.history, self.max_points);
        let chart_lr = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
            .split(rows[4]);
        draw_usage_chart(f, chart_lr[0], &series);
        draw_cpu_trend(f, chart_lr[1], &series);

        draw_disks(f, rows[5], Some(latest));
    }
}
