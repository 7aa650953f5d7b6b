//! Terminal dashboard over the persisted trading state.

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use rust_decimal::Decimal;
use sage_core::types::{Position, TradeRecord};
use sage_engine::TradeStats;
use std::io;
use std::time::Duration;

/// Dashboard state.
pub struct DashboardState {
    pub symbol: String,
    pub position: Option<Position>,
    pub stats: TradeStats,
    /// Newest first
    pub recent_trades: Vec<TradeRecord>,
    pub messages: Vec<String>,
}

/// Terminal dashboard. Renders the state returned by a closure until the
/// user quits with `q` or `Esc`.
pub struct Dashboard {
    refresh_ms: u64,
}

impl Dashboard {
    pub fn new(refresh_ms: u64) -> Self {
        Self { refresh_ms }
    }

    /// Run the dashboard.
    pub fn run<F>(&self, mut get_state: F) -> io::Result<()>
    where
        F: FnMut() -> DashboardState,
    {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_loop(&mut terminal, &mut get_state);

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        res
    }

    fn run_loop<F>(
        &self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        get_state: &mut F,
    ) -> io::Result<()>
    where
        F: FnMut() -> DashboardState,
    {
        loop {
            let state = get_state();
            terminal.draw(|f| self.ui(f, &state))?;

            if event::poll(Duration::from_millis(self.refresh_ms))? {
                if let Event::Key(key) = event::read()? {
                    if key.code == KeyCode::Char('q') || key.code == KeyCode::Esc {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn ui(&self, frame: &mut Frame, state: &DashboardState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(5), // Stats
                Constraint::Length(5), // Open position
                Constraint::Min(8),    // Trades
                Constraint::Length(6), // Messages
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0], state);
        self.render_stats(frame, chunks[1], state);
        self.render_position(frame, chunks[2], state);
        self.render_trades(frame, chunks[3], state);
        self.render_messages(frame, chunks[4], state);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let header = Paragraph::new(vec![Line::from(vec![
            Span::styled(
                "Analysis Dashboard",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::styled(&state.symbol, Style::default().fg(Color::Cyan)),
            Span::raw(" | Press 'q' to quit"),
        ])])
        .block(Block::default().borders(Borders::ALL).title("System"));
        frame.render_widget(header, area);
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let stats = &state.stats;
        let pnl_color = if stats.total_pnl >= Decimal::ZERO {
            Color::Green
        } else {
            Color::Red
        };

        let lines = vec![
            Line::from(vec![
                Span::raw("Total P&L: "),
                Span::styled(
                    format!("{:.4}", stats.total_pnl),
                    Style::default().fg(pnl_color).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  |  Trades: "),
                Span::raw(format!("{}", stats.total_trades)),
                Span::raw("  |  Win rate: "),
                Span::raw(format!("{:.1}%", stats.win_rate_pct)),
            ]),
            Line::from(vec![
                Span::raw("Avg win: "),
                Span::styled(format!("{:.4}", stats.avg_win), Style::default().fg(Color::Green)),
                Span::raw("  |  Avg loss: "),
                Span::styled(format!("{:.4}", stats.avg_loss), Style::default().fg(Color::Red)),
                Span::raw("  |  Profit factor: "),
                Span::raw(format!("{:.2}", stats.profit_factor)),
            ]),
        ];

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Statistics"));
        frame.render_widget(paragraph, area);
    }

    fn render_position(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let lines = match &state.position {
            Some(position) => {
                let direction_color = match position.direction {
                    sage_core::types::Direction::Long => Color::Green,
                    sage_core::types::Direction::Short => Color::Red,
                };
                vec![
                    Line::from(vec![
                        Span::styled(
                            position.direction.to_string(),
                            Style::default()
                                .fg(direction_color)
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::raw(format!(
                            "  entry ${}  size {}  confidence {}",
                            position.entry_price, position.size, position.confidence
                        )),
                    ]),
                    Line::from(vec![Span::raw(format!(
                        "stop ${}  target ${}  opened {}",
                        position.stop_loss,
                        position.take_profit,
                        position.opened_at.format("%Y-%m-%d %H:%M")
                    ))]),
                ]
            }
            None => vec![Line::from(Span::styled(
                "flat",
                Style::default().fg(Color::DarkGray),
            ))],
        };

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Open Position"));
        frame.render_widget(paragraph, area);
    }

    fn render_trades(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let header_cells = ["Closed", "Dir", "Entry", "Exit", "P&L", "Reason"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells).height(1);

        let rows = state.recent_trades.iter().map(|trade| {
            let pnl_color = if trade.pnl >= Decimal::ZERO {
                Color::Green
            } else {
                Color::Red
            };

            Row::new(vec![
                Cell::from(trade.closed_at.format("%m-%d %H:%M").to_string()),
                Cell::from(trade.direction.to_string()),
                Cell::from(format!("${}", trade.entry_price)),
                Cell::from(format!("${}", trade.exit_price)),
                Cell::from(format!("{:.4}", trade.pnl)).style(Style::default().fg(pnl_color)),
                Cell::from(trade.exit_reason.to_string()),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(18),
                Constraint::Percentage(10),
                Constraint::Percentage(18),
                Constraint::Percentage(18),
                Constraint::Percentage(16),
                Constraint::Percentage(20),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Closed Trades"));

        frame.render_widget(table, area);
    }

    fn render_messages(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let messages: Vec<Line> = state
            .messages
            .iter()
            .rev()
            .take(4)
            .map(|m| Line::from(m.as_str()))
            .collect();

        let paragraph =
            Paragraph::new(messages).block(Block::default().borders(Borders::ALL).title("Log"));
        frame.render_widget(paragraph, area);
    }
}
