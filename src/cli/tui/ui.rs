//! Terminal setup and drawing for the preview

use std::io::{self, stdout, Stdout};

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use super::app::App;

/// Terminal type alias
pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode with mouse capture
pub fn init_terminal() -> Result<Terminal> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = ratatui::Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
    Ok(())
}

/// Draw the whole preview frame
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(3),
    ])
    .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_rows(frame, app, chunks[1]);
    draw_status(frame, app, chunks[2]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let image = app
        .image()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "not rendered yet".to_string());
    let text = format!(
        "{}  ·  {}  ·  {}",
        app.root().display(),
        app.chart_kind().as_str(),
        image
    );
    let header = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" plannav preview "),
    );
    frame.render_widget(header, area);
}

fn draw_rows(frame: &mut Frame, app: &mut App, area: Rect) {
    // Remember where the table body sits for mouse hit-testing.
    app.set_rows_area(area);

    let items: Vec<ListItem> = app
        .rows()
        .iter()
        .enumerate()
        .skip(app.scroll())
        .map(|(row, (kind, identifier))| {
            ListItem::new(format!("{:>4}  {:<9} {}", row, kind.label(), identifier))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" chart rows "),
    );
    frame.render_widget(list, area);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = Paragraph::new(app.status().to_string()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" q quit · r render · click a row to open its source "),
    );
    frame.render_widget(status, area);
}
