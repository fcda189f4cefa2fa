//! Preview application state and logic

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::prelude::Rect;

use super::event::{Event, EventHandler};
use super::ui::{self, Terminal};
use crate::config::Config;
use crate::domain::FilePos;
use crate::outline::PlanOutline;
use crate::preview::{
    IdentifierKind, PreviewSession, SystemClock, UiEvent, CHART_GEOMETRY,
};
use crate::render::{ChartKind, RenderOptions, Renderer};

/// Application state
pub struct App {
    /// Root plan file
    root: PathBuf,

    /// Render options for this preview
    options: RenderOptions,

    /// Renderer handle
    renderer: Renderer,

    /// Correlator session for the current preview
    session: PreviewSession<PlanOutline, SystemClock>,

    /// Display copy of the active render's row table
    rows: Vec<(IdentifierKind, String)>,

    /// Last rendered image, if any
    image: Option<PathBuf>,

    /// Status line content
    status: String,

    /// First visible row of the table
    scroll: usize,

    /// Screen area of the row table, set during drawing
    rows_area: Option<Rect>,

    /// Source location to open once the frame is drawn
    pending_nav: Option<FilePos>,

    /// Whether to quit
    should_quit: bool,
}

impl App {
    /// Create a new application
    pub fn new(root: &Path, config: &Config, options: RenderOptions) -> Self {
        let renderer = Renderer::new(config.renderer_binary());
        let session = PreviewSession::new(PlanOutline::new(), SystemClock, root);
        Self {
            root: root.to_path_buf(),
            options,
            renderer,
            session,
            rows: Vec::new(),
            image: None,
            status: "Starting...".to_string(),
            scroll: 0,
            rows_area: None,
            pending_nav: None,
            should_quit: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn chart_kind(&self) -> ChartKind {
        self.options.chart
    }

    pub fn image(&self) -> Option<&PathBuf> {
        self.image.as_ref()
    }

    pub fn rows(&self) -> &[(IdentifierKind, String)] {
        &self.rows
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn set_rows_area(&mut self, area: Rect) {
        self.rows_area = Some(area);
    }

    /// Run the main loop
    pub fn run(&mut self, terminal: &mut Terminal, events: EventHandler) -> Result<()> {
        self.render_chart();

        loop {
            terminal.draw(|frame| ui::draw(frame, self))?;

            if let Some(pos) = self.pending_nav.take() {
                self.open_in_editor(terminal, &pos)?;
                continue;
            }
            if self.should_quit {
                break;
            }

            match events.next()? {
                Event::Key(key) => self.on_key(key),
                Event::Mouse(mouse) => self.on_mouse(mouse),
                Event::Resize(_, _) | Event::Tick => {}
            }
        }
        Ok(())
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => self.render_chart(),
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll_down(),
            _ => {}
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.click_at(mouse.column, mouse.row),
            MouseEventKind::Moved => self.hover_at(mouse.column, mouse.row),
            MouseEventKind::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            MouseEventKind::ScrollDown => self.scroll_down(),
            _ => {}
        }
    }

    fn scroll_down(&mut self) {
        if self.scroll + 1 < self.rows.len() {
            self.scroll += 1;
        }
    }

    /// Translates a terminal position inside the row table to chart image
    /// pixel coordinates.
    fn chart_pixel(&self, column: u16, row: u16) -> Option<(u32, u32)> {
        let area = self.rows_area?;
        if area.height < 2 || area.width < 2 {
            return None;
        }
        // The table body starts inside the border.
        if row <= area.y || row >= area.y + area.height - 1 {
            return None;
        }
        if column <= area.x || column >= area.x + area.width - 1 {
            return None;
        }
        let chart_row = (row - area.y - 1) as usize + self.scroll;
        if chart_row >= self.rows.len() {
            return None;
        }
        let y = CHART_GEOMETRY.row_center_y(chart_row as u32);
        Some((column as u32, y))
    }

    fn hover_at(&mut self, column: u16, row: u16) {
        let Some((x, y)) = self.chart_pixel(column, row) else {
            return;
        };
        if let Some(UiEvent::ShowLabel {
            kind, identifier, ..
        }) = self.session.hover(x, y)
        {
            self.status = format!("{} {}", kind.label(), identifier);
        }
    }

    fn click_at(&mut self, column: u16, row: u16) {
        let Some((x, y)) = self.chart_pixel(column, row) else {
            return;
        };
        match self.session.click(x, y) {
            Some(UiEvent::Navigate(pos)) => {
                self.status = format!("Opening {}", pos);
                self.pending_nav = Some(pos);
            }
            Some(_) => {}
            None => {
                if let Some(e) = self.session.build_error() {
                    self.status = format!("Cannot resolve references: {}", e);
                } else if let Some(e) = self.session.side_channel_error() {
                    self.status = format!("Row map unavailable: {}", e);
                } else {
                    self.status = "Nothing to navigate to".to_string();
                }
            }
        }
    }

    /// Renders once and swaps the preview to the new artifacts.
    fn render_chart(&mut self) {
        self.status = "Rendering...".to_string();
        match self.renderer.render(&self.root, &self.options) {
            Ok(outcome) => {
                self.session.render_completed(&outcome.click_map);
                self.rows = collect_rows(&mut self.session);
                self.scroll = 0;
                self.status = match self.session.side_channel_error() {
                    Some(e) => format!("Rendered, but row map unavailable: {}", e),
                    None => format!("Rendered {}", outcome.image.display()),
                };
                self.image = Some(outcome.image);
            }
            Err(e) => {
                self.status = format!("Render failed: {}", first_line(&e.to_string()));
            }
        }
    }

    /// Suspends the TUI, opens the position in `$EDITOR`, and resumes.
    fn open_in_editor(&mut self, terminal: &mut Terminal, pos: &FilePos) -> Result<()> {
        ui::restore_terminal()?;

        let editor = std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .unwrap_or_else(|_| "vi".to_string());
        let status = Command::new(&editor)
            .arg(format!("+{}", pos.display_line()))
            .arg(&pos.path)
            .status();

        *terminal = ui::init_terminal()?;
        terminal.clear()?;

        self.status = match status {
            Ok(s) if s.success() => format!("Viewed {}", pos),
            Ok(s) => format!("{} exited with {}", editor, s),
            Err(e) => format!("Failed to launch {}: {}", editor, e),
        };
        Ok(())
    }
}

fn collect_rows(
    session: &mut PreviewSession<PlanOutline, SystemClock>,
) -> Vec<(IdentifierKind, String)> {
    let Some(map) = session.click_map() else {
        return Vec::new();
    };
    (0..map.row_count() as u32)
        .filter_map(|row| map.identifier_at(row))
        .map(|(kind, id)| (kind, id.to_string()))
        .collect()
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}
