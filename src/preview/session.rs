//! Preview session: pixel → row → identifier → source location
//!
//! One session spans one open preview. It owns the per-render ClickMap
//! cache, the lazily built reference index and the click cycling state.
//! Lifecycle: created when a preview opens, invalidated on every new
//! render, dropped when the preview closes.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::domain::FilePos;
use crate::outline::{ImportSource, SymbolSource};
use crate::preview::clickmap::{ClickMap, IdentifierKind};
use crate::preview::geometry::{RowGeometry, CHART_GEOMETRY};
use crate::references::{build_plan, find_resource, find_task};

/// Repeated clicks on the same identifier within this window cycle
/// through its matches.
pub const CYCLE_WINDOW_MS: i64 = 2000;

/// Wall-clock capability, injectable so cycling is testable without real
/// delays.
pub trait Clock {
    /// Milliseconds since the epoch
    fn now_ms(&self) -> i64;
}

/// The process wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Side effects the correlator asks the UI boundary to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Show a transient label for the identifier under the cursor
    ShowLabel {
        x: u32,
        y: u32,
        kind: IdentifierKind,
        identifier: String,
    },

    /// Open the file and reveal the position
    Navigate(FilePos),
}

/// Click cycling state, reset on every render invalidation.
#[derive(Debug, Clone, Default, PartialEq)]
struct ClickState {
    last_identifier: String,
    last_results: Vec<FilePos>,
    last_click_ms: i64,
    cycle_index: usize,
}

/// One preview session over a root plan file.
pub struct PreviewSession<S, C> {
    source: S,
    clock: C,
    root: PathBuf,
    geometry: RowGeometry,

    /// Side-channel file of the active render, if any render succeeded yet
    map_path: Option<PathBuf>,
    /// ClickMap cache, loaded at most once per render generation
    click_map: Option<ClickMap>,
    /// Remembered side-channel failure for the active render
    map_error: Option<String>,

    /// Merged plan, built lazily on the first click of the session
    references: Option<crate::domain::PlanDef>,
    /// Remembered build failure; cleared only with the session
    build_error: Option<String>,

    state: ClickState,
}

impl<S, C> PreviewSession<S, C>
where
    S: SymbolSource + ImportSource,
    C: Clock,
{
    /// Opens a session for the given root plan file.
    pub fn new(source: S, clock: C, root: impl Into<PathBuf>) -> Self {
        Self {
            source,
            clock,
            root: root.into(),
            geometry: CHART_GEOMETRY,
            map_path: None,
            click_map: None,
            map_error: None,
            references: None,
            build_error: None,
            state: ClickState::default(),
        }
    }

    /// Returns the root plan file of this session.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Records a completed render: the new side-channel file replaces the
    /// old one, the cached map and the cycling state are dropped, so a
    /// stale row table is never consulted again.
    pub fn render_completed(&mut self, map_path: impl Into<PathBuf>) {
        self.map_path = Some(map_path.into());
        self.click_map = None;
        self.map_error = None;
        self.state = ClickState::default();
    }

    /// Remembered side-channel failure for the active render, if any.
    pub fn side_channel_error(&self) -> Option<&str> {
        self.map_error.as_deref()
    }

    /// Remembered reference build failure, if any.
    pub fn build_error(&self) -> Option<&str> {
        self.build_error.as_deref()
    }

    /// The active render's row table, loading it on first use.
    pub fn click_map(&mut self) -> Option<&ClickMap> {
        self.ensure_click_map();
        self.click_map.as_ref()
    }

    /// Resolves a pixel position to the identifier drawn on that row.
    pub fn identifier_at(&mut self, y: u32) -> Option<(IdentifierKind, String)> {
        let row = self.geometry.row_at(y)?;
        self.ensure_click_map();
        let map = self.click_map.as_ref()?;
        map.identifier_at(row)
            .map(|(kind, id)| (kind, id.to_string()))
    }

    /// Hover: resolve the position and ask the UI to show a label. Never
    /// touches the cycling state.
    pub fn hover(&mut self, x: u32, y: u32) -> Option<UiEvent> {
        let (kind, identifier) = self.identifier_at(y)?;
        Some(UiEvent::ShowLabel {
            x,
            y,
            kind,
            identifier,
        })
    }

    /// Click: resolve the position to an identifier, the identifier to its
    /// source locations, and ask the UI to navigate to one of them.
    ///
    /// Repeated clicks on the same identifier within the cycle window step
    /// through every match in order, wrapping around; a click elsewhere or
    /// after a pause restarts at the first match.
    pub fn click(&mut self, _x: u32, y: u32) -> Option<UiEvent> {
        let (kind, identifier) = self.identifier_at(y)?;

        self.ensure_references();
        let plan = self.references.as_ref()?;
        let matches = match kind {
            IdentifierKind::Task => find_task(plan, &identifier),
            IdentifierKind::Resource => find_resource(plan, &identifier),
        };
        if matches.is_empty() {
            return None;
        }

        let now = self.clock.now_ms();
        let within_window = now - self.state.last_click_ms < CYCLE_WINDOW_MS;
        if within_window && self.state.last_identifier == identifier {
            self.state.cycle_index += 1;
        } else {
            self.state.cycle_index = 0;
        }
        self.state.last_identifier = identifier;
        self.state.last_click_ms = now;
        self.state.last_results = matches;

        let results = &self.state.last_results;
        let target = results[self.state.cycle_index % results.len()].clone();
        Some(UiEvent::Navigate(target))
    }

    fn ensure_click_map(&mut self) {
        if self.click_map.is_some() || self.map_error.is_some() {
            return;
        }
        let Some(path) = self.map_path.as_ref() else {
            return;
        };
        match ClickMap::load(path) {
            Ok(map) => self.click_map = Some(map),
            Err(e) => self.map_error = Some(e.to_string()),
        }
    }

    fn ensure_references(&mut self) {
        if self.references.is_some() || self.build_error.is_some() {
            return;
        }
        match build_plan(&self.source, &self.root) {
            Ok(build) => self.references = Some(build.plan),
            Err(e) => self.build_error = Some(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fs;
    use std::rc::Rc;

    use crate::outline::PlanOutline;

    use super::*;

    /// Manually advanced clock for deterministic cycling tests.
    #[derive(Clone, Default)]
    struct FakeClock(Rc<Cell<i64>>);

    impl FakeClock {
        fn advance(&self, ms: i64) {
            self.0.set(self.0.get() + ms);
        }
    }

    impl Clock for FakeClock {
        fn now_ms(&self) -> i64 {
            self.0.get()
        }
    }

    const PLAN: &str = "\
resources:
  - resource: dev1
tasks:
  - task: alpha
  - task: beta
updates:
  - update: 2021-01-01
    tasks:
      - task: alpha
  - update: 2021-02-01
    tasks:
      - task: alpha
";

    fn session_with_render(
        dir: &tempfile::TempDir,
    ) -> (PreviewSession<PlanOutline, FakeClock>, FakeClock) {
        let root = dir.path().join("plan.yaml");
        fs::write(&root, PLAN).unwrap();

        // The renderer emits resource rows below the task rows, so the
        // resource table only becomes reachable past the task table.
        let map = serde_json::json!({
            "tasks": ["alpha", "beta"],
            "resources": ["alpha", "beta", "dev1"],
        });
        let map_path = dir.path().join("plan.gantt.png.json");
        fs::write(&map_path, serde_json::to_string(&map).unwrap()).unwrap();

        let clock = FakeClock::default();
        clock.advance(10_000);
        let mut session = PreviewSession::new(PlanOutline::new(), clock.clone(), &root);
        session.render_completed(&map_path);
        (session, clock)
    }

    fn row_y(row: u32) -> u32 {
        CHART_GEOMETRY.row_center_y(row)
    }

    #[test]
    fn hover_shows_label_without_touching_state() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _clock) = session_with_render(&dir);

        let event = session.hover(12, row_y(1)).unwrap();
        assert_eq!(
            event,
            UiEvent::ShowLabel {
                x: 12,
                y: row_y(1),
                kind: IdentifierKind::Task,
                identifier: "beta".into(),
            }
        );
        assert_eq!(session.state, ClickState::default());
    }

    #[test]
    fn rapid_clicks_cycle_through_matches_and_wrap() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, clock) = session_with_render(&dir);
        let root = session.root().to_path_buf();

        // alpha: declaration (line 3) plus two update records (lines 8, 11).
        let expected = [3u32, 8, 11, 3];
        for line in expected {
            let event = session.click(0, row_y(0)).unwrap();
            assert_eq!(event, UiEvent::Navigate(FilePos::new(&root, line)));
            clock.advance(100);
        }
    }

    #[test]
    fn pause_restarts_cycling_at_first_match() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, clock) = session_with_render(&dir);
        let root = session.root().to_path_buf();

        session.click(0, row_y(0)).unwrap();
        clock.advance(100);
        let second = session.click(0, row_y(0)).unwrap();
        assert_eq!(second, UiEvent::Navigate(FilePos::new(&root, 8)));

        clock.advance(2100);
        let after_pause = session.click(0, row_y(0)).unwrap();
        assert_eq!(after_pause, UiEvent::Navigate(FilePos::new(&root, 3)));
    }

    #[test]
    fn clicking_elsewhere_resets_the_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, clock) = session_with_render(&dir);
        let root = session.root().to_path_buf();

        session.click(0, row_y(0)).unwrap();
        clock.advance(100);
        // beta is a single-match identifier on row 1.
        let other = session.click(0, row_y(1)).unwrap();
        assert_eq!(other, UiEvent::Navigate(FilePos::new(&root, 4)));

        clock.advance(100);
        let back = session.click(0, row_y(0)).unwrap();
        assert_eq!(back, UiEvent::Navigate(FilePos::new(&root, 3)));
    }

    #[test]
    fn resource_rows_resolve_after_task_rows() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _clock) = session_with_render(&dir);
        let root = session.root().to_path_buf();

        // Row 2 misses the task table (2 entries) and hits resource row 2.
        let event = session.click(0, row_y(2));
        assert_eq!(event, Some(UiEvent::Navigate(FilePos::new(&root, 1))));
    }

    #[test]
    fn no_render_yet_means_no_events() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("plan.yaml");
        fs::write(&root, PLAN).unwrap();

        let mut session = PreviewSession::new(PlanOutline::new(), FakeClock::default(), &root);
        assert_eq!(session.hover(0, row_y(0)), None);
        assert_eq!(session.click(0, row_y(0)), None);
        assert!(session.side_channel_error().is_none());
    }

    #[test]
    fn missing_side_channel_degrades_and_is_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("plan.yaml");
        fs::write(&root, PLAN).unwrap();

        let mut session = PreviewSession::new(PlanOutline::new(), FakeClock::default(), &root);
        session.render_completed(dir.path().join("plan.gantt.png.json"));

        assert_eq!(session.click(0, row_y(0)), None);
        assert!(session.side_channel_error().is_some());
    }

    #[test]
    fn invalidation_clears_map_and_state() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, clock) = session_with_render(&dir);

        session.click(0, row_y(0)).unwrap();
        clock.advance(100);

        // New render: swap the side-channel content, rows shifted.
        let map = serde_json::json!({ "tasks": ["beta", "alpha"], "resources": [] });
        let map_path = dir.path().join("plan.gantt.png.json");
        fs::write(&map_path, serde_json::to_string(&map).unwrap()).unwrap();
        session.render_completed(&map_path);

        assert_eq!(session.state, ClickState::default());
        let root = session.root().to_path_buf();
        // Row 0 now resolves via the new table, starting a fresh cycle.
        let event = session.click(0, row_y(0)).unwrap();
        assert_eq!(event, UiEvent::Navigate(FilePos::new(&root, 4)));
    }

    #[test]
    fn clicks_above_the_first_band_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _clock) = session_with_render(&dir);
        assert_eq!(session.click(0, CHART_GEOMETRY.offset_y - 1), None);
    }
}
