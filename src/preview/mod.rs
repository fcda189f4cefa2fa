//! Chart preview correlation
//!
//! Maps positions on a rendered chart image back to plan identifiers and
//! their source locations: pixel → row band ([`geometry`]), row →
//! identifier ([`clickmap`]), identifier → positions with click cycling
//! ([`session`]).

mod clickmap;
mod geometry;
mod session;

pub use clickmap::{ClickMap, ClickMapError, IdentifierKind};
pub use geometry::{RowGeometry, CHART_GEOMETRY};
pub use session::{Clock, PreviewSession, SystemClock, UiEvent, CYCLE_WINDOW_MS};
