//! View renderers
//!
//! Both renderers are pure over (store, selection). The list renderer keeps
//! one id of memory to detect scroll transitions; the map renderer caches
//! base radii so single-selection updates stay O(1).

mod list;
mod map;

pub use list::{CardViewModel, ListRenderer, ListUpdate, render_cards};
pub use map::{MapRenderer, MarkerColor, MarkerViewModel, RadiusScale, render_markers};
