//! Falling glyph rendering for bitfall.
//!
//! A [`Field`] owns one [`Column`] per screen slot. Each column mutates on its
//! own timer (driven by a shared [`Scheduler`] thread) while the host's render
//! loop draws every column onto a [`Surface`] once per frame.

mod column;
mod field;
mod scheduler;
mod style;
mod surface;

pub use column::{Column, ColumnState, Tick};
pub use field::{COLUMN_DENSITY, Field};
pub use scheduler::{Schedule, Scheduler, TaskHandle};
pub use style::{BlurLevel, ColumnStyle, DEPTH_RANGE, SHARP_THRESHOLD, SLIGHT_BLUR_THRESHOLD};
pub use surface::{BufferSurface, CELL_HEIGHT, CELL_WIDTH, GlyphPaint, Surface};
