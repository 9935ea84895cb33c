//! Overlap-aware renderer
//!
//! Stateless: the same document and annotation set always give the same
//! segmentation, whatever was rendered before.
//!
//! - [`segment`]: boundary-event sweep producing maximal runs
//! - [`style_segment`]: colors, borders and titles per run
//! - [`render_markup`]: HTML fragment with highlight spans

mod markup;
mod style;
mod sweep;

pub use markup::{render_markup, MarkupConfig};
pub use style::{
    band_gradient, find_label, hex_to_rgba, style_segment, SegmentStyle, MULTI_BORDER,
    MULTI_FILL_ALPHA, SINGLE_FILL_ALPHA,
};
pub use sweep::{segment, Coverage, Segment};
