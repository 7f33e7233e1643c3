//! # Metadata Layer
//!
//! Record → document rendering, the SVG card and the data-URI transport.

pub mod document;
pub mod svg;
pub mod transport;

pub use document::*;
pub use svg::{check_well_formed, render_svg};
pub use transport::*;
