//! # Domain Layer
//!
//! Pure registry logic with no I/O. Time and caller identity are inputs.

pub mod engine;
pub mod entities;
pub mod invariants;
pub mod lease;
pub mod owner_index;
pub mod pricing;
pub mod records;
pub mod treasury;
pub mod value_objects;

pub use engine::*;
pub use entities::*;
pub use invariants::*;
pub use lease::*;
pub use owner_index::*;
pub use pricing::*;
pub use records::*;
pub use treasury::*;
pub use value_objects::*;
