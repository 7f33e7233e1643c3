//! # Ports Layer
//!
//! - `inbound`: the API this subsystem exposes
//! - `outbound`: interfaces it depends on

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
