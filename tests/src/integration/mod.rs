//! # Integration Tests
//!
//! Full registration lifecycles driven through [`NameRegistryApi`] with the
//! in-memory adapters.
//!
//! [`NameRegistryApi`]: qc_18_name_registry::ports::inbound::NameRegistryApi

pub mod flows;
