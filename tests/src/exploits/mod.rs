//! # Attack Simulations
//!
//! Hostile call sequences against the registry. Each test asserts that the
//! attack fails and that the registry invariants still hold afterwards.

pub mod index_consistency;
pub mod reentrancy;
