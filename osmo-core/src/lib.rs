//! Core traits and types for Osmo, a framework for steady-state membrane
//! system modeling.
//!
//! This crate defines the shared pieces the chemistry and membrane crates
//! build on:
//!
//! - [`Model`]: a deterministic callable mapping a typed input to a typed output
//! - [`Bounded`]: a fraction held inside a fixed band, such as [`Recovery`]
//!   and [`Rejection`]
//! - [`units`]: display unit tags and the conversions between them and the
//!   internal `uom` quantities

mod bounded;
mod model;

pub mod units;

pub use bounded::{Bounded, Bounds, BoundsError, Recovery, RecoveryBand, Rejection, RejectionBand};
pub use model::Model;
