//! Reusable observers for the Spindle workspace.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work across the solvers and pipelines in Spindle.
//!
//! # Modules
//!
//! - [`traits`] — Capability traits for cross-solver observers
//!   ([`HasResidual`], [`HasObjective`], [`CanStopEarly`])
//!
//! # Observers
//!
//! - [`LogObserver`] — forwards events to [`tracing`]
//! - [`StopAfter`] — stops any interruptible operation after a fixed number of events
//!
//! [`Observer`]: spindle_core::Observer
//! [`HasResidual`]: traits::HasResidual
//! [`HasObjective`]: traits::HasObjective
//! [`CanStopEarly`]: traits::CanStopEarly

mod log;
mod stop_after;
pub mod traits;

pub use log::LogObserver;
pub use stop_after::StopAfter;
