//! Crossroads Simulation Library
//!
//! A signalised four-way intersection with vehicles and pedestrians, plus a
//! small lane-runner game. Both run headless or, for the intersection, with
//! a Bevy UI.

pub mod arcade;
pub mod simulation;

#[cfg(feature = "ui")]
pub mod ui;
