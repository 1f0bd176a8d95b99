//! # Pad Overlay Library
//!
//! Touch-driven virtual game controller: turns any number of simultaneous
//! screen touches into one continuously updated controller state.
//!
//! The [`overlay::Overlay`] owns every on-screen control (buttons,
//! directional pads, fixed and floating analog sticks), routes each
//! [`touch::TouchEvent`] to them in priority order and forwards the
//! aggregated [`state::ControllerState`] to a [`state::StateSink`]. In edit
//! mode the same touches move, resize and reconfigure the controls, with
//! every change persisted through a [`store::SettingsStore`].

pub mod config;
pub mod controls;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod state;
pub mod store;
pub mod touch;
