//! # geocoin-session — session driver for the Geocoin world
//!
//! This crate is the integration layer between the pure world model in
//! `geocoin-core` and whatever host delivers player input (UI buttons, a
//! geolocation watch). It owns all per-session state and reacts to discrete
//! events:
//!
//! - movement commands and position updates drive cache materialization and
//!   teardown through the momento store;
//! - collect/deposit commands route through the core transfer protocol;
//! - position and inventory are persisted through the host's blob store
//!   after every mutating event, degrading to in-memory-only if storage
//!   fails.
//!
//! Rendering, widgets, and the geolocation device itself stay on the host
//! side; the driver exposes plain state accessors for them.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod session;

pub use session::{GameSession, SessionCommand};
