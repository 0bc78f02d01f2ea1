//! Authentication-gated environmental sensing.
//!
//! A presented card is validated against a hashed allow-list; on success
//! the control loop polls motion, distance and temperature/humidity
//! sensors once per tick, keeps a bounded rolling history and appends
//! every reading and auth event to an append-only log. Display rendering
//! and wire-level GPIO drivers are external collaborators behind the
//! `sensors::interface` traits and the `control::DisplayHandle`.

pub mod auth;
pub mod config;
pub mod control;
pub mod models;
pub mod sensors;
pub mod storage;
