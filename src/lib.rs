//! brickstep - headless editor layer over the animated scene model
//!
//! This crate exposes the layered configuration and the editor session that
//! drives a [`brickstep_core::Scene`].

pub mod config;
pub mod session;
