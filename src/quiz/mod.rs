//! Quiz rounds
//!
//! This module contains the question model, the rounds built from fetched
//! questions and the engine that drives their lifecycle.

pub mod engine;
pub mod question;
pub mod round;
