//! # Trivia Library
//!
//! This library provides the question-lifecycle and scoring engine of a
//! trivia quiz. It fetches batches of multiple choice questions, shuffles
//! their answers, grades submissions and keeps a persistent score history
//! and player identity across sessions.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]
use serde::Serialize;

pub mod config;
pub mod constants;
pub mod game;
pub mod identity;
pub mod ledger;
pub mod quiz;
pub mod session;
pub mod source;
pub mod storage;

/// Messages sent to update what the rendering surface displays
///
/// Update messages describe every visible change: new questions, the
/// loading indicator, scores and error notices.
#[derive(Debug, Serialize, Clone, PartialEq, Eq, derive_more::From)]
pub enum UpdateMessage {
    /// Session level updates
    Game(game::UpdateMessage),
    /// Round display updates
    Round(quiz::round::UpdateMessage),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}
