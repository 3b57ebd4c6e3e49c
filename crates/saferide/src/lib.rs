//! Crash-aware route comparison.
//!
//! Ranks candidate routes by recorded crashes, assigns each a risk color, and keeps track
//! of which routes are shown as the user hovers and clicks.

pub mod api;
pub mod autocomplete;
pub mod cards;
pub mod classify;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod geometry;
pub mod visibility;
