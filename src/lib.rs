//! insightdash: ask business questions in plain language, get a chart,
//! a summary and insights back.
//!
//! The binary in `main.rs` is a thin clap front-end over these modules.

pub mod analysis;
pub mod analytics;
pub mod cli;
pub mod config;
pub mod health;
pub mod llm;
pub mod store;
pub mod suggest;
pub mod view;
pub mod web;
