//! Wealth Inc.: an incremental coin-and-note economy played in a
//! terminal-styled browser page.
//!
//! [`economy`] is the simulation and knows nothing about the browser.
//! [`app`], [`render`] and [`click`] form the host shell that `main.rs`
//! wires to ratzilla.

pub mod app;
pub mod click;
pub mod config;
pub mod economy;
pub mod error;
pub mod format;
pub mod logging;
pub mod render;
pub mod save;
pub mod time;
