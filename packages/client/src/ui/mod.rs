//! Terminal UI.

pub mod command;
pub mod render;
mod runner;

pub use runner::run;
