pub mod cli;
pub mod commands;
pub mod console;
pub mod error;
pub mod graph_api;
pub mod menu;
pub mod settings;
pub mod types;

pub use error::{GraphError, Result};
