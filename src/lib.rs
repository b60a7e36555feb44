//! Common functionality for ecm-summary.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod ecm;
pub mod id;
pub mod input;
pub mod log;
pub mod output;
pub mod settings;
pub mod state;
pub mod table;
pub mod year;

#[cfg(test)]
mod fixture;

/// Get the directory in which the program's configuration files are stored.
///
/// Falls back to the current directory if the platform has no config directory.
pub fn get_ecm_summary_config_dir() -> PathBuf {
    let Some(mut dir) = dirs::config_dir() else {
        return PathBuf::from(".");
    };
    dir.push("ecm-summary");

    dir
}
