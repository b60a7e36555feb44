//! Common routines for handling input data.
use anyhow::{Context, Result, ensure};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt::Display;
use std::fs::{self, File};
use std::hash::Hash;
use std::io::BufReader;
use std::path::Path;

pub mod ecm;
pub use ecm::read_results;

/// Read a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Read a JSON file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the JSON file
///
/// # Returns
///
/// * The deserialised JSON data or an error if the file could not be read or parsed.
pub fn read_json<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let file = File::open(file_path).with_context(|| input_err_msg(file_path))?;
    let json_data =
        serde_json::from_reader(BufReader::new(file)).with_context(|| input_err_msg(file_path))?;
    Ok(json_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Check that a list is not empty and contains no duplicates.
///
/// # Arguments
///
/// * `iter` - The values to check
/// * `description` - What the values are, for use in error messages (e.g. "building types")
pub fn check_non_empty_and_unique<'a, T, I>(iter: I, description: &str) -> Result<()>
where
    T: Eq + Hash + Display + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut seen = HashSet::new();
    let mut count = 0;
    for value in iter {
        ensure!(seen.insert(value), "Duplicate entry in {description}: {value}");
        count += 1;
    }
    ensure!(count > 0, "No {description} provided");

    Ok(())
}
