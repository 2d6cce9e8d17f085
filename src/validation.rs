//! Validation of raw text input from the console and command line

use crate::core::{DispatchError, LogLevel, Result};

/// A message is accepted when it contains something other than spaces
pub fn validate_message(message: &str) -> bool {
    !message.is_empty() && message.chars().any(|c| c != ' ')
}

/// Parse a level name, falling back to `Info` for anything unrecognized
pub fn parse_level_or_default(input: &str) -> LogLevel {
    input.parse().unwrap_or_default()
}

/// Log files must carry a `.txt` extension with a non-empty stem
pub fn validate_file_name(name: &str) -> Result<()> {
    match name.strip_suffix(".txt") {
        Some(stem) if !stem.is_empty() && !stem.ends_with('/') => Ok(()),
        _ => Err(DispatchError::config(
            "file name",
            format!("'{}' must have a .txt extension", name),
        )),
    }
}

/// Parse a TCP port in the range 1-65535
pub fn parse_port(input: &str) -> Result<u16> {
    match input.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(DispatchError::config(
            "port",
            format!("'{}' is not a port number (1-65535)", input.trim()),
        )),
    }
}

/// Parse a numbered menu choice within `min..=max`
pub fn parse_menu_choice(input: &str, min: u32, max: u32) -> Option<u32> {
    input
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|choice| (min..=max).contains(choice))
}
