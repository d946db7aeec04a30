//! Utility functions for apiscope

use anyhow::{anyhow, Result};
use std::path::PathBuf;

/// Get the platform data directory for apiscope (sessions and history)
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?
        .join("apiscope");

    Ok(data_dir)
}

/// Format bytes as human readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.1} {}", size, UNITS[unit_index])
}

/// Format a millisecond duration as human readable string
pub fn format_duration_ms(duration_ms: u64) -> String {
    let secs = duration_ms / 1000;
    let millis = duration_ms % 1000;

    if secs > 0 {
        format!("{secs}.{millis:03}s")
    } else {
        format!("{millis}ms")
    }
}

/// Shorten text to at most `max_chars` characters for one-line display
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= max_chars {
        return single_line;
    }

    let kept: String = single_line.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512.0 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.0 MB");
    }

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration_ms(42), "42ms");
        assert_eq!(format_duration_ms(1_005), "1.005s");
    }

    #[test]
    fn test_truncate_for_display() {
        assert_eq!(truncate_for_display("short", 10), "short");
        assert_eq!(truncate_for_display("a\n  b", 10), "a b");
        assert_eq!(truncate_for_display("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_data_dir_is_namespaced() {
        if let Ok(dir) = get_data_dir() {
            assert!(dir.ends_with("apiscope"));
        }
    }
}
