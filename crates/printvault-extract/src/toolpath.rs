//! Toolpath (G-code) annotation metadata extraction.
//!
//! Slicers embed their estimates as comment banners at the head or tail of
//! the file, in slicer-specific formats:
//!
//! ```text
//! ;TIME:3661                        (Cura — seconds)
//! ;Filament used: 1.234m            (Cura — meters)
//! ; Filament used [m] = 1.234       (PrusaSlicer-style — meters)
//! ```
//!
//! Only the first and last 500 lines are scanned; reading a multi-megabyte
//! body of movement commands for a banner is wasted work. Unrecognized
//! formats silently yield zeros — this is a best-effort annotation reader,
//! not a validating parser.

use serde::{Deserialize, Serialize};

/// Number of lines scanned at each end of the file.
const SCAN_WINDOW: usize = 500;

/// Print duration marker.
const TIME_MARKER: &str = ";TIME:";

/// Filament length marker.
const FILAMENT_MARKER: &str = "Filament used";

/// Estimated print metadata recovered from slicer comments.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolpathMetadata {
    /// Estimated print duration in seconds.
    pub print_time_seconds: i32,
    /// Estimated filament length in millimeters.
    pub filament_length_mm: f64,
}

/// Extract print duration and filament length from toolpath text.
///
/// Both values default to 0 when no marker matches. When a marker appears
/// more than once, the later occurrence wins.
pub fn extract_metadata(text: &str) -> ToolpathMetadata {
    let lines: Vec<&str> = text.lines().collect();

    let head = lines.iter().take(SCAN_WINDOW);
    let tail_start = lines.len().saturating_sub(SCAN_WINDOW);
    let tail = lines.iter().skip(tail_start);

    let mut meta = ToolpathMetadata::default();
    for line in head.chain(tail) {
        if let Some(rest) = line.split_once(TIME_MARKER).map(|(_, rest)| rest) {
            if let Some(seconds) = leading_integer(rest.trim_start()) {
                meta.print_time_seconds = seconds;
            }
        }
        if line.contains(FILAMENT_MARKER) {
            if let Some(meters) = filament_meters(line) {
                meta.filament_length_mm = meters * 1000.0;
            }
        }
    }
    meta
}

/// Parse the run of leading ASCII digits as an integer.
fn leading_integer(s: &str) -> Option<i32> {
    let digits: &str = {
        let end = s
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        &s[..end]
    };
    digits.parse().ok()
}

/// Recover a filament length in meters from a `Filament used` line.
///
/// Two conventions: a numeric run immediately followed by `m`
/// (`... 1.234m`), or the bracketed unit form (`... [m] = 1.234`).
fn filament_meters(line: &str) -> Option<f64> {
    if let Some(value) = numeric_run_before_m(line) {
        return Some(value);
    }
    if line.contains("[m]") {
        let (_, after) = line.split_once('=')?;
        return after.trim().split_whitespace().next()?.parse().ok();
    }
    None
}

/// First run of `[0-9.]` characters immediately followed by `m`.
fn numeric_run_before_m(line: &str) -> Option<f64> {
    let bytes = line.as_bytes();
    let mut start = None;
    for (i, &b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() || b == b'.' {
            if start.is_none() {
                start = Some(i);
            }
        } else {
            if b == b'm' {
                if let Some(s) = start {
                    if let Ok(value) = line[s..i].parse::<f64>() {
                        return Some(value);
                    }
                }
            }
            start = None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cura_banner() {
        let gcode = ";FLAVOR:Marlin\n;TIME:3661\n;Filament used: 1.234m\nG28\nG1 X0 Y0\n";
        let meta = extract_metadata(gcode);
        assert_eq!(meta.print_time_seconds, 3661);
        assert!((meta.filament_length_mm - 1234.0).abs() < 1e-9);
    }

    #[test]
    fn test_prusa_bracketed_meters() {
        let gcode = "G28\n; Filament used [m] = 1.234\n; estimated printing time = 1h 1m 1s\n";
        let meta = extract_metadata(gcode);
        assert!((meta.filament_length_mm - 1234.0).abs() < 1e-9);
        assert_eq!(meta.print_time_seconds, 0);
    }

    #[test]
    fn test_no_markers_yields_zeros() {
        let meta = extract_metadata("G28\nG1 X10 Y10 E2.5\nM104 S0\n");
        assert_eq!(meta, ToolpathMetadata::default());
    }

    #[test]
    fn test_last_match_wins() {
        let gcode = ";TIME:100\nG1 X0\n;TIME:200\n";
        assert_eq!(extract_metadata(gcode).print_time_seconds, 200);
    }

    #[test]
    fn test_footer_banner_beyond_window() {
        // Banner after a long movement body is found by the tail scan.
        let mut gcode = String::from("G28\n");
        for i in 0..5000 {
            gcode.push_str(&format!("G1 X{} Y{}\n", i % 200, i % 180));
        }
        gcode.push_str(";TIME:42\n;Filament used: 0.5m\n");
        let meta = extract_metadata(&gcode);
        assert_eq!(meta.print_time_seconds, 42);
        assert!((meta.filament_length_mm - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_marker_buried_mid_file_is_missed() {
        // Only the head and tail windows are scanned by design.
        let mut gcode = String::new();
        for _ in 0..SCAN_WINDOW + 10 {
            gcode.push_str("G1 X1\n");
        }
        gcode.push_str(";TIME:77\n");
        for _ in 0..SCAN_WINDOW + 10 {
            gcode.push_str("G1 X1\n");
        }
        assert_eq!(extract_metadata(&gcode).print_time_seconds, 0);
    }

    #[test]
    fn test_malformed_time_ignored() {
        let meta = extract_metadata(";TIME:soon\n");
        assert_eq!(meta.print_time_seconds, 0);
    }
}
