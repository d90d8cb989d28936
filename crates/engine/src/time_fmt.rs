// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp formatting for log lines.

use chrono::Utc;

/// Format the current UTC time as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_utc_now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_matches_iso_8601() {
        let ts = format_utc_now();
        assert_eq!(ts.len(), 20);
        assert_eq!(ts.chars().nth(4), Some('-'));
        assert_eq!(ts.chars().nth(10), Some('T'));
        assert!(ts.ends_with('Z'));
    }
}
