// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable duration formatting for logs and status output.

use std::time::Duration;

/// Formats a duration as a compact human-readable string, e.g. `"1h2m3s"`.
pub fn format_elapsed(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{hours}h{mins}m{secs}s")
    } else if mins > 0 {
        format!("{mins}m{secs}s")
    } else if total_secs > 0 {
        format!("{secs}s")
    } else {
        format!("{}ms", d.as_millis())
    }
}

/// Formats a duration with millisecond precision, e.g. `"123.4ms"` or `"2.500s"`.
pub fn format_elapsed_ms(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms < 1000.0 {
        format!("{ms:.1}ms")
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sub_second() {
        assert_eq!(format_elapsed(Duration::from_millis(500)), "500ms");
    }

    #[test]
    fn formats_seconds() {
        assert_eq!(format_elapsed(Duration::from_secs(42)), "42s");
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m5s");
    }

    #[test]
    fn formats_hours() {
        assert_eq!(format_elapsed(Duration::from_secs(3725)), "1h2m5s");
    }

    #[test]
    fn formats_elapsed_ms_sub_second() {
        assert_eq!(format_elapsed_ms(Duration::from_millis(123)), "123.0ms");
    }

    #[test]
    fn formats_elapsed_ms_seconds() {
        assert_eq!(format_elapsed_ms(Duration::from_millis(2500)), "2.500s");
    }
}
