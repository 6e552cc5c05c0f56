//! Progress-line formatting for the analysis loop.

use std::time::Duration;

/// Render elapsed wall-clock time as `HH:MM:SS.mmm`, switching to
/// `D:HH:MM:SS.mmm` once a run passes 24 hours.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_ms = elapsed.as_millis();
    let ms = total_ms % 1000;
    let secs = (total_ms / 1000) % 60;
    let mins = (total_ms / 1000 / 60) % 60;
    let hours = (total_ms / 1000 / 60 / 60) % 24;
    let days = total_ms / 1000 / 60 / 60 / 24;
    if days > 0 {
        format!("{}:{:02}:{:02}:{:02}.{:03}", days, hours, mins, secs, ms)
    } else {
        format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
    }
}

/// Progress line after processing item `done` of `total`. The caller
/// overwrites the previous line in place with a leading carriage return.
pub fn progress_line(done: usize, total: usize, elapsed: Duration) -> String {
    let pct = if total > 0 {
        done as f64 / total as f64 * 100.0
    } else {
        100.0
    };
    format!(
        "Progress: {}/{} ({:.4}%) [elapsed {}]",
        done,
        total,
        pct,
        format_elapsed(elapsed)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed_sub_day() {
        assert_eq!(format_elapsed(Duration::ZERO), "00:00:00.000");
        assert_eq!(format_elapsed(Duration::from_millis(1_250)), "00:00:01.250");
        // 1 h 2 m 5 s 250 ms
        assert_eq!(format_elapsed(Duration::from_millis(3_725_250)), "01:02:05.250");
        assert_eq!(
            format_elapsed(Duration::from_millis(23 * 3_600_000 + 59 * 60_000 + 59_999)),
            "23:59:59.999"
        );
    }

    #[test]
    fn test_format_elapsed_day_rollover() {
        // 1 d 2 h 3 m 4 s 5 ms
        let elapsed = Duration::from_millis(86_400_000 + 2 * 3_600_000 + 3 * 60_000 + 4_005);
        assert_eq!(format_elapsed(elapsed), "1:02:03:04.005");
    }

    #[test]
    fn test_progress_line_percentage_precision() {
        let line = progress_line(1, 3, Duration::from_millis(42));
        assert_eq!(line, "Progress: 1/3 (33.3333%) [elapsed 00:00:00.042]");
        let line = progress_line(3, 3, Duration::from_secs(1));
        assert_eq!(line, "Progress: 3/3 (100.0000%) [elapsed 00:00:01.000]");
    }
}
