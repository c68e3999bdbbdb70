use std::time::Duration;

/// Render a duration as a `mm:ss` clock, rounding partial seconds up so a
/// running countdown shows `00:00` only when it is over.
pub fn format_clock(duration: Duration) -> String {
    let secs = duration.as_millis().div_ceil(1000);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_clock_whole() {
        assert_eq!(format_clock(Duration::from_secs(25 * 60)), "25:00");
        assert_eq!(format_clock(Duration::from_secs(61)), "01:01");
        assert_eq!(format_clock(Duration::ZERO), "00:00");
    }

    #[test]
    fn format_clock_rounds_up() {
        assert_eq!(format_clock(Duration::from_millis(100)), "00:01");
        assert_eq!(format_clock(Duration::from_millis(59_900)), "01:00");
    }

    #[test]
    fn format_clock_long() {
        assert_eq!(format_clock(Duration::from_secs(100 * 60)), "100:00");
    }
}
