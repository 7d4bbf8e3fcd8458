// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

/// User-facing text for a throttled request.
///
/// Sub-second delays round up so the caller is never told to wait "0s".
pub fn throttle_message(retry_after: Duration) -> String {
    if retry_after.is_zero() {
        return "You're sending requests too quickly. Please wait a moment.".to_string();
    }
    let mut secs = retry_after.as_secs();
    if retry_after.subsec_nanos() > 0 {
        secs += 1;
    }
    let wait = if secs >= 60 {
        let (m, s) = (secs / 60, secs % 60);
        if s == 0 { format!("{m}m") } else { format!("{m}m {s}s") }
    } else {
        format!("{secs}s")
    };
    format!("You're sending requests too quickly. Try again in {wait}.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_partial_seconds_up() {
        assert_eq!(
            throttle_message(Duration::from_millis(12_200)),
            "You're sending requests too quickly. Try again in 13s."
        );
    }

    #[test]
    fn formats_minutes() {
        assert!(throttle_message(Duration::from_secs(60)).ends_with("in 1m."));
        assert!(throttle_message(Duration::from_secs(95)).ends_with("in 1m 35s."));
    }

    #[test]
    fn zero_delay_has_no_countdown() {
        assert!(throttle_message(Duration::ZERO).contains("wait a moment"));
    }
}
