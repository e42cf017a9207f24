// framereel - visual frame codec for arbitrary binary data.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! General utility functions for the CLI binary.

use chrono::Duration;
use std::time;

/// Single hex representation of a byte slice, e.g. for printing checksums.
pub fn bytes_to_hex_string(bytes: &[u8]) -> String {
    let mut hex_string = String::with_capacity(2 + bytes.len() * 2);
    hex_string.push_str("0x");

    for byte in bytes {
        hex_string.push_str(&format!("{byte:02x}"));
    }
    hex_string
}

/// Format a duration to human readable form.
pub fn format_duration(duration: time::Duration) -> String {
    let Ok(chrono_duration) = Duration::from_std(duration) else {
        return "Duration too large".to_string();
    };

    if chrono_duration < Duration::milliseconds(1) {
        format!("{} µs", chrono_duration.num_microseconds().unwrap_or(0))
    } else if chrono_duration < Duration::seconds(1) {
        format!("{} ms", chrono_duration.num_milliseconds())
    } else if chrono_duration < Duration::minutes(1) {
        format!("{} s", chrono_duration.num_seconds())
    } else {
        format!(
            "{:02}:{:02}:{:02}",
            chrono_duration.num_hours(),
            chrono_duration.num_minutes() % 60,
            chrono_duration.num_seconds() % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_string_formats_with_prefix() {
        assert_eq!(bytes_to_hex_string(&[0x0a, 0xff]), "0x0aff");
    }

    #[test]
    fn duration_formats_by_magnitude() {
        assert!(format_duration(time::Duration::from_micros(5)).ends_with("µs"));
        assert!(format_duration(time::Duration::from_millis(5)).ends_with("ms"));
        assert!(format_duration(time::Duration::from_secs(5)).ends_with("s"));
        assert_eq!(
            format_duration(time::Duration::from_secs(3661)),
            "01:01:01"
        );
    }
}
