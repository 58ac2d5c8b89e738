use std::fmt::Display;

use chrono::{DateTime, TimeZone};

pub const NO_RECORD: &str = "No record available";

/// Renders a timestamp relative to `now`: "Today at 02:30 PM",
/// "Yesterday at 09:05 AM", otherwise "May 08, 2024 at 11:00 AM".
pub fn humanized_date<Tz>(value: Option<&DateTime<Tz>>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(value) = value else {
        return NO_RECORD.to_string();
    };

    let value = value.with_timezone(&now.timezone());
    let today = now.date_naive();
    let day = value.date_naive();

    if day == today {
        format!("Today at {}", value.format("%I:%M %p"))
    } else if today.pred_opt() == Some(day) {
        format!("Yesterday at {}", value.format("%I:%M %p"))
    } else {
        value.format("%B %d, %Y at %I:%M %p").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    #[case((2024, 5, 10, 14, 30), "Today at 02:30 PM")]
    #[case((2024, 5, 9, 9, 5), "Yesterday at 09:05 AM")]
    #[case((2024, 5, 8, 11, 0), "May 08, 2024 at 11:00 AM")]
    fn formats_relative_to_now(
        #[case] (y, m, d, h, min): (i32, u32, u32, u32, u32),
        #[case] expected: &str,
    ) {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 18, 0, 0).unwrap();
        let value = Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap();

        assert_eq!(humanized_date(Some(&value), &now), expected);
    }

    #[test]
    fn missing_value_has_placeholder() {
        let now = Utc::now();
        assert_eq!(humanized_date(None, &now), NO_RECORD);
    }
}
