use serde::{Serializer, ser::Error};
use time::{Duration, UtcDateTime, UtcOffset, format_description::well_known::Rfc3339};

/// Human label for how long ago `created_at` was, relative to `now`.
///
/// Times in the future (clock skew) count as "Just now".
#[must_use]
pub fn relative_label(created_at: UtcDateTime, now: UtcDateTime) -> String {
    let elapsed = now - created_at;

    if elapsed < Duration::MINUTE {
        return "Just now".to_owned();
    }

    let (amount, unit) = if elapsed < Duration::HOUR {
        (elapsed.whole_minutes(), "minute")
    } else if elapsed < Duration::DAY {
        (elapsed.whole_hours(), "hour")
    } else {
        (elapsed.whole_days(), "day")
    };

    let plural = if amount == 1 { "" } else { "s" };
    format!("{amount} {unit}{plural} ago")
}

pub fn serialize_rfc3339<S>(value: &UtcDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = value
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(S::Error::custom)?;
    serializer.serialize_str(&formatted)
}

#[cfg(test)]
mod tests {
    use crate::util::relative_label;
    use time::{Duration, macros::utc_datetime};

    #[test]
    fn relative_labels() {
        let now = utc_datetime!(2025-10-24 12:00);

        assert_eq!(relative_label(now, now), "Just now");
        assert_eq!(relative_label(now - Duration::seconds(59), now), "Just now");
        assert_eq!(relative_label(now + Duration::minutes(3), now), "Just now");
        assert_eq!(relative_label(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(relative_label(now - Duration::minutes(45), now), "45 minutes ago");
        assert_eq!(relative_label(now - Duration::hours(2), now), "2 hours ago");
        assert_eq!(relative_label(now - Duration::hours(24), now), "1 day ago");
        assert_eq!(relative_label(now - Duration::days(3), now), "3 days ago");
    }
}
