use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, Utc};

/// Calendar used to turn instants into local hours and days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
  /// Host time zone, DST-aware
  #[default]
  Local,
  Fixed(FixedOffset),
}

impl Clock {
  pub fn utc() -> Self {
    Clock::Fixed(Utc.fix())
  }

  /// Fixed offset east of UTC; out-of-range offsets fall back to UTC
  pub fn fixed_minutes(minutes: i32) -> Self {
    match FixedOffset::east_opt(minutes.saturating_mul(60)) {
      Some(offset) => Clock::Fixed(offset),
      None => {
        tracing::warn!(minutes, "UTC offset out of range, using UTC");
        Clock::utc()
      }
    }
  }

  pub fn localize(&self, instant: DateTime<Utc>) -> NaiveDateTime {
    match self {
      Clock::Local => instant.with_timezone(&Local).naive_local(),
      Clock::Fixed(offset) => instant.with_timezone(offset).naive_local(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{TimeZone, Timelike};

  #[test]
  fn test_fixed_offset_shifts_hour() {
    let instant = Utc.with_ymd_and_hms(2025, 3, 14, 23, 30, 0).unwrap();
    let local = Clock::fixed_minutes(120).localize(instant);
    assert_eq!(local.hour(), 1);
    assert_eq!(local.date().to_string(), "2025-03-15");
  }

  #[test]
  fn test_out_of_range_offset_is_utc() {
    assert_eq!(Clock::fixed_minutes(100_000), Clock::utc());
  }
}
