use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Clock abstracts access to the current timestamp so services remain deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current UTC date. Defaults to `now().date_naive()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Noon UTC on the given calendar day; falls back to the Unix epoch for invalid dates.
    pub fn at_date(year: i32, month: u32, day: u32) -> Self {
        let instant = Utc
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .unwrap_or_default();
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Instant a deadline date is measured against: midnight UTC.
pub fn deadline_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

/// Days from `now` until `deadline`, rounded up; negative once the deadline has passed.
pub fn days_until(deadline: NaiveDate, now: DateTime<Utc>) -> i64 {
    let millis = (deadline_instant(deadline) - now).num_milliseconds();
    const DAY_MS: i64 = 86_400_000;
    // ceil division that also holds for negative spans
    let quotient = millis.div_euclid(DAY_MS);
    if millis.rem_euclid(DAY_MS) == 0 {
        quotient
    } else {
        quotient + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_instant() {
        let clock = FixedClock::at_date(2025, 3, 15);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    }

    #[test]
    fn days_until_rounds_partial_days_up() {
        let now = FixedClock::at_date(2025, 3, 15).now();
        let tomorrow = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();
        assert_eq!(days_until(tomorrow, now), 1);
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert_eq!(days_until(today, now), 0);
        let yesterday = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(days_until(yesterday, now), -1);
    }

    #[test]
    fn exact_midnight_is_whole_days() {
        let now = deadline_instant(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let deadline = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(days_until(deadline, now), 30);
    }
}
