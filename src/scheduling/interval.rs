use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn from_minutes(start: DateTime<Utc>, minutes: i64) -> Self {
        Self {
            start,
            end: start + Duration::minutes(minutes),
        }
    }

    /// Whole days, `end_date` inclusive: `[start_date 00:00, end_date+1 00:00)`.
    pub fn from_dates(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start: start_date.and_time(NaiveTime::MIN).and_utc(),
            end: (end_date + Duration::days(1)).and_time(NaiveTime::MIN).and_utc(),
        }
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Time between two non-overlapping intervals; zero when they touch or overlap.
    pub fn gap(&self, other: &Interval) -> Duration {
        if self.overlaps(other) {
            return Duration::zero();
        }
        if self.end <= other.start {
            other.start - self.end
        } else {
            self.start - other.end
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
