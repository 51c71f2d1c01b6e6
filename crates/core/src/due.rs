//! Deciding whether a bucket needs a new snapshot

use crate::schedule::Frequency;
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};

impl Frequency {
    /// `now` minus this frequency, using calendar arithmetic
    ///
    /// Years, months and days are subtracted from the date fields together
    /// and the result is normalized: a day past the end of the landing month
    /// rolls forward into the next one (Mar 31 minus one month is Mar 2 in a
    /// leap year). Returns `None` if the result is out of range.
    pub fn cutoff(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let months_back = i64::from(self.years) * 12 + i64::from(self.months);
        let total = i64::from(now.year()) * 12 + i64::from(now.month0()) - months_back;
        let year = i32::try_from(total.div_euclid(12)).ok()?;
        let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;

        let offset = i64::from(now.day()) - 1 - i64::from(self.days);
        let date = if offset >= 0 {
            first.checked_add_days(Days::new(offset.unsigned_abs()))?
        } else {
            first.checked_sub_days(Days::new(offset.unsigned_abs()))?
        };

        Some(date.and_time(now.time()))
    }
}

/// Whether a snapshot must be taken at `now`
///
/// Due when the bucket is empty or the newest snapshot is at or before the
/// cutoff. `now` should already be truncated to the snapshot format.
pub fn is_due(now: NaiveDateTime, frequency: &Frequency, most_recent: Option<NaiveDateTime>) -> bool {
    let Some(last) = most_recent else {
        return true;
    };

    match frequency.cutoff(now) {
        Some(cutoff) => last <= cutoff,
        None => false,
    }
}
