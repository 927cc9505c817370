use chrono::{DateTime, Datelike, NaiveDate, Utc};

pub type Id = uuid::Uuid;
pub type Time = DateTime<Utc>;
pub type Date = NaiveDate;

/// Day of the month every loan payment falls due on.
pub const DUE_DAY: u32 = 10;

pub trait DateExt {
	/// The due day (the 10th) of the month `months` calendar months ahead.
	///
	/// Arithmetic is on year/month only; the day component of `self` is
	/// discarded so repeated advances cannot drift.
	fn due_date_in(&self, months: u32) -> Date;

	/// Whole months elapsed since `earlier`, by year*12+month arithmetic.
	/// Negative when `earlier` is in the future.
	fn months_since(&self, earlier: Date) -> i32;
}

impl DateExt for Date {
	fn due_date_in(&self, months: u32) -> Date {
		let total = self.year() * 12 + self.month0() as i32 + months as i32;
		let year = total.div_euclid(12);
		let month = total.rem_euclid(12) as u32 + 1;

		// the 10th exists in every month
		Date::from_ymd_opt(year, month, DUE_DAY).expect("valid due date")
	}

	fn months_since(&self, earlier: Date) -> i32 {
		(self.year() - earlier.year()) * 12 + self.month() as i32 - earlier.month() as i32
	}
}
