use std::cell::Cell;

pub use bigdecimal::BigDecimal;

pub use fund_ledger::*;

pub fn dec(s: &str) -> BigDecimal {
	s.parse().unwrap()
}

pub fn ymd(y: i32, m: u32, d: u32) -> Date {
	Date::from_ymd_opt(y, m, d).unwrap()
}

/// Calendar frozen at a settable date; time is pinned to noon so
/// same-day transactions still land strictly after a date's midnight
pub struct FixedCalendar {
	now: Cell<Time>,
}

impl FixedCalendar {
	pub fn at(date: Date) -> Self {
		FixedCalendar {
			now: Cell::new(noon(date)),
		}
	}

	pub fn set_date(&self, date: Date) {
		self.now.set(noon(date));
	}
}

impl Calendar for FixedCalendar {
	fn current_time(&self) -> Time {
		self.now.get()
	}
}

fn noon(date: Date) -> Time {
	date.and_hms_opt(12, 0, 0).unwrap().and_utc()
}

pub struct Fixture {
	pub member_repo: member::Repo,
	pub loan_repo: loan::Repo,
	pub transaction_repo: transaction::Repo,
	pub contribution_repo: contribution::Repo,
	pub calendar: FixedCalendar,
}

impl Fixture {
	pub fn new() -> Self {
		Fixture {
			member_repo: member::Repo::new(),
			loan_repo: loan::Repo::new(),
			transaction_repo: transaction::Repo::new(),
			contribution_repo: contribution::Repo::new(),
			calendar: FixedCalendar::at(ymd(2024, 1, 15)),
		}
	}

	pub fn service(&self) -> FundService {
		FundService::new(NewFundService {
			member_repo: &self.member_repo,
			loan_repo: &self.loan_repo,
			transaction_repo: &self.transaction_repo,
			contribution_repo: &self.contribution_repo,
			calendar: &self.calendar,
		})
	}

	pub fn member(&self, id: &str, first_name: &str, family_name: &str) -> Member {
		self.member_repo
			.create(NewMember {
				id,
				first_name,
				family_name,
				phone_number: None,
				joined_on: self.calendar.current_date(),
			})
			.unwrap()
	}

	pub fn bob(&self) -> Member {
		self.member("M-001", "Bob", "Roberts")
	}

	pub fn lucy(&self) -> Member {
		self.member("M-002", "Lucy", "Luke")
	}

	/// A member who has already contributed `amount` through the service
	pub fn contributor(&self, id: &str, first_name: &str, amount: &str) -> Member {
		let member = self.member(id, first_name, "Doe");
		self.service()
			.record_contribution(&member.id, &dec(amount), "Cash", "Admin")
			.unwrap();
		self.member_repo.find_by_id(&member.id).unwrap()
	}
}
