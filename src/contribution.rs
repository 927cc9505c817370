use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

/// One member's contributions summed over a calendar year
///
/// This is a side-ledger kept next to `Member::total_contribution`; the two
/// are reconciled explicitly, not continuously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyContribution {
	pub member_id: String,
	pub year: i32,
	pub amount: BigDecimal,
}

/// Data store implementation for the per-year contribution side-ledger
#[derive(Default)]
pub struct Repo {
	by_member: RefCell<HashMap<String, BTreeMap<i32, BigDecimal>>>,
}

impl Repo {
	pub fn new() -> Self {
		Repo::default()
	}

	pub fn add(&self, member_id: &str, year: i32, amount: &BigDecimal) {
		let mut by_member = self.by_member.borrow_mut();
		let years = by_member.entry(member_id.to_string()).or_default();
		let total = years.entry(year).or_insert_with(BigDecimal::zero);
		*total = &*total + amount;
	}

	/// Yearly rows for a member, ascending by year
	pub fn for_member(&self, member_id: &str) -> Vec<YearlyContribution> {
		self.by_member
			.borrow()
			.get(member_id)
			.map(|years| {
				years
					.iter()
					.map(|(year, amount)| YearlyContribution {
						member_id: member_id.to_string(),
						year: *year,
						amount: amount.clone(),
					})
					.collect()
			})
			.unwrap_or_default()
	}

	/// Recomputed sum across all years for a member
	pub fn total_for(&self, member_id: &str) -> BigDecimal {
		self.by_member
			.borrow()
			.get(member_id)
			.map(|years| years.values().fold(BigDecimal::zero(), |acc, a| acc + a))
			.unwrap_or_else(BigDecimal::zero)
	}
}
