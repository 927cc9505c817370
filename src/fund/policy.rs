use bigdecimal::{BigDecimal, Signed};
use serde::{Deserialize, Serialize};

use crate::loan::LoanTerm;
use crate::member::{AccountStatus, Member};
use crate::types::{Date, DateExt};

/// Hard cap on any single loan, protecting fund liquidity
pub const BORROW_CAP: i64 = 5_000;
/// A member may borrow up to this multiple of their total contribution
pub const CONTRIBUTION_MULTIPLE: i64 = 4;
/// Months a member must wait after paying off a loan before borrowing again
pub const COOL_OFF_MONTHS: i32 = 3;
/// Flat fee charged when a repayment arrives past its due date
pub const LATE_FEE: i64 = 5;
/// Requested amounts at or above this fall into the upper fee tier
pub const FEE_TIER_THRESHOLD: i64 = 2_500;
/// Application fee below the tier threshold, any term
pub const BASE_FEE: i64 = 30;
/// Upper-tier application fee for a 12-month term
pub const UPPER_FEE_SHORT_TERM: i64 = 50;
/// Upper-tier application fee for a 24-month term
pub const UPPER_FEE_LONG_TERM: i64 = 70;

/// Tolerance for decimal drift when settling a balance
pub fn payment_epsilon() -> BigDecimal {
	BigDecimal::new(1.into(), 2) // 0.01
}

/// Outcome of an eligibility check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Eligibility {
	Approved { limit: BigDecimal },
	Refused { reason: String },
}

impl Eligibility {
	fn refused(reason: &str) -> Eligibility {
		Eligibility::Refused {
			reason: reason.to_string(),
		}
	}

	pub fn is_approved(&self) -> bool {
		matches!(self, Eligibility::Approved { .. })
	}

	pub fn limit(&self) -> Option<&BigDecimal> {
		match self {
			Eligibility::Approved { limit } => Some(limit),
			Eligibility::Refused { .. } => None,
		}
	}

	pub fn reason(&self) -> Option<&str> {
		match self {
			Eligibility::Approved { .. } => None,
			Eligibility::Refused { reason } => Some(reason),
		}
	}
}

/// Decide whether a member may receive a new loan, and up to how much.
///
/// Rules are checked in order and the first failing rule wins:
/// missing member, inactive account, outstanding loan, no contributions,
/// active cosigner elsewhere, cool-off after the last payoff. A member who
/// passes them all is approved for `borrow_limit` of their contributions.
///
/// `cosigns_active_loan` is the caller-supplied answer to whether the
/// member currently backs another active loan.
pub fn evaluate(member: Option<&Member>, cosigns_active_loan: bool, today: Date) -> Eligibility {
	let member = match member {
		Some(m) => m,
		None => return Eligibility::refused("member not found"),
	};

	if member.status == AccountStatus::Inactive {
		return Eligibility::refused("account is inactive");
	}
	if member.active_loan_id.is_some() {
		return Eligibility::refused("an active loan exists");
	}
	if !member.total_contribution.is_positive() {
		return Eligibility::refused("no contributions");
	}
	if cosigns_active_loan {
		return Eligibility::refused("active cosigner on another loan");
	}
	if let Some(paid) = member.last_loan_paid_date {
		let elapsed = today.months_since(paid);
		if elapsed < COOL_OFF_MONTHS {
			let remaining = COOL_OFF_MONTHS - elapsed;
			return Eligibility::Refused {
				reason: format!("cool-off period: {} month(s) remaining", remaining),
			};
		}
	}

	Eligibility::Approved {
		limit: borrow_limit(&member.total_contribution),
	}
}

/// `min(total_contribution * 4, 5000)`
pub fn borrow_limit(total_contribution: &BigDecimal) -> BigDecimal {
	let limit = total_contribution * BigDecimal::from(CONTRIBUTION_MULTIPLE);
	let cap = BigDecimal::from(BORROW_CAP);
	if limit > cap {
		cap
	} else {
		limit
	}
}

/// Flat-tier application fee for a requested principal and term.
///
/// Not proportional: amounts under the tier threshold pay the base fee
/// regardless of term; larger amounts pay by term length.
pub fn application_fee(amount: &BigDecimal, term: LoanTerm) -> BigDecimal {
	let fee = if amount < &BigDecimal::from(FEE_TIER_THRESHOLD) {
		BASE_FEE
	} else {
		match term {
			LoanTerm::Months24 => UPPER_FEE_LONG_TERM,
			LoanTerm::Months12 => UPPER_FEE_SHORT_TERM,
		}
	};
	BigDecimal::from(fee)
}
