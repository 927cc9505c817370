use std::cell::RefCell;
use std::collections::HashMap;

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::store::{self, Error};
use crate::types::{Date, Id};

/// A loan issued from the fund to a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
	pub id: Id,
	pub borrower_id: String,
	/// Jointly liable second member; always set at issuance
	pub cosigner_id: Option<String>,
	/// Principal fixed at issuance; includes the application fee when it
	/// was capitalized
	pub original_amount: BigDecimal,
	/// Outstanding balance; decreases via repayment, increases only when a
	/// late fee is capitalized at repayment time
	pub balance: BigDecimal,
	pub term: LoanTerm,
	pub state: LoanState,
	pub start_date: Date,
	/// Always the 10th of a calendar month
	pub next_payment_due: Date,
}

impl Loan {
	/// Flat installment for reporting: original principal spread evenly
	/// over the term, no interest.
	pub fn monthly_payment(&self) -> BigDecimal {
		let months = BigDecimal::from(i64::from(self.term.months()));
		(&self.original_amount / months).with_scale_round(2, RoundingMode::HalfUp)
	}
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumString, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum LoanState {
	Active,
	Paid,
	Defaulted,
}

impl Default for LoanState {
	fn default() -> Self {
		LoanState::Active
	}
}

/// The two supported repayment terms
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum LoanTerm {
	Months12,
	Months24,
}

impl LoanTerm {
	pub fn months(&self) -> u32 {
		match self {
			LoanTerm::Months12 => 12,
			LoanTerm::Months24 => 24,
		}
	}

	pub fn from_months(months: u32) -> Option<LoanTerm> {
		match months {
			12 => Some(LoanTerm::Months12),
			24 => Some(LoanTerm::Months24),
			_ => None,
		}
	}
}

/// How the application fee is settled at issuance
#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumString, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum FeeDisposition {
	/// Collected separately, outside the principal
	Upfront,
	/// Added to the principal
	Capitalized,
}

pub struct NewLoan {
	pub borrower_id: String,
	pub cosigner_id: Option<String>,
	pub original_amount: BigDecimal,
	pub balance: BigDecimal,
	pub term: LoanTerm,
	pub start_date: Date,
	pub next_payment_due: Date,
	pub state: LoanState,
}

/// Data store implementation for operating on loans
#[derive(Default)]
pub struct Repo {
	loans: RefCell<HashMap<Id, Loan>>,
}

impl Repo {
	pub fn new() -> Self {
		Repo::default()
	}

	pub fn create(&self, new_loan: NewLoan) -> store::Result<Loan> {
		let loan = Loan {
			id: Uuid::new_v4(),
			borrower_id: new_loan.borrower_id,
			cosigner_id: new_loan.cosigner_id,
			original_amount: new_loan.original_amount,
			balance: new_loan.balance,
			term: new_loan.term,
			state: new_loan.state,
			start_date: new_loan.start_date,
			next_payment_due: new_loan.next_payment_due,
		};

		let mut loans = self.loans.borrow_mut();
		if loans.contains_key(&loan.id) {
			return Err(Error::RecordAlreadyExists);
		}
		loans.insert(loan.id, loan.clone());
		Ok(loan)
	}

	pub fn find_by_id(&self, id: &Id) -> store::Result<Loan> {
		self.loans
			.borrow()
			.get(id)
			.cloned()
			.ok_or(Error::RecordNotFound)
	}

	pub fn list(&self) -> Vec<Loan> {
		let mut loans: Vec<Loan> = self.loans.borrow().values().cloned().collect();
		loans.sort_by_key(|l| (l.start_date, l.id));
		loans
	}

	pub fn set_state(&self, id: &Id, state: LoanState) -> store::Result<Loan> {
		self.update(id, |l| l.state = state)
	}

	pub fn set_balance(&self, id: &Id, balance: &BigDecimal) -> store::Result<Loan> {
		self.update(id, |l| l.balance = balance.clone())
	}

	pub fn set_next_payment_due(&self, id: &Id, due: Date) -> store::Result<Loan> {
		self.update(id, |l| l.next_payment_due = due)
	}

	/// Whether the member backs any loan that is still active
	pub fn cosigns_active_loan(&self, member_id: &str) -> bool {
		self.loans.borrow().values().any(|l| {
			l.state == LoanState::Active && l.cosigner_id.as_deref() == Some(member_id)
		})
	}

	pub fn find_active_by_borrower(&self, member_id: &str) -> Vec<Loan> {
		self.loans
			.borrow()
			.values()
			.filter(|l| l.state == LoanState::Active && l.borrower_id == member_id)
			.cloned()
			.collect()
	}

	fn update<F>(&self, id: &Id, apply: F) -> store::Result<Loan>
	where
		F: FnOnce(&mut Loan),
	{
		let mut loans = self.loans.borrow_mut();
		let loan = loans.get_mut(id).ok_or(Error::RecordNotFound)?;
		apply(loan);
		Ok(loan.clone())
	}
}

#[cfg(test)]
mod tests {
	use crate::testutil::*;
	use crate::types::DateExt;

	use super::*;

	fn new_loan(borrower: &str, cosigner: &str, amount: &str, term: LoanTerm) -> NewLoan {
		let start = ymd(2024, 1, 15);
		NewLoan {
			borrower_id: borrower.to_string(),
			cosigner_id: Some(cosigner.to_string()),
			original_amount: dec(amount),
			balance: dec(amount),
			term,
			start_date: start,
			next_payment_due: start.due_date_in(1),
			state: LoanState::default(),
		}
	}

	#[test]
	fn create_loan() {
		let repo = Repo::new();
		let loan = repo
			.create(new_loan("M-001", "M-002", "1200", LoanTerm::Months12))
			.unwrap();

		assert_eq!(loan.state, LoanState::Active);
		assert_eq!(loan.balance, loan.original_amount);
		assert_eq!(loan.next_payment_due, ymd(2024, 2, 10));
		assert_eq!(repo.find_by_id(&loan.id).unwrap(), loan);
	}

	#[test]
	fn monthly_payment_rounds_to_cents() {
		let repo = Repo::new();
		let loan = repo
			.create(new_loan("M-001", "M-002", "4000", LoanTerm::Months12))
			.unwrap();
		assert_eq!(loan.monthly_payment(), dec("333.33"));

		let loan = repo
			.create(new_loan("M-001", "M-002", "1230", LoanTerm::Months24))
			.unwrap();
		assert_eq!(loan.monthly_payment(), dec("51.25"));
	}

	#[test]
	fn cosigns_active_loan_tracks_state() {
		let repo = Repo::new();
		let loan = repo
			.create(new_loan("M-001", "M-002", "500", LoanTerm::Months12))
			.unwrap();

		assert!(repo.cosigns_active_loan("M-002"));
		assert!(!repo.cosigns_active_loan("M-001"));

		repo.set_state(&loan.id, LoanState::Paid).unwrap();
		assert!(!repo.cosigns_active_loan("M-002"));
	}

	#[test]
	fn term_from_months() {
		assert_eq!(LoanTerm::from_months(12), Some(LoanTerm::Months12));
		assert_eq!(LoanTerm::from_months(24), Some(LoanTerm::Months24));
		assert_eq!(LoanTerm::from_months(18), None);
	}
}
