use bigdecimal::{BigDecimal, Signed, Zero};
use chrono::{Datelike, Utc};

use crate::contribution;
use crate::loan::{self, FeeDisposition, Loan, LoanState, LoanTerm, NewLoan};
use crate::member;
use crate::schedule::{self, Schedule};
use crate::transaction::{self, NewTransaction, Transaction, TransactionType};
use crate::types::{Date, DateExt, Id, Time};

use super::error::{Error, ErrorKind};
use super::policy::{self, Eligibility};

pub type Result<T> = std::result::Result<T, Error>;

/// Service for performing fund ledger operations
///
/// The service holds no ledger state of its own: it operates on whatever
/// repository snapshot the caller supplies, one mutating operation at a
/// time. Every operation validates all of its preconditions before the
/// first write, so a rejected operation leaves the ledger untouched.
pub struct FundService<'a> {
	member_repo: &'a member::Repo,
	loan_repo: &'a loan::Repo,
	transaction_repo: &'a transaction::Repo,
	contribution_repo: &'a contribution::Repo,
	calendar: &'a dyn Calendar,
}

/// Parameter object for creating a new FundService
pub struct NewFundService<'a> {
	pub member_repo: &'a member::Repo,
	pub loan_repo: &'a loan::Repo,
	pub transaction_repo: &'a transaction::Repo,
	pub contribution_repo: &'a contribution::Repo,
	pub calendar: &'a dyn Calendar,
}

impl<'a> FundService<'a> {
	pub fn new(v: NewFundService<'a>) -> Self {
		FundService {
			member_repo: v.member_repo,
			loan_repo: v.loan_repo,
			transaction_repo: v.transaction_repo,
			contribution_repo: v.contribution_repo,
			calendar: v.calendar,
		}
	}

	/// Decide whether a member may receive a new loan, and up to how much
	///
	/// A missing member id yields a refusal rather than an error, so the
	/// result always carries a human-readable reason for the caller.
	pub fn evaluate_eligibility(&self, member_id: &str) -> Eligibility {
		let member = self.member_repo.find_by_id(member_id).ok();
		let cosigns = self.loan_repo.cosigns_active_loan(member_id);
		policy::evaluate(member.as_ref(), cosigns, self.calendar.current_date())
	}

	/// Issue a new loan to an eligible borrower
	///
	/// # Arguments
	/// * `borrower_id` - member receiving the principal
	/// * `cosigner_id` - distinct member jointly liable for the loan
	/// * `amount` - requested principal, within the borrower's limit
	/// * `term` - repayment term
	/// * `disposition` - whether the application fee is collected upfront
	///   or capitalized into the principal
	pub fn issue_loan(
		&self,
		borrower_id: &str,
		cosigner_id: &str,
		amount: &BigDecimal,
		term: LoanTerm,
		disposition: FeeDisposition,
	) -> Result<Loan> {
		let limit = match self.evaluate_eligibility(borrower_id) {
			Eligibility::Refused { reason } => {
				return Err(Error::new(ErrorKind::Policy(reason)));
			}
			Eligibility::Approved { limit } => limit,
		};

		if !amount.is_positive() {
			return Err(Error::new(ErrorKind::Validation(
				"loan amount must be positive".to_string(),
			)));
		}
		if amount > &limit {
			return Err(Error::new(ErrorKind::Policy(format!(
				"requested amount {} exceeds borrowing limit {}",
				amount, limit
			))));
		}
		if cosigner_id == borrower_id {
			return Err(Error::new(ErrorKind::Policy(
				"cosigner must be a different member".to_string(),
			)));
		}
		let cosigner = self
			.member_repo
			.find_by_id(cosigner_id)
			.map_err(|_| Error::new(ErrorKind::NotFound(format!("cosigner {}", cosigner_id))))?;
		if self.loan_repo.cosigns_active_loan(&cosigner.id) {
			return Err(Error::new(ErrorKind::Policy(format!(
				"{} already cosigns an active loan",
				cosigner.id
			))));
		}

		let fee = policy::application_fee(amount, term);
		let original_amount = match disposition {
			FeeDisposition::Upfront => amount.clone(),
			FeeDisposition::Capitalized => amount + &fee,
		};

		let today = self.calendar.current_date();
		let now = self.calendar.current_time();

		let loan = self.loan_repo.create(NewLoan {
			borrower_id: borrower_id.to_string(),
			cosigner_id: Some(cosigner.id),
			original_amount: original_amount.clone(),
			balance: original_amount,
			term,
			start_date: today,
			next_payment_due: today.due_date_in(1),
			state: LoanState::Active,
		})?;
		self.member_repo.set_active_loan(borrower_id, Some(loan.id))?;

		self.transaction_repo.create(NewTransaction {
			member_id: borrower_id,
			transaction_type: TransactionType::LoanDisbursal,
			amount,
			date: now,
			description: format!("loan disbursal, {} month term", term.months()),
			payment_method: None,
			received_by: None,
		});
		self.transaction_repo.create(NewTransaction {
			member_id: borrower_id,
			transaction_type: TransactionType::Fee,
			amount: &fee,
			date: now,
			description: format!("loan application fee ({})", disposition),
			payment_method: None,
			received_by: None,
		});

		Ok(loan)
	}

	/// Apply a payment to an active loan
	///
	/// A payment arriving past the due date first capitalizes a flat late
	/// fee into the balance (and logs it). Settling the balance closes the
	/// loan; otherwise the due date advances one calendar month, pinned to
	/// the 10th.
	///
	/// # Arguments
	/// * `loan_id` - the loan being paid down
	/// * `amount` - payment amount, at most the payable balance (late fee
	///   included) plus a one-cent rounding tolerance
	/// * `method` - payment method label
	/// * `received_by` - who collected the payment
	pub fn record_repayment(
		&self,
		loan_id: &Id,
		amount: &BigDecimal,
		method: &str,
		received_by: &str,
	) -> Result<Loan> {
		let loan = self
			.loan_repo
			.find_by_id(loan_id)
			.map_err(|_| Error::new(ErrorKind::NotFound(format!("loan {}", loan_id))))?;
		if loan.state != LoanState::Active {
			return Err(Error::new(ErrorKind::Policy(format!(
				"loan is {}, repayments are only accepted against active loans",
				loan.state
			))));
		}
		if !amount.is_positive() {
			return Err(Error::new(ErrorKind::Validation(
				"payment amount must be positive".to_string(),
			)));
		}

		let today = self.calendar.current_date();
		let now = self.calendar.current_time();

		let is_late = today > loan.next_payment_due;
		let late_fee = if is_late {
			BigDecimal::from(policy::LATE_FEE)
		} else {
			BigDecimal::zero()
		};

		let payable = &loan.balance + &late_fee;
		if amount > &(&payable + &policy::payment_epsilon()) {
			return Err(Error::new(ErrorKind::Policy(format!(
				"payment {} exceeds payable balance {}",
				amount, payable
			))));
		}

		let mut new_balance = &payable - amount;
		if new_balance < policy::payment_epsilon() {
			new_balance = BigDecimal::zero();
		}

		let updated = if new_balance.is_zero() {
			self.loan_repo.set_balance(loan_id, &new_balance)?;
			let updated = self.loan_repo.set_state(loan_id, LoanState::Paid)?;
			self.member_repo.set_active_loan(&loan.borrower_id, None)?;
			self.member_repo.set_last_loan_paid(&loan.borrower_id, today)?;
			updated
		} else {
			self.loan_repo.set_balance(loan_id, &new_balance)?;
			self.loan_repo
				.set_next_payment_due(loan_id, loan.next_payment_due.due_date_in(1))?
		};

		// the repayment precedes the late fee in the log; both dated now
		self.transaction_repo.create(NewTransaction {
			member_id: &loan.borrower_id,
			transaction_type: TransactionType::LoanRepayment,
			amount,
			date: now,
			description: "loan repayment".to_string(),
			payment_method: Some(method),
			received_by: Some(received_by),
		});
		if is_late {
			self.transaction_repo.create(NewTransaction {
				member_id: &loan.borrower_id,
				transaction_type: TransactionType::Fee,
				amount: &late_fee,
				date: now,
				description: format!("late fee, missed payment due {}", loan.next_payment_due),
				payment_method: None,
				received_by: None,
			});
		}

		Ok(updated)
	}

	/// Record a member contribution
	///
	/// Contributions are always accepted for an existing member: there is
	/// no cap and no eligibility gate, and an inactive account may still
	/// contribute.
	pub fn record_contribution(
		&self,
		member_id: &str,
		amount: &BigDecimal,
		method: &str,
		received_by: &str,
	) -> Result<Transaction> {
		let member = self
			.member_repo
			.find_by_id(member_id)
			.map_err(|_| Error::new(ErrorKind::NotFound(format!("member {}", member_id))))?;
		if !amount.is_positive() {
			return Err(Error::new(ErrorKind::Validation(
				"contribution amount must be positive".to_string(),
			)));
		}

		let now = self.calendar.current_time();
		let year = self.calendar.current_date().year();

		self.member_repo.increment_contribution(&member.id, amount)?;
		self.contribution_repo.add(&member.id, year, amount);
		let transaction = self.transaction_repo.create(NewTransaction {
			member_id: &member.id,
			transaction_type: TransactionType::Contribution,
			amount,
			date: now,
			description: format!("contribution for {}", year),
			payment_method: Some(method),
			received_by: Some(received_by),
		});

		Ok(transaction)
	}

	/// Project the repayment schedule for a loan; read-only
	pub fn project_schedule(&self, loan_id: &Id) -> Result<Schedule> {
		let loan = self
			.loan_repo
			.find_by_id(loan_id)
			.map_err(|_| Error::new(ErrorKind::NotFound(format!("loan {}", loan_id))))?;
		let transactions = self.transaction_repo.for_member(&loan.borrower_id);
		Ok(schedule::project(&loan, &transactions))
	}

	/// Admin override moving an active loan into default; terminal
	///
	/// The repayment processor never sets this state itself and refuses
	/// payments against a defaulted loan.
	pub fn mark_defaulted(&self, loan_id: &Id) -> Result<Loan> {
		let loan = self
			.loan_repo
			.find_by_id(loan_id)
			.map_err(|_| Error::new(ErrorKind::NotFound(format!("loan {}", loan_id))))?;
		if loan.state != LoanState::Active {
			return Err(Error::new(ErrorKind::Policy(format!(
				"loan is {}, only active loans can be defaulted",
				loan.state
			))));
		}

		let updated = self.loan_repo.set_state(loan_id, LoanState::Defaulted)?;
		self.member_repo.set_active_loan(&loan.borrower_id, None)?;
		Ok(updated)
	}

	/// Remove a member who holds no ledger obligations
	///
	/// Refused while the member has an outstanding loan or backs one as a
	/// cosigner. The member's transactions are retained.
	pub fn remove_member(&self, member_id: &str) -> Result<()> {
		let member = self
			.member_repo
			.find_by_id(member_id)
			.map_err(|_| Error::new(ErrorKind::NotFound(format!("member {}", member_id))))?;
		if member.active_loan_id.is_some() {
			return Err(Error::new(ErrorKind::Policy(
				"member has an active loan".to_string(),
			)));
		}
		if self.loan_repo.cosigns_active_loan(&member.id) {
			return Err(Error::new(ErrorKind::Policy(
				"member cosigns an active loan".to_string(),
			)));
		}

		self.member_repo.delete(&member.id)?;
		Ok(())
	}

	/// Reconcile the per-year contribution side-ledger against the
	/// member's running total; returns the reconciled total
	pub fn reconcile_contributions(&self, member_id: &str) -> Result<BigDecimal> {
		let member = self
			.member_repo
			.find_by_id(member_id)
			.map_err(|_| Error::new(ErrorKind::NotFound(format!("member {}", member_id))))?;

		let recomputed = self.contribution_repo.total_for(&member.id);
		if recomputed != member.total_contribution {
			return Err(Error::new(ErrorKind::Validation(format!(
				"yearly contributions sum to {} but the member total is {}",
				recomputed, member.total_contribution
			))));
		}
		Ok(recomputed)
	}
}

pub trait Calendar {
	/// Gets the current instant
	fn current_time(&self) -> Time {
		Utc::now()
	}

	/// Gets the current date
	fn current_date(&self) -> Date {
		self.current_time().date_naive()
	}
}

/// Wall-clock calendar used outside of tests
pub struct SystemCalendar;

impl Calendar for SystemCalendar {}
