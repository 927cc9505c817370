use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

use crate::loan::Loan;
use crate::transaction::{Transaction, TransactionType};
use crate::types::{Date, DateExt, Id, Time};

/// One projected installment, with the observed repayment matched to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
	/// 1-based installment number
	pub installment: u32,
	/// The 10th of the month the installment falls due in
	pub due_date: Date,
	pub amount_due: BigDecimal,
	pub amount_paid: Option<BigDecimal>,
	pub paid_on: Option<Time>,
}

/// Read-only amortization view over a loan and its observed repayments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
	pub loan_id: Id,
	pub monthly_payment: BigDecimal,
	pub rows: Vec<ScheduleRow>,
	pub total_paid: BigDecimal,
}

/// Project the repayment schedule for `loan` from the borrower's
/// transaction history.
///
/// Installments are equal nominal amounts over the term, due on the 10th
/// of each month after the start month. Repayments are matched to
/// installments by chronological position: the i-th repayment observed
/// after the start date is assumed to settle the i-th installment. That is
/// a best-effort reporting view, not authoritative accounting; the
/// authoritative state is the loan balance. Pure derivation, no mutation.
pub fn project(loan: &Loan, transactions: &[Transaction]) -> Schedule {
	let start = loan
		.start_date
		.and_hms_opt(0, 0, 0)
		.expect("midnight exists")
		.and_utc();

	let mut repayments: Vec<&Transaction> = transactions
		.iter()
		.filter(|t| {
			t.member_id == loan.borrower_id
				&& t.transaction_type == TransactionType::LoanRepayment
				&& t.date > start
		})
		.collect();
	repayments.sort_by_key(|t| t.date);

	let monthly_payment = loan.monthly_payment();
	let rows = (1..=loan.term.months())
		.map(|installment| {
			let matched = repayments.get(installment as usize - 1);
			ScheduleRow {
				installment,
				due_date: loan.start_date.due_date_in(installment),
				amount_due: monthly_payment.clone(),
				amount_paid: matched.map(|t| t.amount.clone()),
				paid_on: matched.map(|t| t.date),
			}
		})
		.collect();

	let total_paid = repayments
		.iter()
		.fold(BigDecimal::zero(), |acc, t| acc + &t.amount);

	Schedule {
		loan_id: loan.id,
		monthly_payment,
		rows,
		total_paid,
	}
}
