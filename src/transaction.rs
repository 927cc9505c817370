use std::cell::RefCell;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::types::{Id, Time};

/// Immutable ledger entry; the source of truth for totals and schedules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
	pub id: Id,
	pub member_id: String,
	pub transaction_type: TransactionType,
	pub amount: BigDecimal,
	pub date: Time,
	pub description: String,
	/// Label only; no payment processing happens here
	pub payment_method: Option<String>,
	pub received_by: Option<String>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumString, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum TransactionType {
	Contribution,
	LoanDisbursal,
	LoanRepayment,
	Fee,
}

pub struct NewTransaction<'a> {
	pub member_id: &'a str,
	pub transaction_type: TransactionType,
	pub amount: &'a BigDecimal,
	pub date: Time,
	pub description: String,
	pub payment_method: Option<&'a str>,
	pub received_by: Option<&'a str>,
}

/// Append-only transaction log
///
/// Entries are never mutated or deleted; iteration order is append order,
/// which is the externally visible log order.
#[derive(Default)]
pub struct Repo {
	log: RefCell<Vec<Transaction>>,
}

impl Repo {
	pub fn new() -> Self {
		Repo::default()
	}

	pub fn create(&self, new_transaction: NewTransaction) -> Transaction {
		let transaction = Transaction {
			id: Uuid::new_v4(),
			member_id: new_transaction.member_id.to_string(),
			transaction_type: new_transaction.transaction_type,
			amount: new_transaction.amount.clone(),
			date: new_transaction.date,
			description: new_transaction.description,
			payment_method: new_transaction.payment_method.map(str::to_string),
			received_by: new_transaction.received_by.map(str::to_string),
		};
		self.log.borrow_mut().push(transaction.clone());
		transaction
	}

	pub fn all(&self) -> Vec<Transaction> {
		self.log.borrow().clone()
	}

	pub fn for_member(&self, member_id: &str) -> Vec<Transaction> {
		self.log
			.borrow()
			.iter()
			.filter(|t| t.member_id == member_id)
			.cloned()
			.collect()
	}

	pub fn for_member_of_type(&self, member_id: &str, kind: TransactionType) -> Vec<Transaction> {
		self.log
			.borrow()
			.iter()
			.filter(|t| t.member_id == member_id && t.transaction_type == kind)
			.cloned()
			.collect()
	}
}
