use std::cell::RefCell;
use std::collections::HashMap;

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::store::{self, Error};
use crate::types::{Date, Id};

/// A fund member: contributor and potential borrower
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
	/// Unique, stable, admin-assigned identifier
	pub id: String,
	pub first_name: String,
	pub family_name: String,
	pub phone_number: Option<String>,
	pub status: AccountStatus,
	/// Lifetime sum of recorded contributions
	pub total_contribution: BigDecimal,
	/// The one outstanding loan, if any
	pub active_loan_id: Option<Id>,
	/// Set only when a loan is paid off in full
	pub last_loan_paid_date: Option<Date>,
	pub joined_on: Date,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumString, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum AccountStatus {
	Active,
	Inactive,
}

pub struct NewMember<'a> {
	pub id: &'a str,
	pub first_name: &'a str,
	pub family_name: &'a str,
	pub phone_number: Option<&'a str>,
	pub joined_on: Date,
}

/// Data store implementation for operating on members
#[derive(Default)]
pub struct Repo {
	members: RefCell<HashMap<String, Member>>,
}

impl Repo {
	pub fn new() -> Self {
		Repo::default()
	}

	pub fn create(&self, new_member: NewMember) -> store::Result<Member> {
		let mut members = self.members.borrow_mut();
		if members.contains_key(new_member.id) {
			return Err(Error::RecordAlreadyExists);
		}

		let member = Member {
			id: new_member.id.to_string(),
			first_name: new_member.first_name.to_string(),
			family_name: new_member.family_name.to_string(),
			phone_number: new_member.phone_number.map(str::to_string),
			status: AccountStatus::Active,
			total_contribution: BigDecimal::zero(),
			active_loan_id: None,
			last_loan_paid_date: None,
			joined_on: new_member.joined_on,
		};
		members.insert(member.id.clone(), member.clone());
		Ok(member)
	}

	pub fn find_by_id(&self, id: &str) -> store::Result<Member> {
		self.members
			.borrow()
			.get(id)
			.cloned()
			.ok_or(Error::RecordNotFound)
	}

	pub fn list(&self) -> Vec<Member> {
		let mut members: Vec<Member> = self.members.borrow().values().cloned().collect();
		members.sort_by(|a, b| a.id.cmp(&b.id));
		members
	}

	pub fn set_status(&self, id: &str, status: AccountStatus) -> store::Result<Member> {
		self.update(id, |m| m.status = status)
	}

	pub fn set_active_loan(&self, id: &str, loan_id: Option<Id>) -> store::Result<Member> {
		self.update(id, |m| m.active_loan_id = loan_id)
	}

	pub fn set_last_loan_paid(&self, id: &str, date: Date) -> store::Result<Member> {
		self.update(id, |m| m.last_loan_paid_date = Some(date))
	}

	pub fn increment_contribution(&self, id: &str, amount: &BigDecimal) -> store::Result<Member> {
		self.update(id, |m| m.total_contribution = &m.total_contribution + amount)
	}

	pub fn delete(&self, id: &str) -> store::Result<()> {
		self.members
			.borrow_mut()
			.remove(id)
			.map(|_| ())
			.ok_or(Error::RecordNotFound)
	}

	fn update<F>(&self, id: &str, apply: F) -> store::Result<Member>
	where
		F: FnOnce(&mut Member),
	{
		let mut members = self.members.borrow_mut();
		let member = members.get_mut(id).ok_or(Error::RecordNotFound)?;
		apply(member);
		Ok(member.clone())
	}
}

#[cfg(test)]
mod tests {
	use crate::testutil::*;

	use super::*;

	#[test]
	fn create_member() {
		let repo = Repo::new();
		let bob = repo
			.create(NewMember {
				id: "M-001",
				first_name: "Bob",
				family_name: "Roberts",
				phone_number: None,
				joined_on: ymd(2024, 1, 2),
			})
			.unwrap();

		assert_eq!(bob.status, AccountStatus::Active);
		assert_eq!(bob.total_contribution, BigDecimal::zero());
		assert_eq!(bob.active_loan_id, None);
		assert_eq!(repo.find_by_id("M-001").unwrap(), bob);
	}

	#[test]
	fn create_duplicate_id_err() {
		let f = Fixture::new();
		f.bob();
		let got = f.member_repo.create(NewMember {
			id: "M-001",
			first_name: "Impostor",
			family_name: "Roberts",
			phone_number: None,
			joined_on: ymd(2024, 1, 2),
		});
		assert_eq!(got.unwrap_err(), Error::RecordAlreadyExists);
	}

	#[test]
	fn increment_contribution_accumulates() {
		let f = Fixture::new();
		let bob = f.bob();
		f.member_repo.increment_contribution(&bob.id, &dec("20")).unwrap();
		let bob = f.member_repo.increment_contribution(&bob.id, &dec("15.50")).unwrap();
		assert_eq!(bob.total_contribution, dec("35.50"));
	}

	#[test]
	fn find_missing_member_err() {
		let repo = Repo::new();
		assert_eq!(repo.find_by_id("nobody").unwrap_err(), Error::RecordNotFound);
	}
}
