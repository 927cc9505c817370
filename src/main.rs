use std::env;

use bigdecimal::BigDecimal;
use log::*;

use fund_ledger::{
	contribution, loan, member, transaction, Calendar, FeeDisposition, FundService, LoanTerm,
	NewFundService, NewMember, SystemCalendar,
};

/// Walks one admin session against an in-memory ledger: register members,
/// record contributions, issue a loan, apply a repayment, and dump the
/// projected schedule as JSON for downstream tooling.
fn main() -> Result<(), Box<dyn std::error::Error>> {
	env::set_var("RUST_LOG", "info");
	pretty_env_logger::init();

	let member_repo = member::Repo::new();
	let loan_repo = loan::Repo::new();
	let transaction_repo = transaction::Repo::new();
	let contribution_repo = contribution::Repo::new();
	let calendar = SystemCalendar;

	let service = FundService::new(NewFundService {
		member_repo: &member_repo,
		loan_repo: &loan_repo,
		transaction_repo: &transaction_repo,
		contribution_repo: &contribution_repo,
		calendar: &calendar,
	});

	let today = calendar.current_date();
	let amina = member_repo.create(NewMember {
		id: "M-100",
		first_name: "Amina",
		family_name: "Diallo",
		phone_number: Some("555-0134"),
		joined_on: today,
	})?;
	let kofi = member_repo.create(NewMember {
		id: "M-101",
		first_name: "Kofi",
		family_name: "Mensah",
		phone_number: None,
		joined_on: today,
	})?;

	service.record_contribution(&amina.id, &BigDecimal::from(1000), "Cash", "Admin")?;
	service.record_contribution(&kofi.id, &BigDecimal::from(250), "Transfer", "Admin")?;

	let verdict = service.evaluate_eligibility(&amina.id);
	info!("eligibility for {}: {:?}", amina.id, verdict);

	let loan = service.issue_loan(
		&amina.id,
		&kofi.id,
		&BigDecimal::from(4000),
		LoanTerm::Months12,
		FeeDisposition::Upfront,
	)?;
	info!(
		"issued loan {} to {}, first payment due {}",
		loan.id, loan.borrower_id, loan.next_payment_due
	);

	let loan = service.record_repayment(&loan.id, &"333.33".parse::<BigDecimal>()?, "Cash", "Admin")?;
	info!(
		"repayment applied, balance {} next due {}",
		loan.balance, loan.next_payment_due
	);

	for transaction in transaction_repo.all() {
		info!(
			"{} {} {} - {}",
			transaction.date, transaction.transaction_type, transaction.amount,
			transaction.description
		);
	}

	let schedule = service.project_schedule(&loan.id)?;
	println!("{}", serde_json::to_string_pretty(&schedule)?);

	Ok(())
}
