pub mod contribution;
pub mod fund;
pub mod loan;
pub mod member;
pub mod schedule;
pub mod store;
pub mod transaction;
pub mod types;

#[cfg(test)]
mod testutil;

pub use contribution::YearlyContribution;
pub use fund::{
	application_fee, borrow_limit, Calendar, Eligibility, Error, ErrorKind, FundService,
	NewFundService, SystemCalendar,
};
pub use loan::{FeeDisposition, Loan, LoanState, LoanTerm, NewLoan};
pub use member::{AccountStatus, Member, NewMember};
pub use schedule::{Schedule, ScheduleRow};
pub use transaction::{NewTransaction, Transaction, TransactionType};
pub use types::{Date, DateExt, Id, Time, DUE_DAY};
