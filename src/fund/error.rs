use std::error;
use std::fmt;

use crate::store;

/// An error that can occur when performing a fund operation
///
/// Every variant is a rejected operation, never a crash: when an operation
/// errors, no ledger state has been written.
#[derive(Debug, PartialEq)]
pub struct Error {
	kind: ErrorKind,
}

impl Error {
	pub fn new(kind: ErrorKind) -> Error {
		Error { kind }
	}

	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}
}

/// The kind of an error that can occur.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
	/// A referenced member or loan id is absent
	NotFound(String),
	/// Input fails shape or range checks
	Validation(String),
	/// A business rule refuses the operation
	Policy(String),
	/// Store-level failure surfaced by a repository
	Store(store::Error),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match &self.kind {
			ErrorKind::NotFound(what) => write!(f, "{} not found", what),
			ErrorKind::Validation(msg) => write!(f, "invalid input: {}", msg),
			ErrorKind::Policy(msg) => write!(f, "operation refused: {}", msg),
			ErrorKind::Store(e) => write!(f, "store error: {}", e),
		}
	}
}

impl error::Error for Error {}

impl From<store::Error> for Error {
	fn from(e: store::Error) -> Self {
		Error::new(ErrorKind::Store(e))
	}
}
