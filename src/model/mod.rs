pub mod balance;
pub mod leave_request;
pub mod leave_type;
pub mod ledger;
pub mod policy;
