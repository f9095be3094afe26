pub mod balance;
pub mod leave;
pub mod sweeper;
pub mod sync;
pub mod transition;
