//! DMTR token ledger
//!
//! An in-process, serially executed ledger for a capped 18-decimal token.
//! Supply changes and administration are gated by roles, a global pause
//! freezes balance movement, and balances can be issued under time locks
//! that keep them out of outbound transfers until maturity.

pub mod config;
pub mod time;
pub mod token;

pub use token::*;
