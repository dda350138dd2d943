//! DMTR Token Module
//!
//! ERC20-like capped token implemented as an in-process state machine.
//!
//! # Features
//!
//! - Core token operations (mint, burn, transfer)
//! - ERC20-compatible approval system
//! - Role-based access control with per-role admin roles
//! - Global pause switch
//! - Lock boxes: balances issued now, transferable only after maturity
//!
//! # Execution
//!
//! Every operation on [`TokenFacade`] runs check-then-act: role, pause, lock
//! and ledger checks all pass before anything is written, so a rejected
//! operation leaves no trace. Use [`SharedToken`] when the token is reached
//! from several threads.

pub mod constants;
pub mod error;
pub mod event;
pub mod facade;
pub mod ledger;
pub mod lockbox;
pub mod pause;
pub mod roles;
pub mod shared;
pub mod units;

pub use constants::*;
pub use error::*;
pub use event::*;
pub use facade::*;
pub use ledger::*;
pub use lockbox::*;
pub use pause::*;
pub use roles::*;
pub use shared::*;
pub use units::*;

/// Account identifier
pub type Address = [u8; 32];

/// The zero address, never a valid owner or recipient
pub const ZERO_ADDRESS: Address = [0u8; 32];
