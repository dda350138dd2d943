//! Token Error Codes
//!
//! Range: 0x0200 - 0x02FF
//! Format: TOKEN_ERROR_<CATEGORY>_<SPECIFIC>

use primitive_types::U256;
use thiserror::Error;

use super::{Address, Role};
use crate::time::TimestampSeconds;

// ===== General Errors (0x0200 - 0x020F) =====

pub const TOKEN_ERROR_ZERO_AMOUNT: u64 = 0x0202;
pub const TOKEN_ERROR_ZERO_ADDRESS: u64 = 0x0203;
pub const TOKEN_ERROR_PAUSED: u64 = 0x0205;
pub const TOKEN_ERROR_NOT_PAUSED: u64 = 0x0206;
pub const TOKEN_ERROR_ALREADY_PAUSED: u64 = 0x0207;
pub const TOKEN_ERROR_OVERFLOW: u64 = 0x0209;
pub const TOKEN_ERROR_UNDERFLOW: u64 = 0x020A;

// ===== Balance Errors (0x0210 - 0x021F) =====

pub const TOKEN_ERROR_INSUFFICIENT_BALANCE: u64 = 0x0210;
pub const TOKEN_ERROR_CAP_EXCEEDED: u64 = 0x0211;
pub const TOKEN_ERROR_INSUFFICIENT_SPENDABLE_BALANCE: u64 = 0x0212;

// ===== Authorization Errors (0x0220 - 0x022F) =====

pub const TOKEN_ERROR_NOT_AUTHORIZED: u64 = 0x0220;
pub const TOKEN_ERROR_INSUFFICIENT_ALLOWANCE: u64 = 0x0221;

// ===== Validation Errors (0x0230 - 0x023F) =====

pub const TOKEN_ERROR_NAME_EMPTY: u64 = 0x0230;
pub const TOKEN_ERROR_NAME_TOO_LONG: u64 = 0x0231;
pub const TOKEN_ERROR_SYMBOL_EMPTY: u64 = 0x0232;
pub const TOKEN_ERROR_SYMBOL_TOO_LONG: u64 = 0x0233;
pub const TOKEN_ERROR_SYMBOL_INVALID: u64 = 0x0234;
pub const TOKEN_ERROR_INVALID_CAP: u64 = 0x0235;
pub const TOKEN_ERROR_INVALID_CONFIG: u64 = 0x0236;
pub const TOKEN_ERROR_INVALID_AMOUNT: u64 = 0x0237;

// ===== Lock Errors (0x0240 - 0x024F) =====

pub const TOKEN_ERROR_LOCK_NOT_FOUND: u64 = 0x0240;

// ===== Role Errors (0x0290 - 0x029F) =====

pub const TOKEN_ERROR_ROLE_MEMBER_NOT_FOUND: u64 = 0x0290;

// ===== System Errors (0x02F0 - 0x02FF) =====

pub const TOKEN_ERROR_CLOCK_REGRESSION: u64 = 0x02F0;
pub const TOKEN_ERROR_STATE_POISONED: u64 = 0x02F1;
pub const TOKEN_ERROR_INVARIANT_VIOLATION: u64 = 0x02F2;

/// Token operation result type
pub type TokenResult<T> = Result<T, TokenError>;

/// Every way a token operation can be rejected
///
/// A rejected operation never leaves partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    // General
    #[error("Zero amount not allowed")]
    ZeroAmount,

    #[error("Zero address not allowed")]
    ZeroAddress,

    #[error("Token is paused")]
    Paused,

    #[error("Token is not paused")]
    NotPaused,

    #[error("Token is already paused")]
    AlreadyPaused,

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Arithmetic underflow")]
    Underflow,

    // Balance
    #[error("Insufficient balance: have {available}, need {required}")]
    InsufficientBalance { available: U256, required: U256 },

    #[error("Insufficient spendable balance: released {available}, need {required}")]
    InsufficientSpendableBalance { available: U256, required: U256 },

    #[error("Cap exceeded: cap {cap}, requested total supply {requested}")]
    CapExceeded { cap: U256, requested: U256 },

    // Authorization
    #[error("Account {} is missing role {role}", hex::encode(.account))]
    NotAuthorized { role: Role, account: Address },

    #[error("Insufficient allowance: have {available}, need {required}")]
    InsufficientAllowance { available: U256, required: U256 },

    // Validation
    #[error("Token name is empty")]
    NameEmpty,

    #[error("Token name is too long")]
    NameTooLong,

    #[error("Token symbol is empty")]
    SymbolEmpty,

    #[error("Token symbol is too long")]
    SymbolTooLong,

    #[error("Token symbol must be alphanumeric")]
    SymbolInvalid,

    #[error("Cap must be greater than zero")]
    InvalidCap,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    // Lock
    #[error("Lock box {0} not found")]
    LockNotFound(u64),

    // Role
    #[error("Role {role} has no member at index {index}")]
    RoleMemberNotFound { role: Role, index: usize },

    // System
    #[error("Clock regression: current {current}, requested {requested}")]
    ClockRegression {
        current: TimestampSeconds,
        requested: TimestampSeconds,
    },

    #[error("Token state lock poisoned")]
    StatePoisoned,

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl TokenError {
    /// Stable numeric code for hosts that surface errors as integers
    pub fn code(&self) -> u64 {
        match self {
            // General
            Self::ZeroAmount => TOKEN_ERROR_ZERO_AMOUNT,
            Self::ZeroAddress => TOKEN_ERROR_ZERO_ADDRESS,
            Self::Paused => TOKEN_ERROR_PAUSED,
            Self::NotPaused => TOKEN_ERROR_NOT_PAUSED,
            Self::AlreadyPaused => TOKEN_ERROR_ALREADY_PAUSED,
            Self::Overflow => TOKEN_ERROR_OVERFLOW,
            Self::Underflow => TOKEN_ERROR_UNDERFLOW,

            // Balance
            Self::InsufficientBalance { .. } => TOKEN_ERROR_INSUFFICIENT_BALANCE,
            Self::InsufficientSpendableBalance { .. } => {
                TOKEN_ERROR_INSUFFICIENT_SPENDABLE_BALANCE
            }
            Self::CapExceeded { .. } => TOKEN_ERROR_CAP_EXCEEDED,

            // Authorization
            Self::NotAuthorized { .. } => TOKEN_ERROR_NOT_AUTHORIZED,
            Self::InsufficientAllowance { .. } => TOKEN_ERROR_INSUFFICIENT_ALLOWANCE,

            // Validation
            Self::NameEmpty => TOKEN_ERROR_NAME_EMPTY,
            Self::NameTooLong => TOKEN_ERROR_NAME_TOO_LONG,
            Self::SymbolEmpty => TOKEN_ERROR_SYMBOL_EMPTY,
            Self::SymbolTooLong => TOKEN_ERROR_SYMBOL_TOO_LONG,
            Self::SymbolInvalid => TOKEN_ERROR_SYMBOL_INVALID,
            Self::InvalidCap => TOKEN_ERROR_INVALID_CAP,
            Self::InvalidConfig(_) => TOKEN_ERROR_INVALID_CONFIG,
            Self::InvalidAmount(_) => TOKEN_ERROR_INVALID_AMOUNT,

            // Lock
            Self::LockNotFound(_) => TOKEN_ERROR_LOCK_NOT_FOUND,

            // Role
            Self::RoleMemberNotFound { .. } => TOKEN_ERROR_ROLE_MEMBER_NOT_FOUND,

            // System
            Self::ClockRegression { .. } => TOKEN_ERROR_CLOCK_REGRESSION,
            Self::StatePoisoned => TOKEN_ERROR_STATE_POISONED,
            Self::InvariantViolation(_) => TOKEN_ERROR_INVARIANT_VIOLATION,
        }
    }

    /// Whether the error is a missing-role rejection
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotAuthorized { .. })
    }
}
