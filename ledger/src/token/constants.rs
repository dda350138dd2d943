//! Token Constants
//!
//! Defines limits and configuration constants.

// ===== Metadata Limits =====

/// Maximum length of token name (bytes)
pub const MAX_NAME_LENGTH: usize = 64;

/// Maximum length of token symbol/ticker (bytes)
pub const MAX_SYMBOL_LENGTH: usize = 12;

/// Decimals of every amount handled by the ledger
pub const DECIMALS: u8 = 18;

// ===== Lock Box Limits =====

/// Maximum page size for lock box enumeration
pub const MAX_LOCK_BOX_PAGE: usize = 256;
