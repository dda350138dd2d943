use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::token::{to_base_units, TokenError, TokenResult, MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH};

// 1B full coin
pub const MAXIMUM_SUPPLY_COINS: u64 = 1_000_000_000;

// Token metadata set at construction
pub const TOKEN_NAME: &str = "DimitraToken";
pub const TOKEN_SYMBOL: &str = "DMTR";

/// Maximum supply in minor units
pub fn maximum_supply() -> U256 {
    to_base_units(MAXIMUM_SUPPLY_COINS)
}

/// Construction parameters of a token
///
/// Name, symbol and cap are fixed for the lifetime of the token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Token name
    pub name: String,
    /// Token symbol/ticker
    pub symbol: String,
    /// Maximum total supply in minor units
    pub cap: U256,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: TOKEN_NAME.to_owned(),
            symbol: TOKEN_SYMBOL.to_owned(),
            cap: maximum_supply(),
        }
    }
}

impl TokenConfig {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, cap: U256) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            cap,
        }
    }

    /// Parse a config from its JSON representation and validate it
    pub fn from_json_str(json: &str) -> TokenResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| TokenError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TokenResult<()> {
        if self.name.is_empty() {
            return Err(TokenError::NameEmpty);
        }
        if self.name.len() > MAX_NAME_LENGTH {
            return Err(TokenError::NameTooLong);
        }
        if self.symbol.is_empty() {
            return Err(TokenError::SymbolEmpty);
        }
        if self.symbol.len() > MAX_SYMBOL_LENGTH {
            return Err(TokenError::SymbolTooLong);
        }
        if !self.symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TokenError::SymbolInvalid);
        }
        if self.cap.is_zero() {
            return Err(TokenError::InvalidCap);
        }
        Ok(())
    }
}
