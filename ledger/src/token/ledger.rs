//! Fungible ledger collaborator
//!
//! Nominal balances, total supply, cap and allowances. The ledger knows
//! nothing about roles, pause or locks: the facade performs those checks
//! before delegating here.

use std::collections::HashMap;

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::{Address, TokenError, TokenResult, ZERO_ADDRESS};

// ========================================
// Ledger Trait (for dependency injection)
// ========================================

/// Abstract ledger interface used by the token facade
///
/// Every mutating method validates completely before writing, so an `Err`
/// leaves the ledger untouched.
pub trait FungibleLedger {
    /// Immutable supply cap
    fn cap(&self) -> U256;
    fn total_supply(&self) -> U256;
    fn balance_of(&self, account: &Address) -> U256;
    fn allowance(&self, owner: &Address, spender: &Address) -> U256;

    /// Credit `to` with new supply
    fn mint(&mut self, to: &Address, amount: U256) -> TokenResult<()>;
    /// Destroy `amount` from `from`
    fn burn(&mut self, from: &Address, amount: U256) -> TokenResult<()>;
    /// Move `amount` from `from` to `to`
    fn transfer(&mut self, from: &Address, to: &Address, amount: U256) -> TokenResult<()>;
    /// Set the allowance of `spender` over `owner`'s balance
    fn approve(&mut self, owner: &Address, spender: &Address, amount: U256) -> TokenResult<()>;
    /// Consume `amount` of allowance; `U256::MAX` is unlimited
    fn spend_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: U256,
    ) -> TokenResult<()>;

    /// Fail with `InsufficientBalance` if `account` holds less than `amount`
    fn check_balance(&self, account: &Address, amount: U256) -> TokenResult<()> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                available,
                required: amount,
            });
        }
        Ok(())
    }

    /// Fail with `InsufficientAllowance` if `spender` may not move `amount`
    fn check_allowance(&self, owner: &Address, spender: &Address, amount: U256) -> TokenResult<()> {
        let available = self.allowance(owner, spender);
        if available < amount {
            return Err(TokenError::InsufficientAllowance {
                available,
                required: amount,
            });
        }
        Ok(())
    }

    /// Total supply after minting `amount`, failing with `CapExceeded`
    fn check_mint(&self, amount: U256) -> TokenResult<U256> {
        let requested = self
            .total_supply()
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let cap = self.cap();
        if requested > cap {
            return Err(TokenError::CapExceeded { cap, requested });
        }
        Ok(requested)
    }
}

// ========================================
// In-memory Ledger
// ========================================

/// In-process ledger backed by hash maps
#[derive(Clone, Debug)]
pub struct MemoryLedger {
    cap: U256,
    total_supply: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

/// Serializable form of a `MemoryLedger`, sorted by address
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub cap: U256,
    pub total_supply: U256,
    pub balances: Vec<(Address, U256)>,
    pub allowances: Vec<(Address, Address, U256)>,
}

impl MemoryLedger {
    pub fn new(cap: U256) -> Self {
        Self {
            cap,
            total_supply: U256::zero(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    /// Export the ledger content
    pub fn export(&self) -> LedgerState {
        let mut balances: Vec<(Address, U256)> = self
            .balances
            .iter()
            .map(|(account, balance)| (*account, *balance))
            .collect();
        balances.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut allowances: Vec<(Address, Address, U256)> = self
            .allowances
            .iter()
            .map(|((owner, spender), amount)| (*owner, *spender, *amount))
            .collect();
        allowances.sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        LedgerState {
            cap: self.cap,
            total_supply: self.total_supply,
            balances,
            allowances,
        }
    }

    /// Rebuild a ledger from exported content
    ///
    /// Balances must sum to the total supply, which must not exceed the cap.
    pub fn import(state: LedgerState) -> TokenResult<Self> {
        let mut sum = U256::zero();
        let mut balances = HashMap::with_capacity(state.balances.len());
        for (account, balance) in state.balances {
            if account == ZERO_ADDRESS {
                return Err(TokenError::ZeroAddress);
            }
            sum = sum.checked_add(balance).ok_or(TokenError::Overflow)?;
            if !balance.is_zero() {
                balances.insert(account, balance);
            }
        }

        if sum != state.total_supply {
            return Err(TokenError::InvariantViolation(format!(
                "balances sum to {} but total supply is {}",
                sum, state.total_supply
            )));
        }
        if state.total_supply > state.cap {
            return Err(TokenError::CapExceeded {
                cap: state.cap,
                requested: state.total_supply,
            });
        }

        let allowances = state
            .allowances
            .into_iter()
            .filter(|(_, _, amount)| !amount.is_zero())
            .map(|(owner, spender, amount)| ((owner, spender), amount))
            .collect();

        Ok(Self {
            cap: state.cap,
            total_supply: state.total_supply,
            balances,
            allowances,
        })
    }

    fn set_balance(&mut self, account: &Address, balance: U256) {
        if balance.is_zero() {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, balance);
        }
    }
}

impl FungibleLedger for MemoryLedger {
    fn cap(&self) -> U256 {
        self.cap
    }

    fn total_supply(&self) -> U256 {
        self.total_supply
    }

    fn balance_of(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    fn mint(&mut self, to: &Address, amount: U256) -> TokenResult<()> {
        if *to == ZERO_ADDRESS {
            return Err(TokenError::ZeroAddress);
        }

        // Phase 1: Validation - calculate new values without state changes
        let new_supply = self.check_mint(amount)?;
        let new_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        // Phase 2: Update balance and supply
        self.set_balance(to, new_balance);
        self.total_supply = new_supply;
        Ok(())
    }

    fn burn(&mut self, from: &Address, amount: U256) -> TokenResult<()> {
        if *from == ZERO_ADDRESS {
            return Err(TokenError::ZeroAddress);
        }

        // Phase 1: Validation - calculate new values without state changes
        self.check_balance(from, amount)?;
        let new_balance = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(TokenError::Underflow)?;
        let new_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(TokenError::Underflow)?;

        // Phase 2: Update balance and supply
        self.set_balance(from, new_balance);
        self.total_supply = new_supply;
        Ok(())
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: U256) -> TokenResult<()> {
        if *from == ZERO_ADDRESS || *to == ZERO_ADDRESS {
            return Err(TokenError::ZeroAddress);
        }

        self.check_balance(from, amount)?;
        if from == to {
            return Ok(());
        }

        // Phase 1: Validation - calculate new values without state changes
        let new_from = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(TokenError::Underflow)?;
        let new_to = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        // Phase 2: Update balances
        self.set_balance(from, new_from);
        self.set_balance(to, new_to);
        Ok(())
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: U256) -> TokenResult<()> {
        if *owner == ZERO_ADDRESS || *spender == ZERO_ADDRESS {
            return Err(TokenError::ZeroAddress);
        }

        if amount.is_zero() {
            // Revoke approval
            self.allowances.remove(&(*owner, *spender));
        } else {
            self.allowances.insert((*owner, *spender), amount);
        }
        Ok(())
    }

    fn spend_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: U256,
    ) -> TokenResult<()> {
        self.check_allowance(owner, spender, amount)?;

        // Reduce allowance (unless unlimited)
        let current = self.allowance(owner, spender);
        if current != U256::MAX {
            let remaining = current.checked_sub(amount).ok_or(TokenError::Underflow)?;
            self.approve(owner, spender, remaining)?;
        }
        Ok(())
    }
}
