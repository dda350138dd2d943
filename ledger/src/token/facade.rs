//! Token facade
//!
//! Public operation surface of the token. Every operation checks, in order:
//!
//! 1. role membership of the caller
//! 2. the pause switch (balance-moving operations only)
//! 3. the nominal, then spendable, balance of the debited account
//!    (outbound movements)
//! 4. the ledger's own allowance/cap checks
//!
//! and only then writes. A rejected operation changes nothing and records no
//! event.

use log::debug;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::{
    Address, FungibleLedger, LedgerState, LockBox, LockBoxEngine, MemoryLedger, PauseSwitch, Role,
    RoleGate, TokenError, TokenEvent, TokenResult, DECIMALS,
};
use crate::config::TokenConfig;
use crate::time::{Clock, TimestampSeconds};

pub struct TokenFacade<L, C> {
    name: String,
    symbol: String,
    ledger: L,
    roles: RoleGate,
    pause: PauseSwitch,
    lock_boxes: LockBoxEngine,
    clock: C,
    events: Vec<TokenEvent>,
}

/// Serializable state of a token backed by a `MemoryLedger`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub ledger: LedgerState,
    pub pause: PauseSwitch,
    pub roles: RoleGate,
    pub lock_boxes: Vec<LockBox>,
    pub total_lock_box_balance: U256,
    pub taken_at: TimestampSeconds,
}

impl<C: Clock> TokenFacade<MemoryLedger, C> {
    /// Deploy a token backed by an in-memory ledger
    ///
    /// `deployer` is granted every role.
    pub fn new(config: TokenConfig, deployer: Address, clock: C) -> TokenResult<Self> {
        let ledger = MemoryLedger::new(config.cap);
        Self::with_ledger(config, deployer, ledger, clock)
    }

    /// Capture the token state
    ///
    /// `taken_at` never precedes a time the lock engine has already judged
    /// maturity against, so a restore cannot lock a matured box again.
    pub fn snapshot(&self) -> TokenSnapshot {
        let taken_at = self.now().max(self.lock_boxes.observed_time());
        TokenSnapshot {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: DECIMALS,
            ledger: self.ledger.export(),
            pause: self.pause.clone(),
            roles: self.roles.clone(),
            lock_boxes: self.lock_boxes.lock_boxes().to_vec(),
            total_lock_box_balance: self.lock_boxes.total_lock_box_balance(taken_at),
            taken_at,
        }
    }

    /// Restore a token from a snapshot, checking its internal consistency
    pub fn from_snapshot(snapshot: TokenSnapshot, clock: C) -> TokenResult<Self> {
        if snapshot.decimals != DECIMALS {
            return Err(TokenError::InvariantViolation(format!(
                "snapshot has {} decimals",
                snapshot.decimals
            )));
        }
        TokenConfig::new(
            snapshot.name.clone(),
            snapshot.symbol.clone(),
            snapshot.ledger.cap,
        )
        .validate()?;

        let ledger = MemoryLedger::import(snapshot.ledger)?;
        let lock_boxes = LockBoxEngine::from_lock_boxes(snapshot.lock_boxes, snapshot.taken_at)?;
        let total = lock_boxes.total_lock_box_balance(snapshot.taken_at);
        if total != snapshot.total_lock_box_balance {
            return Err(TokenError::InvariantViolation(format!(
                "lock boxes sum to {} but snapshot records {}",
                total, snapshot.total_lock_box_balance
            )));
        }
        for lock_box in lock_boxes.lock_boxes() {
            let nominal = ledger.balance_of(&lock_box.beneficiary);
            lock_boxes.released_balance(&lock_box.beneficiary, nominal, snapshot.taken_at)?;
        }

        Ok(Self {
            name: snapshot.name,
            symbol: snapshot.symbol,
            ledger,
            roles: snapshot.roles,
            pause: snapshot.pause,
            lock_boxes,
            clock,
            events: Vec::new(),
        })
    }
}

impl<L: FungibleLedger, C: Clock> TokenFacade<L, C> {
    /// Deploy a token on top of an existing ledger
    ///
    /// The ledger cap must match the configured cap.
    pub fn with_ledger(
        config: TokenConfig,
        deployer: Address,
        ledger: L,
        clock: C,
    ) -> TokenResult<Self> {
        config.validate()?;
        if ledger.cap() != config.cap {
            return Err(TokenError::InvalidConfig(format!(
                "ledger cap {} differs from configured cap {}",
                ledger.cap(),
                config.cap
            )));
        }
        let roles = RoleGate::new(deployer)?;

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Token {} ({}) deployed by {} with cap {}",
                config.name,
                config.symbol,
                hex::encode(deployer),
                config.cap
            );
        }

        Ok(Self {
            name: config.name,
            symbol: config.symbol,
            ledger,
            roles,
            pause: PauseSwitch::default(),
            lock_boxes: LockBoxEngine::new(),
            clock,
            events: Vec::new(),
        })
    }

    // ========================================
    // Metadata & Queries
    // ========================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        DECIMALS
    }

    pub fn cap(&self) -> U256 {
        self.ledger.cap()
    }

    pub fn total_supply(&self) -> U256 {
        self.ledger.total_supply()
    }

    pub fn balance_of(&self, account: &Address) -> U256 {
        self.ledger.balance_of(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.ledger.allowance(owner, spender)
    }

    pub fn now(&self) -> TimestampSeconds {
        self.clock.now()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn roles(&self) -> &RoleGate {
        &self.roles
    }

    pub fn pause_state(&self) -> &PauseSwitch {
        &self.pause
    }

    // ========================================
    // Event Journal
    // ========================================

    /// Events recorded since the last drain
    pub fn events(&self) -> &[TokenEvent] {
        &self.events
    }

    /// Hand the recorded events to the host
    pub fn drain_events(&mut self) -> Vec<TokenEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================
    // Transfer Operations
    // ========================================

    /// Fail unless `amount` may leave `account`
    ///
    /// An amount above the nominal balance is `InsufficientBalance`;
    /// `InsufficientSpendableBalance` means lock boxes hold back the rest.
    fn ensure_spendable(&self, account: &Address, amount: U256) -> TokenResult<()> {
        self.ledger.check_balance(account, amount)?;
        let nominal = self.ledger.balance_of(account);
        self.lock_boxes
            .ensure_spendable(account, nominal, amount, self.clock.now())
    }

    pub fn transfer(&mut self, caller: &Address, to: &Address, amount: U256) -> TokenResult<bool> {
        self.pause.ensure_not_paused()?;
        self.ensure_spendable(caller, amount)?;

        self.ledger.transfer(caller, to, amount)?;

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Transfer {} from {} to {}",
                amount,
                hex::encode(caller),
                hex::encode(to)
            );
        }
        self.events.push(TokenEvent::Transfer {
            from: Some(*caller),
            to: Some(*to),
            amount,
        });
        Ok(true)
    }

    /// Move `amount` from `from` to `to` using the caller's allowance
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: U256,
    ) -> TokenResult<bool> {
        self.pause.ensure_not_paused()?;
        self.ensure_spendable(from, amount)?;
        self.ledger.check_allowance(from, caller, amount)?;

        self.ledger.transfer(from, to, amount)?;
        self.ledger.spend_allowance(from, caller, amount)?;

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Transfer {} from {} to {} by {}",
                amount,
                hex::encode(from),
                hex::encode(to),
                hex::encode(caller)
            );
        }
        self.events.push(TokenEvent::Transfer {
            from: Some(*from),
            to: Some(*to),
            amount,
        });
        Ok(true)
    }

    pub fn approve(
        &mut self,
        caller: &Address,
        spender: &Address,
        amount: U256,
    ) -> TokenResult<bool> {
        self.ledger.approve(caller, spender, amount)?;

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Approval of {} for {} by {}",
                amount,
                hex::encode(spender),
                hex::encode(caller)
            );
        }
        self.events.push(TokenEvent::Approval {
            owner: *caller,
            spender: *spender,
            amount,
        });
        Ok(true)
    }

    // ========================================
    // Mint & Burn Operations
    // ========================================

    pub fn mint(&mut self, caller: &Address, to: &Address, amount: U256) -> TokenResult<()> {
        self.roles.check_role(Role::Minter, caller)?;
        self.pause.ensure_not_paused()?;

        self.ledger.mint(to, amount)?;

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Minted {} to {}, total supply {}",
                amount,
                hex::encode(to),
                self.ledger.total_supply()
            );
        }
        self.events.push(TokenEvent::Transfer {
            from: None,
            to: Some(*to),
            amount,
        });
        Ok(())
    }

    /// Burn from the caller's own balance
    pub fn burn(&mut self, caller: &Address, amount: U256) -> TokenResult<()> {
        self.roles.check_role(Role::Burner, caller)?;
        self.pause.ensure_not_paused()?;
        self.ensure_spendable(caller, amount)?;

        self.ledger.burn(caller, amount)?;

        self.log_burn(caller, caller, amount);
        self.events.push(TokenEvent::Transfer {
            from: Some(*caller),
            to: None,
            amount,
        });
        Ok(())
    }

    /// Burn from `account` using the caller's allowance
    pub fn burn_from(
        &mut self,
        caller: &Address,
        account: &Address,
        amount: U256,
    ) -> TokenResult<()> {
        self.roles.check_role(Role::Burner, caller)?;
        self.pause.ensure_not_paused()?;
        self.ensure_spendable(account, amount)?;
        self.ledger.check_allowance(account, caller, amount)?;

        self.ledger.burn(account, amount)?;
        self.ledger.spend_allowance(account, caller, amount)?;

        self.log_burn(caller, account, amount);
        self.events.push(TokenEvent::Transfer {
            from: Some(*account),
            to: None,
            amount,
        });
        Ok(())
    }

    fn log_burn(&self, caller: &Address, account: &Address, amount: U256) {
        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Burned {} from {} by {}, total supply {}",
                amount,
                hex::encode(account),
                hex::encode(caller),
                self.ledger.total_supply()
            );
        }
    }

    // ========================================
    // Pause Operations
    // ========================================

    pub fn paused(&self) -> bool {
        self.pause.is_paused()
    }

    pub fn pause(&mut self, caller: &Address) -> TokenResult<()> {
        self.roles.check_role(Role::Pauser, caller)?;
        let now = self.clock.now();
        self.pause.pause(caller, now)?;
        self.events.push(TokenEvent::Paused { account: *caller });
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Address) -> TokenResult<()> {
        self.roles.check_role(Role::Pauser, caller)?;
        self.pause.unpause(caller)?;
        self.events.push(TokenEvent::Unpaused { account: *caller });
        Ok(())
    }

    // ========================================
    // Role Operations
    // ========================================

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.roles.has_role(role, account)
    }

    pub fn get_role_admin(&self, role: Role) -> Role {
        self.roles.get_role_admin(role)
    }

    pub fn get_role_member_count(&self, role: Role) -> usize {
        self.roles.get_role_member_count(role)
    }

    pub fn get_role_member(&self, role: Role, index: usize) -> TokenResult<Address> {
        self.roles.get_role_member(role, index)
    }

    pub fn grant_role(&mut self, caller: &Address, role: Role, account: &Address) -> TokenResult<()> {
        if self.roles.grant_role(caller, role, account)? {
            self.events.push(TokenEvent::RoleGranted {
                role,
                account: *account,
                sender: *caller,
            });
        }
        Ok(())
    }

    pub fn revoke_role(&mut self, caller: &Address, role: Role, account: &Address) -> TokenResult<()> {
        if self.roles.revoke_role(caller, role, account)? {
            self.events.push(TokenEvent::RoleRevoked {
                role,
                account: *account,
                sender: *caller,
            });
        }
        Ok(())
    }

    pub fn renounce_role(&mut self, caller: &Address, role: Role) -> TokenResult<()> {
        if self.roles.renounce_role(caller, role) {
            self.events.push(TokenEvent::RoleRevoked {
                role,
                account: *caller,
                sender: *caller,
            });
        }
        Ok(())
    }

    pub fn set_role_admin(
        &mut self,
        caller: &Address,
        role: Role,
        admin_role: Role,
    ) -> TokenResult<()> {
        let previous_admin_role = self.roles.set_role_admin(caller, role, admin_role)?;
        self.events.push(TokenEvent::RoleAdminChanged {
            role,
            previous_admin_role,
            new_admin_role: admin_role,
        });
        Ok(())
    }

    // ========================================
    // Lock Box Operations
    // ========================================

    /// Credit `amount` to `beneficiary`, spendable only from `maturity` on
    ///
    /// The amount is newly minted and counts toward the cap. A maturity in
    /// the past yields a lock box that is released immediately.
    pub fn issue_locked_tokens(
        &mut self,
        caller: &Address,
        beneficiary: &Address,
        amount: U256,
        maturity: TimestampSeconds,
    ) -> TokenResult<()> {
        self.roles.check_role(Role::Issuer, caller)?;
        self.pause.ensure_not_paused()?;
        self.lock_boxes.check_issue(beneficiary, amount)?;

        let now = self.clock.now();
        self.ledger.mint(beneficiary, amount)?;
        let lock_box = self
            .lock_boxes
            .issue(caller, beneficiary, amount, maturity, now)?;

        self.events.push(TokenEvent::Transfer {
            from: None,
            to: Some(*beneficiary),
            amount,
        });
        self.events.push(TokenEvent::LockedTokensIssued {
            lock_id: lock_box.id,
            beneficiary: *beneficiary,
            amount,
            maturity,
        });
        Ok(())
    }

    /// Per-account lock queries are open to the account itself and issuers
    fn check_self_or_issuer(&self, caller: &Address, account: &Address) -> TokenResult<()> {
        if caller == account {
            return Ok(());
        }
        self.roles.check_role(Role::Issuer, caller)
    }

    pub fn get_locked_balance(&self, caller: &Address, account: &Address) -> TokenResult<U256> {
        self.check_self_or_issuer(caller, account)?;
        Ok(self.lock_boxes.locked_balance(account, self.clock.now()))
    }

    /// Spendable balance: nominal balance minus locked balance
    pub fn get_released_balance(&self, caller: &Address, account: &Address) -> TokenResult<U256> {
        self.check_self_or_issuer(caller, account)?;
        self.lock_boxes.released_balance(
            account,
            self.ledger.balance_of(account),
            self.clock.now(),
        )
    }

    pub fn get_total_lock_box_balance(&self, caller: &Address) -> TokenResult<U256> {
        self.roles.check_role(Role::Admin, caller)?;
        Ok(self.lock_boxes.total_lock_box_balance(self.clock.now()))
    }

    /// Number of lock boxes ever issued, matured ones included
    pub fn get_lock_box_count(&self, caller: &Address) -> TokenResult<u64> {
        self.roles.check_role(Role::Admin, caller)?;
        Ok(self.lock_boxes.lock_box_count() as u64)
    }

    pub fn get_lock_box(&self, caller: &Address, id: u64) -> TokenResult<LockBox> {
        let lock_box = self.lock_boxes.get_lock_box(id)?;
        self.check_self_or_issuer(caller, &lock_box.beneficiary)?;
        Ok(lock_box.clone())
    }

    pub fn get_lock_box_ids(&self, caller: &Address, account: &Address) -> TokenResult<Vec<u64>> {
        self.check_self_or_issuer(caller, account)?;
        Ok(self.lock_boxes.lock_box_ids(account))
    }

    pub fn get_lock_boxes(
        &self,
        caller: &Address,
        account: &Address,
        offset: usize,
        limit: usize,
    ) -> TokenResult<Vec<LockBox>> {
        self.check_self_or_issuer(caller, account)?;
        Ok(self
            .lock_boxes
            .lock_boxes_of(account, offset, limit)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn get_next_maturity(
        &self,
        caller: &Address,
        account: &Address,
    ) -> TokenResult<Option<TimestampSeconds>> {
        self.check_self_or_issuer(caller, account)?;
        Ok(self.lock_boxes.next_maturity(account, self.clock.now()))
    }
}
