//! Lock boxes
//!
//! A lock box is balance credited to a beneficiary at issuance that cannot
//! leave the account before its maturity timestamp. The locked amount is
//! part of the nominal balance from the start; the engine only restricts
//! what may be spent.
//!
//! Maturity is evaluated lazily at query time. Lock boxes are never removed:
//! once matured they simply stop counting toward any locked amount.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::{Address, TokenError, TokenResult, MAX_LOCK_BOX_PAGE, ZERO_ADDRESS};
use crate::time::TimestampSeconds;

/// A single time-locked issuance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockBox {
    /// Issuance sequence number, starting at 0
    pub id: u64,
    /// Account whose balance is restricted
    pub beneficiary: Address,
    /// Locked amount in minor units, never zero
    pub amount: U256,
    /// Unix timestamp from which the amount is spendable
    pub maturity: TimestampSeconds,
    /// Unix timestamp of issuance
    pub created_at: TimestampSeconds,
    /// Account that issued the lock
    pub issuer: Address,
}

impl LockBox {
    #[inline]
    pub fn is_matured(&self, now: TimestampSeconds) -> bool {
        now >= self.maturity
    }
}

/// Tracks every lock box and answers locked/spendable queries
#[derive(Debug, Default)]
pub struct LockBoxEngine {
    // Arena in issuance order, lock id == index
    lock_boxes: Vec<LockBox>,
    // Arena indexes per beneficiary, in issuance order
    by_beneficiary: HashMap<Address, Vec<usize>>,
    // Amounts not yet settled as matured, keyed by maturity
    pending: BTreeMap<TimestampSeconds, U256>,
    // Sum of `pending`
    unsettled_total: U256,
    // Highest timestamp observed, keeps maturity monotonic
    observed: AtomicU64,
}

impl LockBoxEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an engine from lock boxes in issuance order
    pub fn from_lock_boxes(lock_boxes: Vec<LockBox>, now: TimestampSeconds) -> TokenResult<Self> {
        let mut engine = Self::new();
        engine.observe(now);

        for (index, lock_box) in lock_boxes.into_iter().enumerate() {
            if lock_box.id != index as u64 {
                return Err(TokenError::InvariantViolation(format!(
                    "lock box {} stored at position {}",
                    lock_box.id, index
                )));
            }
            engine.check_issue(&lock_box.beneficiary, lock_box.amount)?;
            engine.insert(lock_box, now)?;
        }

        Ok(engine)
    }

    /// Record `now` and return the effective time, never earlier than any
    /// timestamp seen before
    fn observe(&self, now: TimestampSeconds) -> TimestampSeconds {
        let previous = self.observed.fetch_max(now, Ordering::SeqCst);
        previous.max(now)
    }

    /// Highest timestamp maturity has been judged against
    pub fn observed_time(&self) -> TimestampSeconds {
        self.observed.load(Ordering::SeqCst)
    }

    /// Drop matured amounts from the running total
    fn settle(&mut self, now: TimestampSeconds) -> TimestampSeconds {
        let now = self.observe(now);
        let still_pending = match now.checked_add(1) {
            Some(bound) => self.pending.split_off(&bound),
            None => BTreeMap::new(),
        };
        let matured = std::mem::replace(&mut self.pending, still_pending);

        // Bounded by the unsettled total: every pending entry is part of it
        let released = matured
            .values()
            .fold(U256::zero(), |acc, amount| acc.saturating_add(*amount));
        self.unsettled_total = self.unsettled_total.saturating_sub(released);

        if !released.is_zero() && log::log_enabled!(log::Level::Debug) {
            debug!("Settled {} matured lock box amount at {}", released, now);
        }
        now
    }

    /// Validate an issuance without changing state
    ///
    /// Succeeds exactly when `issue` with the same arguments would.
    pub fn check_issue(&self, beneficiary: &Address, amount: U256) -> TokenResult<()> {
        if amount.is_zero() {
            return Err(TokenError::ZeroAmount);
        }
        if *beneficiary == ZERO_ADDRESS {
            return Err(TokenError::ZeroAddress);
        }
        self.unsettled_total
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        Ok(())
    }

    /// Record a new lock box
    ///
    /// The caller is responsible for crediting `amount` to the beneficiary.
    pub fn issue(
        &mut self,
        issuer: &Address,
        beneficiary: &Address,
        amount: U256,
        maturity: TimestampSeconds,
        now: TimestampSeconds,
    ) -> TokenResult<LockBox> {
        self.check_issue(beneficiary, amount)?;
        let now = self.settle(now);

        let lock_box = LockBox {
            id: self.lock_boxes.len() as u64,
            beneficiary: *beneficiary,
            amount,
            maturity,
            created_at: now,
            issuer: *issuer,
        };
        self.insert(lock_box.clone(), now)?;

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Lock box #{} issued to {}: {} until {}",
                lock_box.id,
                hex::encode(beneficiary),
                amount,
                maturity
            );
        }
        Ok(lock_box)
    }

    fn insert(&mut self, lock_box: LockBox, now: TimestampSeconds) -> TokenResult<()> {
        if !lock_box.is_matured(now) {
            let unsettled_total = self
                .unsettled_total
                .checked_add(lock_box.amount)
                .ok_or(TokenError::Overflow)?;
            let entry = self.pending.entry(lock_box.maturity).or_default();
            // Bounded by the unsettled total checked above
            *entry = entry.saturating_add(lock_box.amount);
            self.unsettled_total = unsettled_total;
        }

        let index = self.lock_boxes.len();
        self.by_beneficiary
            .entry(lock_box.beneficiary)
            .or_default()
            .push(index);
        self.lock_boxes.push(lock_box);
        Ok(())
    }

    fn lock_boxes_for<'a>(&'a self, account: &Address) -> impl Iterator<Item = &'a LockBox> + 'a {
        self.by_beneficiary
            .get(account)
            .map(|indexes| indexes.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |index| self.lock_boxes.get(*index))
    }

    /// Sum of unmatured lock boxes of `account`
    pub fn locked_balance(&self, account: &Address, now: TimestampSeconds) -> U256 {
        let now = self.observe(now);
        // Bounded by the unsettled total: unmatured boxes are all pending
        self.lock_boxes_for(account)
            .filter(|lock_box| !lock_box.is_matured(now))
            .fold(U256::zero(), |acc, lock_box| {
                acc.saturating_add(lock_box.amount)
            })
    }

    /// Nominal balance minus locked balance
    ///
    /// A locked amount above the nominal balance means the ledger was moved
    /// behind the engine's back and is reported, not masked.
    pub fn released_balance(
        &self,
        account: &Address,
        nominal: U256,
        now: TimestampSeconds,
    ) -> TokenResult<U256> {
        let locked = self.locked_balance(account, now);
        nominal.checked_sub(locked).ok_or_else(|| {
            TokenError::InvariantViolation(format!(
                "locked balance {} exceeds balance {} of {}",
                locked,
                nominal,
                hex::encode(account)
            ))
        })
    }

    /// Fail with `InsufficientSpendableBalance` if `amount` may not leave
    /// `account`
    pub fn ensure_spendable(
        &self,
        account: &Address,
        nominal: U256,
        amount: U256,
        now: TimestampSeconds,
    ) -> TokenResult<()> {
        let available = self.released_balance(account, nominal, now)?;
        if amount > available {
            return Err(TokenError::InsufficientSpendableBalance {
                available,
                required: amount,
            });
        }
        Ok(())
    }

    /// Sum of every unmatured lock box
    pub fn total_lock_box_balance(&self, now: TimestampSeconds) -> U256 {
        let now = self.observe(now);
        // Matured since the last settlement
        let matured = self
            .pending
            .range(..=now)
            .fold(U256::zero(), |acc, (_, amount)| acc.saturating_add(*amount));
        self.unsettled_total.saturating_sub(matured)
    }

    /// Number of lock boxes ever issued, matured or not
    pub fn lock_box_count(&self) -> usize {
        self.lock_boxes.len()
    }

    pub fn get_lock_box(&self, id: u64) -> TokenResult<&LockBox> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.lock_boxes.get(index))
            .ok_or(TokenError::LockNotFound(id))
    }

    /// Ids of the lock boxes of `account`, in issuance order
    pub fn lock_box_ids(&self, account: &Address) -> Vec<u64> {
        self.lock_boxes_for(account)
            .map(|lock_box| lock_box.id)
            .collect()
    }

    /// Page of the lock boxes of `account`, in issuance order
    ///
    /// `limit` is capped at `MAX_LOCK_BOX_PAGE`.
    pub fn lock_boxes_of(&self, account: &Address, offset: usize, limit: usize) -> Vec<&LockBox> {
        self.lock_boxes_for(account)
            .skip(offset)
            .take(limit.min(MAX_LOCK_BOX_PAGE))
            .collect()
    }

    /// Earliest maturity among the unmatured lock boxes of `account`
    pub fn next_maturity(&self, account: &Address, now: TimestampSeconds) -> Option<TimestampSeconds> {
        let now = self.observe(now);
        self.lock_boxes_for(account)
            .filter(|lock_box| !lock_box.is_matured(now))
            .map(|lock_box| lock_box.maturity)
            .min()
    }

    /// Every lock box, in issuance order
    pub fn lock_boxes(&self) -> &[LockBox] {
        &self.lock_boxes
    }
}
