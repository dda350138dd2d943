//! Shared token handle
//!
//! Wraps a [`TokenFacade`] in a mutex for hosts that reach it from several
//! threads. A poisoned lock is reported as `StatePoisoned` instead of
//! exposing state a panicking operation may have left half written.

use std::sync::{Arc, Mutex, MutexGuard};

use log::error;

use super::{FungibleLedger, TokenError, TokenFacade, TokenResult};
use crate::time::Clock;

/// Thread-safe handle to a token
///
/// Every closure passed to `execute` runs under one lock acquisition, so a
/// sequence of operations inside it is observed atomically by other handles.
pub struct SharedToken<L, C> {
    inner: Arc<Mutex<TokenFacade<L, C>>>,
}

impl<L, C> Clone for SharedToken<L, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: FungibleLedger, C: Clock> SharedToken<L, C> {
    pub fn new(token: TokenFacade<L, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(token)),
        }
    }

    fn lock(&self) -> TokenResult<MutexGuard<'_, TokenFacade<L, C>>> {
        self.inner.lock().map_err(|_| {
            error!("Token state lock poisoned, refusing further operations");
            TokenError::StatePoisoned
        })
    }

    /// Run `f` with exclusive access to the token
    pub fn execute<T, F>(&self, f: F) -> TokenResult<T>
    where
        F: FnOnce(&mut TokenFacade<L, C>) -> TokenResult<T>,
    {
        let mut token = self.lock()?;
        f(&mut token)
    }

    /// Run a read-only query against the token
    pub fn read<T, F>(&self, f: F) -> TokenResult<T>
    where
        F: FnOnce(&TokenFacade<L, C>) -> T,
    {
        let token = self.lock()?;
        Ok(f(&token))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use primitive_types::U256;

    use super::*;
    use crate::config::TokenConfig;
    use crate::time::ManualClock;
    use crate::token::{to_base_units, Address, MemoryLedger, Role};

    const OWNER: Address = [1u8; 32];

    fn shared() -> SharedToken<MemoryLedger, ManualClock> {
        let token =
            TokenFacade::new(TokenConfig::default(), OWNER, ManualClock::new(1_000)).unwrap();
        SharedToken::new(token)
    }

    #[test]
    fn test_concurrent_mints_respect_cap() {
        let config = TokenConfig::new("Small", "SML", to_base_units(100));
        let token = TokenFacade::new(config, OWNER, ManualClock::new(1_000)).unwrap();
        let shared = SharedToken::new(token);

        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let to = [10 + i; 32];
                    shared.execute(|t| t.mint(&OWNER, &to, to_base_units(30)))
                })
            })
            .collect();

        let succeeded = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();

        assert_eq!(succeeded, 3);
        assert_eq!(shared.read(|t| t.total_supply()).unwrap(), to_base_units(90));
    }

    #[test]
    fn test_execute_is_atomic_for_sequences() {
        let shared = shared();
        let alice = [2u8; 32];

        shared
            .execute(|t| {
                t.grant_role(&OWNER, Role::Minter, &alice)?;
                t.mint(&alice, &alice, U256::from(7u64))
            })
            .unwrap();

        assert!(shared.read(|t| t.has_role(Role::Minter, &alice)).unwrap());
        assert_eq!(shared.read(|t| t.balance_of(&alice)).unwrap(), U256::from(7u64));
    }

    #[test]
    fn test_poisoned_lock() {
        let shared = shared();
        let other = shared.clone();

        let _ = thread::spawn(move || {
            other
                .execute(|_| -> TokenResult<()> { panic!("operation panicked") })
                .ok();
        })
        .join();

        assert_eq!(
            shared.execute(|t| t.pause(&OWNER)),
            Err(TokenError::StatePoisoned)
        );
        assert_eq!(shared.read(|t| t.paused()), Err(TokenError::StatePoisoned));
    }
}
