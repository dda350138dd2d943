//! Global pause switch
//!
//! Role checks happen in the facade; the switch only enforces the edge
//! transition (pausing a paused token and unpausing a running one fail).

use log::debug;
use serde::{Deserialize, Serialize};

use super::{Address, TokenError, TokenResult};
use crate::time::TimestampSeconds;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseSwitch {
    /// Whether balance movement is frozen
    pub is_paused: bool,
    /// Who paused (None when unpaused)
    pub paused_by: Option<Address>,
    /// When the pause started (None when unpaused)
    pub paused_at: Option<TimestampSeconds>,
}

impl PauseSwitch {
    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// Fail with `Paused` while balance movement is frozen
    pub fn ensure_not_paused(&self) -> TokenResult<()> {
        if self.is_paused {
            return Err(TokenError::Paused);
        }
        Ok(())
    }

    pub fn pause(&mut self, caller: &Address, now: TimestampSeconds) -> TokenResult<()> {
        if self.is_paused {
            return Err(TokenError::AlreadyPaused);
        }

        self.is_paused = true;
        self.paused_by = Some(*caller);
        self.paused_at = Some(now);
        if log::log_enabled!(log::Level::Debug) {
            debug!("Token paused by {} at {}", hex::encode(caller), now);
        }
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Address) -> TokenResult<()> {
        if !self.is_paused {
            return Err(TokenError::NotPaused);
        }

        *self = Self::default();
        if log::log_enabled!(log::Level::Debug) {
            debug!("Token unpaused by {}", hex::encode(caller));
        }
        Ok(())
    }
}
