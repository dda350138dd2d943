//! Token events
//!
//! Every committed operation appends its events to the facade journal; the
//! host drains the journal and decides how to surface them.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::{Address, Role};
use crate::time::TimestampSeconds;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenEvent {
    /// Balance movement; `from` is None for mints, `to` is None for burns
    Transfer {
        from: Option<Address>,
        to: Option<Address>,
        amount: U256,
    },
    Approval {
        owner: Address,
        spender: Address,
        amount: U256,
    },
    Paused {
        account: Address,
    },
    Unpaused {
        account: Address,
    },
    RoleGranted {
        role: Role,
        account: Address,
        sender: Address,
    },
    RoleRevoked {
        role: Role,
        account: Address,
        sender: Address,
    },
    RoleAdminChanged {
        role: Role,
        previous_admin_role: Role,
        new_admin_role: Role,
    },
    LockedTokensIssued {
        lock_id: u64,
        beneficiary: Address,
        amount: U256,
        maturity: TimestampSeconds,
    },
}

impl TokenEvent {
    /// Event name as exposed to hosts
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "Transfer",
            Self::Approval { .. } => "Approval",
            Self::Paused { .. } => "Paused",
            Self::Unpaused { .. } => "Unpaused",
            Self::RoleGranted { .. } => "RoleGranted",
            Self::RoleRevoked { .. } => "RoleRevoked",
            Self::RoleAdminChanged { .. } => "RoleAdminChanged",
            Self::LockedTokensIssued { .. } => "LogIssueLockedTokens",
        }
    }
}
