//! Token Role System
//!
//! Role-based access control for the token.

use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

use super::{Address, TokenError, TokenResult, ZERO_ADDRESS};

/// Role identifier (32 bytes, the encoding hosts use on the wire)
pub type RoleId = [u8; 32];

/// Default admin role - can manage all other roles
pub const DEFAULT_ADMIN_ROLE: RoleId = [0u8; 32];

/// Create a RoleId from a role name (Keccak-256 of the name)
pub fn role_id_from_name(name: &str) -> RoleId {
    let mut hasher = Keccak256::new();
    hasher.update(name.as_bytes());
    let result = hasher.finalize();
    let mut id = [0u8; 32];
    id.copy_from_slice(&result);
    id
}

/// Predefined roles
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    Display,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Administers every role, itself included
    Admin,
    /// Can mint new tokens
    Minter,
    /// Can pause/unpause balance movement
    Pauser,
    /// Can burn tokens
    Burner,
    /// Can issue lock boxes and inspect any account's locks
    Issuer,
}

impl Role {
    pub fn id(&self) -> RoleId {
        match self {
            Role::Admin => DEFAULT_ADMIN_ROLE,
            role => role_id_from_name(&format!("{}_ROLE", role)),
        }
    }

    /// Resolve a wire role identifier to a predefined role
    pub fn from_id(id: &RoleId) -> Option<Role> {
        Role::iter().find(|role| role.id() == *id)
    }
}

/// Membership and admin configuration of a single role
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoleData {
    /// The admin role that can grant/revoke this role
    pub admin_role: Role,
    /// Accounts holding the role, in grant order
    pub members: IndexSet<Address>,
}

impl Default for RoleData {
    fn default() -> Self {
        Self {
            admin_role: Role::Admin,
            members: IndexSet::new(),
        }
    }
}

/// Role membership oracle
///
/// Grant and revoke require the caller to hold the admin role of the target
/// role. Granting a held role or revoking an unheld one is a no-op.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoleGate {
    roles: IndexMap<Role, RoleData>,
}

impl Default for RoleGate {
    fn default() -> Self {
        Self {
            roles: Role::iter().map(|role| (role, RoleData::default())).collect(),
        }
    }
}

impl RoleGate {
    /// Create a gate where `deployer` holds every role
    pub fn new(deployer: Address) -> TokenResult<Self> {
        if deployer == ZERO_ADDRESS {
            return Err(TokenError::ZeroAddress);
        }

        let mut gate = Self::default();
        for data in gate.roles.values_mut() {
            data.members.insert(deployer);
        }
        Ok(gate)
    }

    /// Check if an address has a role
    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.roles
            .get(&role)
            .map(|data| data.members.contains(account))
            .unwrap_or(false)
    }

    /// Require `account` to hold `role`
    pub fn check_role(&self, role: Role, account: &Address) -> TokenResult<()> {
        if self.has_role(role, account) {
            return Ok(());
        }

        if log::log_enabled!(log::Level::Warn) {
            warn!(
                "Rejected call from {}: missing role {}",
                hex::encode(account),
                role
            );
        }
        Err(TokenError::NotAuthorized {
            role,
            account: *account,
        })
    }

    /// Get the admin role of a role
    pub fn get_role_admin(&self, role: Role) -> Role {
        self.roles
            .get(&role)
            .map(|data| data.admin_role)
            .unwrap_or(Role::Admin)
    }

    /// Change the admin role of `role`
    ///
    /// The caller must hold the current admin role of `role`.
    /// Returns the previous admin role.
    pub fn set_role_admin(
        &mut self,
        caller: &Address,
        role: Role,
        admin_role: Role,
    ) -> TokenResult<Role> {
        let previous = self.get_role_admin(role);
        self.check_role(previous, caller)?;

        self.roles.entry(role).or_default().admin_role = admin_role;
        if log::log_enabled!(log::Level::Debug) {
            debug!("Admin of role {} changed from {} to {}", role, previous, admin_role);
        }
        Ok(previous)
    }

    /// Grant `role` to `account`
    ///
    /// Returns whether membership changed.
    pub fn grant_role(
        &mut self,
        caller: &Address,
        role: Role,
        account: &Address,
    ) -> TokenResult<bool> {
        self.check_role(self.get_role_admin(role), caller)?;
        if *account == ZERO_ADDRESS {
            return Err(TokenError::ZeroAddress);
        }

        let inserted = self.roles.entry(role).or_default().members.insert(*account);
        if inserted && log::log_enabled!(log::Level::Debug) {
            debug!(
                "Role {} granted to {} by {}",
                role,
                hex::encode(account),
                hex::encode(caller)
            );
        }
        Ok(inserted)
    }

    /// Revoke `role` from `account`
    ///
    /// Returns whether membership changed.
    pub fn revoke_role(
        &mut self,
        caller: &Address,
        role: Role,
        account: &Address,
    ) -> TokenResult<bool> {
        self.check_role(self.get_role_admin(role), caller)?;
        if *account == ZERO_ADDRESS {
            return Err(TokenError::ZeroAddress);
        }

        Ok(self.remove_member(role, account, caller))
    }

    /// Drop `role` from the caller itself
    ///
    /// Returns whether membership changed.
    pub fn renounce_role(&mut self, caller: &Address, role: Role) -> bool {
        self.remove_member(role, caller, caller)
    }

    fn remove_member(&mut self, role: Role, account: &Address, sender: &Address) -> bool {
        let removed = self
            .roles
            .get_mut(&role)
            .map(|data| data.members.swap_remove(account))
            .unwrap_or(false);

        if removed && log::log_enabled!(log::Level::Debug) {
            debug!(
                "Role {} revoked from {} by {}",
                role,
                hex::encode(account),
                hex::encode(sender)
            );
        }
        removed
    }

    /// Number of accounts holding `role`
    pub fn get_role_member_count(&self, role: Role) -> usize {
        self.roles
            .get(&role)
            .map(|data| data.members.len())
            .unwrap_or(0)
    }

    /// Member of `role` at `index`
    ///
    /// Ordering is not stable across revocations.
    pub fn get_role_member(&self, role: Role, index: usize) -> TokenResult<Address> {
        self.roles
            .get(&role)
            .and_then(|data| data.members.get_index(index))
            .copied()
            .ok_or(TokenError::RoleMemberNotFound { role, index })
    }

    /// All members of `role`
    pub fn members(&self, role: Role) -> impl Iterator<Item = &Address> {
        self.roles
            .get(&role)
            .map(|data| data.members.iter())
            .into_iter()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPLOYER: Address = [1u8; 32];
    const ALICE: Address = [2u8; 32];
    const BOB: Address = [3u8; 32];

    #[test]
    fn test_role_ids() {
        assert_eq!(Role::Admin.id(), DEFAULT_ADMIN_ROLE);
        // keccak256("MINTER_ROLE")
        assert_eq!(
            hex::encode(Role::Minter.id()),
            "9f2df0fed2c77648de5860a4cc508cd0818c85b8b8a1ab4ceeef8d981c8956a6"
        );
        for role in Role::iter() {
            assert_eq!(Role::from_id(&role.id()), Some(role));
        }
        assert_eq!(Role::from_id(&[0xff; 32]), None);
    }

    #[test]
    fn test_deployer_holds_every_role() {
        let gate = RoleGate::new(DEPLOYER).unwrap();
        for role in Role::iter() {
            assert!(gate.has_role(role, &DEPLOYER));
            assert_eq!(gate.get_role_member_count(role), 1);
            assert_eq!(gate.get_role_member(role, 0), Ok(DEPLOYER));
        }
        assert_eq!(RoleGate::new(ZERO_ADDRESS).err(), Some(TokenError::ZeroAddress));
    }

    #[test]
    fn test_grant_and_revoke_require_admin() {
        let mut gate = RoleGate::new(DEPLOYER).unwrap();

        assert_eq!(
            gate.grant_role(&ALICE, Role::Minter, &BOB),
            Err(TokenError::NotAuthorized {
                role: Role::Admin,
                account: ALICE,
            })
        );
        assert!(!gate.has_role(Role::Minter, &BOB));

        assert_eq!(gate.grant_role(&DEPLOYER, Role::Minter, &ALICE), Ok(true));
        assert!(gate.has_role(Role::Minter, &ALICE));

        // Holding the role itself does not allow administering it
        assert!(gate.revoke_role(&ALICE, Role::Minter, &DEPLOYER).is_err());

        assert_eq!(gate.revoke_role(&DEPLOYER, Role::Minter, &ALICE), Ok(true));
        assert!(!gate.has_role(Role::Minter, &ALICE));
    }

    #[test]
    fn test_redundant_grant_and_revoke_are_noops() {
        let mut gate = RoleGate::new(DEPLOYER).unwrap();
        assert_eq!(gate.grant_role(&DEPLOYER, Role::Issuer, &DEPLOYER), Ok(false));
        assert_eq!(gate.revoke_role(&DEPLOYER, Role::Issuer, &BOB), Ok(false));
        assert_eq!(gate.get_role_member_count(Role::Issuer), 1);
        assert_eq!(
            gate.grant_role(&DEPLOYER, Role::Issuer, &ZERO_ADDRESS),
            Err(TokenError::ZeroAddress)
        );
    }

    #[test]
    fn test_renounce_role() {
        let mut gate = RoleGate::new(DEPLOYER).unwrap();
        gate.grant_role(&DEPLOYER, Role::Pauser, &ALICE).unwrap();

        assert!(gate.renounce_role(&ALICE, Role::Pauser));
        assert!(!gate.has_role(Role::Pauser, &ALICE));
        assert!(!gate.renounce_role(&ALICE, Role::Pauser));

        // Admin may renounce itself, leaving the role unadministered
        assert!(gate.renounce_role(&DEPLOYER, Role::Admin));
        assert!(gate.grant_role(&DEPLOYER, Role::Admin, &DEPLOYER).is_err());
    }

    #[test]
    fn test_per_role_admin() {
        let mut gate = RoleGate::new(DEPLOYER).unwrap();
        gate.grant_role(&DEPLOYER, Role::Issuer, &ALICE).unwrap();

        assert_eq!(
            gate.set_role_admin(&ALICE, Role::Burner, Role::Issuer),
            Err(TokenError::NotAuthorized {
                role: Role::Admin,
                account: ALICE,
            })
        );
        assert_eq!(
            gate.set_role_admin(&DEPLOYER, Role::Burner, Role::Issuer),
            Ok(Role::Admin)
        );
        assert_eq!(gate.get_role_admin(Role::Burner), Role::Issuer);

        // Issuers now administer burners
        assert_eq!(gate.grant_role(&ALICE, Role::Burner, &BOB), Ok(true));
        assert_eq!(gate.revoke_role(&ALICE, Role::Burner, &BOB), Ok(true));
    }

    #[test]
    fn test_member_enumeration_uses_swap_remove() {
        let mut gate = RoleGate::new(DEPLOYER).unwrap();
        gate.grant_role(&DEPLOYER, Role::Minter, &ALICE).unwrap();
        gate.grant_role(&DEPLOYER, Role::Minter, &BOB).unwrap();
        assert_eq!(gate.get_role_member_count(Role::Minter), 3);

        gate.revoke_role(&DEPLOYER, Role::Minter, &DEPLOYER).unwrap();
        assert_eq!(gate.get_role_member(Role::Minter, 0), Ok(BOB));
        assert_eq!(gate.get_role_member(Role::Minter, 1), Ok(ALICE));
        assert_eq!(
            gate.get_role_member(Role::Minter, 2),
            Err(TokenError::RoleMemberNotFound {
                role: Role::Minter,
                index: 2,
            })
        );
        assert_eq!(gate.members(Role::Minter).count(), 2);
    }
}
