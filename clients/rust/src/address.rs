//! Ledger identifiers and their EVM address form.
//!
//! Hedera entities are addressed natively as `shard.realm.num` triplets.
//! Every triplet also has a "long-zero" 20-byte EVM address (4 bytes of
//! shard, 8 of realm, 8 of num). Entities created through the EVM usually
//! carry a real EVM address instead, which cannot be mapped back to a
//! triplet without asking the network.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;

use crate::errors::MemejobError;

/// Number of leading zero bytes that mark a long-zero EVM address.
const LONG_ZERO_PREFIX_LEN: usize = 5;

/// A native `shard.realm.num` entity id (account, token or contract).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl EntityId {
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }

    /// Long-zero EVM address of this entity.
    pub fn to_evm_address(&self) -> Address {
        let mut bytes = [0u8; 20];
        bytes[0..4].copy_from_slice(&(self.shard as u32).to_be_bytes());
        bytes[4..12].copy_from_slice(&self.realm.to_be_bytes());
        bytes[12..20].copy_from_slice(&self.num.to_be_bytes());
        Address::from(bytes)
    }

    /// Recover a triplet from a long-zero EVM address.
    ///
    /// Returns `None` for genuine EVM addresses, which have no fixed triplet.
    pub fn from_long_zero(address: &Address) -> Option<Self> {
        if !is_long_zero(address) {
            return None;
        }
        let bytes = address.as_slice();
        let mut shard = [0u8; 4];
        let mut realm = [0u8; 8];
        let mut num = [0u8; 8];
        shard.copy_from_slice(&bytes[0..4]);
        realm.copy_from_slice(&bytes[4..12]);
        num.copy_from_slice(&bytes[12..20]);
        Some(Self::new(
            u32::from_be_bytes(shard) as u64,
            u64::from_be_bytes(realm),
            u64::from_be_bytes(num),
        ))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for EntityId {
    type Err = MemejobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MemejobError::InvalidInput(format!("invalid entity id: {s}"));

        let mut parts = s.trim().split('.');
        let (Some(shard), Some(realm), Some(num), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        Ok(Self::new(
            shard.parse().map_err(|_| invalid())?,
            realm.parse().map_err(|_| invalid())?,
            num.parse().map_err(|_| invalid())?,
        ))
    }
}

/// An identifier expressed in either address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerAddress {
    /// `shard.realm.num` triplet.
    Native(EntityId),
    /// 20-byte EVM address.
    Evm(Address),
}

impl LedgerAddress {
    /// The native triplet, if this identifier has one without a network lookup.
    pub fn entity_id(&self) -> Option<EntityId> {
        match self {
            LedgerAddress::Native(id) => Some(*id),
            LedgerAddress::Evm(address) => EntityId::from_long_zero(address),
        }
    }
}

impl From<EntityId> for LedgerAddress {
    fn from(id: EntityId) -> Self {
        LedgerAddress::Native(id)
    }
}

impl From<Address> for LedgerAddress {
    fn from(address: Address) -> Self {
        LedgerAddress::Evm(address)
    }
}

impl fmt::Display for LedgerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerAddress::Native(id) => id.fmt(f),
            LedgerAddress::Evm(address) => write!(f, "{address:#x}"),
        }
    }
}

impl FromStr for LedgerAddress {
    type Err = MemejobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("0x") || s.starts_with("0X") {
            let address = s
                .parse::<Address>()
                .map_err(|e| MemejobError::InvalidInput(format!("invalid EVM address {s}: {e}")))?;
            Ok(LedgerAddress::Evm(address))
        } else {
            Ok(LedgerAddress::Native(s.parse()?))
        }
    }
}

/// Derive the 20-byte EVM form of an identifier.
pub fn to_evm_address(id: &LedgerAddress) -> Address {
    match id {
        LedgerAddress::Native(entity) => entity.to_evm_address(),
        LedgerAddress::Evm(address) => *address,
    }
}

/// True iff the identifier has a genuine EVM address, i.e. not the
/// long-zero form the ledger assigns to triplets by default.
pub fn is_evm_address(id: &LedgerAddress) -> bool {
    !is_long_zero(&to_evm_address(id))
}

/// True iff the identifier's string form is a `shard.realm.num` triplet.
pub fn is_native_address(id: &LedgerAddress) -> bool {
    id.to_string().parse::<EntityId>().is_ok()
}

fn is_long_zero(address: &Address) -> bool {
    address.as_slice()[..LONG_ZERO_PREFIX_LEN]
        .iter()
        .all(|b| *b == 0)
}
