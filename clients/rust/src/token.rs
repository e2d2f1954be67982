//! Per-token operations bound to a client.

use alloy::primitives::{Address, U256};

use crate::address::{EntityId, LedgerAddress};
use crate::client::MemejobClient;
use crate::constants::ZERO_ADDRESS;
use crate::errors::{MemejobError, MemejobResult};
use crate::types::{
    AllowanceEntry, AllowanceResult, AssociateResult, BuyConfig, BuyRequest, BuyResult,
    OperationalMode, Outcome, SellConfig, SellRequest, SellResult,
};

/// A token registered on the bonding curve.
///
/// Obtained from [`MemejobClient::get_token`] or
/// [`MemejobClient::create_token`].
#[derive(Debug, Clone)]
pub struct MemejobToken {
    token_id: EntityId,
    client: MemejobClient,
}

impl MemejobToken {
    pub(crate) fn new(token_id: EntityId, client: MemejobClient) -> Self {
        Self { token_id, client }
    }

    pub fn token_id(&self) -> EntityId {
        self.token_id
    }

    /// EVM address of the token.
    pub fn address(&self) -> Address {
        self.token_id.to_evm_address()
    }

    /// Buy from the bonding curve, optionally associating first.
    ///
    /// `auto_associate` needs a submitting adapter; in bytes mode call
    /// [`MemejobToken::associate`] and sign its bytes separately.
    pub async fn buy(&self, config: BuyConfig) -> MemejobResult<Outcome<BuyResult>> {
        require_amount(config.amount)?;

        if config.auto_associate {
            self.require_submission("auto_associate")?;
            self.associate().await?;
        }

        self.client
            .adapter()
            .buy(BuyRequest {
                token: self.address(),
                amount: config.amount,
                referrer: config.referrer.unwrap_or(ZERO_ADDRESS),
            })
            .await
    }

    /// Sell to the bonding curve. `instant` approves the contract's
    /// allowance for `amount` first and, like `auto_associate`, is not
    /// available in bytes mode.
    pub async fn sell(&self, config: SellConfig) -> MemejobResult<Outcome<SellResult>> {
        require_amount(config.amount)?;

        if config.instant {
            self.require_submission("instant")?;
            self.approve_allowance(config.amount).await?;
        }

        self.client
            .adapter()
            .sell(SellRequest {
                token: self.address(),
                amount: config.amount,
            })
            .await
    }

    /// Allow the bonding-curve contract to move `amount` of this token.
    pub async fn approve_allowance(&self, amount: U256) -> MemejobResult<Outcome<Vec<AllowanceResult>>> {
        self.client
            .adapter()
            .approve_allowance(
                &[AllowanceEntry::new(self.token_id, amount)],
                self.client.contract_id(),
            )
            .await
    }

    /// Associate this token with the account.
    pub async fn associate(&self) -> MemejobResult<Outcome<Vec<AssociateResult>>> {
        self.client
            .adapter()
            .associate_tokens(&[LedgerAddress::Native(self.token_id)])
            .await
    }

    /// A prerequisite built in bytes mode would never reach the ledger.
    fn require_submission(&self, option: &str) -> MemejobResult<()> {
        if self.client.adapter().operational_mode() == OperationalMode::ReturnBytes {
            return Err(MemejobError::UnsupportedMode {
                message: format!(
                    "{option} submits a prerequisite transaction and is not available in bytes mode"
                ),
            });
        }
        Ok(())
    }

    /// Account balance in the token's smallest unit.
    pub async fn get_balance(&self) -> MemejobResult<U256> {
        self.client
            .adapter()
            .get_balance(&LedgerAddress::Native(self.token_id))
            .await
    }
}

fn require_amount(amount: U256) -> MemejobResult<()> {
    if amount.is_zero() {
        return Err(MemejobError::MissingField { field: "amount" });
    }
    Ok(())
}
