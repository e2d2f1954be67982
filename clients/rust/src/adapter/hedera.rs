//! Hedera SDK implementation of the native ledger seam.
//!
//! [`HederaLedger`] maps [`NativeTransaction`] values onto the SDK's
//! transaction builders. With an operator it signs and submits them; without
//! one it only freezes them into the SDK's unsigned wire encoding.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use hedera::{
    AccountAllowanceApproveTransaction, AccountId, Client, ContractExecuteTransaction, ContractId,
    Hbar, PrivateKey, TokenAssociateTransaction, TokenId, TransactionId, TransactionReceiptQuery,
};
use tokio::sync::OnceCell;

use super::native::{LedgerClient, LedgerConnector, NativeTransaction, Operator, TransactionBody};
use crate::address::EntityId;
use crate::chains::{Chain, Network};
use crate::errors::{MemejobError, MemejobResult};

/// One of the SDK builders a [`NativeTransaction`] maps onto.
enum SdkTransaction {
    ContractExecute(ContractExecuteTransaction),
    AllowanceApprove(AccountAllowanceApproveTransaction),
    TokenAssociate(TokenAssociateTransaction),
}

/// Run the same code against whichever builder `$sdk` holds.
macro_rules! with_sdk_transaction {
    ($sdk:expr, $tx:ident => $body:expr) => {
        match $sdk {
            SdkTransaction::ContractExecute($tx) => $body,
            SdkTransaction::AllowanceApprove($tx) => $body,
            SdkTransaction::TokenAssociate($tx) => $body,
        }
    };
}

/// Operator account and signing key.
#[derive(Clone)]
struct Signer {
    entity_id: EntityId,
    account_id: AccountId,
    key: PrivateKey,
}

/// [`LedgerClient`] over a Hedera SDK client for mainnet or testnet.
///
/// The SDK client is created on first use, inside the caller's runtime.
pub struct HederaLedger {
    network: Network,
    signer: Option<Signer>,
    client: OnceCell<Client>,
}

impl fmt::Debug for HederaLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HederaLedger")
            .field("network", &self.network)
            .field("operator", &self.signer.as_ref().map(|s| s.entity_id))
            .finish()
    }
}

impl HederaLedger {
    /// Client without an operator. It can only freeze unsigned transactions.
    pub fn for_chain(chain: &Chain) -> MemejobResult<Self> {
        let network = Network::from_chain_id(chain.id).ok_or_else(|| {
            MemejobError::invalid_config(format!("Unsupported chain: {}", chain.id))
        })?;

        Ok(Self {
            network,
            signer: None,
            client: OnceCell::new(),
        })
    }

    /// Client that signs and pays with `operator`.
    pub fn with_operator(chain: &Chain, operator: &Operator) -> MemejobResult<Self> {
        let key = PrivateKey::from_str(operator.private_key.trim())
            .map_err(|e| MemejobError::invalid_config(format!("invalid operator key: {e}")))?;
        let signer = Signer {
            entity_id: operator.account_id,
            account_id: sdk_id(operator.account_id)?,
            key,
        };

        Ok(Self {
            signer: Some(signer),
            ..Self::for_chain(chain)?
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    async fn client(&self) -> &Client {
        self.client
            .get_or_init(|| async {
                let client = match self.network {
                    Network::Mainnet => Client::for_mainnet(),
                    Network::Testnet => Client::for_testnet(),
                };
                if let Some(signer) = &self.signer {
                    client.set_operator(signer.account_id.clone(), signer.key.clone());
                }
                client
            })
            .await
    }

    /// Freeze `transaction` for its payer and return the unsigned wire bytes.
    ///
    /// Node accounts come from the network's address book; the transaction
    /// id is generated for the payer.
    pub async fn freeze(&self, transaction: &NativeTransaction) -> MemejobResult<Vec<u8>> {
        let payer = transaction
            .payer
            .ok_or(MemejobError::MissingField { field: "account_id" })?;
        let transaction_id = TransactionId::generate(sdk_id(payer)?);

        let mut sdk = SdkTransaction::build(transaction)?;
        let client = self.client().await;

        let bytes = with_sdk_transaction!(&mut sdk, tx => {
            tx.transaction_id(transaction_id);
            tx.freeze_with(client).map_err(ledger_error)?;
            tx.to_bytes().map_err(ledger_error)?
        });

        tracing::debug!(payer = %payer, len = bytes.len(), "Froze unsigned native transaction");
        Ok(bytes)
    }
}

#[async_trait]
impl LedgerClient for HederaLedger {
    fn operator_account_id(&self) -> Option<EntityId> {
        self.signer.as_ref().map(|signer| signer.entity_id)
    }

    async fn execute(&self, transaction: &NativeTransaction) -> MemejobResult<String> {
        if self.signer.is_none() {
            return Err(MemejobError::invalid_config("no operator configured"));
        }

        let mut sdk = SdkTransaction::build(transaction)?;
        let client = self.client().await;

        let response = with_sdk_transaction!(&mut sdk, tx => tx.execute(client).await)
            .map_err(ledger_error)?;

        Ok(response.transaction_id.to_string())
    }

    async fn get_receipt(&self, transaction_id: &str) -> MemejobResult<String> {
        let id = TransactionId::from_str(transaction_id).map_err(|e| {
            MemejobError::InvalidInput(format!("invalid transaction id {transaction_id}: {e}"))
        })?;
        let client = self.client().await;

        let receipt = TransactionReceiptQuery::new()
            .transaction_id(id)
            .execute(client)
            .await;

        match receipt {
            Ok(receipt) => Ok(receipt.status.as_str_name().to_string()),
            // A failed transaction still has a receipt; its status is the answer.
            Err(hedera::Error::ReceiptStatus { status, .. }) => Ok(status.as_str_name().to_string()),
            Err(e) => Err(ledger_error(e)),
        }
    }
}

/// [`LedgerConnector`] that builds a [`HederaLedger`] for the configured chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct HederaConnector;

impl LedgerConnector for HederaConnector {
    fn connect(&self, chain: &Chain, operator: &Operator) -> MemejobResult<Arc<dyn LedgerClient>> {
        Ok(Arc::new(HederaLedger::with_operator(chain, operator)?))
    }
}

impl SdkTransaction {
    fn build(transaction: &NativeTransaction) -> MemejobResult<Self> {
        Ok(match &transaction.body {
            TransactionBody::ContractExecute {
                contract_id,
                gas,
                payable_tinybars,
                function_parameters,
            } => {
                let payable = i64::try_from(*payable_tinybars).map_err(|_| {
                    MemejobError::InvalidInput(format!(
                        "payable amount {payable_tinybars} exceeds the tinybar range"
                    ))
                })?;

                let mut tx = ContractExecuteTransaction::new();
                tx.contract_id(sdk_id::<ContractId>(*contract_id)?)
                    .gas(*gas)
                    .payable_amount(Hbar::from_tinybars(payable))
                    .function_parameters(function_parameters.clone());
                SdkTransaction::ContractExecute(tx)
            }
            TransactionBody::AllowanceApprove {
                owner,
                spender,
                allowances,
            } => {
                let owner: AccountId = sdk_id(*owner)?;
                let spender: AccountId = sdk_id(*spender)?;

                let mut tx = AccountAllowanceApproveTransaction::new();
                for allowance in allowances {
                    tx.approve_token_allowance(
                        sdk_id::<TokenId>(allowance.token_id)?,
                        owner.clone(),
                        spender.clone(),
                        allowance.amount,
                    );
                }
                SdkTransaction::AllowanceApprove(tx)
            }
            TransactionBody::TokenAssociate {
                account_id,
                token_ids,
            } => {
                let token_ids = token_ids
                    .iter()
                    .map(|id| sdk_id::<TokenId>(*id))
                    .collect::<MemejobResult<Vec<_>>>()?;

                let mut tx = TokenAssociateTransaction::new();
                tx.account_id(sdk_id(*account_id)?).token_ids(token_ids);
                SdkTransaction::TokenAssociate(tx)
            }
        })
    }
}

/// Convert an entity id to the SDK's id type for the same triplet.
fn sdk_id<T>(id: EntityId) -> MemejobResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    id.to_string()
        .parse()
        .map_err(|e| MemejobError::InvalidInput(format!("invalid entity id {id}: {e}")))
}

fn ledger_error(e: hedera::Error) -> MemejobError {
    match e {
        hedera::Error::TransactionPreCheckStatus { .. } => MemejobError::transaction_failed(e),
        e => MemejobError::rpc(e),
    }
}
