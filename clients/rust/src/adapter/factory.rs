//! Deferred adapter construction.
//!
//! [`create_adapter`] captures backend secrets now; the client supplies the
//! chain, contract and indexer later. Backends are only constructible
//! through this path: [`ConstructionToken`] has no public constructor and
//! [`Backend`] is sealed.

use std::sync::Arc;

use super::{AdapterContext, MemejobAdapter};
use crate::address::LedgerAddress;
use crate::chains::Chain;
use crate::config::ExistenceCheck;
use crate::errors::MemejobResult;
use crate::mirror::IndexerClient;
use crate::reader::ContractReader;
use crate::types::OperationalMode;

/// Proof that construction goes through [`AdapterFactory`].
#[derive(Debug)]
pub struct ConstructionToken {
    _private: (),
}

/// A concrete adapter backend.
pub trait Backend: MemejobAdapter + Sized + 'static {
    type Params: Clone + std::fmt::Debug + Send + Sync + 'static;

    /// Mode asked for in the backend parameters, if any.
    fn requested_mode(params: &Self::Params) -> Option<OperationalMode>;

    fn construct(
        token: ConstructionToken,
        ctx: AdapterContext,
        params: Self::Params,
    ) -> MemejobResult<Self>;
}

/// Context supplied by the client at build time.
#[derive(Clone)]
pub struct SharedParams {
    pub chain: Chain,
    pub contract_id: LedgerAddress,
    pub indexer: IndexerClient,
    pub reader: Arc<dyn ContractReader>,
    pub existence_check: ExistenceCheck,
}

/// Build-time settings that take precedence over the backend parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterOverrides {
    pub operational_mode: Option<OperationalMode>,
}

/// Deferred constructor for backend `B`.
pub struct AdapterFactory<B: Backend> {
    params: B::Params,
}

impl<B: Backend> std::fmt::Debug for AdapterFactory<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterFactory")
            .field("backend", &std::any::type_name::<B>())
            .field("params", &self.params)
            .finish()
    }
}

impl<B: Backend> Clone for AdapterFactory<B> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
        }
    }
}

/// Capture backend parameters for later construction.
///
/// ```ignore
/// let factory = create_adapter::<NativeAdapter>(NativeParams::with_client(client));
/// let client = MemejobClient::new(&factory, config)?;
/// ```
pub fn create_adapter<B: Backend>(params: B::Params) -> AdapterFactory<B> {
    AdapterFactory { params }
}

impl<B: Backend> AdapterFactory<B> {
    /// Build the adapter. The operational mode resolves as
    /// override, then backend parameters, then [`OperationalMode::ReturnResult`].
    pub fn build(&self, shared: SharedParams, overrides: AdapterOverrides) -> MemejobResult<B> {
        let mode = overrides
            .operational_mode
            .or_else(|| B::requested_mode(&self.params))
            .unwrap_or_default();

        let ctx = AdapterContext {
            chain: shared.chain,
            contract_id: shared.contract_id,
            indexer: shared.indexer,
            reader: shared.reader,
            mode,
            existence_check: shared.existence_check,
        };

        B::construct(ConstructionToken { _private: () }, ctx, self.params.clone())
    }
}

/// Object-safe view of [`AdapterFactory`] used by the client.
pub trait AdapterBuilder: Send + Sync {
    fn build_adapter(
        &self,
        shared: SharedParams,
        overrides: AdapterOverrides,
    ) -> MemejobResult<Arc<dyn MemejobAdapter>>;
}

impl<B: Backend> AdapterBuilder for AdapterFactory<B> {
    fn build_adapter(
        &self,
        shared: SharedParams,
        overrides: AdapterOverrides,
    ) -> MemejobResult<Arc<dyn MemejobAdapter>> {
        Ok(Arc::new(self.build(shared, overrides)?))
    }
}
