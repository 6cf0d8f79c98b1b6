//! [`ChainClient`] over an alloy HTTP provider with a local signer.

use std::{fmt, time::Duration};

use alloy_json_rpc::RpcError;
use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::{
    DynProvider, PendingTransactionBuilder, PendingTransactionError, Provider, ProviderBuilder,
};
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use tracing::{debug, trace};

use crate::{
    constants::DEFAULT_CONFIRMATIONS, CallRequest, ChainClient, ChainError, ConfirmedReceipt,
};

/// JSON-RPC chain client that signs with a local private key.
#[derive(Clone)]
pub struct RpcChainClient {
    provider: DynProvider,
    signer: Address,
    confirmations: u64,
    timeout: Option<Duration>,
}

impl RpcChainClient {
    /// Connects to `rpc_url` over HTTP. No request is sent until the first call.
    pub fn connect(rpc_url: &str, signer: PrivateKeySigner) -> Result<Self, ChainError> {
        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(rpc_url.parse().map_err(|e| ChainError::InvalidUrl {
                url: rpc_url.to_string(),
                reason: format!("{e}"),
            })?)
            .erased();
        debug!(rpc = rpc_url, signer = %address, "Connected provider");

        Ok(Self {
            provider,
            signer: address,
            confirmations: DEFAULT_CONFIRMATIONS,
            timeout: None,
        })
    }

    /// Sets how many confirmations to wait for after submission.
    pub const fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// Gives up waiting for the receipt after `timeout`.
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcChainClient")
            .field("signer", &self.signer)
            .field("confirmations", &self.confirmations)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ChainClient for RpcChainClient {
    fn signer(&self) -> Address {
        self.signer
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError> {
        trace!(%address, "eth_getCode");
        Ok(self.provider.get_code_at(address).await?)
    }

    async fn balance_of(&self, address: Address) -> Result<U256, ChainError> {
        trace!(%address, "eth_getBalance");
        Ok(self.provider.get_balance(address).await?)
    }

    async fn call(&self, request: &CallRequest) -> Result<Bytes, ChainError> {
        trace!(to = %request.to, "eth_call");
        Ok(self.provider.call(transaction_request(request)).await?)
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, ChainError> {
        trace!(to = %request.to, "eth_estimateGas");
        Ok(self.provider.estimate_gas(transaction_request(request)).await?)
    }

    async fn send(&self, request: &CallRequest, gas_limit: u64) -> Result<B256, ChainError> {
        let tx = transaction_request(request).with_gas_limit(gas_limit);
        let pending = self.provider.send_transaction(tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<ConfirmedReceipt, ChainError> {
        debug!(
            %tx_hash,
            confirmations = self.confirmations,
            timeout = ?self.timeout,
            "Waiting for receipt"
        );
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .with_required_confirmations(self.confirmations)
            .with_timeout(self.timeout)
            .get_receipt()
            .await?;
        Ok(confirmed_receipt(&receipt))
    }
}

fn transaction_request(request: &CallRequest) -> TransactionRequest {
    TransactionRequest::default()
        .with_from(request.from)
        .with_to(request.to)
        .with_input(request.input.clone())
}

fn confirmed_receipt(receipt: &TransactionReceipt) -> ConfirmedReceipt {
    ConfirmedReceipt {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
        success: receipt.inner.status(),
        logs: receipt.inner.logs().iter().map(|log| log.inner.clone()).collect(),
    }
}

impl From<TransportError> for ChainError {
    fn from(err: TransportError) -> Self {
        match err {
            RpcError::ErrorResp(payload) => Self::Rpc {
                code: payload.code,
                message: payload.message.to_string(),
                revert_data: payload.as_revert_data(),
            },
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<PendingTransactionError> for ChainError {
    fn from(err: PendingTransactionError) -> Self {
        match err {
            PendingTransactionError::TransportError(err) => err.into(),
            other => Self::Confirmation(other.to_string()),
        }
    }
}
