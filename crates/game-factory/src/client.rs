//! The chain access the routine depends on.

use alloy_primitives::{Address, Bytes, Log, B256, U256};

use crate::{find_game_created, ChainError};

/// A call from the signer to a contract, shared by simulation, estimation and submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    /// Sender, always the signing account.
    pub from: Address,
    /// Target contract.
    pub to: Address,
    /// ABI-encoded calldata.
    pub input: Bytes,
}

/// The parts of a mined transaction's receipt the routine reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedReceipt {
    /// Hash of the mined transaction.
    pub tx_hash: B256,
    /// Block the transaction was included in.
    pub block_number: Option<u64>,
    /// Gas consumed by the transaction.
    pub gas_used: u64,
    /// Whether execution succeeded.
    pub success: bool,
    /// Emitted logs, in order.
    pub logs: Vec<Log>,
}

impl ConfirmedReceipt {
    /// Address of the game announced by the first `GameCreated` log, if any.
    pub fn game_address(&self) -> Option<Address> {
        find_game_created(&self.logs)
    }
}

/// Remote ledger access with a signing account attached.
///
/// Every method is one network round trip. Implementations must not retry.
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    /// Address of the signing account.
    fn signer(&self) -> Address;

    /// Deployed code at `address`, empty if none.
    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError>;

    /// Native balance of `address` in wei.
    async fn balance_of(&self, address: Address) -> Result<U256, ChainError>;

    /// Executes `request` read-only against the latest state and returns its output.
    async fn call(&self, request: &CallRequest) -> Result<Bytes, ChainError>;

    /// Estimates the gas `request` would consume.
    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, ChainError>;

    /// Signs and broadcasts `request` with the given gas limit, returning the transaction hash.
    async fn send(&self, request: &CallRequest, gas_limit: u64) -> Result<B256, ChainError>;

    /// Blocks until `tx_hash` is mined and returns its receipt.
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<ConfirmedReceipt, ChainError>;
}
