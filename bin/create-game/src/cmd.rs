use std::{path::PathBuf, time::Duration};

use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use clap::Parser;
use game_factory::{
    constants::{
        DEFAULT_CONFIRMATIONS, DEFAULT_CURRENCY, DEFAULT_FACTORY_ADDRESS, DEFAULT_GAS_LIMIT,
        DEFAULT_RPC_URL,
    },
    ArtifactError, ChainError, GameCreation, GameCreationRoutine, GameEvent, GasLimitPolicy,
    RevertDecoder, RoutineConfig, RoutineError, RpcChainClient,
};
use tracing::{error, info};

use crate::LogArgs;

/// Create a new game through the `GameFactory` contract
#[derive(Parser, Debug)]
#[command(name = "create-game", version)]
pub struct Cmd {
    /// JSON-RPC endpoint of the chain
    #[arg(long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc: String,

    /// Private key of the signing account
    #[arg(long = "private-key", env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: PrivateKeySigner,

    /// Address of the `GameFactory` contract
    #[arg(long, env = "GAME_FACTORY_ADDRESS", default_value_t = DEFAULT_FACTORY_ADDRESS)]
    pub factory: Address,

    /// Foundry artifact or ABI JSON of the factory, used to decode custom revert errors
    #[arg(long, env = "GAME_FACTORY_ABI")]
    pub abi: Option<PathBuf>,

    /// Gas limit attached to the `createGame` transaction
    #[arg(long = "gas-limit", default_value_t = DEFAULT_GAS_LIMIT)]
    pub gas_limit: u64,

    /// Use the gas estimate plus this many percent instead of the fixed gas limit
    #[arg(long = "gas-margin")]
    pub gas_margin: Option<u64>,

    /// Number of confirmations to wait for
    #[arg(long, default_value_t = DEFAULT_CONFIRMATIONS)]
    pub confirmations: u64,

    /// Give up waiting for the receipt after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Currency symbol printed next to the account balance
    #[arg(long, default_value = DEFAULT_CURRENCY)]
    pub currency: String,

    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,
}

/// Error types for the create-game command
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The factory ABI could not be loaded
    #[error("{0}")]
    Artifact(#[from] ArtifactError),

    /// The provider could not be set up
    #[error("{0}")]
    Chain(#[from] ChainError),

    /// The routine stopped before a game was created
    #[error("{0}")]
    Routine(#[from] RoutineError),
}

impl Error {
    /// Logs the fields of a routine failure that the display message leaves out.
    pub fn log_details(&self) {
        let Self::Routine(err) = self else { return };
        error!(step = %err.step(), aborted = err.is_aborted(), "Routine stopped");
        if let Some(reason) = err.reason() {
            error!(reason, "Error reason");
        }
        if let Some(code) = err.code() {
            error!(code, "Error code");
        }
        if let Some(tx) = err.transaction() {
            error!(from = %tx.from, to = %tx.to, data = ?tx.input, "Transaction");
        }
        if let Some(receipt) = err.receipt() {
            error!(
                tx_hash = %receipt.tx_hash,
                block_number = ?receipt.block_number,
                gas_used = receipt.gas_used,
                "Transaction receipt"
            );
        }
    }
}

impl Cmd {
    /// Gas limit policy selected by `--gas-limit` and `--gas-margin`.
    pub const fn gas_policy(&self) -> GasLimitPolicy {
        match self.gas_margin {
            Some(percent) => GasLimitPolicy::Margin { percent },
            None => GasLimitPolicy::Fixed(self.gas_limit),
        }
    }

    /// Routine settings taken from the command line.
    pub fn routine_config(&self) -> RoutineConfig {
        RoutineConfig {
            factory: self.factory,
            gas_limit: self.gas_policy(),
            currency: self.currency.clone(),
        }
    }

    /// Revert decoder, extended with the factory ABI when `--abi` is given.
    pub fn decoder(&self) -> Result<RevertDecoder, ArtifactError> {
        match &self.abi {
            Some(path) => RevertDecoder::load(path),
            None => Ok(RevertDecoder::new()),
        }
    }

    /// Execute the command
    pub async fn run(&self) -> Result<GameCreation, Error> {
        let decoder = self.decoder()?;
        let client = RpcChainClient::connect(&self.rpc, self.private_key.clone())?
            .with_confirmations(self.confirmations)
            .with_timeout(self.timeout.map(Duration::from_secs));
        info!(rpc = %self.rpc, "Using RPC endpoint");

        let creation = GameCreationRoutine::new(client, self.routine_config())
            .with_decoder(decoder)
            .run()
            .await?;

        match creation.game {
            GameEvent::Created(address) => println!("New game created at address: {address}"),
            GameEvent::NotFound => println!("GameCreated event not found in the transaction logs"),
        }
        Ok(creation)
    }
}
