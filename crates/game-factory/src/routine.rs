//! The game creation routine.

use alloy_primitives::{utils::format_ether, Address, Bytes};
use tracing::{debug, error, info, warn};

use crate::{
    constants::{DEFAULT_CURRENCY, DEFAULT_FACTORY_ADDRESS},
    decode_create_game_output, decode_game_address, encode_create_game, encode_get_game_address,
    CallRequest, ChainClient, ChainError, ConfirmedReceipt, FailurePolicy, GasLimitPolicy,
    RevertDecoder, RoutineError, Salt, Step,
};

/// Settings of a game creation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineConfig {
    /// Address of the `GameFactory` contract.
    pub factory: Address,
    /// How the submitted gas limit is chosen.
    pub gas_limit: GasLimitPolicy,
    /// Symbol printed next to the signer balance.
    pub currency: String,
}

impl Default for RoutineConfig {
    fn default() -> Self {
        Self {
            factory: DEFAULT_FACTORY_ADDRESS,
            gas_limit: GasLimitPolicy::default(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// Whether the receipt announced the new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A `GameCreated` log carried the game address.
    Created(Address),
    /// The transaction succeeded but no `GameCreated` log was found.
    NotFound,
}

/// Result of a completed routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameCreation {
    /// Salt the game was created with.
    pub salt: Salt,
    /// Address reported by `getGameAddress`, if the query succeeded.
    pub predicted_address: Option<Address>,
    /// The `createGame` calldata that was simulated, estimated and submitted.
    pub calldata: Bytes,
    /// Gas estimate returned by the node.
    pub estimated_gas: u64,
    /// Gas limit attached to the transaction.
    pub gas_limit: u64,
    /// Receipt of the mined transaction.
    pub receipt: ConfirmedReceipt,
    /// Outcome of the event scan.
    pub game: GameEvent,
}

impl GameCreation {
    /// Address of the created game, if the event was found.
    pub const fn game_address(&self) -> Option<Address> {
        match self.game {
            GameEvent::Created(address) => Some(address),
            GameEvent::NotFound => None,
        }
    }
}

/// One attempt to create a game through the factory.
///
/// The routine runs its [`Step`]s strictly in order and never has two requests in flight. What a
/// failed step does follows [`Step::policy`]: advisory steps are logged and skipped, gating steps
/// abort before submission, and submission or confirmation failures are returned to the caller.
#[derive(Debug)]
pub struct GameCreationRoutine<C> {
    client: C,
    config: RoutineConfig,
    decoder: RevertDecoder,
    salt: Option<Salt>,
}

impl<C: ChainClient> GameCreationRoutine<C> {
    /// Creates a routine over `client`.
    pub fn new(client: C, config: RoutineConfig) -> Self {
        Self { client, config, decoder: RevertDecoder::new(), salt: None }
    }

    /// Uses `decoder` to explain reverts from simulation and estimation.
    pub fn with_decoder(mut self, decoder: RevertDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Uses `salt` instead of drawing a random one.
    pub const fn with_salt(mut self, salt: Salt) -> Self {
        self.salt = Some(salt);
        self
    }

    /// The underlying chain client.
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Runs the routine to completion.
    pub async fn run(&self) -> Result<GameCreation, RoutineError> {
        let factory = self.config.factory;
        let signer = self.client.signer();
        info!(%factory, %signer, "Creating game");

        enter(Step::VerifyDeployed);
        let code = self.client.code_at(factory).await;
        let code = self.gate(Step::VerifyDeployed, code, |source| {
            RoutineError::DeploymentCheck { factory, source }
        })?;
        if code.is_empty() {
            error!(%factory, "GameFactory contract is not deployed at the specified address");
            return Err(RoutineError::ContractNotDeployed { factory });
        }
        info!(code_size = code.len(), "Contract is deployed at the specified address");

        enter(Step::CheckBalance);
        let balance = self.client.balance_of(signer).await;
        if let Some(balance) = self.advisory(Step::CheckBalance, balance) {
            info!("Account balance: {} {}", format_ether(balance), self.config.currency);
        }

        enter(Step::GenerateSalt);
        let salt = self.salt.unwrap_or_else(Salt::random);
        info!(%salt, "Generated salt");

        enter(Step::PredictAddress);
        let predicted_address =
            self.advisory(Step::PredictAddress, self.predict_game_address(signer, salt).await);
        if let Some(address) = predicted_address {
            info!(%address, "Predicted game address");
        }

        enter(Step::EncodeCall);
        let request = CallRequest { from: signer, to: factory, input: encode_create_game(salt) };
        info!(calldata = ?request.input, "Encoded function call data");

        enter(Step::Simulate);
        info!("Simulating transaction");
        let simulation = self.client.call(&request).await;
        match &simulation {
            Ok(output) => self.log_simulation_output(output),
            Err(err) => self.log_revert(err),
        }
        self.advisory(Step::Simulate, simulation);

        enter(Step::EstimateGas);
        info!("Estimating gas");
        let estimation = self.client.estimate_gas(&request).await;
        let revert_reason = estimation.as_ref().err().and_then(|err| self.explain(err));
        let estimated_gas = self.gate(Step::EstimateGas, estimation, |source| {
            error!(error = %source, reason = ?revert_reason, "Error estimating gas");
            RoutineError::EstimationFailed { source, revert_reason }
        })?;
        info!(gas = estimated_gas, "Estimated gas");

        let gas_limit = self.config.gas_limit.limit_for(estimated_gas);
        if GasLimitPolicy::is_below(gas_limit, estimated_gas) {
            warn!(gas_limit, estimated_gas, "Gas limit is below the estimate");
        }

        enter(Step::Submit);
        info!(gas_limit, "Creating game");
        let tx_hash = self.client.send(&request, gas_limit).await.map_err(|source| {
            RoutineError::SubmissionFailed { request: request.clone(), gas_limit, source }
        })?;
        info!(%tx_hash, "Transaction hash");

        enter(Step::AwaitConfirmation);
        let receipt = self
            .client
            .wait_for_receipt(tx_hash)
            .await
            .map_err(|source| RoutineError::ConfirmationFailed { tx_hash, source })?;
        if !receipt.success {
            return Err(RoutineError::Reverted { receipt });
        }
        info!(
            block_number = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "Transaction confirmed"
        );

        enter(Step::ScanEvent);
        let game = match receipt.game_address() {
            Some(address) => {
                info!(%address, "New game created");
                if predicted_address.is_some_and(|predicted| predicted != address) {
                    warn!(?predicted_address, %address, "Game address differs from prediction");
                }
                GameEvent::Created(address)
            }
            None => {
                warn!(%tx_hash, "GameCreated event not found in the transaction logs");
                GameEvent::NotFound
            }
        };

        Ok(GameCreation {
            salt,
            predicted_address,
            calldata: request.input,
            estimated_gas,
            gas_limit,
            receipt,
            game,
        })
    }

    async fn predict_game_address(
        &self,
        signer: Address,
        salt: Salt,
    ) -> Result<Address, ChainError> {
        let request = CallRequest {
            from: signer,
            to: self.config.factory,
            input: encode_get_game_address(salt),
        };
        let output = self.client.call(&request).await?;
        Ok(decode_game_address(&output)?)
    }

    fn log_simulation_output(&self, output: &Bytes) {
        match decode_create_game_output(output) {
            Ok(address) => info!(output = ?output, game = %address, "Simulation result"),
            Err(err) => info!(output = ?output, %err, "Simulation result (undecoded)"),
        }
    }

    fn log_revert(&self, err: &ChainError) {
        warn!(error = %err, "Error simulating transaction");
        if let Some(data) = err.revert_data() {
            match self.decoder.decode(data) {
                Some(reason) => warn!(%reason, "Decoded error"),
                None => warn!(data = ?data, "Could not decode error data"),
            }
        }
    }

    /// Best reason for a failed call: the decoded revert payload, else the node's message.
    fn explain(&self, err: &ChainError) -> Option<String> {
        err.revert_data()
            .and_then(|data| self.decoder.decode(data))
            .or_else(|| err.message().map(str::to_owned))
    }

    /// Result of an advisory step: a failure is logged and dropped.
    fn advisory<T>(&self, step: Step, result: Result<T, ChainError>) -> Option<T> {
        debug_assert_eq!(step.policy(), FailurePolicy::Advisory, "{step} is not advisory");
        result.inspect_err(|err| warn!(%step, error = %err, "Step failed, continuing")).ok()
    }

    /// Result of a gating step: a failure stops the routine with `abort(err)`.
    fn gate<T>(
        &self,
        step: Step,
        result: Result<T, ChainError>,
        abort: impl FnOnce(ChainError) -> RoutineError,
    ) -> Result<T, RoutineError> {
        debug_assert_eq!(step.policy(), FailurePolicy::Abort, "{step} is not a gate");
        result.map_err(abort)
    }
}

fn enter(step: Step) {
    debug!(%step, policy = ?step.policy(), "Entering step");
}
