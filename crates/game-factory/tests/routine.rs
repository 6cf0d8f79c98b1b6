//! Tests for the game creation routine against a scripted chain client.

use std::{
    io,
    sync::{Arc, Mutex},
};

use alloy_primitives::{address, keccak256, Address, Bytes, Log, LogData, B256, U256};
use alloy_sol_types::{Revert, SolCall, SolError};
use game_factory::{
    encode_create_game, CallRequest, ChainClient, ChainError, ConfirmedReceipt, GameCreationRoutine,
    GameEvent, GasLimitPolicy, RevertDecoder, RoutineConfig, RoutineError, Salt, Step,
    GAME_CREATED_TOPIC,
};

const FACTORY: Address = address!("0x85E433c027F2438375ce9eBA1C42A8CFFDC2CA5c");
const SIGNER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
const GAME: Address = address!("0x1000000000000000000000000000000000000001");
const TX_HASH: B256 = B256::repeat_byte(0xaa);

/// `getGameAddress(bytes32)` selector.
const GET_GAME_ADDRESS: [u8; 4] = game_factory::IGameFactory::getGameAddressCall::SELECTOR;

/// A chain client that answers from a script and records every call it receives.
struct MockChain {
    code: Result<Bytes, ChainError>,
    balance: Result<U256, ChainError>,
    prediction: Result<Bytes, ChainError>,
    simulation: Result<Bytes, ChainError>,
    estimate: Result<u64, ChainError>,
    send: Result<B256, ChainError>,
    receipt: Result<ConfirmedReceipt, ChainError>,
    calls: Mutex<Vec<&'static str>>,
    sent: Mutex<Vec<(CallRequest, u64)>>,
    simulated: Mutex<Vec<CallRequest>>,
    estimated: Mutex<Vec<CallRequest>>,
}

impl MockChain {
    fn healthy() -> Self {
        Self {
            code: Ok(Bytes::from_static(&[0x60, 0x80, 0x60, 0x40])),
            balance: Ok(U256::from(10u128.pow(18))),
            prediction: Ok(GAME.into_word().to_vec().into()),
            simulation: Ok(GAME.into_word().to_vec().into()),
            estimate: Ok(250_000),
            send: Ok(TX_HASH),
            receipt: Ok(receipt(true, vec![game_created_log(GAME)])),
            calls: Mutex::default(),
            sent: Mutex::default(),
            simulated: Mutex::default(),
            estimated: Mutex::default(),
        }
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn sent(&self) -> Vec<(CallRequest, u64)> {
        self.sent.lock().unwrap().clone()
    }
}

impl ChainClient for MockChain {
    fn signer(&self) -> Address {
        SIGNER
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError> {
        assert_eq!(address, FACTORY);
        self.record("code_at");
        self.code.clone()
    }

    async fn balance_of(&self, address: Address) -> Result<U256, ChainError> {
        assert_eq!(address, SIGNER);
        self.record("balance_of");
        self.balance.clone()
    }

    async fn call(&self, request: &CallRequest) -> Result<Bytes, ChainError> {
        if request.input.starts_with(&GET_GAME_ADDRESS) {
            self.record("predict");
            return self.prediction.clone();
        }
        self.record("simulate");
        self.simulated.lock().unwrap().push(request.clone());
        self.simulation.clone()
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, ChainError> {
        self.record("estimate_gas");
        self.estimated.lock().unwrap().push(request.clone());
        self.estimate.clone()
    }

    async fn send(&self, request: &CallRequest, gas_limit: u64) -> Result<B256, ChainError> {
        self.record("send");
        self.sent.lock().unwrap().push((request.clone(), gas_limit));
        self.send.clone()
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<ConfirmedReceipt, ChainError> {
        assert_eq!(tx_hash, TX_HASH);
        self.record("wait_for_receipt");
        self.receipt.clone()
    }
}

fn receipt(success: bool, logs: Vec<Log>) -> ConfirmedReceipt {
    ConfirmedReceipt { tx_hash: TX_HASH, block_number: Some(42), gas_used: 180_000, success, logs }
}

fn game_created_log(game: Address) -> Log {
    Log {
        address: FACTORY,
        data: LogData::new_unchecked(vec![GAME_CREATED_TOPIC], game.into_word().to_vec().into()),
    }
}

fn reverted(data: Option<Vec<u8>>) -> ChainError {
    ChainError::Rpc {
        code: 3,
        message: "execution reverted".to_string(),
        revert_data: data.map(Bytes::from),
    }
}

/// Log sink shared with a `fmt` subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn routine(chain: MockChain) -> GameCreationRoutine<MockChain> {
    GameCreationRoutine::new(chain, RoutineConfig::default())
        .with_salt(Salt::from(B256::repeat_byte(0x5a)))
}

#[tokio::test]
async fn test_happy_path_reports_game_address() {
    let routine = routine(MockChain::healthy());
    let creation = routine.run().await.unwrap();

    assert_eq!(creation.game, GameEvent::Created(GAME));
    assert_eq!(creation.game_address(), Some(GAME));
    assert_eq!(creation.predicted_address, Some(GAME));
    assert_eq!(creation.estimated_gas, 250_000);
    assert_eq!(creation.gas_limit, 3_000_000);
    assert_eq!(creation.receipt.block_number, Some(42));
    assert_eq!(
        routine.client().calls(),
        vec![
            "code_at",
            "balance_of",
            "predict",
            "simulate",
            "estimate_gas",
            "send",
            "wait_for_receipt"
        ]
    );
}

#[tokio::test]
async fn test_same_calldata_is_simulated_estimated_and_sent() {
    let salt = Salt::from(B256::repeat_byte(0x5a));
    let routine = routine(MockChain::healthy());
    let creation = routine.run().await.unwrap();

    let chain = routine.client();
    let expected = CallRequest { from: SIGNER, to: FACTORY, input: encode_create_game(salt) };
    assert_eq!(creation.calldata, expected.input);
    assert_eq!(chain.simulated.lock().unwrap().as_slice(), &[expected.clone()]);
    assert_eq!(chain.estimated.lock().unwrap().as_slice(), &[expected.clone()]);
    assert_eq!(chain.sent(), vec![(expected, 3_000_000)]);
}

#[tokio::test]
async fn test_empty_code_aborts_before_any_other_call() {
    let chain = MockChain { code: Ok(Bytes::new()), ..MockChain::healthy() };
    let routine = routine(chain);

    let err = routine.run().await.unwrap_err();
    assert!(matches!(err, RoutineError::ContractNotDeployed { factory } if factory == FACTORY));
    assert!(err.is_aborted());
    assert_eq!(routine.client().calls(), vec!["code_at"]);
}

#[tokio::test]
async fn test_code_fetch_failure_aborts() {
    let chain = MockChain {
        code: Err(ChainError::Transport("connection refused".to_string())),
        ..MockChain::healthy()
    };
    let routine = routine(chain);

    let err = routine.run().await.unwrap_err();
    assert!(matches!(err, RoutineError::DeploymentCheck { .. }));
    assert_eq!(err.step(), Step::VerifyDeployed);
    assert_eq!(routine.client().calls(), vec!["code_at"]);
}

#[tokio::test]
async fn test_estimation_failure_never_submits() {
    let revert = Revert { reason: "game exists".to_string() }.abi_encode();
    let chain = MockChain { estimate: Err(reverted(Some(revert))), ..MockChain::healthy() };
    let routine = routine(chain);

    let err = routine.run().await.unwrap_err();
    match &err {
        RoutineError::EstimationFailed { revert_reason, .. } => {
            assert!(revert_reason.as_deref().unwrap().contains("game exists"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_aborted());
    assert!(routine.client().sent().is_empty());
    assert!(!routine.client().calls().contains(&"send"));
}

#[tokio::test]
async fn test_estimation_failure_falls_back_to_node_message() {
    let chain = MockChain { estimate: Err(reverted(None)), ..MockChain::healthy() };
    let err = routine(chain).run().await.unwrap_err();
    assert_eq!(err.reason(), Some("execution reverted"));
    assert_eq!(err.code(), Some(3));
}

#[tokio::test]
async fn test_simulation_failure_still_submits() {
    let chain = MockChain {
        simulation: Err(reverted(Some(vec![0xde, 0xad, 0xbe, 0xef]))),
        ..MockChain::healthy()
    };
    let routine = routine(chain);

    let creation = routine.run().await.unwrap();
    assert_eq!(creation.game_address(), Some(GAME));
    assert_eq!(routine.client().sent().len(), 1);
}

#[tokio::test]
async fn test_simulation_failure_logs_decoded_custom_error() {
    let abi = r#"[{"type":"error","name":"GameAlreadyExists","inputs":[{"name":"game","type":"address"}]}]"#;
    let mut data = keccak256("GameAlreadyExists(address)")[..4].to_vec();
    data.extend_from_slice(GAME.into_word().as_slice());

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let chain = MockChain { simulation: Err(reverted(Some(data))), ..MockChain::healthy() };
    let routine = routine(chain).with_decoder(RevertDecoder::from_json(abi).unwrap());

    assert!(routine.run().await.is_ok());
    assert_eq!(routine.client().sent().len(), 1);

    let output = logs.contents();
    assert!(output.contains("Decoded error"), "{output}");
    assert!(
        output.contains("reason=GameAlreadyExists(0x1000000000000000000000000000000000000001)"),
        "{output}"
    );
}

#[tokio::test]
async fn test_advisory_failures_are_swallowed() {
    let chain = MockChain {
        balance: Err(ChainError::Transport("timeout".to_string())),
        prediction: Err(reverted(None)),
        ..MockChain::healthy()
    };
    let routine = routine(chain);

    let creation = routine.run().await.unwrap();
    assert_eq!(creation.predicted_address, None);
    assert_eq!(creation.game_address(), Some(GAME));
}

#[tokio::test]
async fn test_undecodable_prediction_is_advisory() {
    let chain = MockChain { prediction: Ok(Bytes::from_static(&[1, 2, 3])), ..MockChain::healthy() };
    let creation = routine(chain).run().await.unwrap();
    assert_eq!(creation.predicted_address, None);
}

#[tokio::test]
async fn test_missing_event_is_done_not_error() {
    let unrelated = Log {
        address: FACTORY,
        data: LogData::new_unchecked(vec![B256::repeat_byte(1)], Bytes::new()),
    };
    let chain = MockChain { receipt: Ok(receipt(true, vec![unrelated])), ..MockChain::healthy() };

    let creation = routine(chain).run().await.unwrap();
    assert_eq!(creation.game, GameEvent::NotFound);
    assert_eq!(creation.game_address(), None);
}

#[tokio::test]
async fn test_truncated_first_event_is_not_found() {
    let truncated = Log {
        address: FACTORY,
        data: LogData::new_unchecked(vec![GAME_CREATED_TOPIC], Bytes::from_static(&[0; 20])),
    };
    let chain = MockChain {
        receipt: Ok(receipt(true, vec![truncated, game_created_log(GAME)])),
        ..MockChain::healthy()
    };

    let creation = routine(chain).run().await.unwrap();
    assert_eq!(creation.game, GameEvent::NotFound);
}

#[tokio::test]
async fn test_submission_failure_carries_payload() {
    let chain = MockChain {
        send: Err(ChainError::Rpc {
            code: -32000,
            message: "insufficient funds for gas * price + value".to_string(),
            revert_data: None,
        }),
        ..MockChain::healthy()
    };
    let routine = routine(chain);

    let err = routine.run().await.unwrap_err();
    assert!(!err.is_aborted());
    assert_eq!(err.step(), Step::Submit);
    assert_eq!(err.code(), Some(-32000));
    assert_eq!(err.transaction().map(|tx| tx.to), Some(FACTORY));
    assert!(!routine.client().calls().contains(&"wait_for_receipt"));
}

#[tokio::test]
async fn test_confirmation_failure() {
    let chain = MockChain {
        receipt: Err(ChainError::Confirmation("timed out".to_string())),
        ..MockChain::healthy()
    };
    let err = routine(chain).run().await.unwrap_err();
    assert!(
        matches!(err, RoutineError::ConfirmationFailed { tx_hash, .. } if tx_hash == TX_HASH)
    );
}

#[tokio::test]
async fn test_reverted_transaction_exposes_receipt() {
    let chain = MockChain { receipt: Ok(receipt(false, vec![])), ..MockChain::healthy() };
    let err = routine(chain).run().await.unwrap_err();
    assert_eq!(err.receipt().map(|r| r.tx_hash), Some(TX_HASH));
    assert_eq!(err.step(), Step::AwaitConfirmation);
}

#[tokio::test]
async fn test_margin_policy_scales_estimate() {
    let config = RoutineConfig {
        gas_limit: GasLimitPolicy::Margin { percent: 20 },
        ..RoutineConfig::default()
    };
    let routine = GameCreationRoutine::new(MockChain::healthy(), config);

    let creation = routine.run().await.unwrap();
    assert_eq!(creation.gas_limit, 300_000);
    assert_eq!(routine.client().sent()[0].1, 300_000);
}

#[tokio::test]
async fn test_random_salt_is_used_when_none_given() {
    let routine = GameCreationRoutine::new(MockChain::healthy(), RoutineConfig::default());
    let creation = routine.run().await.unwrap();
    assert_eq!(creation.calldata, encode_create_game(creation.salt));
}
