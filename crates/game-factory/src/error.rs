use alloy_primitives::{Address, Bytes, B256};

use crate::{CallRequest, ConfirmedReceipt, Step};

/// Error types for a single chain round trip
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// The node answered with a JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message reported by the node
        message: String,
        /// Revert payload carried in the error's `data` field, if any
        revert_data: Option<Bytes>,
    },

    /// Invalid RPC URL
    #[error("Invalid RPC URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// RPC transport error (connection, HTTP status, malformed response)
    #[error("RPC transport error: {0}")]
    Transport(String),

    /// The confirmation watcher failed or timed out
    #[error("Confirmation error: {0}")]
    Confirmation(String),

    /// Return data did not match the expected ABI
    #[error("ABI decode error: {0}")]
    Decode(String),
}

impl ChainError {
    /// JSON-RPC error code, if the node produced one.
    pub const fn code(&self) -> Option<i64> {
        match self {
            Self::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Revert payload returned alongside an RPC error.
    pub const fn revert_data(&self) -> Option<&Bytes> {
        match self {
            Self::Rpc { revert_data, .. } => revert_data.as_ref(),
            _ => None,
        }
    }

    /// Node-provided message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Rpc { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<alloy_sol_types::Error> for ChainError {
    fn from(err: alloy_sol_types::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Error types for the game creation routine
///
/// Each variant names the step that failed and carries only what that step produced.
#[derive(Debug, thiserror::Error)]
pub enum RoutineError {
    /// No code at the factory address
    #[error("GameFactory contract is not deployed at {factory}")]
    ContractNotDeployed {
        /// Address that was checked
        factory: Address,
    },

    /// Deployed code could not be fetched
    #[error("Failed to fetch code at {factory}: {source}")]
    DeploymentCheck {
        /// Address that was checked
        factory: Address,
        /// Underlying failure
        source: ChainError,
    },

    /// Gas estimation failed, which predicts an on-chain revert
    #[error("Gas estimation failed: {source}")]
    EstimationFailed {
        /// Underlying failure
        source: ChainError,
        /// Decoded revert reason, or the node's message when the payload is undecodable
        revert_reason: Option<String>,
    },

    /// The transaction could not be signed or broadcast
    #[error("Failed to submit transaction: {source}")]
    SubmissionFailed {
        /// The attempted call
        request: CallRequest,
        /// Gas limit attached to the attempt
        gas_limit: u64,
        /// Underlying failure
        source: ChainError,
    },

    /// The transaction was broadcast but no receipt was obtained
    #[error("Failed to confirm transaction {tx_hash}: {source}")]
    ConfirmationFailed {
        /// Hash of the broadcast transaction
        tx_hash: B256,
        /// Underlying failure
        source: ChainError,
    },

    /// The transaction was mined but reverted
    #[error("Transaction {} reverted in block {:?}", .receipt.tx_hash, .receipt.block_number)]
    Reverted {
        /// Receipt of the reverted transaction
        receipt: ConfirmedReceipt,
    },
}

impl RoutineError {
    /// The step the routine was in when it stopped.
    pub const fn step(&self) -> Step {
        match self {
            Self::ContractNotDeployed { .. } | Self::DeploymentCheck { .. } => {
                Step::VerifyDeployed
            }
            Self::EstimationFailed { .. } => Step::EstimateGas,
            Self::SubmissionFailed { .. } => Step::Submit,
            Self::ConfirmationFailed { .. } | Self::Reverted { .. } => Step::AwaitConfirmation,
        }
    }

    /// Whether the routine stopped at one of its gating checks, before anything was broadcast.
    pub const fn is_aborted(&self) -> bool {
        matches!(self.step().policy(), crate::FailurePolicy::Abort)
    }

    /// Human-readable reason, when one is more specific than the display message.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::EstimationFailed { revert_reason, .. } => revert_reason.as_deref(),
            _ => self.source_error().and_then(ChainError::message),
        }
    }

    /// JSON-RPC error code of the underlying failure.
    pub fn code(&self) -> Option<i64> {
        self.source_error().and_then(ChainError::code)
    }

    /// The call that was being attempted, if the failure happened while submitting it.
    pub const fn transaction(&self) -> Option<&CallRequest> {
        match self {
            Self::SubmissionFailed { request, .. } => Some(request),
            _ => None,
        }
    }

    /// Receipt of the mined transaction, if one exists.
    pub const fn receipt(&self) -> Option<&ConfirmedReceipt> {
        match self {
            Self::Reverted { receipt } => Some(receipt),
            _ => None,
        }
    }

    const fn source_error(&self) -> Option<&ChainError> {
        match self {
            Self::DeploymentCheck { source, .. } |
            Self::EstimationFailed { source, .. } |
            Self::SubmissionFailed { source, .. } |
            Self::ConfirmationFailed { source, .. } => Some(source),
            Self::ContractNotDeployed { .. } | Self::Reverted { .. } => None,
        }
    }
}
