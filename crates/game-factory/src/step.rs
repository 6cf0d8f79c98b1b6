//! Steps of the game creation routine and what a failure at each one means.

use core::fmt;

/// What the routine does when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure and continue with the next step.
    Advisory,
    /// Stop the routine before anything is broadcast.
    Abort,
    /// Hand the failure to the caller's top-level handler.
    Escalate,
}

/// A step of the game creation routine, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Check that the factory has deployed code.
    VerifyDeployed,
    /// Read the signer's balance.
    CheckBalance,
    /// Draw a fresh salt.
    GenerateSalt,
    /// Ask the factory where the game will be deployed.
    PredictAddress,
    /// Encode the `createGame` calldata.
    EncodeCall,
    /// Run the call read-only against the latest state.
    Simulate,
    /// Estimate the gas of the real call.
    EstimateGas,
    /// Sign and broadcast the transaction.
    Submit,
    /// Wait for the transaction to be mined.
    AwaitConfirmation,
    /// Look for `GameCreated` in the receipt logs.
    ScanEvent,
}

impl Step {
    /// All steps, in execution order.
    pub const ALL: [Self; 10] = [
        Self::VerifyDeployed,
        Self::CheckBalance,
        Self::GenerateSalt,
        Self::PredictAddress,
        Self::EncodeCall,
        Self::Simulate,
        Self::EstimateGas,
        Self::Submit,
        Self::AwaitConfirmation,
        Self::ScanEvent,
    ];

    /// Failure policy of this step.
    ///
    /// Only the deployment check and gas estimation gate the submission; the diagnostic steps
    /// never stop the routine.
    pub const fn policy(self) -> FailurePolicy {
        match self {
            Self::VerifyDeployed | Self::EstimateGas => FailurePolicy::Abort,
            Self::CheckBalance | Self::PredictAddress | Self::Simulate | Self::ScanEvent => {
                FailurePolicy::Advisory
            }
            Self::GenerateSalt | Self::EncodeCall | Self::Submit | Self::AwaitConfirmation => {
                FailurePolicy::Escalate
            }
        }
    }

    /// Short name used in log lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::VerifyDeployed => "verify-deployed",
            Self::CheckBalance => "check-balance",
            Self::GenerateSalt => "generate-salt",
            Self::PredictAddress => "predict-address",
            Self::EncodeCall => "encode-call",
            Self::Simulate => "simulate",
            Self::EstimateGas => "estimate-gas",
            Self::Submit => "submit",
            Self::AwaitConfirmation => "await-confirmation",
            Self::ScanEvent => "scan-event",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
