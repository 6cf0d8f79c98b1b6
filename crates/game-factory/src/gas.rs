//! Gas limit selection for the `createGame` transaction.

use crate::constants::DEFAULT_GAS_LIMIT;

/// How the gas limit of the submitted transaction is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasLimitPolicy {
    /// Always attach this limit, whatever the estimate.
    Fixed(u64),
    /// Attach the estimate plus `percent` percent, saturating at `u64::MAX`.
    Margin {
        /// Headroom over the estimate, in percent.
        percent: u64,
    },
}

impl Default for GasLimitPolicy {
    fn default() -> Self {
        Self::Fixed(DEFAULT_GAS_LIMIT)
    }
}

impl GasLimitPolicy {
    /// Gas limit for a call whose estimate is `estimate`.
    pub fn limit_for(&self, estimate: u64) -> u64 {
        match *self {
            Self::Fixed(limit) => limit,
            Self::Margin { percent } => {
                let padded = u128::from(estimate) * (100 + u128::from(percent)) / 100;
                u64::try_from(padded).unwrap_or(u64::MAX)
            }
        }
    }

    /// Whether `limit` leaves less room than `estimate` asks for.
    pub const fn is_below(limit: u64, estimate: u64) -> bool {
        limit < estimate
    }
}
