//! Per-invocation salt mixed into the game address derivation.

use core::fmt;

use alloy_primitives::B256;
use rand::{CryptoRng, RngCore};

/// A 32-byte uniqueness input for `createGame` and `getGameAddress`.
///
/// A fresh salt is drawn for every game; two games created with the same salt by the same
/// factory would collide on the derived address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Salt(B256);

impl Salt {
    /// Draws a salt from the thread-local CSPRNG.
    pub fn random() -> Self {
        Self::random_with(&mut rand::rng())
    }

    /// Draws a salt from the given cryptographically secure generator.
    pub fn random_with<R: CryptoRng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(B256::from(bytes))
    }

    /// Returns the salt as a `bytes32` word.
    pub const fn as_b256(&self) -> B256 {
        self.0
    }
}

impl From<B256> for Salt {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl From<Salt> for B256 {
    fn from(value: Salt) -> Self {
        value.0
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", self.0)
    }
}
