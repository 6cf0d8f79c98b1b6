//! Default endpoints, addresses and limits.

use alloy_primitives::{address, Address};

/// Address of the `GameFactory` deployment on the Chiliz Spicy testnet.
pub const DEFAULT_FACTORY_ADDRESS: Address = address!("0x85E433c027F2438375ce9eBA1C42A8CFFDC2CA5c");

/// Chiliz Spicy testnet JSON-RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://spicy-rpc.chiliz.com/";

/// Gas limit attached to the `createGame` transaction unless a margin policy is selected.
pub const DEFAULT_GAS_LIMIT: u64 = 3_000_000;

/// Symbol printed next to the signer balance.
pub const DEFAULT_CURRENCY: &str = "CHZ";

/// Number of confirmations awaited after submission.
pub const DEFAULT_CONFIRMATIONS: u64 = 1;
