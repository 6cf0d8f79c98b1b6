//! Create a game through a `GameFactory` contract.
//!
//! The crate wraps a single routine, [`GameCreationRoutine`], which walks through deployment
//! check, balance check, address prediction, simulation, gas estimation, submission and receipt
//! scanning against any [`ChainClient`]. [`RpcChainClient`] is the JSON-RPC backed client.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod constants;

mod client;
pub use client::*;

mod contract;
pub use contract::*;

mod error;
pub use error::*;

mod gas;
pub use gas::*;

mod revert;
pub use revert::*;

mod routine;
pub use routine::*;

mod rpc;
pub use rpc::*;

mod salt;
pub use salt::*;

mod step;
pub use step::*;
