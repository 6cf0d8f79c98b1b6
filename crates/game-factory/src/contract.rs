//! ABI bindings for the `GameFactory` contract.

use alloy_primitives::{Address, Bytes, Log, B256};
use alloy_sol_types::{sol, SolCall, SolEvent};

use crate::Salt;

sol! {
    /// The subset of the `GameFactory` interface this crate talks to.
    #[derive(Debug, PartialEq, Eq)]
    interface IGameFactory {
        /// Emitted once per game with the address of the freshly deployed game.
        event GameCreated(address game);

        /// Deploys a new game at the address derived from `salt`.
        function createGame(bytes32 salt) external returns (address game);

        /// Returns the address `createGame(salt)` would deploy to.
        function getGameAddress(bytes32 salt) external view returns (address game);
    }
}

/// `keccak256("GameCreated(address)")`, the topic0 of the creation event.
pub const GAME_CREATED_TOPIC: B256 = IGameFactory::GameCreated::SIGNATURE_HASH;

/// Number of zero bytes in front of an address inside a 32-byte ABI word.
const ADDRESS_WORD_PADDING: usize = 12;

const WORD_LEN: usize = 32;

/// Encodes `createGame(salt)` calldata.
pub fn encode_create_game(salt: Salt) -> Bytes {
    IGameFactory::createGameCall { salt: salt.as_b256() }.abi_encode().into()
}

/// Decodes `createGame` calldata back into its salt.
pub fn decode_create_game(calldata: &[u8]) -> Result<Salt, alloy_sol_types::Error> {
    IGameFactory::createGameCall::abi_decode(calldata).map(|call| Salt::from(call.salt))
}

/// Decodes the return data of a simulated `createGame` call.
pub fn decode_create_game_output(output: &[u8]) -> Result<Address, alloy_sol_types::Error> {
    IGameFactory::createGameCall::abi_decode_returns(output)
}

/// Encodes `getGameAddress(salt)` calldata.
pub fn encode_get_game_address(salt: Salt) -> Bytes {
    IGameFactory::getGameAddressCall { salt: salt.as_b256() }.abi_encode().into()
}

/// Decodes the return data of `getGameAddress`.
pub fn decode_game_address(output: &[u8]) -> Result<Address, alloy_sol_types::Error> {
    IGameFactory::getGameAddressCall::abi_decode_returns(output)
}

/// Finds the first `GameCreated` log and extracts the game address from its data word.
///
/// Logs are scanned in receipt order and only the first log carrying the `GameCreated` topic is
/// read. If its data is shorter than one word there is no address.
pub fn find_game_created(logs: &[Log]) -> Option<Address> {
    let log = logs.iter().find(|log| log.topics().first() == Some(&GAME_CREATED_TOPIC))?;
    log.data.data.get(ADDRESS_WORD_PADDING..WORD_LEN).map(Address::from_slice)
}
