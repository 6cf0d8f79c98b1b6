//! Command-line front end for creating games through the `GameFactory` contract.

mod cmd;
pub use cmd::*;

mod logging;
pub use logging::*;
