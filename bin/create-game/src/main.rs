//! `create-game` CLI
//!
//! Creates a new game through the `GameFactory` contract, checking deployment, balance and gas
//! before anything is broadcast.

use std::process::ExitCode;

use clap::Parser;
use create_game::Cmd;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cmd = Cmd::parse();
    if let Err(err) = cmd.log_args.init() {
        eprintln!("Failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match cmd.run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error creating game: {err}");
            err.log_details();
            ExitCode::FAILURE
        }
    }
}
