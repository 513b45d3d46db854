//! safe-sigverify: compute Safe hashes and recover signers from JSON on stdin

use std::io::Read;

use eyre::{bail, WrapErr};

mod commands;

const USAGE: &str = "usage: safe-sigverify <tx-hash|message-hash|recover> < request.json";

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let Some(command) = std::env::args().nth(1) else {
        bail!(USAGE);
    };

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .wrap_err("failed to read request from stdin")?;

    tracing::debug!(%command, bytes = input.len(), "handling request");

    let output = match command.as_str() {
        "tx-hash" => commands::tx_hash(&input)?,
        "message-hash" => commands::message_hash(&input)?,
        "recover" => commands::recover(&input)?,
        other => bail!("unknown command '{other}'\n{USAGE}"),
    };
    println!("{output}");
    Ok(())
}
