//! Config command - prints the resolved configuration

use super::load_config;

pub fn run() -> anyhow::Result<()> {
    let config = load_config();

    println!("{}", serde_json::to_string_pretty(&config.redacted())?);

    Ok(())
}
