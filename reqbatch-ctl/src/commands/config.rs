//! Effective configuration dump

use reqbatch_shared::config::ReqbatchConfig;

use crate::output;

pub(crate) fn handle_config_command(config: &ReqbatchConfig) -> anyhow::Result<()> {
    output::plain(toml::to_string_pretty(config)?);
    Ok(())
}
