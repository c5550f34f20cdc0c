//! Schema command implementation

use clap::Args;
use tracing::instrument;

/// Arguments for the `schema` subcommand.
#[derive(Args, Debug, Default)]
pub struct SchemaArgs {}

/// Print the JSON Schema of the artifact format.
#[instrument(name = "cmd_schema", skip_all)]
pub fn cmd_schema(_args: SchemaArgs) -> anyhow::Result<()> {
    let schema = rarity_map_core::artifact::artifact_schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
