//! CLI command definitions and dispatch.

pub mod generate;

use clap::{Parser, Subcommand};

/// lforge: generate reproducible lesson environments from manifests.
#[derive(Parser, Debug)]
#[command(name = "lforge", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the build-context and consumer trees for a lesson manifest.
    Generate(generate::GenerateArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Generate(args) => generate::execute(args),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_generate_requires_manifest() {
        assert!(Cli::try_parse_from(["lforge", "generate"]).is_err());
    }
}
