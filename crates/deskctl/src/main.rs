//! deskctl - command-line front end for helpdesk SLA reporting

use anyhow::{Context, Result};
use clap::Parser;
use deskctl::errors::{exit_code_for, EXIT_SUCCESS};
use deskctl::{logging, output, Cli};
use desk_common::SlaConfig;
use tracing::debug;

fn execute(cli: &Cli) -> Result<()> {
    let path = SlaConfig::resolve_path(cli.config.as_deref());
    let config = SlaConfig::load(&path).with_context(|| format!("loading {}", path.display()))?;
    debug!("Config loaded from {}", path.display());

    let result = deskctl::run(&cli.command, &config)?;
    output::print(&result);
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    debug!("deskctl v{}", env!("DESK_VERSION"));

    let code = match execute(&cli) {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            output::print_error(&err);
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}
