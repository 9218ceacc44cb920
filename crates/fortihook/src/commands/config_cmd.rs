//! Config subcommand handlers.

use std::path::PathBuf;

use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct SourceEntry {
    path: PathBuf,
    exists: bool,
}

#[derive(Tabled)]
struct SourceRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Exists")]
    exists: String,
}

fn source_row(entry: &SourceEntry) -> SourceRow {
    SourceRow {
        path: entry.path.display().to_string(),
        exists: if entry.exists { "yes" } else { "no" }.into(),
    }
}

/// Map an interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::redacted(&config::load(global)?);
            let rendered = match global.output {
                OutputFormat::Json => serde_json::to_string_pretty(&cfg)
                    .map_err(|e| CliError::Internal(e.to_string()))?,
                OutputFormat::JsonCompact => {
                    serde_json::to_string(&cfg).map_err(|e| CliError::Internal(e.to_string()))?
                }
                OutputFormat::Yaml => output::render_yaml(&cfg),
                OutputFormat::Table | OutputFormat::Plain => config::to_toml(&cfg)?,
            };
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            let entries: Vec<SourceEntry> = config::sources(global)
                .paths()
                .iter()
                .map(|path| SourceEntry {
                    exists: path.exists(),
                    path: path.clone(),
                })
                .collect();
            let rendered = output::render_list(&global.output, &entries, source_row, |e| {
                e.path.display().to_string()
            });
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword { domain } => {
            let password = rpassword::prompt_password(format!("Password for {domain}: "))
                .map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            fortihook_config::store_password(&domain, &password)?;
            info!(%domain, "password stored in system keyring");
            Ok(())
        }
    }
}
