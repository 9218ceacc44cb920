//! Manual deploy handler.

use futures::future::join_all;
use tracing::error;

use fortihook_core::{DeployMode, DeployOutcome, DeployRequest};
use fortihook_ssh::SshConnector;

use crate::cli::{DeployArgs, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// Deploy one certificate with the record configured for its domain.
pub async fn deploy_one(
    config: &Config,
    request: &DeployRequest,
    mode: DeployMode,
) -> Result<DeployOutcome, CliError> {
    let record = config::record(config, &request.domain)?;
    let connector = SshConnector::new();
    let outcome = fortihook_core::deploy(&connector, record.as_ref(), request, mode).await?;
    Ok(outcome)
}

fn requests(args: DeployArgs) -> Result<Vec<DeployRequest>, CliError> {
    if args.domain.len() != args.key.len() || args.domain.len() != args.cert.len() {
        return Err(CliError::Validation {
            field: "--domain/--key/--cert".into(),
            reason: format!(
                "each domain needs one key and one certificate (got {} domains, {} keys, {} certificates)",
                args.domain.len(),
                args.key.len(),
                args.cert.len()
            ),
        });
    }

    Ok(args
        .domain
        .into_iter()
        .zip(args.key)
        .zip(args.cert)
        .map(|((domain, key_file), cert_file)| DeployRequest {
            domain,
            key_file,
            cert_file,
        })
        .collect())
}

/// Domains are deployed concurrently, one session each. The report lists
/// every domain that succeeded; the first failure is returned afterwards.
pub async fn handle(args: DeployArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mode = if args.dry_run {
        DeployMode::DryRun
    } else {
        DeployMode::Apply
    };
    let requests = requests(args)?;
    let config = config::load(global)?;

    let results = join_all(
        requests
            .iter()
            .map(|request| deploy_one(&config, request, mode)),
    )
    .await;

    let mut outcomes = Vec::with_capacity(results.len());
    let mut first_error = None;
    for (request, result) in requests.iter().zip(results) {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => {
                error!(domain = %request.domain, error = %err, "deploy failed");
                first_error.get_or_insert(err);
            }
        }
    }

    output::print_output(
        &output::render_outcomes(&global.output, &outcomes),
        global.quiet,
    );

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
