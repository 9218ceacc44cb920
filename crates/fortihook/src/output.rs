//! Output formatting: table, JSON, YAML, plain.
//!
//! Reports go to stdout in the format selected by `--output`; logs go to
//! stderr, so piping a JSON report never mixes the two.

use std::io::{self, Write};

use tabled::{Table, Tabled, settings::Style};

use fortihook_core::{DeployOutcome, DeploymentPlan};

use crate::cli::OutputFormat;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Deploy report ────────────────────────────────────────────────────

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Certificate")]
    certificate: String,
    #[tabled(rename = "Bindings")]
    bindings: String,
}

fn join_bindings(bindings: &[fortihook_core::Binding]) -> String {
    if bindings.is_empty() {
        return "-".into();
    }
    bindings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn outcome_row(outcome: &DeployOutcome) -> OutcomeRow {
    match outcome {
        DeployOutcome::NoConfiguration { domain } => OutcomeRow {
            domain: domain.clone(),
            result: "not configured".into(),
            certificate: "-".into(),
            bindings: "-".into(),
        },
        DeployOutcome::AlreadyInstalled {
            domain,
            certificate_name,
        } => OutcomeRow {
            domain: domain.clone(),
            result: "already installed".into(),
            certificate: certificate_name.clone(),
            bindings: "-".into(),
        },
        DeployOutcome::Installed {
            domain,
            certificate_name,
            bindings,
        } => OutcomeRow {
            domain: domain.clone(),
            result: "installed".into(),
            certificate: certificate_name.clone(),
            bindings: join_bindings(bindings),
        },
        DeployOutcome::Planned(DeploymentPlan {
            domain,
            certificate_name,
            decision,
            bindings,
            ..
        }) => OutcomeRow {
            domain: domain.clone(),
            result: format!("dry run: {decision}"),
            certificate: certificate_name.clone(),
            bindings: join_bindings(bindings),
        },
    }
}

fn outcome_plain(outcome: &DeployOutcome) -> String {
    let row = outcome_row(outcome);
    format!("{}\t{}\t{}", row.domain, row.result, row.certificate)
}

/// Render the outcomes of one invocation.
pub fn render_outcomes(format: &OutputFormat, outcomes: &[DeployOutcome]) -> String {
    render_list(format, outcomes, outcome_row, outcome_plain)
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.expect("serialization should not fail")
}

/// YAML output.
pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}
