pub mod character;
pub mod data;
pub mod perks;
pub mod session;

use std::path::Path;

use colored::Colorize;
use vk_core::{CoreError, JsonFileRepository, Vault, VaultConfig};
use vk_rules::ValidationIssue;

/// The vault every command runs against.
pub type CliVault = Vault<JsonFileRepository>;

/// Load the config, the reference data and the store.
pub fn open(config_path: &Path, store: Option<&Path>) -> Result<CliVault, String> {
    let mut config = VaultConfig::load(config_path).map_err(describe)?;
    if let Some(store) = store {
        config = config.with_store_path(store);
    }
    let data = config.rule_data().map_err(describe)?;
    let repo = JsonFileRepository::open(&config.store_path).map_err(describe)?;
    Ok(Vault::new(repo, data, config))
}

/// Render an error for the terminal. Rejected builds list every blocking
/// issue, not just the first.
pub fn describe(err: CoreError) -> String {
    match err {
        CoreError::InvalidBuild(report) => {
            let lines: Vec<String> = report
                .errors()
                .map(|issue| format!("  {} ({})", issue.message, issue.code))
                .collect();
            format!("build has {} error(s):\n{}", lines.len(), lines.join("\n"))
        }
        other => other.to_string(),
    }
}

/// Print validation warnings to stderr.
pub fn print_warnings(warnings: &[ValidationIssue]) {
    for warning in warnings {
        eprintln!("  {} {}", "warning:".yellow(), warning.message);
    }
}
