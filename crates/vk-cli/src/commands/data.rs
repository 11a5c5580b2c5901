use clap::Subcommand;
use comfy_table::{ContentArrangement, Table};

use super::CliVault;

#[derive(Subcommand)]
pub enum DataCommand {
    /// List origins
    Origins,

    /// List survivor traits
    Traits,

    /// Print the whole data set, e.g. as a starting point for a custom file
    Export {
        /// Output format: json or toml
        #[arg(short, long, default_value = "json")]
        format: String,
    },
}

pub fn run(vault: &CliVault, command: DataCommand) -> Result<(), String> {
    let data = vault.data();
    match command {
        DataCommand::Origins => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Id", "Name", "Robot", "Description"]);
            for origin in &data.origins {
                table.add_row(vec![
                    origin.id.clone(),
                    origin.name.clone(),
                    if origin.is_robot { "yes" } else { "" }.to_string(),
                    origin.description.clone(),
                ]);
            }
            println!("{table}");
            Ok(())
        }
        DataCommand::Traits => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Id", "Name", "Description"]);
            for t in &data.survivor_traits {
                table.add_row(vec![t.id.clone(), t.name.clone(), t.description.clone()]);
            }
            println!("{table}");
            Ok(())
        }
        DataCommand::Export { format } => {
            let out = match format.as_str() {
                "json" => serde_json::to_string_pretty(data).map_err(|e| e.to_string())?,
                "toml" => toml::to_string_pretty(data).map_err(|e| e.to_string())?,
                other => return Err(format!("unknown format: {other} (expected json or toml)")),
            };
            println!("{out}");
            Ok(())
        }
    }
}
