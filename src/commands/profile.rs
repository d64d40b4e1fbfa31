use std::path::Path;

use colored::Colorize;

use crate::cli::{Cli, ProfileCommands};
use crate::error::Result;
use crate::profile::{extension_id, write_profile_tree, ProfileSpec};

pub fn run(cli: &Cli, command: &ProfileCommands) -> Result<()> {
    match command {
        ProfileCommands::ExtensionId { manifest } => show_extension_id(cli, manifest.as_deref()),
        ProfileCommands::Write { dir, manifest } => write(cli, dir, manifest.as_deref()),
    }
}

fn show_extension_id(cli: &Cli, manifest: Option<&str>) -> Result<()> {
    let config = cli.effective_config()?;
    let path = config.manifest_path(manifest)?;
    let id = extension_id(&path)?;

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "manifest": path.display().to_string(),
                "id": id,
            })
        );
    } else {
        println!("{}", id);
    }

    Ok(())
}

fn write(cli: &Cli, dir: &str, manifest: Option<&str>) -> Result<()> {
    let config = cli.effective_config()?;
    let path = config.manifest_path(manifest)?;
    let id = extension_id(&path)?;
    let spec = ProfileSpec::from_config(&id, &config);

    let home = Path::new(dir);
    write_profile_tree(home, &spec)?;

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "home": home.display().to_string(),
                "extension_id": id,
            })
        );
    } else {
        println!(
            "{} Profile for {} written under {}",
            "✓".green(),
            id.bold(),
            home.display().to_string().dimmed()
        );
    }

    Ok(())
}
