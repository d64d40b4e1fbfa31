use colored::Colorize;

use crate::browser::Browser;
use crate::cli::Cli;
use crate::error::Result;

pub fn run(cli: &Cli) -> Result<()> {
    let config = cli.effective_config()?;
    let browser = Browser::from_config(&config);

    let path = browser.locate()?;
    let version = browser.version()?;

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "executable": config.browser.executable,
                "path": path.display().to_string(),
                "version": version,
            })
        );
    } else {
        println!(
            "{} {} is version {}",
            "✓".green(),
            path.display(),
            version.to_string().bold()
        );
    }

    Ok(())
}
