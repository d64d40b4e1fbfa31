use colored::Colorize;

use crate::browser::{Browser, WindowRef};
use crate::cli::Cli;
use crate::error::Result;
use crate::profile::{extension_id, with_clean_home, ProfileSpec};

pub fn run(
    cli: &Cli,
    url: &str,
    window: Option<&str>,
    keys: &[String],
    manifest: Option<&str>,
) -> Result<()> {
    let config = cli.effective_config()?;
    let browser = Browser::from_config(&config);

    if manifest.is_some() || config.extension.manifest.is_some() {
        let manifest_path = config.manifest_path(manifest)?;
        let id = extension_id(&manifest_path)?;
        let spec = ProfileSpec::from_config(&id, &config);
        with_clean_home(&spec, || drive(cli, &browser, url, window, keys))
    } else {
        drive(cli, &browser, url, window, keys)
    }
}

/// Launch the browser, optionally focus and type, then wait it out.
fn drive(
    cli: &Cli,
    browser: &Browser,
    url: &str,
    window: Option<&str>,
    keys: &[String],
) -> Result<()> {
    let mut session = browser.open(url)?;

    if !cli.json {
        println!(
            "{} Browser {} (pid {}) on {}",
            "✓".green(),
            session.version(),
            session.pid(),
            session.url()
        );
    }

    if let Some(pattern) = window {
        let target = WindowRef::Name(pattern.to_string());
        if keys.is_empty() {
            session.activate_window(&target)?;
        } else {
            let tokens: Vec<&str> = keys.iter().map(String::as_str).collect();
            session.talk(&target, &tokens)?;
        }
    }

    let status = session.wait()?;

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "url": url,
                "version": session.version(),
                "exit_code": status.code(),
            })
        );
    } else {
        println!("{} Browser exited with {}", "✓".green(), status);
    }

    Ok(())
}
