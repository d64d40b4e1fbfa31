use std::thread;

use colored::Colorize;

use crate::cli::Cli;
use crate::error::Result;
use crate::fixture::FixtureServer;

pub fn run(cli: &Cli, once: bool) -> Result<()> {
    let server = FixtureServer::run()?;

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "url": server.url(),
                "port": server.port(),
            })
        );
    } else {
        println!("{} Serving at {}", "✓".green(), server.url().bold());
    }

    if once {
        server.served().wait();
        if cli.json {
            println!("{}", serde_json::json!({ "served": true }));
        } else {
            println!("{} Page served", "✓".green());
        }
        return Ok(());
    }

    // Keep the process alive for the detached serving thread.
    loop {
        thread::park();
    }
}
