//! End-to-end harness demonstration
//!
//! Serves the fixture page over HTTPS, builds a disposable profile
//! enabling the add-on, launches the browser on the fixture URL, and
//! waits for the page to be fetched before shutting everything down.
//!
//! Usage:
//! ```bash
//! cargo run --example harness_demo -- path/to/install.rdf
//! ```

use std::env;
use std::path::Path;
use std::time::Duration;

use foxtrap::browser::{Browser, WindowRef};
use foxtrap::config::Config;
use foxtrap::fixture::FixtureServer;
use foxtrap::profile::{extension_id, with_clean_home, ProfileSpec};
use foxtrap::Result;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let manifest = env::args()
        .nth(1)
        .expect("usage: harness_demo <install.rdf>");

    println!("🦊 Foxtrap harness demo");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    // Step 1: stand up the fixture page
    let server = FixtureServer::run()?;
    println!("🌐 Fixture page at {}", server.url());

    // Step 2: read the add-on id from its manifest
    let id = extension_id(Path::new(&manifest))?;
    println!("🧩 Extension under test: {}", id);

    // Step 3: run the browser inside a disposable profile
    let config = Config::load()?;
    let browser = Browser::from_config(&config);
    let spec = ProfileSpec::from_config(&id, &config);

    with_clean_home(&spec, || {
        let mut session = browser.open(server.url())?;
        println!(
            "🚀 Browser {} running with pid {}",
            session.version(),
            session.pid()
        );

        let window = WindowRef::Name("Mozilla Firefox".to_string());
        session.activate_window(&window)?;

        if server.served().wait_timeout(Duration::from_secs(60)) {
            println!("✅ Fixture page was fetched");
        } else {
            println!("⏰ Fixture page was never fetched");
        }

        session.talk(&window, &["ctrl+q"])?;
        session.wait()?;
        Ok(())
    })?;

    println!("\n🧹 Disposable profile cleaned up");
    Ok(())
}
