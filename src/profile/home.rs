use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

use chrono::Local;
use tracing::debug;

use crate::config::Config;
use crate::error::{FoxtrapError, Result};

/// Profile registry declaring a single profile named "default", stored
/// at a relative path of the same name.
const PROFILES_INI: &str = "\
[General]
StartWithLastProfile=1

[Profile0]
Name=default
IsRelative=1
Path=default
";

/// Everything that varies between generated profiles.
#[derive(Debug, Clone)]
pub struct ProfileSpec {
    /// Extension id to pre-enable.
    pub extension_id: String,
    /// Host the profile proxies all traffic to.
    pub proxy_host: String,
    /// Proxy port. Isolation only holds if nothing listens here.
    pub proxy_port: u16,
}

impl ProfileSpec {
    pub fn new(extension_id: &str) -> Self {
        Self {
            extension_id: extension_id.to_string(),
            proxy_host: "127.0.0.1".to_string(),
            proxy_port: 9,
        }
    }

    pub fn from_config(extension_id: &str, config: &Config) -> Self {
        Self {
            extension_id: extension_id.to_string(),
            proxy_host: config.proxy.host.clone(),
            proxy_port: config.proxy.port,
        }
    }

    /// Render prefs.js content.
    ///
    /// The manual proxy settings point every request at a dead port,
    /// cutting the browser off from the real network. Today's date in
    /// the enabledItems value keeps stale enablement state from an
    /// earlier day's run from being honored.
    fn render_prefs(&self) -> String {
        let today = Local::now().date_naive();
        format!(
            "user_pref(\"network.proxy.http\", \"{host}\");\n\
             user_pref(\"network.proxy.http_port\", {port});\n\
             user_pref(\"network.proxy.ssl\", \"{host}\");\n\
             user_pref(\"network.proxy.ssl_port\", {port});\n\
             user_pref(\"network.proxy.type\", 1);\n\
             user_pref(\"extensions.enabledItems\", \"{id}:{today}\");\n",
            host = self.proxy_host,
            port = self.proxy_port,
            id = self.extension_id,
            today = today,
        )
    }
}

/// Write the profile registry and preferences tree under `home`.
pub fn write_profile_tree(home: &Path, spec: &ProfileSpec) -> Result<()> {
    let firefox_dir = home.join(".mozilla").join("firefox");
    let profile_dir = firefox_dir.join("default");
    fs::create_dir_all(&profile_dir)?;
    fs::write(firefox_dir.join("profiles.ini"), PROFILES_INI)?;
    fs::write(profile_dir.join("prefs.js"), spec.render_prefs())?;
    Ok(())
}

/// Run `f` with `HOME` redirected to a freshly built disposable profile.
///
/// The tree is fully written before `HOME` moves, and `HOME` is
/// restored before the tree is deleted, so nothing in the process can
/// observe a half-built or already-vanished home directory. Deletion
/// failures are not swallowed; they surface after `HOME` is back.
///
/// `HOME` is process-wide state. Only one of these scopes may be
/// active at a time; tests that use it must not run in parallel.
pub fn with_clean_home<T>(spec: &ProfileSpec, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let home = tempfile::Builder::new().prefix("foxtrap.").tempdir()?;
    debug!("Building disposable profile in {}", home.path().display());

    let result = write_profile_tree(home.path(), spec).and_then(|_| {
        let _guard = HomeGuard::redirect(home.path())?;
        f()
    });

    match home.close() {
        Ok(()) => result,
        Err(e) => Err(e.into()),
    }
}

/// Restores the original `HOME` when dropped, unwinding included.
struct HomeGuard {
    saved: OsString,
}

impl HomeGuard {
    fn redirect(home: &Path) -> Result<Self> {
        let saved = env::var_os("HOME").ok_or_else(|| {
            FoxtrapError::Profile("HOME is not set, nothing to redirect".to_string())
        })?;
        debug!("Redirecting HOME to {}", home.display());
        env::set_var("HOME", home);
        Ok(Self { saved })
    }
}

impl Drop for HomeGuard {
    fn drop(&mut self) {
        env::set_var("HOME", &self.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_declares_one_relative_default_profile() {
        assert!(PROFILES_INI.starts_with("[General]\n"));
        assert!(PROFILES_INI.contains("StartWithLastProfile=1"));
        assert!(PROFILES_INI.contains("[Profile0]"));
        assert!(PROFILES_INI.contains("Name=default"));
        assert!(PROFILES_INI.contains("IsRelative=1"));
        assert!(PROFILES_INI.contains("Path=default"));
    }

    #[test]
    fn prefs_enable_the_extension_with_todays_date() {
        let spec = ProfileSpec::new("addon@example.org");
        let prefs = spec.render_prefs();

        let expected = format!(
            "user_pref(\"extensions.enabledItems\", \"addon@example.org:{}\");",
            Local::now().date_naive()
        );
        assert!(prefs.contains(&expected), "missing in: {}", prefs);
    }

    #[test]
    fn prefs_point_http_and_ssl_at_the_dead_proxy() {
        let spec = ProfileSpec::new("addon@example.org");
        let prefs = spec.render_prefs();

        assert!(prefs.contains("user_pref(\"network.proxy.http\", \"127.0.0.1\");"));
        assert!(prefs.contains("user_pref(\"network.proxy.http_port\", 9);"));
        assert!(prefs.contains("user_pref(\"network.proxy.ssl\", \"127.0.0.1\");"));
        assert!(prefs.contains("user_pref(\"network.proxy.ssl_port\", 9);"));
        assert!(prefs.contains("user_pref(\"network.proxy.type\", 1);"));
    }

    #[test]
    fn prefs_honor_a_configured_proxy() {
        let mut config = Config::default();
        config.proxy.host = "10.0.0.1".to_string();
        config.proxy.port = 1;

        let spec = ProfileSpec::from_config("addon@example.org", &config);
        let prefs = spec.render_prefs();

        assert!(prefs.contains("user_pref(\"network.proxy.http\", \"10.0.0.1\");"));
        assert!(prefs.contains("user_pref(\"network.proxy.http_port\", 1);"));
    }
}
