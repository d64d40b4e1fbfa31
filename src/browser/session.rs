use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};

use tracing::{debug, info, warn};

use super::window::{self, WindowRef};
use crate::config::Config;
use crate::error::{FoxtrapError, Result};

/// Handle to a browser installation, before any process is started.
#[derive(Debug, Clone)]
pub struct Browser {
    executable: String,
    automation: String,
}

impl Browser {
    pub fn new(executable: &str, automation: &str) -> Self {
        Self {
            executable: executable.to_string(),
            automation: automation.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.browser.executable, &config.automation.executable)
    }

    /// Resolve the configured browser executable on PATH.
    pub fn locate(&self) -> Result<PathBuf> {
        which::which(&self.executable)
            .map_err(|_| FoxtrapError::BrowserNotFound(self.executable.clone()))
    }

    /// Ask the browser for its major version number.
    ///
    /// Runs `<browser> --version` and parses the first run of digits,
    /// so `Mozilla Firefox 52.0.1` reports 52.
    pub fn version(&self) -> Result<u32> {
        debug!("Probing version: {} --version", self.executable);
        let output = Command::new(&self.executable)
            .arg("--version")
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => FoxtrapError::BrowserNotFound(self.executable.clone()),
                _ => FoxtrapError::VersionProbe(e.to_string()),
            })?;

        if !output.status.success() {
            return Err(FoxtrapError::VersionProbe(format!(
                "{} --version exited with {}",
                self.executable, output.status
            )));
        }

        parse_major_version(&String::from_utf8_lossy(&output.stdout))
    }

    /// Launch the browser on `url` and hand back the running session.
    ///
    /// The version probe runs first, so an unusable browser fails the
    /// test before any process is left to clean up. `-no-remote` keeps
    /// the launch from delegating to an already running instance, which
    /// would exit immediately and leave nothing to control. The
    /// browser's stderr chatter is discarded.
    pub fn open(&self, url: &str) -> Result<BrowserSession> {
        let version = self.version()?;
        info!("Launching {} {} at {}", self.executable, version, url);
        let child = Command::new(&self.executable)
            .arg("-no-remote")
            .arg(url)
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => FoxtrapError::BrowserNotFound(self.executable.clone()),
                _ => FoxtrapError::LaunchFailed(e.to_string()),
            })?;

        debug!("Browser running with pid {}", child.id());
        Ok(BrowserSession {
            child,
            url: url.to_string(),
            version,
            automation: self.automation.clone(),
            reaped: false,
        })
    }
}

/// Parse the first run of digits in a version banner.
fn parse_major_version(banner: &str) -> Result<u32> {
    let start = banner
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| FoxtrapError::VersionParse(banner.trim().to_string()))?;
    let digits: String = banner[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits
        .parse()
        .map_err(|_| FoxtrapError::VersionParse(banner.trim().to_string()))
}

/// A running browser process plus the automation tool to drive it.
///
/// The session owns the child process. Dropping it terminates and
/// reaps the browser, so a failed test never leaves one behind; call
/// [`wait`](BrowserSession::wait) instead when the browser is expected
/// to quit on its own.
pub struct BrowserSession {
    child: Child,
    url: String,
    version: u32,
    automation: String,
    reaped: bool,
}

impl BrowserSession {
    /// Process id of the running browser.
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// The URL the browser was launched on.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Major version reported by the browser at launch time.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Wait for the browser to exit on its own.
    ///
    /// Used after sending it a quit sequence. No signal is sent.
    pub fn wait(&mut self) -> Result<ExitStatus> {
        let status = self.child.wait()?;
        self.reaped = true;
        debug!("Browser exited with {}", status);
        Ok(status)
    }

    /// Terminate the browser and wait for it to go away.
    pub fn shutdown(&mut self) -> Result<ExitStatus> {
        self.terminate();
        self.wait()
    }

    /// Resolve a numeric window id from a title pattern.
    ///
    /// Blocks until a matching window exists.
    pub fn find_window(&self, pattern: &str) -> Result<u64> {
        let output = self.automation_output(&window::search_args(self.pid(), pattern))?;
        output.trim().parse().map_err(|_| {
            FoxtrapError::Automation(format!(
                "window search for {:?} printed {:?}, expected a numeric id",
                pattern,
                output.trim()
            ))
        })
    }

    /// Give a window focus so keystrokes land in it.
    pub fn activate_window(&self, window: &WindowRef) -> Result<()> {
        self.automation_output(&window::activate_args(self.pid(), window))?;
        Ok(())
    }

    /// Inject a sequence of key tokens into the focused window.
    ///
    /// All tokens go out in a single tool invocation to keep their
    /// relative timing tight.
    pub fn send_keys(&self, keys: &[&str]) -> Result<()> {
        self.automation_output(&window::key_args(keys))?;
        Ok(())
    }

    /// Focus a window, then type into it.
    ///
    /// Literal text goes in angle brackets and expands one keystroke
    /// per character; see [`expand_key_tokens`](super::expand_key_tokens).
    pub fn talk(&self, window: &WindowRef, keys: &[&str]) -> Result<()> {
        self.activate_window(window)?;
        self.send_keys(keys)
    }

    /// Run the automation tool and capture stdout, failing on non-zero exit.
    fn automation_output(&self, args: &[String]) -> Result<String> {
        debug!("Running {} {}", self.automation, args.join(" "));
        let output = Command::new(&self.automation)
            .args(args)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => FoxtrapError::AutomationNotFound(self.automation.clone()),
                _ => FoxtrapError::Automation(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FoxtrapError::Automation(format!(
                "{} {} exited with {}: {}",
                self.automation,
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    #[cfg(unix)]
    fn terminate(&mut self) {
        let pid = self.child.id() as i32;
        debug!("Sending SIGTERM to browser pid {}", pid);
        unsafe {
            libc::kill(pid, libc::SIGTERM);
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) {
        if let Err(e) = self.child.kill() {
            warn!("Failed to kill browser process: {}", e);
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        self.terminate();
        if let Err(e) = self.child.wait() {
            warn!("Failed to reap browser process: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod version_parsing {
        use super::*;

        #[test]
        fn takes_the_major_component() {
            assert_eq!(parse_major_version("Mozilla Firefox 52.0.1\n").unwrap(), 52);
        }

        #[test]
        fn handles_nightly_banners() {
            assert_eq!(parse_major_version("Mozilla Firefox 128.0a1").unwrap(), 128);
        }

        #[test]
        fn single_component_versions_work() {
            assert_eq!(parse_major_version("Firefox 9").unwrap(), 9);
        }

        #[test]
        fn rejects_banners_without_digits() {
            let err = parse_major_version("Mozilla Firefox").unwrap_err();
            assert!(matches!(err, FoxtrapError::VersionParse(_)));
        }

        #[test]
        fn rejects_absurdly_long_digit_runs() {
            let err = parse_major_version("Firefox 99999999999999999999").unwrap_err();
            assert!(matches!(err, FoxtrapError::VersionParse(_)));
        }
    }

    mod construction {
        use super::*;
        use crate::config::Config;

        #[test]
        fn from_config_picks_up_executables() {
            let mut config = Config::default();
            config.browser.executable = "/nonexistent/firefox".to_string();
            config.automation.executable = "/usr/bin/xdotool".to_string();

            let browser = Browser::from_config(&config);
            let err = browser.locate().unwrap_err();
            assert!(matches!(
                err,
                FoxtrapError::BrowserNotFound(name) if name == "/nonexistent/firefox"
            ));
        }
    }
}
