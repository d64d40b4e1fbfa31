//! Argument builders for the window-automation tool.
//!
//! Kept as pure functions so the exact command lines can be tested
//! without a display server.

/// How to address a browser window in an automation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowRef {
    /// A numeric window id previously returned by a search.
    Id(u64),
    /// A title pattern, resolved against the session's process id.
    Name(String),
}

/// Arguments for resolving a window id from a title pattern.
///
/// Scoped to `pid` so a stray window from another browser instance
/// cannot match. `--sync` blocks until the window exists.
pub fn search_args(pid: u32, pattern: &str) -> Vec<String> {
    vec![
        "search".to_string(),
        "--sync".to_string(),
        "--limit".to_string(),
        "1".to_string(),
        "--all".to_string(),
        "--pid".to_string(),
        pid.to_string(),
        "--name".to_string(),
        pattern.to_string(),
    ]
}

/// Arguments for focusing a window.
///
/// A known id activates directly; a pattern chains a search in front
/// so the whole thing stays one tool invocation.
pub fn activate_args(pid: u32, window: &WindowRef) -> Vec<String> {
    match window {
        WindowRef::Id(id) => vec![
            "windowactivate".to_string(),
            "--sync".to_string(),
            id.to_string(),
        ],
        WindowRef::Name(pattern) => {
            let mut args = search_args(pid, pattern);
            args.push("windowactivate".to_string());
            args.push("--sync".to_string());
            args
        }
    }
}

/// Arguments for typing a sequence of key tokens into the focused window.
pub fn key_args(keys: &[&str]) -> Vec<String> {
    let mut args = vec!["key".to_string()];
    args.extend(expand_key_tokens(keys));
    args
}

/// Expand key tokens into the form the automation tool expects.
///
/// A token wrapped in angle brackets is literal text: each character
/// becomes its own keystroke, with spaces spelled as `space`. Anything
/// else (chord names like `ctrl+t`, keysyms like `Return`) passes
/// through untouched.
pub fn expand_key_tokens(keys: &[&str]) -> Vec<String> {
    let mut expanded = Vec::new();
    for key in keys {
        if key.len() >= 2 && key.starts_with('<') && key.ends_with('>') {
            for c in key[1..key.len() - 1].chars() {
                if c == ' ' {
                    expanded.push("space".to_string());
                } else {
                    expanded.push(c.to_string());
                }
            }
        } else {
            expanded.push(key.to_string());
        }
    }
    expanded
}
