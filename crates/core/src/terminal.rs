//! Terminal session orchestration
//!
//! Opens one titled terminal session per requested command. Host capability
//! is detected once per process and a matching controller is selected, first
//! match wins: native tabs, scriptable whole-window automation, or no
//! automation at all. Sessions are fire-and-forget; nothing is awaited and a
//! failed spawn degrades to printing the command as a manual instruction
//! instead of aborting the run.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// A unit of work for the orchestrator: open a terminal titled `title` and
/// run `command` in it. Consumed once, then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalSessionRequest {
    pub title: String,
    pub command: String,
}

impl TerminalSessionRequest {
    pub fn new(title: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            command: command.into(),
        }
    }
}

/// Strategy for opening terminal sessions on this host.
///
/// Selected once per process via [`detect`]. `open` is side-effect only and
/// never returns a usable handle.
pub trait TerminalController: std::fmt::Debug {
    fn open(&self, request: &TerminalSessionRequest);
}

/// Probe host capability and select a controller, first match wins.
pub fn detect() -> Box<dyn TerminalController> {
    if find_on_path("gnome-terminal").is_some() {
        debug!("Terminal capability: gnome-terminal tabs");
        return Box::new(TabController);
    }
    if cfg!(target_os = "macos") && find_on_path("osascript").is_some() {
        debug!("Terminal capability: scriptable Terminal.app windows");
        return Box::new(ScriptedWindowController);
    }
    debug!("Terminal capability: none, falling back to manual instructions");
    Box::new(ManualFallback)
}

/// Host terminal supports native tabs (gnome-terminal).
#[derive(Debug)]
pub struct TabController;

impl TerminalController for TabController {
    fn open(&self, request: &TerminalSessionRequest) {
        let cwd = current_dir();
        let result = Command::new("gnome-terminal")
            .arg("--tab")
            .arg("--title")
            .arg(&request.title)
            .arg("--working-directory")
            .arg(&cwd)
            .arg("--")
            .arg("bash")
            .arg("-c")
            .arg(&request.command)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match result {
            Ok(_) => debug!("Opened tab '{}'", request.title),
            Err(e) => {
                warn!("Failed to open tab '{}': {}", request.title, e);
                ManualFallback.open(request);
            }
        }
    }
}

/// Host only supports whole-window automation (macOS Terminal.app via
/// osascript). The title is set in-band with a title-escape sequence before
/// the command runs.
#[derive(Debug)]
pub struct ScriptedWindowController;

impl TerminalController for ScriptedWindowController {
    fn open(&self, request: &TerminalSessionRequest) {
        let cwd = current_dir();
        let shell_line = format!(
            "printf '\\033]1;%s\\007' {}; cd {}; {}",
            shell_words::quote(&request.title),
            shell_words::quote(&cwd),
            request.command
        );
        let script = format!(
            "tell application \"Terminal\" to do script \"{}\"",
            shell_line.replace('\\', "\\\\").replace('"', "\\\"")
        );

        let result = Command::new("osascript")
            .arg("-e")
            .arg(&script)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match result {
            Ok(_) => debug!("Opened window '{}'", request.title),
            Err(e) => {
                warn!("Failed to open window '{}': {}", request.title, e);
                ManualFallback.open(request);
            }
        }
    }
}

/// No automation available: print the command as a manual instruction.
#[derive(Debug)]
pub struct ManualFallback;

impl TerminalController for ManualFallback {
    fn open(&self, request: &TerminalSessionRequest) {
        warn_capability_once();
        println!("[{}] run this yourself:", request.title);
        println!("  {}", request.command);
    }
}

static CAPABILITY_WARNED: AtomicBool = AtomicBool::new(false);

/// Emit the generic capability warning, at most once per process run.
///
/// Returns whether this call emitted it.
pub fn warn_capability_once() -> bool {
    if CAPABILITY_WARNED.swap(true, Ordering::SeqCst) {
        return false;
    }
    warn!(
        "No terminal automation available on this host; session commands will be printed for you to run manually"
    );
    true
}

fn current_dir() -> String {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .to_string_lossy()
        .to_string()
}

/// Search PATH for an executable.
fn find_on_path(binary: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        let candidate = dir.join(binary);
        if is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
