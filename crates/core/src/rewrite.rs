//! Argument rewriting
//!
//! Adapts the generic compose invocation the user typed to this launcher's
//! semantics: `down` gains forced-removal semantics, startup invocations are
//! auto-detached so terminals can be attached afterwards, restarts are
//! sequenced as teardown-then-up, and a database wipe is injected when
//! requested.
//!
//! Passthrough stays a token sequence throughout; it is flattened to a
//! single string only at the final display boundary. Matching verbs and
//! detach markers against tokens avoids the whitespace lossiness of
//! string-prefix matching.

use crate::config::Configuration;
use tracing::debug;

/// Arguments of the forced stop-and-remove-with-volumes call.
///
/// Stronger cleanup semantics than a plain `down`: containers are stopped,
/// removed, and their anonymous volumes deleted in one pass.
pub const FORCED_REMOVE_ARGS: &[&str] = &["rm", "--stop", "--force", "-v"];

/// Named volume backing the development database.
pub const DB_VOLUME: &str = "devup_pgdata";

/// A prelude call executed synchronously before the main compose invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreludeCall {
    /// Forced stop-and-remove-with-volumes against the compose project.
    ForcedRemove,
    /// Best-effort deletion of the database volume; absence is swallowed.
    DeleteDbVolume,
}

/// Result of rewriting the passthrough arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewritePlan {
    /// Calls to execute strictly before the main invocation, in order.
    pub prelude: Vec<PreludeCall>,
    /// Arguments of the main compose invocation.
    pub final_args: Vec<String>,
    /// Effective attach decision; may be forced on when there is nothing
    /// meaningful to attach to.
    pub dont_attach: bool,
}

/// Apply the rewrite rules, in order, to the passthrough tokens.
pub fn rewrite(passthrough: &[String], config: &Configuration) -> RewritePlan {
    let mut prelude = Vec::new();
    let mut dont_attach = config.dont_attach;

    // Rule 1: bare `down` gets forced-removal semantics.
    let mut final_args: Vec<String> = if passthrough == ["down"] {
        debug!("Rewriting `down` to forced stop-and-remove-with-volumes");
        FORCED_REMOVE_ARGS.iter().map(|s| s.to_string()).collect()
    } else {
        passthrough.to_vec()
    };

    // Rule 2: auto-detach startup invocations, or conclude there is nothing
    // to attach to.
    if !dont_attach {
        let starts_containers = matches!(
            final_args.first().map(String::as_str),
            Some("up") | Some("start")
        );
        if starts_containers || config.up_down_restart {
            if !has_detach_marker(&final_args) {
                debug!("Appending detach marker so the compose call returns immediately");
                final_args.push("-d".to_string());
            }
        } else {
            debug!("No startup verb and no restart; forcing dont_attach");
            dont_attach = true;
        }
    }

    // Rule 3: restart sequencing.
    if config.up_down_restart {
        prelude.push(PreludeCall::ForcedRemove);
        final_args.insert(0, "up".to_string());
    }

    // Rule 4: database wipe. Ordered after any teardown: the volume can
    // only be deleted once the containers holding it are gone.
    if config.delete_db_volume {
        prelude.push(PreludeCall::DeleteDbVolume);
    }

    RewritePlan {
        prelude,
        final_args,
        dont_attach,
    }
}

fn has_detach_marker(args: &[String]) -> bool {
    args.iter().any(|a| a == "-d" || a == "--detach")
}
