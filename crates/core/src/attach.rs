//! Container log/shell attachment
//!
//! Builds the per-service terminal sessions opened after startup: a
//! log-attach session for each long-running service and an interactive exec
//! session for the lint helpers. Failures are isolated per service; a
//! container that cannot be resolved leaves the service name in the built
//! command so the failure surfaces inside that session's own terminal, not
//! in the launcher.

use crate::compose::ComposeCommand;
use crate::terminal::{TerminalController, TerminalSessionRequest};
use tracing::{debug, warn};

/// How a service session attaches to its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachMode {
    /// Dump accumulated log output, then attach to the live stream.
    AttachLogs,
    /// Open an interactive execution session running the given command.
    ExecInteractive(&'static str),
}

/// One entry of the fixed attach table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAttachSpec {
    pub title: &'static str,
    pub service: &'static str,
    pub mode: AttachMode,
}

/// Services to attach to after startup, in the order their terminals open.
///
/// The order is cosmetic only; the host may still reorder the windows it
/// actually shows.
pub fn attach_table() -> Vec<ServiceAttachSpec> {
    vec![
        ServiceAttachSpec {
            title: "backend",
            service: "backend",
            mode: AttachMode::AttachLogs,
        },
        ServiceAttachSpec {
            title: "web frontend",
            service: "web-frontend",
            mode: AttachMode::AttachLogs,
        },
        ServiceAttachSpec {
            title: "celery",
            service: "celery",
            mode: AttachMode::AttachLogs,
        },
        ServiceAttachSpec {
            title: "export worker",
            service: "celery-export-worker",
            mode: AttachMode::AttachLogs,
        },
        ServiceAttachSpec {
            title: "beat worker",
            service: "celery-beat-worker",
            mode: AttachMode::AttachLogs,
        },
        ServiceAttachSpec {
            title: "web frontend lint",
            service: "web-frontend",
            mode: AttachMode::ExecInteractive("bash -c 'yarn run eslint --fix'"),
        },
        ServiceAttachSpec {
            title: "backend lint",
            service: "backend",
            mode: AttachMode::ExecInteractive("bash -c 'make lint'"),
        },
    ]
}

/// Build the shell command for one attach spec against a resolved container
/// target (container id, or the service name when resolution failed).
pub fn build_command(spec: &ServiceAttachSpec, target: &str) -> String {
    match &spec.mode {
        AttachMode::AttachLogs => {
            format!("docker logs {target} && docker attach {target}")
        }
        AttachMode::ExecInteractive(exec_command) => {
            format!("docker exec -it {target} {exec_command}")
        }
    }
}

/// Resolve each service in the attach table and delegate one session per
/// entry to the terminal controller, in table order.
pub fn attach_all(compose: &ComposeCommand, controller: &dyn TerminalController) {
    for spec in attach_table() {
        let target = match compose.container_id_for(spec.service) {
            Ok(Some(id)) => id,
            Ok(None) => {
                // Let the command fail visibly inside its own session.
                warn!(
                    "No running container for service {}; session will report the failure itself",
                    spec.service
                );
                spec.service.to_string()
            }
            Err(e) => {
                warn!(
                    "Container lookup for service {} failed ({}); session will report the failure itself",
                    spec.service, e
                );
                spec.service.to_string()
            }
        };

        let request = TerminalSessionRequest::new(spec.title, build_command(&spec, &target));
        debug!("Opening session '{}'", request.title);
        controller.open(&request);
    }
}
