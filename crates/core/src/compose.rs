//! Docker Compose invocation
//!
//! The seam to the orchestration engine. The launcher only ever issues a
//! fixed shape of commands: `docker compose` against the development
//! manifest pair, a container-identity lookup by service name, and a
//! best-effort named-volume delete. Engine semantics (build, start, stop)
//! live entirely on the other side of this boundary.

use crate::errors::{ComposeError, DevupError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, instrument, warn};

/// Compose manifests submitted with every invocation, in order.
pub const COMPOSE_FILES: &[&str] = &["docker-compose.yml", "docker-compose.dev.yml"];

/// Compose project name; also prefixes named volumes.
pub const PROJECT_NAME: &str = "devup";

/// A running service as reported by `docker compose ps`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeService {
    /// Service name
    pub name: String,
    /// Container ID (if running)
    pub container_id: Option<String>,
    /// Service state
    pub state: String,
    /// Service status
    pub status: String,
}

/// Docker Compose command builder.
///
/// Holds everything constant across invocations: the docker binary, the
/// manifest pair, the project name, and the resolved environment exported
/// onto each spawned process.
#[derive(Debug)]
pub struct ComposeCommand {
    docker_path: String,
    compose_files: Vec<PathBuf>,
    project_name: String,
    env: BTreeMap<String, String>,
}

impl ComposeCommand {
    /// Create a builder for the standard development manifest pair.
    pub fn new(env: BTreeMap<String, String>) -> Self {
        Self {
            docker_path: "docker".to_string(),
            compose_files: COMPOSE_FILES.iter().map(PathBuf::from).collect(),
            project_name: PROJECT_NAME.to_string(),
            env,
        }
    }

    /// Set custom docker binary path (the `DEVUP_DOCKER` override).
    pub fn with_docker_path(mut self, docker_path: String) -> Self {
        self.docker_path = docker_path;
        self
    }

    /// Build a `docker compose` invocation with the given arguments.
    pub fn build_command<S: AsRef<str>>(&self, args: &[S]) -> Command {
        let mut command = Command::new(&self.docker_path);
        command.arg("compose");

        for file in &self.compose_files {
            command.arg("-f").arg(file);
        }

        command.arg("-p").arg(&self.project_name);
        command.args(args.iter().map(|a| a.as_ref().to_string()));
        command.envs(&self.env);

        command
    }

    /// Run a compose invocation with inherited stdio, blocking until it
    /// exits. A nonzero status propagates with the child's own exit code.
    #[instrument(skip(self))]
    pub fn run(&self, args: &[String]) -> Result<()> {
        debug!(
            "Running: {} compose {} {}",
            self.docker_path,
            self.compose_files
                .iter()
                .map(|f| format!("-f {}", f.display()))
                .collect::<Vec<_>>()
                .join(" "),
            args.join(" ")
        );

        let status = self
            .build_command(args)
            .status()
            .map_err(|e| DevupError::Compose(ComposeError::Spawn(e.to_string())))?;

        if status.success() {
            Ok(())
        } else {
            Err(DevupError::Compose(ComposeError::Failed {
                code: status.code().unwrap_or(1),
            }))
        }
    }

    /// Forced stop-and-remove-with-volumes against the compose project.
    #[instrument(skip(self))]
    pub fn forced_remove(&self) -> Result<()> {
        let args: Vec<String> = crate::rewrite::FORCED_REMOVE_ARGS
            .iter()
            .map(|s| s.to_string())
            .collect();
        self.run(&args)
    }

    /// Delete a named volume, best-effort. A volume that does not exist (or
    /// is still held by a container) is not an error.
    #[instrument(skip(self))]
    pub fn remove_volume(&self, volume: &str) {
        let result = Command::new(&self.docker_path)
            .arg("volume")
            .arg("rm")
            .arg(volume)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match result {
            Ok(status) if status.success() => debug!("Removed volume {}", volume),
            Ok(_) => debug!("Volume {} not removed (likely absent); continuing", volume),
            Err(e) => warn!("Could not run docker volume rm {}: {}", volume, e),
        }
    }

    /// List services with their status via `ps --format json`.
    #[instrument(skip(self))]
    pub fn ps(&self) -> Result<Vec<ComposeService>> {
        let output = self
            .build_command(&["ps", "--format", "json"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| DevupError::Compose(ComposeError::Spawn(e.to_string())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DevupError::Compose(ComposeError::Parse {
                message: format!("docker compose ps failed: {}", stderr.trim()),
            }));
        }

        parse_ps_output(&String::from_utf8_lossy(&output.stdout))
    }

    /// Resolve the running container bound to `service`.
    ///
    /// Exactly one container is expected per service in this project; zero
    /// or multiple is the engine's own boundary and is not validated here.
    #[instrument(skip(self))]
    pub fn container_id_for(&self, service: &str) -> Result<Option<String>> {
        let services = self.ps()?;
        let found = services
            .iter()
            .find(|s| s.name == service)
            .and_then(|s| s.container_id.clone());

        debug!("Container lookup for service {}: {:?}", service, found);
        Ok(found)
    }
}

/// Parse `docker compose ps --format json` output.
///
/// Newer compose versions emit one JSON object per line; older ones emit a
/// single array. Both are handled.
fn parse_ps_output(json_output: &str) -> Result<Vec<ComposeService>> {
    let trimmed = json_output.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let values: Vec<serde_json::Value> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|e| {
            DevupError::Compose(ComposeError::Parse {
                message: format!("Failed to parse compose ps JSON: {}", e),
            })
        })?
    } else {
        trimmed
            .lines()
            .map(serde_json::from_str)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                DevupError::Compose(ComposeError::Parse {
                    message: format!("Failed to parse compose ps JSON: {}", e),
                })
            })?
    };

    let mut result = Vec::new();
    for value in values {
        result.push(ComposeService {
            name: value
                .get("Service")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
            container_id: value
                .get("ID")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            state: value
                .get("State")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
            status: value
                .get("Status")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_command_shape() {
        let cmd = ComposeCommand::new(BTreeMap::new());
        let command = cmd.build_command(&["up", "-d"]);

        let args: Vec<String> = command
            .get_args()
            .map(|s| s.to_string_lossy().to_string())
            .collect();

        assert_eq!(args[0], "compose");
        assert!(args.contains(&"-f".to_string()));
        assert!(args.contains(&"docker-compose.yml".to_string()));
        assert!(args.contains(&"docker-compose.dev.yml".to_string()));
        assert!(args.contains(&"-p".to_string()));
        assert!(args.contains(&PROJECT_NAME.to_string()));
        assert!(args.contains(&"up".to_string()));
        assert!(args.contains(&"-d".to_string()));
    }

    #[test]
    fn test_with_docker_path_overrides_program() {
        let cmd = ComposeCommand::new(BTreeMap::new())
            .with_docker_path("/opt/custom/docker".to_string());
        let command = cmd.build_command(&["ps"]);
        assert_eq!(command.get_program(), "/opt/custom/docker");
    }

    #[test]
    fn test_build_command_manifest_order() {
        let cmd = ComposeCommand::new(BTreeMap::new());
        let command = cmd.build_command(&["ps"]);
        let args: Vec<String> = command
            .get_args()
            .map(|s| s.to_string_lossy().to_string())
            .collect();

        let base = args
            .iter()
            .position(|a| a == "docker-compose.yml")
            .unwrap();
        let dev = args
            .iter()
            .position(|a| a == "docker-compose.dev.yml")
            .unwrap();
        assert!(base < dev, "dev manifest must override the base manifest");
    }

    #[test]
    fn test_build_command_exports_env() {
        let mut env = BTreeMap::new();
        env.insert("MIGRATE_ON_STARTUP".to_string(), "false".to_string());
        let cmd = ComposeCommand::new(env);
        let command = cmd.build_command(&["ps"]);

        let exported: Vec<(String, Option<String>)> = command
            .get_envs()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().to_string(),
                    v.map(|v| v.to_string_lossy().to_string()),
                )
            })
            .collect();

        assert!(exported
            .contains(&("MIGRATE_ON_STARTUP".to_string(), Some("false".to_string()))));
    }

    #[test]
    fn test_parse_ps_output_empty() {
        assert!(parse_ps_output("").unwrap().is_empty());
        assert!(parse_ps_output("  \n ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_ps_output_json_lines() {
        let output = r#"{"Service":"backend","ID":"abc123","State":"running","Status":"Up 2 minutes"}
{"Service":"web-frontend","ID":"def456","State":"running","Status":"Up 2 minutes"}"#;

        let services = parse_ps_output(output).unwrap();
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].name, "backend");
        assert_eq!(services[0].container_id.as_deref(), Some("abc123"));
        assert_eq!(services[1].name, "web-frontend");
    }

    #[test]
    fn test_parse_ps_output_array_form() {
        let output = r#"[{"Service":"celery","ID":"0ab","State":"running","Status":"Up"}]"#;
        let services = parse_ps_output(output).unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].name, "celery");
    }

    #[test]
    fn test_parse_ps_output_invalid_json() {
        assert!(parse_ps_output("not json").is_err());
    }

    #[test]
    fn test_parse_ps_output_missing_fields() {
        let services = parse_ps_output(r#"{"Service":"backend"}"#).unwrap();
        assert_eq!(services[0].name, "backend");
        assert!(services[0].container_id.is_none());
        assert_eq!(services[0].state, "unknown");
    }
}
