//! The launcher pipeline
//!
//! Single control thread, strict abort: parse, validate ownership, resolve
//! environment, rewrite arguments, run prelude calls synchronously, run the
//! main compose invocation, then spawn the per-service terminal sessions.
//! Only the volume wipe and the terminal spawns are best-effort.

use anyhow::Result;
use devup_core::attach;
use devup_core::compose::ComposeCommand;
use devup_core::config::{Configuration, ParseOutcome, USAGE};
use devup_core::env;
use devup_core::ownership;
use devup_core::rewrite::{self, PreludeCall};
use devup_core::terminal;
use std::path::Path;
use tracing::{debug, info};

/// Run the launcher over the raw mixed token stream.
pub fn run(tokens: Vec<String>) -> Result<()> {
    let config = match Configuration::parse(&tokens) {
        ParseOutcome::Help => {
            print!("{}", USAGE);
            return Ok(());
        }
        ParseOutcome::Parsed { config, .. } => config,
    };
    debug!("Configuration: {:?}", config);

    ownership::check(Path::new("."), config.exit_if_other_owners_found)?;

    let resolved_env = env::resolve(&config)?;
    let plan = rewrite::rewrite(&config.passthrough, &config);
    debug!("Rewrite plan: {:?}", plan);

    let mut compose = ComposeCommand::new(resolved_env);
    if let Some(docker) = std::env::var("DEVUP_DOCKER").ok().filter(|p| !p.is_empty()) {
        debug!("Using docker binary override: {}", docker);
        compose = compose.with_docker_path(docker);
    }

    for call in &plan.prelude {
        match call {
            PreludeCall::ForcedRemove => {
                info!("Stopping and removing containers");
                compose.forced_remove()?;
            }
            PreludeCall::DeleteDbVolume => {
                info!("Deleting database volume {}", rewrite::DB_VOLUME);
                compose.remove_volume(rewrite::DB_VOLUME);
            }
        }
    }

    compose.run(&plan.final_args)?;

    if !plan.dont_attach {
        let controller = terminal::detect();
        attach::attach_all(&compose, controller.as_ref());
    }

    Ok(())
}
