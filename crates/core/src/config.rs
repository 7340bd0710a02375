//! Launcher configuration and flag parsing
//!
//! The launcher CLI mixes its own control keywords with arguments destined
//! for docker compose. Recognition is a strict-prefix scan: keywords are
//! consumed from the head of the token list until the first token outside
//! the keyword set, which permanently ends recognition. Everything from that
//! token onward is carried verbatim as passthrough, even if a later token
//! happens to spell a keyword.

use tracing::debug;

/// Result of scanning the launcher's own keywords off the token stream.
///
/// Immutable once parsed; read by the environment resolver, the argument
/// rewriter and the attacher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Run database migrations on startup
    pub migrate: bool,
    /// Sync templates on startup
    pub sync_templates: bool,
    /// Skip opening per-service terminal sessions after startup
    pub dont_attach: bool,
    /// Abort when files owned by another user are found in the workspace
    pub exit_if_other_owners_found: bool,
    /// Delete the database volume before starting
    pub delete_db_volume: bool,
    /// Tear everything down first, then bring it back up
    pub up_down_restart: bool,
    /// Unrecognized tokens, verbatim and in original order
    pub passthrough: Vec<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            migrate: true,
            sync_templates: true,
            dont_attach: false,
            exit_if_other_owners_found: true,
            delete_db_volume: false,
            up_down_restart: false,
            passthrough: Vec::new(),
        }
    }
}

/// Outcome of a parse: either a configuration or a help request.
///
/// `help` short-circuits the whole pipeline, so it is surfaced as its own
/// variant instead of a flag on the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Normal parse; carries the configuration and the index of the first
    /// passthrough token.
    Parsed {
        config: Configuration,
        stopped_at: usize,
    },
    /// The `help` keyword was recognized in the flag prefix.
    Help,
}

impl Configuration {
    /// Scan control keywords off the head of `tokens`.
    ///
    /// Unrecognized leading tokens are not an error; they simply end flag
    /// recognition and become the head of the passthrough sequence.
    pub fn parse<I, S>(tokens: I) -> ParseOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(|t| t.as_ref().to_string()).collect();
        let mut config = Configuration::default();
        let mut stopped_at = tokens.len();

        for (index, token) in tokens.iter().enumerate() {
            match token.as_str() {
                "dont_migrate" => config.migrate = false,
                "dont_sync" => config.sync_templates = false,
                "dont_attach" | "da" => config.dont_attach = true,
                "wipe_db" => config.delete_db_volume = true,
                "restart" => config.up_down_restart = true,
                "restart_wipe" => {
                    config.delete_db_volume = true;
                    config.up_down_restart = true;
                }
                "ignore_ownership" => config.exit_if_other_owners_found = false,
                "help" => return ParseOutcome::Help,
                _ => {
                    stopped_at = index;
                    break;
                }
            }
        }

        config.passthrough = tokens[stopped_at..].to_vec();
        debug!(
            "Parsed {} control keyword(s), {} passthrough token(s)",
            stopped_at,
            config.passthrough.len()
        );

        ParseOutcome::Parsed { config, stopped_at }
    }
}

/// Usage text for the `help` keyword.
pub const USAGE: &str = "\
Usage: devup [keywords...] [compose args...]

Control keywords form a strict prefix; the first unrecognized token and
everything after it is forwarded to docker compose verbatim.

Keywords:
  dont_migrate      disable automatic database migration on startup
  dont_sync         disable automatic template syncing on startup
  dont_attach, da   do not open terminal sessions after startup
  wipe_db           delete the database volume before starting
  restart           stop and remove all containers, then `up`
  restart_wipe      restart plus database volume wipe
  ignore_ownership  downgrade the foreign-file-owner check to a warning
  help              show this message and exit

Examples:
  devup up --build
  devup dont_migrate da restart
  devup down
";

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tokens: &[&str]) -> (Configuration, usize) {
        match Configuration::parse(tokens) {
            ParseOutcome::Parsed { config, stopped_at } => (config, stopped_at),
            ParseOutcome::Help => panic!("unexpected help outcome"),
        }
    }

    #[test]
    fn test_defaults() {
        let (config, stopped_at) = parse(&[]);
        assert_eq!(config, Configuration::default());
        assert_eq!(stopped_at, 0);
        assert!(config.migrate);
        assert!(config.sync_templates);
        assert!(!config.dont_attach);
        assert!(config.exit_if_other_owners_found);
        assert!(!config.delete_db_volume);
        assert!(!config.up_down_restart);
    }

    #[test]
    fn test_flags_then_passthrough() {
        let (config, stopped_at) = parse(&["dont_migrate", "da", "up", "--build"]);
        assert!(!config.migrate);
        assert!(config.dont_attach);
        assert_eq!(stopped_at, 2);
        assert_eq!(config.passthrough, vec!["up", "--build"]);
    }

    #[test]
    fn test_recognition_stops_permanently() {
        // A keyword appearing after the first passthrough token stays passthrough.
        let (config, stopped_at) = parse(&["up", "dont_migrate"]);
        assert!(config.migrate);
        assert_eq!(stopped_at, 0);
        assert_eq!(config.passthrough, vec!["up", "dont_migrate"]);
    }

    #[test]
    fn test_restart_wipe_implies_both() {
        let (config, _) = parse(&["restart_wipe"]);
        assert!(config.delete_db_volume);
        assert!(config.up_down_restart);

        let (config, _) = parse(&["restart"]);
        assert!(!config.delete_db_volume);
        assert!(config.up_down_restart);
    }

    #[test]
    fn test_ignore_ownership() {
        let (config, _) = parse(&["ignore_ownership", "up"]);
        assert!(!config.exit_if_other_owners_found);
        assert_eq!(config.passthrough, vec!["up"]);
    }

    #[test]
    fn test_da_alias() {
        let (long, _) = parse(&["dont_attach"]);
        let (short, _) = parse(&["da"]);
        assert_eq!(long, short);
        assert!(short.dont_attach);
    }

    #[test]
    fn test_help_short_circuits() {
        assert_eq!(
            Configuration::parse(["dont_migrate", "help", "up"]),
            ParseOutcome::Help
        );
    }

    #[test]
    fn test_passthrough_preserves_exact_tokens() {
        let (config, _) = parse(&["wipe_db", "run", "--rm", "backend", "bash -c 'ls'"]);
        assert!(config.delete_db_volume);
        assert_eq!(
            config.passthrough,
            vec!["run", "--rm", "backend", "bash -c 'ls'"]
        );
    }

    #[test]
    fn test_usage_mentions_every_keyword() {
        for keyword in [
            "dont_migrate",
            "dont_sync",
            "dont_attach",
            "da",
            "wipe_db",
            "restart",
            "restart_wipe",
            "ignore_ownership",
            "help",
        ] {
            assert!(USAGE.contains(keyword), "usage missing {}", keyword);
        }
    }
}
