//! CLI argument parsing for the agent.

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments.
#[derive(Parser, Debug, Clone)]
#[command(about = "Watch credential files and report rotations")]
pub struct AgentArgs {
    /// Path to configuration file.
    #[arg(short, long)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl AgentArgs {
    /// Parse CLI arguments with a default config path.
    ///
    /// If no `--config` argument is provided, uses the default.
    pub fn parse_with_default(default_config: &'static str) -> Self {
        Self::parse_from_with_default(std::env::args_os(), default_config)
    }

    /// Parse the given arguments with a default config path.
    ///
    /// Exits the process with clap's usage message on invalid input.
    pub fn parse_from_with_default<I, T>(args: I, default_config: &'static str) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from_with_default(args, default_config).unwrap_or_else(|e| e.exit())
    }

    /// Parse the given arguments with a default config path, returning
    /// clap's error instead of exiting.
    pub fn try_parse_from_with_default<I, T>(
        args: I,
        default_config: &'static str,
    ) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        // The derive marks a non-optional field as required; the default covers it.
        let matches = <Self as clap::CommandFactory>::command()
            .mut_arg("config", |arg| arg.default_value(default_config).required(false))
            .try_get_matches_from(args)?;

        <Self as clap::FromArgMatches>::from_arg_matches(&matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let args =
            AgentArgs::try_parse_from_with_default(["credwatch-agent"], "credwatch.json5").unwrap();
        assert_eq!(args.config, PathBuf::from("credwatch.json5"));
        assert_eq!(args.log_level, None);
    }

    #[test]
    fn test_explicit_arguments() {
        let args = AgentArgs::try_parse_from_with_default(
            [
                "credwatch-agent",
                "--config",
                "/etc/credwatch/agent.json5",
                "--log-level",
                "debug",
            ],
            "credwatch.json5",
        )
        .unwrap();
        assert_eq!(args.config, PathBuf::from("/etc/credwatch/agent.json5"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_short_config_flag() {
        let args =
            AgentArgs::try_parse_from_with_default(["credwatch-agent", "-c", "a.json5"], "b.json5")
                .unwrap();
        assert_eq!(args.config, PathBuf::from("a.json5"));
    }

    #[test]
    fn test_default_follows_caller() {
        let args = AgentArgs::try_parse_from_with_default(["credwatch-agent"], "other.json5")
            .unwrap();
        assert_eq!(args.config, PathBuf::from("other.json5"));
    }

    #[test]
    fn test_unknown_flag_is_error() {
        let err = AgentArgs::try_parse_from_with_default(
            ["credwatch-agent", "--bogus"],
            "credwatch.json5",
        )
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
