use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{get, home, sweep, unzip};
use crate::config::Config;

#[derive(Clone, Debug, Parser)]
#[command(name = "haul", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// Configuration file. Defaults to ~/.haul/config.toml when present.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log lifecycle details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "g", name = "get", about = "Download a file, or print a text resource")]
    Get(get::GetArgs),
    #[command(alias = "x", name = "unzip", about = "Extract a zip archive, flattened")]
    Unzip(unzip::UnzipArgs),
    #[command(name = "sweep", about = "Remove partial downloads left by earlier runs")]
    Sweep(sweep::SweepArgs),
    #[command(name = "home", about = "Print (and create) an application's home directory")]
    Home(home::HomeArgs),
}

impl Commands {
    /// Whether the command, with `config` applied, suppresses console output.
    pub fn is_silent(&self, config: &Config) -> bool {
        match self {
            Commands::Get(args) => args.silent || config.download.silent.unwrap_or(false),
            Commands::Unzip(args) => args.silent,
            Commands::Sweep(_) | Commands::Home(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        App::command().debug_assert();
    }

    #[test]
    fn test_parse_get_with_flags() {
        let app = App::try_parse_from([
            "haul",
            "get",
            "https://example.test/f.zip",
            "-o",
            "/tmp/out/f.zip",
            "--attempts",
            "5",
            "--stall-timeout",
            "500",
            "--silent",
            "--unzip",
            "/tmp/out/f",
        ])
        .unwrap();

        let Commands::Get(args) = app.cmd else {
            panic!("expected get");
        };
        assert_eq!(args.url, "https://example.test/f.zip");
        assert_eq!(args.output, Some(PathBuf::from("/tmp/out/f.zip")));
        assert_eq!(args.attempts, Some(5));
        assert_eq!(args.stall_timeout, Some(500));
        assert!(args.silent);
        assert!(!args.insecure);
    }

    #[test]
    fn test_silence_from_flag_or_config() {
        let get = App::try_parse_from(["haul", "get", "https://example.test/latest"]).unwrap();
        assert!(!get.cmd.is_silent(&Config::default()));

        let quiet = Config::parse("[download]\nsilent = true\n").unwrap();
        assert!(get.cmd.is_silent(&quiet));

        let unzip = App::try_parse_from(["haul", "unzip", "a.zip", "out", "-s"]).unwrap();
        assert!(unzip.cmd.is_silent(&Config::default()));

        // the download table does not apply to other commands
        let home = App::try_parse_from(["haul", "home", "tool"]).unwrap();
        assert!(!home.cmd.is_silent(&quiet));
    }

    #[test]
    fn test_unzip_requires_output() {
        let parsed = App::try_parse_from([
            "haul",
            "get",
            "https://example.test/f.zip",
            "--unzip",
            "/tmp/out",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let app = App::try_parse_from(["haul", "sweep", "--verbose", "--config", "c.toml"]).unwrap();
        assert!(app.verbose);
        assert_eq!(app.config, Some(PathBuf::from("c.toml")));
    }
}
