use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use saferide::api::TravelMode;

#[derive(Parser)]
#[command(name = "saferide")]
#[command(author, version, about)]
#[command(long_about = "Compare candidate routes by recorded crashes.\n\n\
    Ranks the alternatives between two places and shows which one is safest.\n\n\
    Examples:\n  \
    saferide rank \"Union Station, Denver\" \"Coors Field\"     Rank routes\n  \
    saferide rank -105.0,39.75 -104.99,39.76 -i             Explore routes interactively\n  \
    saferide suggest \"union sta\"                           Show place suggestions")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank the routes between two places by crash count
    Rank {
        /// Start: a place name or `lon,lat`
        #[arg(allow_hyphen_values = true)]
        from: String,

        /// Destination: a place name or `lon,lat`
        #[arg(allow_hyphen_values = true)]
        to: String,

        /// Travel mode (defaults to the configured mode)
        #[arg(long, value_enum)]
        mode: Option<Mode>,

        /// Crash search buffer around each route, in meters
        #[arg(long)]
        buffer_m: Option<f64>,

        /// Number of alternative routes to request (1-5)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=5))]
        max_alternatives: Option<u32>,

        /// Ask the service for its bundled fixture routes
        #[arg(long)]
        fixture: bool,

        /// Explore the routes with hover and select commands
        #[arg(short, long)]
        interactive: bool,
    },

    /// Show place suggestions for a partial query
    Suggest {
        /// Text typed so far
        query: String,

        /// Maximum number of suggestions (defaults to the configured limit)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=20))]
        limit: Option<u32>,

        /// Keep searching and pick a suggestion by number
        #[arg(short, long)]
        interactive: bool,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. api.base_url, api.mode, geocoder.limit)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Mode {
    Driving,
    Cycling,
    Walking,
}

impl From<Mode> for TravelMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Driving => TravelMode::Driving,
            Mode::Cycling => TravelMode::Cycling,
            Mode::Walking => TravelMode::Walking,
        }
    }
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Rank {
                from,
                to,
                mode,
                buffer_m,
                max_alternatives,
                fixture,
                interactive,
            }) => crate::commands::rank::run(crate::commands::rank::RankArgs {
                from,
                to,
                mode: mode.map(TravelMode::from),
                buffer_m,
                max_alternatives,
                fixture,
                interactive,
                quiet: self.quiet,
            }),
            Some(Commands::Suggest {
                query,
                limit,
                interactive,
            }) => crate::commands::suggest::run(&query, limit.map(|l| l as usize), interactive),
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                crate::commands::print_version();
                Ok(())
            }
            None => {
                use clap::CommandFactory;
                let mut cmd = Self::command();
                cmd.print_help()?;
                println!();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_rank_arguments() {
        let cli = Cli::try_parse_from([
            "saferide",
            "-v",
            "rank",
            "Union Station",
            "-104.99,39.76",
            "--mode",
            "cycling",
            "--max-alternatives",
            "2",
            "-i",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        let Some(Commands::Rank {
            from,
            to,
            mode,
            max_alternatives,
            interactive,
            fixture,
            ..
        }) = cli.command
        else {
            panic!("expected rank command");
        };
        assert_eq!(from, "Union Station");
        assert_eq!(to, "-104.99,39.76");
        assert!(matches!(mode, Some(Mode::Cycling)));
        assert_eq!(max_alternatives, Some(2));
        assert!(interactive);
        assert!(!fixture);
    }

    #[test]
    fn test_max_alternatives_out_of_range() {
        let result = Cli::try_parse_from(["saferide", "rank", "a", "b", "--max-alternatives", "9"]);
        assert!(result.is_err());
    }
}
