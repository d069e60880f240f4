use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use confluence_core::Comparison;

#[derive(Parser, Debug)]
#[command(name = "confluence")]
#[command(about = "Read and edit Confluence Cloud pages over OAuth 2.0", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Env file holding the OAuth client settings and tokens
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Where tokens are read from and written to
    #[arg(long, global = true, value_enum, default_value_t = StoreKind::Env)]
    pub store: StoreKind,

    /// Print raw JSON instead of the key/value listing
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    /// Tokens live in the env file next to the client settings
    Env,
    /// Tokens live in the OS keychain
    Keyring,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Ge,
    Lt,
    Le,
}

impl From<CompareOp> for Comparison {
    fn from(op: CompareOp) -> Self {
        match op {
            CompareOp::Gt => Comparison::After,
            CompareOp::Ge => Comparison::OnOrAfter,
            CompareOp::Lt => Comparison::Before,
            CompareOp::Le => Comparison::OnOrBefore,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one page by id
    #[command(alias = "get")]
    Fetch { id: String },

    /// List one page of current pages
    #[command(alias = "ls")]
    FetchAll {
        /// Space key (defaults to SPACE_KEY from the env file)
        #[arg(long)]
        space: Option<String>,

        #[arg(long, default_value_t = 0)]
        offset: u32,

        #[arg(long, default_value_t = confluence_core::api::DEFAULT_PAGE_LIMIT)]
        limit: u32,
    },

    /// Pages modified relative to a date (YYYY-MM-DD or "YYYY-MM-DD HH:MM")
    FetchByUpdateDate {
        date: String,

        #[arg(long, value_enum, default_value_t = CompareOp::Gt)]
        op: CompareOp,
    },

    /// Replace a page's title and storage-format body
    Update {
        id: String,
        title: String,
        body: String,

        /// Version message
        #[arg(long)]
        message: Option<String>,
    },

    /// Delete a page
    #[command(alias = "rm")]
    Delete { id: String },

    /// List the sites the stored token can reach
    CheckAccess,

    /// Print the consent URL to start authorization
    AuthUrl,

    /// Trade an authorization code for tokens and store them
    AuthExchange { code: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_date_defaults_to_after() {
        let cli = Cli::parse_from(["confluence", "fetch-by-update-date", "2024-01-01"]);
        match cli.command {
            Commands::FetchByUpdateDate { date, op } => {
                assert_eq!(date, "2024-01-01");
                assert_eq!(Comparison::from(op), Comparison::After);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["confluence", "delete", "42", "--store", "keyring", "--json", "-v"]);
        assert_eq!(cli.store, StoreKind::Keyring);
        assert!(cli.json);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Delete { ref id } if id == "42"));
    }

    #[test]
    fn test_fetch_all_defaults() {
        let cli = Cli::parse_from(["confluence", "fetch-all"]);
        match cli.command {
            Commands::FetchAll { space, offset, limit } => {
                assert_eq!(space, None);
                assert_eq!(offset, 0);
                assert_eq!(limit, 25);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
