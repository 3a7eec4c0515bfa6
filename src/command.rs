use clap::{ArgAction, Subcommand};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a secret (prompts for the value if none is given)
    Write {
        /// Secret path, absolute or relative to prefix/env
        path: String,
        /// Secret value, or '-' to read from stdin (may end up in shell history)
        #[arg(long, short = 'v')]
        value: Option<String>,
        /// Read the value from a file
        #[arg(long, short = 'f')]
        file: Option<String>,
        /// Tag in key=value form (repeatable)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
        /// Overwrite an existing secret
        #[arg(
            long,
            action = ArgAction::Set,
            default_value_t = true,
            num_args = 0..=1,
            default_missing_value = "true"
        )]
        overwrite: bool,
    },
    /// Read a secret (interactive search if no path is given)
    Read {
        path: Option<String>,
        /// Print the value only, for scripts
        #[arg(long, short = 'q')]
        quiet: bool,
    },
    /// List secrets (all secrets, interactively, if no path is given)
    List {
        path: Option<String>,
        #[arg(long, short = 'r')]
        recursive: bool,
        /// Fuzzy-search the results
        #[arg(long, short = 'i')]
        interactive: bool,
    },
    /// Delete a secret
    Delete {
        path: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

/// Top-level subcommands. `version` needs no store connection.
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Print version information
    Version,
    #[command(flatten)]
    Secret(Command),
}
