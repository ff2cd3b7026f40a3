use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "bitfall", version)]
#[command(about = "Falling binary and matrix glyph rain for the terminal", long_about = None)]
pub struct Cli {
    /// Settings file to use instead of the one in the config directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not reload the settings file when it changes.
    #[arg(long, default_value_t = false)]
    pub no_watch: bool,

    /// Print the effective settings as TOML and exit.
    #[arg(long, default_value_t = false)]
    pub print_config: bool,

    /// Write the default settings to the settings file and exit.
    #[arg(long, default_value_t = false)]
    pub write_default_config: bool,
}
