use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(name = "anktui", version, about = "Spaced-repetition flashcards in your terminal")]
pub struct Cli {
    /// Path to config.json (defaults to the platform config dir)
    #[arg(long, env = "ANKTUI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding one JSON file per deck (overrides the config file)
    #[arg(long, env = "ANKTUI_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log at debug level unless ANKTUI_LOG says otherwise
    #[arg(long)]
    pub debug: bool,

    /// Launches the TUI when omitted
    #[command(subcommand)]
    pub cmd: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Deck operations
    #[command(subcommand)]
    Deck(DeckCmd),
    /// Card operations
    #[command(subcommand)]
    Card(CardCmd),
    /// Line-based study loop
    Study(StudyCmd),
    /// Retention statistics
    Stats(StatsCmd),
    /// Inspect or create the config file
    #[command(subcommand)]
    Config(ConfigCmd),
    /// Launch the terminal UI
    Tui,
}

#[derive(Debug, Subcommand, Clone)]
pub enum DeckCmd {
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    List,
    Rm {
        deck: String,
    },
    Edit {
        deck: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Debug, Subcommand, Clone)]
pub enum CardCmd {
    Add(CardAdd),
    List {
        #[arg(long)]
        deck: Option<String>,
        /// Case-insensitive match on either side of the card
        #[arg(long)]
        query: Option<String>,
    },
    Rm {
        #[arg(long)]
        deck: String,
        card_id: String,
    },
    Edit(CardEdit),
}

#[derive(Debug, Args, Clone)]
pub struct CardAdd {
    #[arg(long)]
    pub deck: String,
    #[arg(long)]
    pub front: String,
    #[arg(long)]
    pub back: String,
}

#[derive(Debug, Args, Clone)]
pub struct CardEdit {
    #[arg(long)]
    pub deck: String,
    pub card_id: String,
    #[arg(long)]
    pub front: Option<String>,
    #[arg(long)]
    pub back: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct StudyCmd {
    pub deck: String,
    /// Study every card instead of only due and new ones
    #[arg(long)]
    pub practice: bool,
    /// Cards in this sitting (defaults to study_session.cards_per_session)
    #[arg(long, allow_negative_numbers = true)]
    pub max: Option<i64>,
}

#[derive(Debug, Args, Clone)]
pub struct StatsCmd {
    #[arg(long)]
    pub deck: Option<String>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum ConfigCmd {
    /// Print where the config file is read from
    Path,
    /// Print the effective configuration
    Show,
    /// Write a config file with default values
    Init {
        #[arg(long)]
        force: bool,
    },
}
