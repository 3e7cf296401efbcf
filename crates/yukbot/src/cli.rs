use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "yukbot")]
#[command(author, version, about = "PBS IMPEX Telegram bot: carrier onboarding, documents and broadcasts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (long polling unless --webhook is given)
    Run {
        /// Receive updates through the webhook server instead of long polling
        #[arg(long)]
        webhook: bool,
    },

    /// Print user counters from the snapshot file and exit
    Stats,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
