use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "medtracker")]
#[command(version, about = "Track daily medications and get reminded when a dose is due")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new medtracker project in the current directory
    Init,

    /// Add a medication
    Add {
        /// Medication name
        name: String,

        /// Dosage, e.g. "100mg"
        #[arg(long, short = 'd')]
        dosage: String,

        /// Time of day to take it, HH:MM (24h)
        #[arg(long, short = 't')]
        time: String,

        /// How often it is taken (daily, twice-daily, weekly, as-needed, ...)
        #[arg(long, short = 'f', default_value = "daily")]
        frequency: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List medications with today's status
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single medication
    Get {
        /// Medication reference (list position like "2" or UUID prefix like "a1b2c")
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change a medication's details
    Update {
        /// Medication reference (list position or UUID prefix)
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New dosage
        #[arg(long, short = 'd')]
        dosage: Option<String>,

        /// New time of day, HH:MM (24h)
        #[arg(long, short = 't')]
        time: Option<String>,

        /// New frequency
        #[arg(long, short = 'f')]
        frequency: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a medication
    Delete {
        /// Medication reference (list position or UUID prefix)
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Mark a medication taken, or not taken if it already was today
    Toggle {
        /// Medication reference (list position or UUID prefix)
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show today's completion
    Progress {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check for due medications once and notify
    Remind {
        /// Output due reminders as JSON
        #[arg(long)]
        json: bool,
    },

    /// Keep running and notify whenever a medication is due
    Watch,
}
