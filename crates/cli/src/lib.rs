pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "tripline",
    about = "Tripline operator CLI",
    long_about = "Inspect configuration, resolve airports, run trip tools against stored conversations and manage the context store.",
    after_help = "Examples:\n  tripline airports --city Mumbai\n  tripline run conv-1 flight_search --args '{\"origin\":\"Mumbai\",\"destination\":\"Dubai\",\"outboundDate\":\"2026-12-01\"}'\n  tripline show conv-1"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Resolve a city to its airport, or list every served city")]
    Airports {
        #[arg(long, help = "City to resolve")]
        city: Option<String>,
    },
    #[command(about = "Run one tool call against a conversation and persist the result")]
    Run {
        #[arg(help = "Conversation id")]
        conversation: String,
        #[arg(help = "Tool name: flight_search, update_summary, select_flight, confirm_booking")]
        tool: String,
        #[arg(long, help = "Tool arguments as a JSON object")]
        args: Option<String>,
    },
    #[command(about = "Print the stored trip context of a conversation")]
    Show {
        #[arg(help = "Conversation id")]
        conversation: String,
    },
    #[command(about = "List conversations with a stored trip context")]
    List,
    #[command(about = "Delete the stored trip context of a conversation")]
    Clear {
        #[arg(help = "Conversation id")]
        conversation: String,
    },
    #[command(about = "Apply pending SQLite migrations and return structured status output")]
    Migrate,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => commands::config::run(),
        Command::Airports { city } => commands::airports::run(city.as_deref()),
        Command::Run { conversation, tool, args } => {
            commands::turn::run(&conversation, &tool, args.as_deref())
        }
        Command::Show { conversation } => commands::conversation::show(&conversation),
        Command::List => commands::conversation::list(),
        Command::Clear { conversation } => commands::conversation::clear(&conversation),
        Command::Migrate => commands::migrate::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
