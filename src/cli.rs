use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;
use crate::domain::{Domain, IdeaStatus, Priority, Vote};

fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightCyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::BrightMagenta.on_default())
}

pub fn styled_command() -> clap::Command {
    Cli::command()
}

#[derive(Debug, Parser)]
#[command(name = "opsboard")]
#[command(bin_name = "opsboard")]
#[command(version)]
#[command(about = "Idea intake, voting, and task checklists with optional shared sync")]
#[command(styles = cli_styles())]
pub struct Cli {
    #[arg(
        long,
        env = "OPSBOARD_DB_PATH",
        default_value = ".opsboard/state.sqlite",
        help = "Path to the local SQLite database."
    )]
    pub db: String,

    #[arg(
        long,
        env = "OPSBOARD_CONFIG",
        default_value = DEFAULT_CONFIG_PATH,
        help = "Path to the TOML configuration file."
    )]
    pub config: PathBuf,

    #[arg(
        short = 'u',
        long,
        env = "OPSBOARD_USER",
        help = "Acting user display name (stored for later runs)."
    )]
    pub user: Option<String>,

    #[arg(
        long,
        env = "OPSBOARD_REMOTE",
        help = "Shared SQLite file used as the remote store (overrides config)."
    )]
    pub remote: Option<PathBuf>,

    #[arg(long, help = "Do not contact the remote store.")]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Capture, vote on, and promote ideas.")]
    Idea(IdeaArgs),
    #[command(about = "Create and update tasks.")]
    Task(TaskArgs),
    #[command(about = "Open tasks for the acting user.")]
    Myday(ViewArgs),
    #[command(about = "This week's focused tasks.")]
    Priorities(ViewArgs),
    #[command(about = "Tasks with a due date, soonest first.")]
    Calendar(ViewArgs),
    #[command(about = "Show the audit trail.")]
    Log(LogArgs),
    #[command(about = "Write the board document as JSON.")]
    Export(ExportArgs),
    #[command(about = "Merge ideas and tasks from an exported document.")]
    Import(ImportArgs),
    #[command(about = "Replace local ideas and tasks with the remote collections.")]
    Pull(ViewArgs),
    #[command(about = "Pull, then apply remote changes until interrupted.")]
    Watch,
    #[command(about = "Show or set the acting user.")]
    User(UserArgs),
    #[command(about = "Generate or install shell completions.")]
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct IdeaArgs {
    #[command(subcommand)]
    pub command: IdeaSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum IdeaSubcommands {
    #[command(about = "Add an idea to the inbox.")]
    New(IdeaNewArgs),
    #[command(about = "Vote yes, no, or maybe as the acting user.")]
    Vote(VoteArgs),
    #[command(about = "Create a task from an idea.")]
    Promote(IdArgs),
    #[command(about = "Show the inbox grouped by status.", alias = "list")]
    Ls(InboxArgs),
    #[command(about = "Show the next idea waiting for a decision.")]
    Next(ViewArgs),
}

#[derive(Debug, Args)]
pub struct IdeaNewArgs {
    #[arg(help = "Idea title.")]
    pub title: String,

    #[arg(short = 'd', long = "desc", help = "Optional description text.")]
    pub desc: Option<String>,

    #[arg(long, default_value_t = Domain::Entreprise, help = "Business domain.")]
    pub domain: Domain,

    #[arg(short = 't', long, help = "Comma separated tags, e.g. \"#launch, q3\".")]
    pub tags: Option<String>,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct VoteArgs {
    #[arg(help = "Idea id.")]
    pub id: String,

    #[arg(help = "yes, no, or maybe.")]
    pub vote: Vote,
}

#[derive(Debug, Args)]
pub struct IdArgs {
    #[arg(help = "Entity id.")]
    pub id: String,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct InboxArgs {
    #[arg(short = 's', long, help = "Only show this status.")]
    pub status: Option<IdeaStatus>,

    #[arg(long, help = "Only show this domain.")]
    pub domain: Option<Domain>,

    #[arg(short = 'q', long, help = "Case-insensitive search over title and description.")]
    pub query: Option<String>,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum TaskSubcommands {
    #[command(about = "Add a task assigned to the acting user.")]
    New(TaskNewArgs),
    #[command(about = "Toggle a task between open and done.")]
    Done(IdArgs),
    #[command(about = "Toggle the weekly focus flag (at most 3 tasks).")]
    Focus(IdArgs),
    #[command(about = "Move the due date to tomorrow.")]
    Delay(IdArgs),
    #[command(about = "Show a domain checklist, open tasks first.", alias = "list")]
    Ls(ChecklistArgs),
}

#[derive(Debug, Args)]
pub struct TaskNewArgs {
    #[arg(help = "Task title.")]
    pub title: String,

    #[arg(short = 'd', long = "desc", help = "Optional description text.")]
    pub desc: Option<String>,

    #[arg(long, default_value_t = Domain::Entreprise, help = "Business domain.")]
    pub domain: Domain,

    #[arg(short = 't', long, help = "Comma separated tags.")]
    pub tags: Option<String>,

    #[arg(short = 'p', long, default_value_t = Priority::Low, help = "low, medium, or high.")]
    pub priority: Priority,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ChecklistArgs {
    #[arg(long, default_value_t = Domain::Entreprise, help = "Checklist domain.")]
    pub domain: Domain,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct LogArgs {
    #[arg(short = 'n', long, help = "Only show the most recent N entries.")]
    pub limit: Option<usize>,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(short = 'o', long, help = "Write to this file instead of stdout.")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[arg(help = "Document previously written by export.")]
    pub file: PathBuf,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum UserSubcommands {
    #[command(about = "Print the acting user.")]
    Show,
    #[command(about = "Store the acting user display name.")]
    Set(UserSetArgs),
}

#[derive(Debug, Args)]
pub struct UserSetArgs {
    #[arg(help = "Display name; an empty value clears it.")]
    pub name: String,
}

#[derive(Debug, Args)]
#[command(about = "Generate or install shell completions.")]
pub struct CompletionsArgs {
    #[arg(help = "Shell name (bash, zsh, fish). Auto-detected if omitted.")]
    pub shell: Option<String>,

    #[arg(
        short = 'i',
        long = "install",
        help = "Write completions to the canonical path for the shell."
    )]
    pub install: bool,
}

impl Commands {
    /// Whether the command connects to a configured remote and pulls first.
    pub fn wants_remote(&self) -> bool {
        !matches!(
            self,
            Commands::Completions(_) | Commands::Export(_) | Commands::User(_)
        )
    }

    /// Whether an empty acting user should be asked for on a terminal.
    pub fn wants_user_prompt(&self) -> bool {
        matches!(
            self,
            Commands::Idea(_) | Commands::Task(_) | Commands::Myday(_) | Commands::Watch
        )
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
