mod audit;
mod board;
mod cli;
mod clock;
mod completions;
mod config;
mod db;
mod domain;
mod ids;
mod listing;
mod remote;
mod snapshot;
mod store;
mod sync;
mod telemetry;
mod ui;

use std::sync::Arc;

use board::{Board, BoardError, NewIdea, NewTask};
use cli::{Cli, Commands, IdeaSubcommands, TaskSubcommands, UserSubcommands};
use config::Config;
use remote::SqliteRemote;
use store::LocalStore;
use sync::{RemoteFailure, SyncBridge};
use tokio::sync::mpsc;

fn main() {
    if let Err(err) = start() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn start() -> Result<(), BoardError> {
    use clap::Parser;

    let cli = Cli::parse();
    if let Commands::Completions(args) = &cli.command {
        return completions::run_completions_command(args.shell.as_deref(), args.install);
    }

    let config = Config::load(&cli.config)?;
    telemetry::init(&config.logging.level);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli, config))
}

fn print_json(value: &impl serde::Serialize) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("json serialization should work")
    );
}

/// An unreachable remote leaves the board local-only for this run.
fn connect_remote(
    cli: &Cli,
    config: &Config,
) -> (SyncBridge, Option<mpsc::UnboundedReceiver<RemoteFailure>>) {
    let path = cli.remote.clone().or_else(|| config.remote.path.clone());
    let Some(path) = path.filter(|_| !cli.offline && cli.command.wants_remote()) else {
        return (SyncBridge::disabled(), None);
    };

    let remote = match SqliteRemote::open(
        &path,
        config.remote.poll_interval(),
        config.remote.session_user.as_deref(),
    ) {
        Ok(remote) => remote,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "remote store unavailable; continuing with local data only"
            );
            return (SyncBridge::disabled(), None);
        }
    };
    tracing::debug!(path = %path.display(), "remote store opened");
    let (bridge, failures) = SyncBridge::connect(Arc::new(remote));
    (bridge, Some(failures))
}

async fn run(cli: Cli, config: Config) -> Result<(), BoardError> {
    let store = LocalStore::open(&cli.db)?;
    let (sync, failures) = connect_remote(&cli, &config);
    let mut board = Board::open(store, sync);

    if let Some(user) = cli.user.as_deref() {
        if user.trim() != board.current_user() {
            board.set_current_user(user)?;
        }
    }

    // `pull` bootstraps during dispatch.
    if !matches!(cli.command, Commands::Pull(_)) {
        board.bootstrap().await?;
    }

    if board.current_user().is_empty() && cli.command.wants_user_prompt() {
        if let Some(name) = ui::prompt_user_name()? {
            board.set_current_user(&name)?;
        }
    }

    let outcome = dispatch(&mut board, cli.command).await;
    board.close().await;
    if let Some(failures) = failures {
        report_remote_failures(failures);
    }
    outcome
}

fn report_remote_failures(mut failures: mpsc::UnboundedReceiver<RemoteFailure>) {
    let mut count = 0;
    while let Ok(failure) = failures.try_recv() {
        eprintln!("warning: {}", failure);
        count += 1;
    }
    if count > 0 {
        eprintln!("warning: {count} remote operation(s) failed; local data is saved");
    }
}

async fn dispatch(board: &mut Board, command: Commands) -> Result<(), BoardError> {
    match command {
        Commands::Idea(args) => match args.command {
            IdeaSubcommands::New(args) => {
                let idea = board.create_idea(NewIdea {
                    title: args.title,
                    description: args.desc.unwrap_or_default(),
                    domain: args.domain,
                    tags: args.tags.as_deref().map(domain::parse_tags).unwrap_or_default(),
                })?;
                if args.json {
                    print_json(&idea);
                } else {
                    print!("created ");
                    ui::print_idea(&idea);
                }
            }
            IdeaSubcommands::Vote(args) => {
                let voter = board.voter_identity().to_string();
                match board.cast_vote(&args.id, &voter, args.vote)? {
                    Some(idea) => {
                        println!("{} voted {} on {}", voter, args.vote, idea.id);
                        ui::print_idea(&idea);
                    }
                    None => println!("no idea '{}'", args.id),
                }
            }
            IdeaSubcommands::Promote(args) => match board.promote_idea(&args.id)? {
                Some(task) if args.json => print_json(&task),
                Some(task) => {
                    print!("promoted {} to ", args.id);
                    ui::print_task(&task);
                }
                None => println!("no idea '{}'", args.id),
            },
            IdeaSubcommands::Ls(args) => {
                let filter = listing::InboxFilter {
                    status: args.status,
                    domain: args.domain,
                    query: args.query,
                };
                let columns = listing::inbox(&board.snapshot().ideas, &filter);
                if args.json {
                    print_json(&columns);
                } else {
                    ui::print_inbox(&columns, &filter);
                }
            }
            IdeaSubcommands::Next(args) => {
                let next = listing::meeting(&board.snapshot().ideas);
                if args.json {
                    print_json(&next);
                } else {
                    ui::print_meeting(next);
                }
            }
        },
        Commands::Task(args) => match args.command {
            TaskSubcommands::New(args) => {
                let task = board.create_task(NewTask {
                    title: args.title,
                    description: args.desc.unwrap_or_default(),
                    domain: args.domain,
                    tags: args.tags.as_deref().map(domain::parse_tags).unwrap_or_default(),
                    priority: args.priority,
                })?;
                print_task_outcome("created", Some(task), args.json, "");
            }
            TaskSubcommands::Done(args) => {
                let task = board.toggle_task_done(&args.id)?;
                print_task_outcome("updated", task, args.json, &args.id);
            }
            TaskSubcommands::Focus(args) => {
                let task = board.toggle_task_focus(&args.id)?;
                print_task_outcome("updated", task, args.json, &args.id);
            }
            TaskSubcommands::Delay(args) => {
                let task = board.delay_task(&args.id)?;
                print_task_outcome("delayed", task, args.json, &args.id);
            }
            TaskSubcommands::Ls(args) => {
                let list = listing::checklist(&board.snapshot().tasks, args.domain);
                if args.json {
                    print_json(&list);
                } else {
                    ui::print_checklist(&list);
                }
            }
        },
        Commands::Myday(args) => {
            let tasks = listing::my_day(&board.snapshot().tasks, board.current_user());
            if args.json {
                print_json(&tasks);
            } else {
                ui::print_tasks("My day", &tasks, "nothing open for you today");
            }
        }
        Commands::Priorities(args) => {
            let tasks = listing::priorities(&board.snapshot().tasks);
            if args.json {
                print_json(&tasks);
            } else {
                ui::print_tasks("Weekly priorities", &tasks, "no focused tasks");
            }
        }
        Commands::Calendar(args) => {
            let entries = listing::calendar(&board.snapshot().tasks);
            if args.json {
                print_json(&entries);
            } else {
                ui::print_calendar(&entries);
            }
        }
        Commands::Log(args) => {
            let logs = &board.snapshot().logs;
            let start = args
                .limit
                .map_or(0, |limit| logs.len().saturating_sub(limit));
            let entries = &logs[start..];
            if args.json {
                print_json(&entries);
            } else {
                ui::print_log(entries);
            }
        }
        Commands::Export(args) => {
            let document = board.export_document()?;
            match args.out {
                Some(path) => {
                    std::fs::write(&path, format!("{document}\n"))?;
                    println!("exported to {}", path.display());
                }
                None => println!("{document}"),
            }
        }
        Commands::Import(args) => {
            let raw = std::fs::read_to_string(&args.file)?;
            let summary = board.import_document(&raw)?;
            if args.json {
                print_json(&summary);
            } else {
                ui::print_import_summary(&summary);
            }
        }
        Commands::Pull(args) => {
            let pulled = board.reauthenticate().await?;
            if args.json {
                print_json(&serde_json::json!({ "pulled": pulled }));
            } else if pulled {
                let snapshot = board.snapshot();
                println!(
                    "pulled {} idea(s) and {} task(s)",
                    snapshot.ideas.len(),
                    snapshot.tasks.len()
                );
            } else {
                println!("no remote available; local data unchanged");
            }
        }
        Commands::Watch => watch(board).await?,
        Commands::User(args) => match args.command {
            UserSubcommands::Show => {
                if board.current_user().is_empty() {
                    println!("(no user set; votes count as '{}')", board::ANONYMOUS_VOTER);
                } else {
                    println!("{}", board.current_user());
                }
            }
            UserSubcommands::Set(args) => {
                board.set_current_user(&args.name)?;
                println!("acting user set to '{}'", board.current_user());
            }
        },
        Commands::Completions(_) => unreachable!("completions are handled before startup"),
    }

    Ok(())
}

fn print_task_outcome(verb: &str, task: Option<domain::Task>, json: bool, id: &str) {
    match task {
        Some(task) if json => print_json(&task),
        Some(task) => {
            print!("{verb} ");
            ui::print_task(&task);
        }
        None => println!("no task '{id}'"),
    }
}

async fn watch(board: &mut Board) -> Result<(), BoardError> {
    let Some(mut changes) = board.subscribe().await else {
        return Err(BoardError::InvalidArgument(
            "watch needs a reachable remote; set remote.path or pass --remote".to_string(),
        ));
    };
    println!("watching for remote changes (ctrl-c to stop)");

    loop {
        tokio::select! {
            change = changes.recv() => {
                let Some(change) = change else {
                    tracing::warn!("remote change feed closed");
                    break;
                };
                let line = format!("{} {} changed", change.collection(), change.id());
                board.apply_remote_change(change)?;
                println!("{line}");
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
        }
    }
    Ok(())
}
