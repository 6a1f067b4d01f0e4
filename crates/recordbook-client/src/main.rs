use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

use recordbook_client::console::{self, ConsoleInput};
use recordbook_client::render::{records_table, render};
use recordbook_client::{refresh, ApiClient, ClientError, ClientView, RecordForm};
use recordbook_shared::constants::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, REFRESH_INTERVAL_SECS};
use recordbook_shared::{ListQuery, RecordPatch};

#[derive(Debug, Parser)]
#[command(name = "recordbook-client", version, about = "Terminal client for the recordbook API")]
struct Cli {
    /// Base URL of the recordbook server.
    #[arg(long, env = "RECORDBOOK_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a record.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
    /// List one page of records.
    List {
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one record.
    Get { id: i64 },
    /// Replace some fields of a record.
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        message: Option<String>,
    },
    /// Delete a record.
    Delete { id: i64 },
    /// Count all records.
    Count,
    /// Keep a live table on screen, refreshed on an interval.
    Watch {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,
        /// Seconds between refreshes.
        #[arg(long, default_value_t = REFRESH_INTERVAL_SECS, value_parser = clap::value_parser!(u64).range(1..))]
        every: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("recordbook_client=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let api = ApiClient::new(&cli.api_url).context("failed to build HTTP client")?;

    match cli.command {
        Command::Add {
            name,
            email,
            message,
        } => {
            let form = RecordForm::new(name, email, message);
            let errors = form.validate();
            if !errors.is_empty() {
                for message in [&errors.name, &errors.email, &errors.message]
                    .into_iter()
                    .flatten()
                {
                    eprintln!("{message}");
                }
                bail!("the record was not submitted");
            }
            let record = api.create(&form.to_input()).await.map_err(explain)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::List {
            page,
            limit,
            search,
        } => {
            let page = api
                .list(&ListQuery::new(page, limit, search))
                .await
                .map_err(explain)?;
            println!("{}", records_table(&page.data));
            println!(
                "page {} of {} ({} records)",
                page.page, page.total_pages, page.total
            );
        }
        Command::Get { id } => {
            let record = api.get(id).await.map_err(explain)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Update {
            id,
            name,
            email,
            message,
        } => {
            let patch = RecordPatch {
                name,
                email,
                message,
            };
            let record = api.update(id, &patch).await.map_err(explain)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Delete { id } => {
            api.delete(id).await.map_err(explain)?;
            println!("deleted record {id}");
        }
        Command::Count => {
            println!("{}", api.count().await.map_err(explain)?);
        }
        Command::Watch {
            search,
            limit,
            every,
        } => watch(api, search, limit, Duration::from_secs(every)).await?,
    }

    Ok(())
}

/// Turn a client error into a message fit for the terminal.
fn explain(err: ClientError) -> anyhow::Error {
    match err {
        ClientError::Validation(fields) => {
            let details: Vec<String> = fields
                .iter()
                .map(|f| format!("{}: {}", f.field, f.message))
                .collect();
            anyhow::anyhow!("validation failed ({})", details.join("; "))
        }
        other => anyhow::Error::new(other),
    }
}

async fn watch(
    api: ApiClient,
    search: Option<String>,
    limit: u32,
    every: Duration,
) -> anyhow::Result<()> {
    let mut view = ClientView::new(limit);
    if let Some(term) = search {
        view.set_search(term);
    }

    let (handle, task) = refresh::spawn(api, view, every);

    let mut snapshots = handle.subscribe();
    let painter = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let view = snapshots.borrow_and_update().clone();
            println!("{}", render(&view));
        }
    });

    println!("{}", console::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match console::parse(&line) {
            ConsoleInput::Commands(commands) => {
                for command in commands {
                    if !handle.send(command).await {
                        bail!("refresh loop stopped unexpectedly");
                    }
                }
            }
            ConsoleInput::Help => println!("{}", console::HELP),
            ConsoleInput::Quit => break,
            ConsoleInput::Unknown(input) => println!("unknown command: {input} (try `help`)"),
        }
    }

    drop(handle);
    task.await?;
    painter.await?;
    Ok(())
}
