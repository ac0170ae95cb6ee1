use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use grid_core::logging::init_logging;
use grid_core::{GridConfig, TableController, TracingNavigator, TracingNotifier};
use grid_store::{FieldValue, InMemoryStore, Record, SortDirection};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

fn cli() -> Command {
    let data = Arg::new("data")
        .long("data")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("JSON array of records");
    let filter = Arg::new("filter")
        .long("filter")
        .help("Substring the display field must contain");
    let json = Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print the page as JSON");

    Command::new("recordgrid")
        .version(grid_core::VERSION)
        .about("Filter, sort, page and edit a set of records")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Override the configured log level"),
        )
        .subcommand(
            Command::new("page")
                .about("Print one page of records")
                .arg(data.clone())
                .arg(filter.clone())
                .arg(Arg::new("sort").long("sort").help("Field to sort by"))
                .arg(
                    Arg::new("direction")
                        .long("direction")
                        .default_value("asc")
                        .value_parser(value_parser!(SortDirection))
                        .help("asc or desc"),
                )
                .arg(
                    Arg::new("page")
                        .long("page")
                        .default_value("1")
                        .value_parser(value_parser!(usize))
                        .help("One-based page number"),
                )
                .arg(json.clone()),
        )
        .subcommand(
            Command::new("edit")
                .about("Stage inline edits, submit them and print the refreshed page")
                .arg(data)
                .arg(filter)
                .arg(
                    Arg::new("set")
                        .long("set")
                        .required(true)
                        .action(ArgAction::Append)
                        .value_name("ID:FIELD=VALUE")
                        .help("Draft edit; may be repeated"),
                )
                .arg(json),
        )
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    match run(&matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(matches: &ArgMatches) -> Result<()> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => GridConfig::load(path)?,
        None => GridConfig::default(),
    };
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.log.level = level.clone();
    }
    init_logging(&config.log)?;

    match matches.subcommand() {
        Some(("page", args)) => {
            let mut table = open_table(config, args)?;
            match args.get_one::<String>("filter") {
                Some(filter) => table.search(filter.as_str()).await?,
                None => table.load().await?,
            };
            if let Some(field) = args.get_one::<String>("sort") {
                let direction = args
                    .get_one::<SortDirection>("direction")
                    .copied()
                    .unwrap_or_default();
                table.sort_by(field.as_str(), direction).await?;
            }
            let page = args.get_one::<usize>("page").copied().unwrap_or(1);
            if page == 0 {
                bail!("pages are numbered from 1");
            }
            table.go_to_page(page - 1)?;
            print_page(&table, args.get_flag("json"))
        }
        Some(("edit", args)) => {
            let mut table = open_table(config, args)?;
            match args.get_one::<String>("filter") {
                Some(filter) => table.search(filter.as_str()).await?,
                None => table.load().await?,
            };
            for spec in args.get_many::<String>("set").into_iter().flatten() {
                let (id, field, value) = parse_edit(spec)?;
                table.stage_cell_edit(id, field, value)?;
            }
            let report = table.save_drafts().await?;
            eprintln!("{} records updated", report.submitted());
            print_page(&table, args.get_flag("json"))
        }
        _ => bail!("no subcommand given"),
    }
}

fn open_table(config: GridConfig, args: &ArgMatches) -> Result<TableController> {
    let path = args
        .get_one::<PathBuf>("data")
        .context("--data is required")?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let records: Vec<Record> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of records", path.display()))?;

    let store = InMemoryStore::from_records(records).with_display_field(config.display_field.clone());
    let table = TableController::new(
        config,
        Arc::new(store),
        Arc::new(TracingNotifier),
        Arc::new(TracingNavigator),
    )?;
    Ok(table)
}

/// Split `ID:FIELD=VALUE`; the value is read as JSON when it parses, else as text
fn parse_edit(spec: &str) -> Result<(String, String, FieldValue)> {
    let (id, assignment) = spec
        .split_once(':')
        .with_context(|| format!("expected ID:FIELD=VALUE, got {spec:?}"))?;
    let (field, raw) = assignment
        .split_once('=')
        .with_context(|| format!("expected ID:FIELD=VALUE, got {spec:?}"))?;
    if id.is_empty() || field.is_empty() {
        bail!("expected ID:FIELD=VALUE, got {spec:?}");
    }

    let value = serde_json::from_str::<FieldValue>(raw)
        .or_else(|_| serde_json::from_value(serde_json::Value::String(raw.to_string())))
        .unwrap_or_else(|_| FieldValue::from(raw));
    Ok((id.to_string(), field.to_string(), value))
}

fn print_page(table: &TableController, json: bool) -> Result<()> {
    let view = table.view();
    if json {
        let rows: Vec<&Record> = table.visible_rows().collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let display_field = &table.config().display_field;
    println!(
        "page {} of {} ({} records)",
        view.page_number() + 1,
        view.total_pages().max(1),
        view.total_count()
    );
    for record in table.visible_rows() {
        let label = record.text_of(display_field).unwrap_or_default();
        println!("{}\t{}", record.id, label);
    }
    Ok(())
}
