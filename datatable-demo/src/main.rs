use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use datatable::prelude::*;
use serde_json::Value;
use simplelog::{Config, LevelFilter, WriteLogger};
use thiserror::Error;

const USAGE: &str = "usage: datatable-demo <rows.json> [--config cfg.json] [--sort col] \
                     [--search text] [--page n] [--out dir]";

#[derive(Debug, Error)]
enum DemoError {
    #[error("{0}")]
    Usage(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid json in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("rows file must hold an array of objects")]
    NotRows,
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug, Default)]
struct Args {
    rows: PathBuf,
    config: Option<PathBuf>,
    sort: Option<String>,
    search: Option<String>,
    page: Option<i64>,
    out: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, DemoError> {
        let mut parsed = Args::default();
        let mut rows = None;
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| DemoError::Usage(format!("{flag} needs a value\n{USAGE}")))
            };
            match arg.as_str() {
                "--config" => parsed.config = Some(value("--config")?.into()),
                "--sort" => parsed.sort = Some(value("--sort")?),
                "--search" => parsed.search = Some(value("--search")?),
                "--page" => {
                    let page = value("--page")?;
                    parsed.page = Some(page.parse().map_err(|_| {
                        DemoError::Usage(format!("--page expects a number, got {page:?}"))
                    })?);
                }
                "--out" => parsed.out = Some(value("--out")?.into()),
                "-h" | "--help" => return Err(DemoError::Usage(USAGE.to_string())),
                _ if rows.is_none() && !arg.starts_with("--") => rows = Some(PathBuf::from(&arg)),
                _ => return Err(DemoError::Usage(format!("unexpected argument {arg:?}\n{USAGE}"))),
            }
        }
        parsed.rows = rows.ok_or_else(|| DemoError::Usage(USAGE.to_string()))?;
        Ok(parsed)
    }
}

fn read_json(path: &Path) -> Result<Value, DemoError> {
    let text = std::fs::read_to_string(path).map_err(|source| DemoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DemoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn load_config(path: &Path) -> Result<TableConfig, DemoError> {
    let text = std::fs::read_to_string(path).map_err(|source| DemoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    TableConfig::from_json(&text).map_err(|source| DemoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// One column per key of the first row.
fn columns_for(rows: &[Value]) -> Vec<ColumnDef> {
    rows.first()
        .and_then(Value::as_object)
        .map(|first| {
            first
                .keys()
                .map(|key| ColumnDef::accessor(key.as_str(), key.as_str()))
                .collect()
        })
        .unwrap_or_default()
}

/// Pages are numbered from one on the command line.
fn zero_based(page: i64) -> i64 {
    page.saturating_sub(1)
}

fn print_view(view: &TableView) {
    let Some(ready) = view.ready() else {
        println!("(loading)");
        return;
    };

    let headers: Vec<String> = ready
        .headers
        .iter()
        .map(|header| match &header.kind {
            HeaderKind::SelectAll(_) => "[ ]".to_string(),
            HeaderKind::Data { label, sort, .. } => match sort {
                Some(SortDirection::Asc) => format!("{label} ^"),
                Some(SortDirection::Desc) => format!("{label} v"),
                None => label.clone(),
            },
        })
        .collect();
    println!("{}", headers.join(" | "));

    match &ready.body {
        TableBody::Empty { message, .. } => println!("{message}"),
        TableBody::Rows(rows) => {
            for row in rows {
                let cells: Vec<String> = row
                    .cells
                    .iter()
                    .map(|cell| match cell {
                        BodyCell::Checkbox(true) => "[x]".to_string(),
                        BodyCell::Checkbox(false) => "[ ]".to_string(),
                        BodyCell::Value(value) => value.to_string(),
                    })
                    .collect();
                println!("{}", cells.join(" | "));
            }
        }
    }

    if let Some(pagination) = &ready.pagination {
        println!("page {}", pagination.label);
    }
}

async fn run(args: Args) -> Result<(), DemoError> {
    let rows: Vec<Value> = match read_json(&args.rows)? {
        Value::Array(rows) if rows.iter().all(Value::is_object) => rows,
        _ => return Err(DemoError::NotRows),
    };
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => TableConfig::default(),
    };
    let debounce = config.debounce;
    log::info!("loaded {} rows from {}", rows.len(), args.rows.display());

    let has_ids = rows.iter().all(|row| row.get("id").is_some());
    let mut options = TableOptions::new(columns_for(&rows), rows)
        .config(config)
        .enable_row_selection(true)
        .enable_export(true)
        .export_scope(ExportScope::FilteredRows);
    if has_ids {
        options = options.get_row_id(|row: &Value| row["id"].to_string());
    }
    let engine = TableStateEngine::new(options)?;

    if let Some(column) = &args.sort
        && !engine.toggle_sort(column).is_handled()
    {
        log::warn!("cannot sort by {column:?}");
    }
    if let Some(search) = &args.search {
        engine.search_input(search.as_str());
        // Let the debounce elapse.
        tokio::time::sleep(debounce + std::time::Duration::from_millis(10)).await;
    }
    if let Some(page) = args.page {
        engine.go_to_page(zero_based(page));
    }

    print_view(&engine.view());

    let saver = DirectorySaver::new(args.out.as_deref().unwrap_or(Path::new(".")));
    let today = chrono::Local::now().date_naive();
    for format in [ExportFormat::Csv, ExportFormat::Workbook] {
        match engine.export(format, today)? {
            Some(artifact) => println!("saved {}", saver.save(&artifact)?.display()),
            None => println!("nothing to export"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Ok(log_file) = File::create("datatable-demo.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), log_file);
    }

    let result = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => run(args).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
