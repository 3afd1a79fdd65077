use std::path::Path;
use std::sync::Arc;
use std::{env, process};

use tempest::about;
use tempest::command::Command;
use tempest::host::{HtmlView, Session, ToolInstance};
use tempest::models::{AtomicStructure, Model, Volume, models_from_json_file};
use tempest::panel::{PAGE_ASSET_PATH, TempestPanel};
use tempest::tm_database::{
    CatalogResultsSource, DEFAULT_TM_CATALOG_PATH, ResultsSource, TmDatabaseCatalog,
};
use url::Url;

fn usage() {
    eprintln!(
        "Usage:\n  \
  tempest_cli --version\n  \
  tempest_cli [--catalog PATH] list-databases\n  \
  tempest_cli [--catalog PATH] fetch DATABASE_ID\n  \
  tempest_cli [--catalog PATH] [--models PATH] scheme URL [URL...]\n\n  \
  'scheme' feeds {scheme}: URLs through the panel dispatcher against a\n  \
  stub session and prints every script payload the page would receive.\n  \
  Known commands: {commands}",
        scheme = tempest::panel::CUSTOM_SCHEME,
        commands = [
            Command::UpdateModels.as_str(),
            Command::LoadDatabase.as_str(),
            Command::LoadJobFromDatabase.as_str(),
        ]
        .join(", ")
    );
}

struct CliOptions {
    catalog_path: String,
    models_path: Option<String>,
}

fn parse_global_args(args: &[String]) -> (CliOptions, usize) {
    let mut options = CliOptions {
        catalog_path: DEFAULT_TM_CATALOG_PATH.to_string(),
        models_path: None,
    };
    let mut idx = 1;
    while idx + 1 < args.len() {
        match args[idx].as_str() {
            "--catalog" => {
                options.catalog_path = args[idx + 1].clone();
                idx += 2;
            }
            "--models" => {
                options.models_path = Some(args[idx + 1].clone());
                idx += 2;
            }
            _ => break,
        }
    }
    (options, idx)
}

/// Session stand-in with a fixed model list.
struct StaticSession {
    models: Vec<Model>,
}

impl Session for StaticSession {
    fn models(&self) -> Vec<Model> {
        self.models.clone()
    }
}

/// Renderer stand-in that prints what the page would receive.
struct PrintingView;

impl HtmlView for PrintingView {
    fn set_url(&mut self, url: &str) {
        println!("-- page: {url}");
    }

    fn run_javascript(&mut self, script: &str) {
        println!("-- script:");
        print!("{script}");
    }
}

fn demo_models() -> Vec<Model> {
    vec![
        Model::AtomicStructure(AtomicStructure::new(1, "apoferritin")),
        Model::Volume(Volume {
            id: 2,
            name: "tomogram slab".to_string(),
        }),
        Model::AtomicStructure(AtomicStructure::new(3, "ribosome 60S")),
    ]
}

fn list_databases(catalog_path: &str) -> Result<(), String> {
    let catalog = TmDatabaseCatalog::from_json_file(catalog_path).map_err(|e| e.to_string())?;
    for id in catalog.list_databases() {
        let entry = catalog.entry(&id).map_err(|e| e.to_string())?;
        match &entry.description {
            Some(description) => println!("{id}  {description}"),
            None => println!("{id}"),
        }
    }
    Ok(())
}

fn fetch(catalog_path: &str, database_id: &str) -> Result<(), String> {
    let catalog = TmDatabaseCatalog::from_json_file(catalog_path).map_err(|e| e.to_string())?;
    let results = catalog.tm_results(database_id).map_err(|e| e.to_string())?;
    let text = serde_json::to_string_pretty(results.records())
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn run_scheme_urls(options: &CliOptions, raw_urls: &[String]) -> Result<(), String> {
    let models = match &options.models_path {
        Some(path) => models_from_json_file(path).map_err(|e| e.to_string())?,
        None => demo_models(),
    };
    let session = Arc::new(StaticSession { models });
    let source = CatalogResultsSource::new(options.catalog_path.clone());
    let mut panel = TempestPanel::with_parts(
        session,
        PrintingView,
        "Template matching",
        Path::new(PAGE_ASSET_PATH),
        Box::new(source),
    )
    .map_err(|e| e.to_string())?;

    for raw in raw_urls {
        let url = Url::parse(raw).map_err(|e| format!("Could not parse URL '{raw}': {e}"))?;
        panel.handle_scheme(&url).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    if let Err(e) = run() {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{}", about::version_cli_text());
        return Ok(());
    }

    let (options, cmd_idx) = parse_global_args(&args);
    if args.len() <= cmd_idx {
        usage();
        return Err("Missing command".to_string());
    }

    match args[cmd_idx].as_str() {
        "list-databases" => list_databases(&options.catalog_path),
        "fetch" => {
            let Some(database_id) = args.get(cmd_idx + 1) else {
                usage();
                return Err("fetch needs a DATABASE_ID".to_string());
            };
            fetch(&options.catalog_path, database_id)
        }
        "scheme" => {
            let raw_urls = &args[cmd_idx + 1..];
            if raw_urls.is_empty() {
                usage();
                return Err("scheme needs at least one URL".to_string());
            }
            run_scheme_urls(&options, raw_urls)
        }
        other => {
            usage();
            Err(format!("Unknown command '{other}'"))
        }
    }
}
