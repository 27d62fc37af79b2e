//! Classnotes CLI - turn course documents into stored Class / Topics / Notes

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Context;
use classnotes::config::{self, ClassnotesConfig};
use classnotes::server::{self, AppState};
use classnotes::store::{MemoryTransport, RestTransport, StoreClient};
use classnotes::structuring::OpenAiStructurer;
use classnotes::ui::{self, Icons, Spinner};
use classnotes::{document, extract, HierarchyDocument, HierarchyReader, HierarchyWriter, Structurer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "classnotes")]
#[command(version)]
#[command(about = "Structure course documents into Class -> Topics -> Notes and store them")]
#[command(long_about = r#"
Classnotes extracts text from PDF, DOCX or text files, asks an LLM to
restructure it into a class with topics and notes, and saves the result
through a REST table API.

Example usage:
  classnotes init
  classnotes ingest lecture-03.pdf
  classnotes show 12
  classnotes serve --port 8000
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Use an in-process store instead of the REST table API
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory with the static frontend
        #[arg(long)]
        static_dir: Option<String>,
    },

    /// Extract, structure and store a document
    Ingest {
        /// PDF, DOCX or text file
        file: PathBuf,

        /// Print the structured document without storing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Store an already structured `{"Class", "Topics"}` JSON file
    Store {
        file: PathBuf,
    },

    /// List stored classes
    Classes,

    /// List the topics of a class
    Topics {
        class_id: i64,
    },

    /// List the notes of a topic
    Notes {
        topic_id: i64,
    },

    /// Show a class with all of its topics and notes
    Show {
        class_id: i64,
    },

    /// Write a template config file
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let load = || config::load_config(cli.config.as_deref());

    match cli.command {
        Commands::Init { force } => {
            let path = cli.config.clone().unwrap_or_else(config::default_config_path);
            config::write_config(&path, &ClassnotesConfig::default(), force)?;
            ui::success(&format!("Wrote {}", path.display()));
        }

        Commands::Serve { host, port, static_dir } => {
            let mut cfg = load()?;
            if let Some(host) = host {
                cfg.server.host = host;
            }
            if let Some(port) = port {
                cfg.server.port = port;
            }
            if static_dir.is_some() {
                cfg.server.static_dir = static_dir;
            }

            let store = open_store(&cfg, cli.memory)?;
            let structurer = Arc::new(structurer(&cfg)?);
            let state = Arc::new(AppState::new(store, structurer));
            server::start_server(&cfg.server, state).await?;
        }

        Commands::Ingest { file, dry_run } => {
            let cfg = load()?;
            let bytes = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let file_name = file_name(&file);

            let spinner = Spinner::new(&format!("Extracting text from {}", file_name));
            let text = extract::extract_text(&file_name, &bytes)?;

            spinner.set_message(&format!("Structuring {} chars with the model", text.len()));
            let doc = structurer(&cfg)?.structure(&text).await?;
            spinner.finish();

            if dry_run {
                print_document(&doc, cli.json)?;
                return Ok(());
            }

            let writer = HierarchyWriter::new(open_store(&cfg, cli.memory)?);
            let class_id = writer.write_with_audit(&doc, Some(&text)).await?;
            report_saved(&doc, class_id, cli.json)?;
        }

        Commands::Store { file } => {
            let cfg = load()?;
            let contents = std::fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            let value: serde_json::Value = serde_json::from_str(&contents)?;
            let raw_text = document::raw_text(&value)?;
            let doc = HierarchyDocument::from_value(&value)?;

            let writer = HierarchyWriter::new(open_store(&cfg, cli.memory)?);
            let class_id = writer.write_with_audit(&doc, raw_text).await?;
            report_saved(&doc, class_id, cli.json)?;
        }

        Commands::Classes => {
            let cfg = load()?;
            let classes = reader(&cfg, cli.memory)?.list_classes().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&classes)?);
            } else if classes.is_empty() {
                println!("{}", ui::muted("No classes stored yet."));
            } else {
                ui::header(&format!("{} classes", classes.len()));
                println!("{}", ui::class_table(&classes));
            }
        }

        Commands::Topics { class_id } => {
            let cfg = load()?;
            let topics = reader(&cfg, cli.memory)?.list_topics(class_id).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&topics)?);
            } else if topics.is_empty() {
                println!("{}", ui::muted(&format!("No topics for class {}.", class_id)));
            } else {
                println!("{}", ui::topic_table(&topics));
            }
        }

        Commands::Notes { topic_id } => {
            let cfg = load()?;
            let notes = reader(&cfg, cli.memory)?.list_notes(topic_id).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else if notes.is_empty() {
                println!("{}", ui::muted(&format!("No notes for topic {}.", topic_id)));
            } else {
                println!("{}", ui::note_table(&notes));
            }
        }

        Commands::Show { class_id } => {
            let cfg = load()?;
            let hierarchy = reader(&cfg, cli.memory)?.get_hierarchy(class_id).await?;
            match hierarchy {
                Some(h) if !cli.json => {
                    ui::header(&format!("{} (class {})", h.name, h.id));
                    for (_, topic) in &h.topics {
                        ui::topic_block(&topic.title, &topic.notes);
                    }
                }
                Some(h) => println!("{}", serde_json::to_string_pretty(&h)?),
                None if cli.json => println!("{{}}"),
                None => ui::warn(&format!("Class {} not found", class_id)),
            }
        }
    }

    Ok(())
}

fn open_store(cfg: &ClassnotesConfig, memory: bool) -> anyhow::Result<StoreClient> {
    if memory {
        tracing::warn!("Using the in-process store; nothing will outlive this process");
        return Ok(StoreClient::new(MemoryTransport::new()));
    }
    let (url, key) = cfg.store_credentials()?;
    Ok(StoreClient::new(RestTransport::new(url, key)))
}

fn reader(cfg: &ClassnotesConfig, memory: bool) -> anyhow::Result<HierarchyReader> {
    Ok(HierarchyReader::new(open_store(cfg, memory)?))
}

fn structurer(cfg: &ClassnotesConfig) -> anyhow::Result<OpenAiStructurer> {
    let mut structurer = OpenAiStructurer::new(cfg.llm_api_key()?);
    if let Some(model) = &cfg.llm.model {
        structurer = structurer.with_model(model);
    }
    if let Some(base_url) = &cfg.llm.base_url {
        structurer = structurer.with_base_url(base_url);
    }
    Ok(structurer)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string())
}

fn print_document(doc: &HierarchyDocument, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(doc)?);
        return Ok(());
    }
    ui::header(&doc.class_name);
    for topic in &doc.topics {
        ui::section(&topic.title);
        for note in &topic.notes {
            println!("   • {}", note);
        }
    }
    Ok(())
}

fn report_saved(doc: &HierarchyDocument, class_id: i64, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "class_id": class_id }))?);
        return Ok(());
    }
    ui::success(&format!("Saved '{}' as class {}", doc.class_name.trim(), class_id));
    ui::status(Icons::TOPIC, "Topics", &doc.topics.len().to_string());
    ui::status(Icons::NOTE, "Notes", &doc.note_count().to_string());
    Ok(())
}
