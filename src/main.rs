//! Headless driver for the gallery client.
//!
//! Reads one command per line from stdin, feeds the matching event into the
//! runtime, and prints a text frame to stdout whenever the view changes.
//! Replies and timers arrive asynchronously and trigger frames on their own.
//!
//! # Usage
//!
//! ```text
//! tapestry-client [config.toml] [--server-url <url>] [--dataset <id>] [--log-level <filter>]
//! ```
//!
//! # Commands
//!
//! - `search <text>`: Type into the search box (empty text clears it)
//! - `dataset <id>`: Select a dataset
//! - `collection <id>` / `collection -`: View a collection / return to browsing
//! - `refresh`: Reload the current view
//! - `scroll <top> <viewport> <height>`: Report a scroll position
//! - `drag <index>`: Start dragging a grid tile
//! - `over grid <index>` / `over sidebar <id>` / `over search`: Hover a target
//! - `drop grid <index>` / `drop sidebar <id>` / `drop search` / `drop zone`: Release
//! - `cancel`: End the drag without dropping
//! - `upload <file>`: Upload an image file
//! - `new <name>`, `rename <id> <name>`, `delete <id>`, `remove <id> <image>`
//! - `preview <index>`, `next`, `prev`, `close`
//! - `columns <count> <container_width>`
//! - `dismiss`: Dismiss the notice
//! - `quit`

#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Instrument;

use tapestry_client::app::drag::DropData;
use tapestry_client::app::{DropPayload, DropTarget, ScrollMetrics};
use tapestry_client::runtime::Runtime;
use tapestry_client::storage::{HttpBackend, PreferenceStore, UploadFile};
use tapestry_client::worker::GalleryWorker;
use tapestry_client::{infrastructure, observability, ui, Config, Event, GallerySession};

#[derive(Parser, Debug)]
#[command(version, about = "Headless driver for the Tapestry gallery client")]
struct Cli {
    #[arg(help = "TOML configuration file")]
    config: Option<PathBuf>,

    #[arg(help = "Base URL of the image service", long)]
    server_url: Option<String>,

    #[arg(help = "Dataset to select at startup", long)]
    dataset: Option<String>,

    #[arg(help = "Log filter directive, e.g. debug or tapestry_client=trace", long)]
    log_level: Option<String>,
}

impl Cli {
    /// Loads the configuration file, if any, and applies command line overrides.
    fn into_config(self) -> tapestry_client::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml_file(path)?,
            None => Config::default(),
        };
        if let Some(server_url) = self.server_url {
            config.server_url = server_url;
        }
        if let Some(dataset) = self.dataset {
            config.dataset_id = Some(dataset);
        }
        if let Some(level) = self.log_level {
            config.trace_level = Some(level);
        }
        Ok(config)
    }
}

/// What a line of input asks for.
enum Command {
    Event(Event),
    Quit,
}

fn main() -> ExitCode {
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("tapestry-client: {e}");
            return ExitCode::FAILURE;
        }
    };
    observability::init_tracing(&config);

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("tapestry-client: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let span = tracing::debug_span!("client_run", server_url = %config.server_url);
    match rt.block_on(run(config).instrument(span)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tapestry-client: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> tapestry_client::Result<()> {
    let backend = HttpBackend::new(&config.server_url)?;
    let store = PreferenceStore::new(infrastructure::preferences_path(&config))
        .map_err(|e| tracing::warn!(error = %e, "preferences will not be saved"))
        .ok();
    let session = tapestry_client::initialize(&config);
    let mut runtime = Runtime::new(session, GalleryWorker::new(Arc::new(backend)), store);

    if runtime.dispatch(&Event::Init) {
        print_frame(runtime.session());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Ok(Some(line)) = line else {
                    break;
                };
                match parse_command(&line, runtime.session()) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::Event(event))) => {
                        if runtime.dispatch(&event) {
                            print_frame(runtime.session());
                        }
                    }
                    Ok(None) => {}
                    Err(message) => eprintln!("{message}"),
                }
            }
            Some(event) = runtime.next_event() => {
                if runtime.dispatch(&event) {
                    print_frame(runtime.session());
                }
            }
        }
    }

    tracing::debug!("client shutting down");
    Ok(())
}

fn print_frame(session: &GallerySession) {
    println!("{}", ui::render(session));
}

fn parse_command(line: &str, session: &GallerySession) -> Result<Option<Command>, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let args: Vec<&str> = rest.split_whitespace().collect();

    let event = match verb {
        "" => return Ok(None),
        "quit" | "exit" => return Ok(Some(Command::Quit)),
        "search" => Event::SearchInput(rest.to_string()),
        "dataset" => Event::SelectDataset(required(&args, 0, "dataset <id>")?.to_string()),
        "collection" => match required(&args, 0, "collection <id|->")? {
            "-" => Event::SelectCollection(None),
            id => Event::SelectCollection(Some(id.to_string())),
        },
        "refresh" => Event::Refresh,
        "scroll" => Event::Scrolled {
            metrics: ScrollMetrics {
                scroll_top: number(&args, 0, "scroll <top> <viewport> <height>")?,
                viewport_height: number(&args, 1, "scroll <top> <viewport> <height>")?,
                scroll_height: number(&args, 2, "scroll <top> <viewport> <height>")?,
            },
            at: Instant::now(),
        },
        "drag" => Event::DragStarted {
            source_index: Some(number(&args, 0, "drag <index>")?),
        },
        "over" => Event::DragOver {
            target: parse_target(&args)?,
        },
        "drop" => {
            let target = parse_target(&args)?;
            let Some(source) = session.drag.gesture().and_then(|g| g.source.as_deref()) else {
                return Err("no tile is being dragged".to_string());
            };
            Event::Dropped {
                target: Some(target),
                payload: DropPayload::Internal(DropData::internal(source).to_json()),
            }
        }
        "cancel" => Event::DragEnded,
        "upload" => Event::Upload(read_upload(Path::new(required(&args, 0, "upload <file>")?))?),
        "new" => Event::CreateCollection { name: rest.to_string() },
        "rename" => {
            let collection_id = required(&args, 0, "rename <id> <name>")?.to_string();
            let name = rest[collection_id.len()..].trim().to_string();
            Event::RenameCollection { collection_id, name }
        }
        "delete" => Event::DeleteCollection {
            collection_id: required(&args, 0, "delete <id>")?.to_string(),
        },
        "remove" => Event::RemoveFromCollection {
            collection_id: required(&args, 0, "remove <id> <image>")?.to_string(),
            identity: required(&args, 1, "remove <id> <image>")?.to_string(),
        },
        "preview" => Event::OpenPreview(number(&args, 0, "preview <index>")?),
        "next" => Event::PreviewNext,
        "prev" => Event::PreviewPrevious,
        "close" => Event::ClosePreview,
        "columns" => Event::SetGridColumns {
            requested: number(&args, 0, "columns <count> <container_width>")?,
            container_width: number(&args, 1, "columns <count> <container_width>")?,
        },
        "dismiss" => Event::DismissNotice,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(Some(Command::Event(event)))
}

fn parse_target(args: &[&str]) -> Result<DropTarget, String> {
    match required(args, 0, "<grid|sidebar|search|zone>")? {
        "grid" => Ok(DropTarget::GridItem {
            index: number(args, 1, "grid <index>")?,
        }),
        "sidebar" => Ok(DropTarget::CollectionsSidebar {
            collection_id: required(args, 1, "sidebar <id>")?.to_string(),
        }),
        "search" => Ok(DropTarget::SearchZone),
        "zone" => Ok(DropTarget::DropZone),
        other => Err(format!("unknown target: {other}")),
    }
}

fn required<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str, String> {
    args.get(index).copied().ok_or_else(|| format!("usage: {usage}"))
}

fn number<T: std::str::FromStr>(args: &[&str], index: usize, usage: &str) -> Result<T, String> {
    required(args, index, usage)?
        .parse()
        .map_err(|_| format!("usage: {usage}"))
}

fn read_upload(path: &Path) -> Result<UploadFile, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let content_type = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };
    Ok(UploadFile {
        name,
        content_type: content_type.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(&path, "server_url = \"http://gallery:8080\"\npage_size = 40\n").unwrap();

        let cli = Cli::try_parse_from([
            "tapestry-client",
            path.to_str().unwrap(),
            "--dataset",
            "trip",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let config = cli.into_config().unwrap();

        assert_eq!(config.server_url, "http://gallery:8080");
        assert_eq!(config.page_size, 40);
        assert_eq!(config.dataset_id.as_deref(), Some("trip"));
        assert_eq!(config.trace_level.as_deref(), Some("debug"));
    }

    #[test]
    fn defaults_without_arguments() {
        let config = Cli::try_parse_from(["tapestry-client"]).unwrap().into_config().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn drop_uses_dragged_identity() {
        let mut session = GallerySession::new(&Config::default(), tapestry_client::storage::Preferences::default());
        assert!(parse_command("drop search", &session).is_err());

        session.drag.begin(Some("a.jpg".to_string()));
        let Ok(Some(Command::Event(Event::Dropped { target, payload }))) = parse_command("drop search", &session) else {
            panic!("expected a drop event");
        };
        assert_eq!(target, Some(DropTarget::SearchZone));
        assert_eq!(payload, DropPayload::Internal(DropData::internal("a.jpg").to_json()));
    }
}
