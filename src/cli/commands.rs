//! CLI command implementations
//!
//! Every command loads and validates the config first. `start` and `call`
//! replay the record log before the first request is read; a corrupt log
//! stops the boot.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde_json::json;
use tracing::{info, warn};

use crate::api::ApiHandler;
use crate::records::{RandomIdGenerator, RecordStore, SystemClock};
use crate::storage::{FileMap, MapBackend, MemoryMap};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_request, read_requests, write_json, write_response};
use super::logging::init_tracing;

/// Handler type served by the CLI. The backend is picked at boot.
pub type CliHandler = ApiHandler<Box<dyn MapBackend>, RandomIdGenerator, SystemClock>;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Start { config, ephemeral } => start(&config, ephemeral),
        Command::Call { config } => call(&config),
        Command::Compact { config } => compact(&config),
    }
}

/// Initialize a new data directory
///
/// Creates `<data_dir>/data`. Writes no records.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let data_dir = config.data_path();

    if is_initialized(data_dir) {
        return Err(CliError::AlreadyInitialized(data_dir.to_path_buf()));
    }

    let dir = data_dir.join("data");
    fs::create_dir_all(&dir).map_err(|source| CliError::CreateDir { path: dir, source })?;

    write_response(json!({"initialized": true}))?;

    Ok(())
}

/// Boot the store and serve one request per stdin line until EOF
pub fn start(config_path: &Path, ephemeral: bool) -> CliResult<()> {
    let config = Config::load(config_path)?;
    init_tracing(&config.log_level)?;

    let mut handler = boot(&config, ephemeral)?;
    info!(data_dir = %config.data_dir, ephemeral, "serving requests");

    let mut stdout = std::io::stdout().lock();
    serve(&mut handler, read_requests(), &mut stdout)?;

    info!("input closed, shutting down");
    Ok(())
}

/// Boot the store, handle a single request and exit
pub fn call(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    init_tracing(&config.log_level)?;

    let mut handler = boot(&config, false)?;
    let request = read_request()?;
    let response = handler.handle(&request);

    write_json(&response.to_json())
}

/// Rewrite the record log so it holds only live records
pub fn compact(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let data_dir = config.data_path();
    if !is_initialized(data_dir) {
        return Err(CliError::NotInitialized(data_dir.to_path_buf()));
    }
    init_tracing(&config.log_level)?;

    let mut map = FileMap::open(data_dir, config.slot_limits()).map_err(CliError::Compaction)?;
    let stats = map.compact().map_err(CliError::Compaction)?;

    write_response(json!({
        "bytes_before": stats.bytes_before,
        "bytes_after": stats.bytes_after,
        "live_entries": stats.live_entries,
    }))
}

/// Build the request handler for a validated config
///
/// Ephemeral mode keeps records in memory and never touches `data_dir`.
pub fn boot(config: &Config, ephemeral: bool) -> CliResult<CliHandler> {
    let backend: Box<dyn MapBackend> = if ephemeral {
        Box::new(MemoryMap::with_limits(config.slot_limits()))
    } else {
        let data_dir = config.data_path();
        if !is_initialized(data_dir) {
            return Err(CliError::NotInitialized(data_dir.to_path_buf()));
        }
        let map = FileMap::open(data_dir, config.slot_limits()).map_err(CliError::Replay)?;
        Box::new(map)
    };

    let ids = RandomIdGenerator::new().with_length(config.id_length);
    Ok(ApiHandler::new(
        RecordStore::with_id_generator(backend, ids),
        SystemClock::new(),
    ))
}

/// Answer each request line with one response line
///
/// A read error ends the loop after reporting it on `out`.
pub fn serve<I, W>(handler: &mut CliHandler, requests: I, out: &mut W) -> CliResult<()>
where
    I: IntoIterator<Item = CliResult<String>>,
    W: Write,
{
    for request in requests {
        match request {
            Ok(line) => {
                let response = handler.handle(&line);
                writeln!(out, "{}", response.to_json())?;
                out.flush()?;
            }
            Err(e) => {
                warn!(code = e.code(), error = %e, "input failed");
                let error = json!({
                    "status": "error",
                    "code": e.code(),
                    "message": e.to_string()
                });
                writeln!(out, "{}", error)?;
                out.flush()?;
                break;
            }
        }
    }
    Ok(())
}

/// Check if a data directory is initialized
fn is_initialized(data_dir: &Path) -> bool {
    data_dir.join("data").is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    fn create_config(temp_dir: &TempDir) -> std::path::PathBuf {
        let config_path = temp_dir.path().join("medvault.json");
        let data_dir = temp_dir.path().join("vault");

        let config = json!({
            "data_dir": data_dir.to_string_lossy()
        });

        fs::write(&config_path, config.to_string()).unwrap();
        config_path
    }

    fn serve_lines(handler: &mut CliHandler, lines: &[Value]) -> Vec<Value> {
        let requests = lines.iter().map(|l| Ok(l.to_string()));
        let mut out = Vec::new();
        serve(handler, requests, &mut out).unwrap();

        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_init_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        init(&config_path).unwrap();

        assert!(temp_dir.path().join("vault").join("data").is_dir());
    }

    #[test]
    fn test_init_refuses_reinit() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        init(&config_path).unwrap();

        let result = init(&config_path);
        assert!(matches!(result, Err(CliError::AlreadyInitialized(_))));
    }

    #[test]
    fn test_boot_requires_init() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(&create_config(&temp_dir)).unwrap();

        let result = boot(&config, false);
        assert!(matches!(result, Err(CliError::NotInitialized(_))));
    }

    #[test]
    fn test_ephemeral_boot_leaves_data_dir_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(&create_config(&temp_dir)).unwrap();

        let mut handler = boot(&config, true).unwrap();
        let responses = serve_lines(
            &mut handler,
            &[json!({"op": "create", "caller": "alice", "payload": {"title": "X-ray", "attachmentURL": "u"}})],
        );

        assert_eq!(responses[0]["status"], "ok");
        assert!(!temp_dir.path().join("vault").exists());
    }

    #[test]
    fn test_records_survive_reboot() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);
        init(&config_path).unwrap();
        let config = Config::load(&config_path).unwrap();

        let mut handler = boot(&config, false).unwrap();
        let created = serve_lines(
            &mut handler,
            &[json!({"op": "create", "caller": "alice", "payload": {"title": "X-ray", "attachmentURL": "u"}})],
        );
        let id = created[0]["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(id.len(), 30);
        drop(handler);

        let mut handler = boot(&config, false).unwrap();
        let responses = serve_lines(
            &mut handler,
            &[
                json!({"op": "getById", "caller": "alice", "id": id}),
                json!({"op": "getById", "caller": "bob", "id": id}),
            ],
        );

        assert_eq!(responses[0]["data"]["title"], "X-ray");
        assert_eq!(responses[1]["code"], "MEDVAULT_FORBIDDEN");
    }

    #[test]
    fn test_serve_answers_every_line_and_stops_on_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(&create_config(&temp_dir)).unwrap();
        let mut handler = boot(&config, true).unwrap();

        let requests = vec![
            Ok(json!({"op": "getCaller", "caller": "alice"}).to_string()),
            Ok("not json".to_string()),
            Err(CliError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "stream closed",
            ))),
            Ok(json!({"op": "getCaller", "caller": "bob"}).to_string()),
        ];
        let mut out = Vec::new();
        serve(&mut handler, requests, &mut out).unwrap();

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["data"], "alice");
        assert_eq!(lines[1]["code"], "MEDVAULT_INVALID_REQUEST");
        assert_eq!(lines[2]["code"], "MEDVAULT_CLI_IO_ERROR");
    }

    #[test]
    fn test_compact_requires_init() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        assert!(matches!(
            compact(&config_path),
            Err(CliError::NotInitialized(_))
        ));
    }
}
