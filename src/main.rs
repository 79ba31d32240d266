//! CLI entry point for the rapidshare tool.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use rapidshare::api::is_file_url;
use rapidshare::api::transport::{API_CONNECT_TIMEOUT_SECS, API_READ_TIMEOUT_SECS};
use rapidshare::download::{DOWNLOAD_CONNECT_TIMEOUT_SECS, DOWNLOAD_READ_TIMEOUT_SECS};
use rapidshare::{
    DownloadError, DownloadOptions, FileStatusRecord, Params, ParsedResponse, RapidShareClient,
    Shape,
};
use tracing::{debug, info, warn};

mod app_config;
mod cli;

use app_config::{CredentialFlags, FileConfig};
use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Results go to stdout, logs to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(command = ?args.command, "CLI arguments parsed");

    let loaded = app_config::load_default_file_config()?;
    if loaded.loaded_from_file {
        debug!(path = ?loaded.path, "loaded config file");
    }
    let file_config = loaded.config.unwrap_or_default();

    let client = connect(&args, &file_config).await?;

    match args.command {
        Command::Account => run_account(&client, args.json).await,
        Command::Check { ref urls } => run_check(&client, urls, args.json).await,
        Command::Download {
            ref urls,
            ref queue,
            ref output_dir,
        } => {
            let queue = queue.as_ref().or(file_config.queue.as_ref());
            let output_dir = output_dir
                .clone()
                .or_else(|| file_config.downloads_dir.clone());
            run_download(&client, urls, queue.map(PathBuf::as_path), output_dir).await
        }
        Command::Call {
            ref service,
            ref params,
            shape,
        } => run_call(&client, service, params, shape, args.json).await,
    }
}

async fn connect(args: &Args, file_config: &FileConfig) -> Result<RapidShareClient> {
    let flags = CredentialFlags {
        cookie: args.cookie.as_deref(),
        login: args.login.as_deref(),
        password: args.password.as_deref(),
        anonymous: args.anonymous,
    };
    let init = app_config::select_token_init(flags, file_config)?;

    let client = RapidShareClient::builder()
        .api_timeouts(
            file_config
                .api_connect_timeout_secs
                .unwrap_or(API_CONNECT_TIMEOUT_SECS),
            file_config
                .api_read_timeout_secs
                .unwrap_or(API_READ_TIMEOUT_SECS),
        )
        .download_timeouts(
            file_config
                .download_connect_timeout_secs
                .unwrap_or(DOWNLOAD_CONNECT_TIMEOUT_SECS),
            file_config
                .download_read_timeout_secs
                .unwrap_or(DOWNLOAD_READ_TIMEOUT_SECS),
        )
        .connect(init)
        .await
        .context("Failed to open a RapidShare session")?;

    info!(anonymous = client.is_anonymous(), "session ready");
    Ok(client)
}

async fn run_account(client: &RapidShareClient, json: bool) -> Result<()> {
    let details = client.get_account_details().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&details)?);
    } else {
        println!("{}", details.to_wire());
    }
    Ok(())
}

async fn run_check(client: &RapidShareClient, urls: &[String], json: bool) -> Result<()> {
    let records = client.check_files(urls).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    for record in &records {
        println!("{}", format_record(record));
    }
    Ok(())
}

fn format_record(record: &FileStatusRecord) -> String {
    let link = if record.is_downloadable() {
        record.download_url()
    } else {
        "-".to_string()
    };
    format!(
        "{}\t{}\t{}\t{}\t{}",
        record.file_id, record.file_name, record.file_size, record.status, link
    )
}

async fn run_download(
    client: &RapidShareClient,
    urls: &[String],
    queue: Option<&Path>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let mut links = urls.to_vec();
    if let Some(queue) = queue {
        links.extend(read_queue_file(queue)?);
    }
    if links.is_empty() {
        bail!("No file links given. Pass links as arguments or use --queue");
    }

    if let Some(dir) = &output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory '{}'", dir.display()))?;
    }

    let records = client.check_files(&links).await?;
    let options = DownloadOptions {
        downloads_dir: output_dir,
        filename: None,
    };

    let mut completed = 0usize;
    let mut skipped = 0usize;
    for record in &records {
        match client.download_record(record, &options).await {
            Ok(file) => {
                completed += 1;
                println!("{}", file.path.display());
            }
            Err(DownloadError::NotDownloadable { .. }) => {
                skipped += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to download '{}'", record.file_name));
            }
        }
    }

    info!(completed, skipped, total = records.len(), "downloads finished");
    Ok(())
}

/// Reads file links from a queue file, one per line.
///
/// Blank lines and `#` comments are ignored; other lines that are not file
/// links are skipped with a warning.
fn read_queue_file(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read queue file '{}'", path.display()))?;
    Ok(queue_links(&raw))
}

fn queue_links(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| {
            let keep = is_file_url(line);
            if !keep {
                warn!(line = %line, "skipping queue line that is not a file link");
            }
            keep
        })
        .map(str::to_string)
        .collect()
}

async fn run_call(
    client: &RapidShareClient,
    service: &str,
    params: &[(String, String)],
    shape: Shape,
    json: bool,
) -> Result<()> {
    let params: Params = params.iter().cloned().collect();
    let response = client.call(service, params, shape).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }
    match response {
        ParsedResponse::Raw(body) => println!("{body}"),
        ParsedResponse::Rows(rows) => {
            for row in rows {
                println!("{}", row.join(","));
            }
        }
        ParsedResponse::Map(map) => println!("{}", map.to_wire()),
    }
    Ok(())
}
