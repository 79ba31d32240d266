//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rapidshare::Shape;

/// Command-line client for the RapidShare file-hosting API.
///
/// Credentials come from flags or the config file; with neither, calls are
/// made anonymously.
#[derive(Parser, Debug)]
#[command(name = "rapidshare")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Session cookie of an existing login
    #[arg(long, global = true, conflicts_with = "login")]
    pub cookie: Option<String>,

    /// Account login (exchanged for a session cookie); the password may come from the config file
    #[arg(long, global = true)]
    pub login: Option<String>,

    /// Account password
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Ignore configured credentials and call without a session
    #[arg(long, global = true, conflicts_with_all = ["cookie", "login"])]
    pub anonymous: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the account details of the current session
    Account,

    /// Print the status of one or more file links
    Check {
        /// File links (`https://rapidshare.com/files/<id>/<name>`)
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Download files whose status is ok
    Download {
        /// File links to download
        urls: Vec<String>,

        /// File with one link per line (`#` starts a comment)
        #[arg(long)]
        queue: Option<PathBuf>,

        /// Directory downloads are written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Call any API service by name
    Call {
        /// Service name, sent verbatim as `sub=`
        service: String,

        /// Request parameters as KEY=VALUE
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Response decoding: raw, rows or map
        #[arg(long, default_value = "raw", value_parser = parse_shape)]
        shape: Shape,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(format!("expected KEY=VALUE, got '{raw}'"));
    };
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_shape(raw: &str) -> Result<Shape, String> {
    raw.parse::<Shape>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_account_parses_with_defaults() {
        let args = Args::try_parse_from(["rapidshare", "account"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(!args.anonymous);
        assert!(args.cookie.is_none());
        assert!(matches!(args.command, Command::Account));
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["rapidshare", "-v", "account"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["rapidshare", "account", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["rapidshare", "--quiet", "account"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["rapidshare", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["rapidshare", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["rapidshare", "--invalid-flag", "account"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_missing_subcommand_is_error() {
        assert!(Args::try_parse_from(["rapidshare"]).is_err());
    }

    #[test]
    fn test_cli_check_requires_urls() {
        let err = Args::try_parse_from(["rapidshare", "check"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_check_collects_urls_in_order() {
        let args = Args::try_parse_from([
            "rapidshare",
            "check",
            "https://rapidshare.com/files/1/a.zip",
            "https://rapidshare.com/files/2/b.zip",
        ])
        .unwrap();
        let Command::Check { urls } = args.command else {
            panic!("expected check");
        };
        assert_eq!(
            urls,
            [
                "https://rapidshare.com/files/1/a.zip",
                "https://rapidshare.com/files/2/b.zip"
            ]
        );
    }

    #[test]
    fn test_cli_download_queue_and_output_dir() {
        let args = Args::try_parse_from([
            "rapidshare",
            "download",
            "--queue",
            "links.txt",
            "-o",
            "/tmp/out",
        ])
        .unwrap();
        let Command::Download {
            urls,
            queue,
            output_dir,
        } = args.command
        else {
            panic!("expected download");
        };
        assert!(urls.is_empty());
        assert_eq!(queue, Some(PathBuf::from("links.txt")));
        assert_eq!(output_dir, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_cli_call_params_and_shape() {
        let args = Args::try_parse_from([
            "rapidshare",
            "call",
            "checkfiles",
            "files=1,2",
            "filenames=a=b,c",
            "--shape",
            "rows",
        ])
        .unwrap();
        let Command::Call {
            service,
            params,
            shape,
        } = args.command
        else {
            panic!("expected call");
        };
        assert_eq!(service, "checkfiles");
        assert_eq!(
            params,
            [
                ("files".to_string(), "1,2".to_string()),
                ("filenames".to_string(), "a=b,c".to_string())
            ]
        );
        assert_eq!(shape, Shape::DelimitedRows);
    }

    #[test]
    fn test_cli_call_shape_defaults_to_raw() {
        let args = Args::try_parse_from(["rapidshare", "call", "nextuploadserver"]).unwrap();
        let Command::Call { shape, params, .. } = args.command else {
            panic!("expected call");
        };
        assert_eq!(shape, Shape::Raw);
        assert!(params.is_empty());
    }

    #[test]
    fn test_cli_call_rejects_unknown_shape() {
        let err = Args::try_parse_from(["rapidshare", "call", "x", "--shape", "xml"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_call_rejects_param_without_equals() {
        let err = Args::try_parse_from(["rapidshare", "call", "x", "files"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_login_parses_with_and_without_password() {
        let args = Args::try_parse_from(["rapidshare", "--login", "me", "account"]).unwrap();
        assert_eq!(args.login.as_deref(), Some("me"));
        assert!(args.password.is_none());

        let args = Args::try_parse_from([
            "rapidshare",
            "--login",
            "me",
            "--password",
            "secret",
            "account",
        ])
        .unwrap();
        assert_eq!(args.login.as_deref(), Some("me"));
        assert_eq!(args.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_cli_anonymous_conflicts_with_cookie() {
        let err = Args::try_parse_from(["rapidshare", "--anonymous", "--cookie", "C", "account"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
