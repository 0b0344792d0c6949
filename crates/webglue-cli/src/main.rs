//! webglue - log in against the site backend and preview the shared page
//! fragments from a terminal.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use webglue_core::auth::{AuthBridge, LoginOutcome, PocketBaseClient, TOKEN_COOKIE};
use webglue_core::config::Config;
use webglue_core::cookie::{Cookie, CookieJar, FileCookieJar};
use webglue_core::fragment::{
    FragmentLoader, FragmentOutcome, HttpFragmentSource, MemoryDocument, FOOTER_MOUNT_ID,
    HEADER_MOUNT_ID,
};

#[derive(Parser)]
#[command(name = "webglue", version, about = "Site login and fragment loader")]
struct Cli {
    /// Config file (defaults to ~/.config/webglue/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides config and WEBGLUE_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session token cookie
    Login {
        username: String,
        /// Read the password from the first line of stdin
        #[arg(long)]
        password_stdin: bool,
    },
    /// Fetch the header and footer fragments and print them
    Fragments,
    /// Print the stored cookies
    Cookies {
        /// Store a `name=value` cookie before printing (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_cookie)]
        set: Vec<Cookie>,
    },
    /// Write the effective configuration to the config file
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn parse_cookie(pair: &str) -> std::result::Result<Cookie, String> {
    Cookie::parse(pair).ok_or_else(|| format!("expected NAME=VALUE, got `{}`", pair))
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => {
            let mut config = Config::load_from(path)?;
            config.apply_env();
            config
        }
        None => Config::load()?,
    };
    if let Some(ref url) = cli.base_url {
        config.base_url = url.clone();
    }
    Ok(config)
}

fn read_password(from_stdin: bool) -> Result<String> {
    if from_stdin {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read password from stdin")?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    } else {
        rpassword::prompt_password("Password: ").context("Failed to read password")
    }
}

async fn login(config: &Config, username: &str, password_stdin: bool) -> Result<ExitCode> {
    let password = read_password(password_stdin)?;

    let client = PocketBaseClient::with_timeout(&config.base_url, config.request_timeout())?
        .with_auth_collection(config.auth_collection.as_str());
    let jar = FileCookieJar::open(config.cookie_path()?)
        .context("Failed to open cookie jar")?;
    let bridge = AuthBridge::new(client, jar);

    match bridge.login(username, &password).await.context("Login failed")? {
        LoginOutcome::Authenticated { .. } => {
            if let Some(record) = bridge.backend().auth_store().record() {
                info!(id = %record.id, collection = %record.collection_name, "Authenticated");
            }
            println!(
                "Logged in as {}; `{}` cookie saved to {}",
                username,
                TOKEN_COOKIE,
                bridge.cookies().path().display()
            );
            Ok(ExitCode::SUCCESS)
        }
        LoginOutcome::SessionInvalid => {
            eprintln!("Backend accepted the request but returned no valid session");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn fragments(config: &Config) -> Result<ExitCode> {
    let source = HttpFragmentSource::new(&config.base_url, config.request_timeout())?;
    let document = Arc::new(MemoryDocument::with_mounts([HEADER_MOUNT_ID, FOOTER_MOUNT_ID]));
    let loader = FragmentLoader::new(Arc::new(source), Arc::clone(&document))
        .with_paths(&config.header_path, &config.footer_path);

    let mut failed = false;
    for report in loader.load_header_and_footer().join().await {
        let mount = &report.fragment.mount_id;
        match report.outcome {
            FragmentOutcome::Rendered { .. } => {
                println!("<!-- #{} ({}) -->", mount, report.fragment.path);
                println!("{}", document.inner_html(mount).unwrap_or_default());
            }
            FragmentOutcome::FetchFailed(e)
            | FragmentOutcome::MountFailed(e)
            | FragmentOutcome::TaskFailed(e) => {
                failed = true;
                eprintln!("#{} not loaded from {}: {}", mount, report.fragment.path, e);
            }
        }
    }

    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn cookies(config: &Config, set: &[Cookie]) -> Result<ExitCode> {
    let jar = FileCookieJar::open(config.cookie_path()?)
        .context("Failed to open cookie jar")?;
    for cookie in set {
        jar.set(cookie.clone())
            .with_context(|| format!("Failed to store cookie `{}`", cookie.name))?;
    }
    println!("{}", jar.header_value());
    Ok(ExitCode::SUCCESS)
}

fn init(cli: &Cli, config: &Config, force: bool) -> Result<ExitCode> {
    let path = match cli.config {
        Some(ref path) => path.clone(),
        None => Config::config_path()?,
    };
    if path.exists() && !force {
        eprintln!("{} already exists (use --force to replace it)", path.display());
        return Ok(ExitCode::FAILURE);
    }
    config
        .save_to(&path)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing();

    let config = load_config(&cli)?;
    info!(base_url = %config.base_url, "webglue starting");

    match cli.command {
        Command::Login {
            ref username,
            password_stdin,
        } => login(&config, username, password_stdin).await,
        Command::Fragments => fragments(&config).await,
        Command::Cookies { ref set } => cookies(&config, set),
        Command::Init { force } => init(&cli, &config, force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_login_with_globals() {
        let cli = Cli::try_parse_from([
            "webglue",
            "login",
            "alice",
            "--password-stdin",
            "--base-url",
            "http://pb.local:8090",
        ])
        .unwrap();

        assert_eq!(cli.base_url.as_deref(), Some("http://pb.local:8090"));
        assert!(matches!(
            cli.command,
            Command::Login { ref username, password_stdin: true } if username == "alice"
        ));
    }

    #[test]
    fn test_parse_cookie_flags() {
        let cli = Cli::try_parse_from(["webglue", "cookies", "--set", "theme=dark", "--set", "token=abc"])
            .unwrap();
        match cli.command {
            Command::Cookies { ref set } => assert_eq!(
                set,
                &vec![Cookie::new("theme", "dark"), Cookie::new("token", "abc")]
            ),
            _ => panic!("expected cookies command"),
        }

        assert!(Cli::try_parse_from(["webglue", "cookies", "--set", "novalue"]).is_err());
    }

    #[test]
    fn test_cookies_set_persists_to_jar() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            cookie_file: Some(dir.path().join("cookies.json")),
            ..Config::default()
        };

        cookies(&config, &[Cookie::new("theme", "dark")]).unwrap();

        let jar = FileCookieJar::open(dir.path().join("cookies.json")).unwrap();
        assert_eq!(jar.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_init_writes_effective_config_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let cli = Cli::try_parse_from([
            "webglue",
            "--config",
            path.to_str().unwrap(),
            "--base-url",
            "http://pb.local:8090",
            "init",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();

        init(&cli, &config, false).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().base_url, "http://pb.local:8090");

        let changed = Config {
            auth_collection: "staff".to_string(),
            ..config
        };
        init(&cli, &changed, false).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().auth_collection, "users");

        init(&cli, &changed, true).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().auth_collection, "staff");
    }

    #[test]
    fn test_base_url_flag_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"base_url": "http://from-file:8090"}"#).unwrap();

        let cli = Cli::try_parse_from([
            "webglue",
            "--config",
            path.to_str().unwrap(),
            "--base-url",
            "http://from-flag:8090",
            "fragments",
        ])
        .unwrap();

        assert_eq!(load_config(&cli).unwrap().base_url, "http://from-flag:8090");
    }
}
