//! SharedBook CLI - sign requests and create books from the command line.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sharedbook::{
    config::{to_params, Cli, Command, ConnectionConfig, PublishConfig, SignConfig, VerifyConfig},
    login_url, BookManifest, ClientError, Credentials, Endpoints, HttpTransport, LoginBootstrap,
    RequestSigner, Session,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = cli.connection.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    match cli.command {
        Command::LoginUrl => {
            println!("{}", login_url(&cli.connection.base_url));
            ExitCode::SUCCESS
        }
        Command::Sign(config) => run_sign(&cli.connection, config),
        Command::Verify(config) => run_verify(&cli.connection, config),
        Command::SessionToken => report(run_session_token(&cli.connection).await),
        Command::Publish(config) => report(run_publish(&cli.connection, config).await),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "sharedbook=debug"
    } else {
        "sharedbook=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn report(result: Result<(), ClientError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Sign / Verify
// =============================================================================

fn run_sign(connection: &ConnectionConfig, config: SignConfig) -> ExitCode {
    let secret_word = match connection.secret_word() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let signer = RequestSigner::new(secret_word);
    println!("{}", signer.sign(&to_params(&config.params)));
    ExitCode::SUCCESS
}

fn run_verify(connection: &ConnectionConfig, config: VerifyConfig) -> ExitCode {
    let secret_word = match connection.secret_word() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let signer = RequestSigner::new(secret_word);
    match signer.verify_signature(&to_params(&config.params), &config.signature) {
        Ok(()) => {
            println!("valid");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("invalid: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Session commands
// =============================================================================

/// Resolve credentials, running the login bootstrap when asked to.
async fn credentials(
    connection: &ConnectionConfig,
    transport: &HttpTransport,
) -> Result<Credentials, ClientError> {
    if !connection.wants_bootstrap() {
        return Ok(connection.credentials()?);
    }

    info!("Fetching an auth token through the login flow");
    let bootstrap = LoginBootstrap::new(
        transport.clone(),
        Endpoints::new(connection.base_url.as_str()),
        connection.development,
    );
    let credentials = Credentials::bootstrap(
        connection.api_key.clone().unwrap_or_default(),
        connection.secret_word.clone().unwrap_or_default(),
        &bootstrap,
    )
    .await?;

    Ok(match &connection.session_token {
        Some(token) => credentials.with_session_token(token.as_str()),
        None => credentials,
    })
}

async fn open_session(connection: &ConnectionConfig) -> Result<Session<HttpTransport>, ClientError> {
    let transport = HttpTransport::new()?;
    let credentials = credentials(connection, &transport).await?;
    Ok(Session::with_endpoints(
        credentials,
        transport,
        Endpoints::new(connection.base_url.as_str()),
    ))
}

async fn run_session_token(connection: &ConnectionConfig) -> Result<(), ClientError> {
    let mut session = open_session(connection).await?;
    let token = session.session_token().await?;
    println!("{}", token);
    Ok(())
}

async fn run_publish(connection: &ConnectionConfig, config: PublishConfig) -> Result<(), ClientError> {
    let manifest = BookManifest::load(&config.manifest).await?;
    let base_dir = config
        .manifest
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let mut session = open_session(connection).await?;
    info!(title = %manifest.title, "Publishing book");
    let published = manifest.publish(&mut session, &base_dir).await?;

    match serde_json::to_string_pretty(&published) {
        Ok(json) => println!("{}", json),
        Err(_) => {
            println!("media_set_id: {}", published.media_set_id);
            println!("book_id: {}", published.book_id);
            println!("preview_url: {}", published.preview_url);
        }
    }
    Ok(())
}
