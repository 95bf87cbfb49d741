//! CLI entrypoint for Holly Hot Box
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use hotbox_application::{
    DispatchUseCase, ModeCatalog, ModeChoice, CheckProvidersUseCase, ProviderRegistry,
};
use hotbox_domain::{ModeKind, OutputFormat, Prompt, ProviderId, SessionId};
use hotbox_infrastructure::{ConfigLoader, FileConfig, JsonlChatStore, build_registry};
use hotbox_presentation::{
    ChatRepl, Cli, ConsoleFormatter, OutputFormatter, ProgressReporter,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let log_guard = init_logging(&cli)?;

    info!("Starting Holly Hot Box");

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        println!();
        println!("Effective configuration:");
        println!("{}", toml::to_string_pretty(&redacted(config))?);
        return Ok(());
    }

    config.validate().context("Invalid configuration")?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    let registry = build_registry(&config, client);

    let catalog = config.mode_catalog()?;
    catalog.validate(&registry)?;

    let mut params = config.dispatch_params();
    if let Some(seconds) = cli.timeout {
        if seconds == 0 {
            bail!("--timeout must be greater than zero");
        }
        params = params.with_timeout(Duration::from_secs(seconds));
    }

    // Provider checks
    if cli.list_providers || cli.check_providers {
        let checker = CheckProvidersUseCase::new(registry.clone(), params.timeout);
        let statuses = checker.execute(cli.check_providers).await;
        print!("{}", ConsoleFormatter::format_provider_statuses(&statuses));
        return Ok(());
    }

    let choice = resolve_mode(&cli, &config, &catalog, &registry)?;
    info!(mode = %choice, "Resolved mode");

    let format: OutputFormat = cli
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();

    let cancellation = CancellationToken::new();
    let mut use_case = DispatchUseCase::new(registry, params)
        .with_composer(config.composer())
        .with_cancellation(cancellation.clone());

    if !cli.no_store && config.store.is_enabled() {
        match config.store.resolved_path().and_then(JsonlChatStore::open) {
            Some(store) => {
                info!(path = %store.path().display(), "Recording chats");
                use_case = use_case.with_recorder(Arc::new(store));
            }
            None => warn!("Chat store unavailable, conversations will not be recorded"),
        }
    }

    let session = cli.session.as_deref().map(SessionId::from);

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(Arc::new(use_case), catalog, choice)
            .with_progress(!cli.quiet)
            .with_format(format);
        if let Some(session) = session {
            repl = repl.with_session(session);
        }
        if let Some(path) = config.store.readline_history_path() {
            repl = repl.with_history_file(path);
        }

        repl.run().await?;
        return Ok(());
    }

    // Single prompt mode - prompt is required
    let text = match cli.prompt {
        Some(text) => text,
        None => bail!("A prompt is required. Use --chat for interactive mode."),
    };

    let mode = catalog.mode_for(&choice, &text, use_case.registry())?;
    let mut prompt = Prompt::new(text, mode)?;
    if let Some(session) = session {
        prompt = prompt.in_session(session);
    }

    // Ctrl-C cancels every in-flight provider call
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancellation.cancel();
        }
    });

    let result = if cli.quiet || format == OutputFormat::Json {
        use_case.dispatch(&prompt).await?
    } else {
        let progress = ProgressReporter::new();
        use_case.dispatch_with_progress(&prompt, &progress).await?
    };

    print!("{}", ConsoleFormatter.render(&result, format));
    if format == OutputFormat::Json {
        println!();
    }

    if result.all_failed() {
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}

/// Install the tracing subscriber; `-v` picks the level unless `RUST_LOG` is set
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match &cli.log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .context("--log-file must name a file")?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

/// Hide inline API keys before printing the configuration
fn redacted(mut config: FileConfig) -> FileConfig {
    let providers = &mut config.providers;
    for vendor in [
        &mut providers.openai,
        &mut providers.gemini,
        &mut providers.claude,
        &mut providers.deepseek,
        &mut providers.grok,
        &mut providers.huggingface,
    ] {
        if vendor.api_key.is_some() {
            vendor.api_key = Some("<redacted>".to_string());
        }
    }
    config
}

/// Work out the mode from `--mode`, `-p` and `--arbiter`, falling back to
/// the configured default mode. `auto` is only decided once the prompt is known.
fn resolve_mode(
    cli: &Cli,
    config: &FileConfig,
    catalog: &ModeCatalog,
    registry: &ProviderRegistry,
) -> Result<ModeChoice> {
    let spec = cli
        .mode
        .as_deref()
        .unwrap_or(&config.orchestrator.default_mode);

    if cli.provider.is_empty() && cli.arbiter.is_none() {
        return Ok(catalog.choose(spec, registry)?);
    }

    let providers = cli
        .provider
        .iter()
        .map(|p| p.parse::<ProviderId>())
        .collect::<Result<Vec<_>, _>>()?;
    let arbiter = cli
        .arbiter
        .as_deref()
        .map(str::parse::<ProviderId>)
        .transpose()?;

    // A lone -p without --mode means "just ask that one"
    let kind = match &cli.mode {
        None if providers.len() == 1 && arbiter.is_none() => ModeKind::Single,
        None => spec.parse::<ModeKind>().unwrap_or(ModeKind::Consensus),
        Some(mode) => mode
            .parse::<ModeKind>()
            .with_context(|| format!("--mode '{}' cannot be combined with -p/--arbiter", mode))?,
    };

    Ok(ModeChoice::Fixed(catalog.build(kind, providers, arbiter, registry)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotbox_domain::Mode;

    fn setup() -> (FileConfig, ModeCatalog, ProviderRegistry) {
        let config = FileConfig::default();
        let catalog = config.mode_catalog().unwrap();
        let registry = build_registry(&config, reqwest::Client::new());
        (config, catalog, registry)
    }

    fn choice_for(args: &[&str]) -> Result<ModeChoice> {
        let (config, catalog, registry) = setup();
        let cli = Cli::parse_from(std::iter::once("hotbox").chain(args.iter().copied()));
        resolve_mode(&cli, &config, &catalog, &registry)
    }

    fn mode_for(args: &[&str]) -> Result<Mode> {
        match choice_for(args)? {
            ModeChoice::Fixed(mode) => Ok(mode),
            ModeChoice::Auto => bail!("expected a fixed mode"),
        }
    }

    #[test]
    fn test_default_mode_uses_every_provider() {
        let mode = mode_for(&["hi"]).unwrap();
        assert_eq!(mode.kind(), ModeKind::Consensus);
        assert_eq!(mode.providers().len(), 6);
    }

    #[test]
    fn test_single_provider_flag() {
        let mode = mode_for(&["-p", "gemini", "hi"]).unwrap();
        assert_eq!(mode, Mode::Single(ProviderId::Gemini));
    }

    #[test]
    fn test_mode_with_provider_flags() {
        let mode = mode_for(&[
            "--mode", "best", "-p", "gemini", "-p", "grok", "--arbiter", "openai", "hi",
        ])
        .unwrap();
        assert_eq!(
            mode,
            Mode::Best {
                providers: vec![ProviderId::Gemini, ProviderId::Grok],
                arbiter: ProviderId::OpenAi,
            }
        );
    }

    #[test]
    fn test_explicit_mode_spec() {
        let mode = mode_for(&["--mode", "fastest:deepseek,claude", "hi"]).unwrap();
        assert_eq!(
            mode,
            Mode::Fastest(vec![ProviderId::DeepSeek, ProviderId::Claude])
        );
    }

    #[test]
    fn test_bad_provider_is_rejected() {
        assert!(mode_for(&["-p", "skynet", "hi"]).is_err());
        assert!(mode_for(&["--mode", "best", "hi"]).is_err());
    }

    #[test]
    fn test_auto_mode_routes_each_prompt() {
        let (config, catalog, registry) = setup();
        let choice = choice_for(&["--mode", "auto", "hi"]).unwrap();
        assert_eq!(choice, ModeChoice::Auto);

        let simple = catalog.mode_for(&choice, "What is 2 + 2?", &registry).unwrap();
        assert_eq!(simple.kind(), ModeKind::Fastest);

        let complex = catalog
            .mode_for(&choice, "Summarize the attached contract", &registry)
            .unwrap();
        assert_eq!(
            complex,
            Mode::Consensus(vec![ProviderId::Gemini, ProviderId::DeepSeek])
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auto_cannot_combine_with_provider_flags() {
        assert!(choice_for(&["--mode", "auto", "-p", "gemini", "hi"]).is_err());
    }

    #[test]
    fn test_redacted_hides_keys() {
        let mut config = FileConfig::default();
        config.providers.grok.api_key = Some("xai-secret".to_string());
        let config = redacted(config);
        assert_eq!(config.providers.grok.api_key.as_deref(), Some("<redacted>"));
        assert_eq!(config.providers.gemini.api_key, None);
    }
}
