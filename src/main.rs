use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;
use textsift::app::run_watch_command;
use textsift::cli::{Cli, Commands, ConfigAction};
use textsift::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Watch) => {
            let config = load_config(cli.config.as_deref())?;
            if let Err(e) = run_watch_command(
                config,
                cli.endpoint,
                cli.interval,
                cli.window,
                cli.threshold,
                cli.marker,
                cli.plain,
                cli.quiet,
                cli.verbose,
            )
            .await
            {
                eprintln!("{}", format!("Error: {}", e).red());
                std::process::exit(1);
            }
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, cli.config.as_deref())?;
        }
    }

    Ok(())
}

/// Load configuration from the given path, the default path, or defaults.
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config_path = custom_path
        .map(std::path::PathBuf::from)
        .unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path)?;
    Ok(config.with_env_overrides())
}

/// Handle configuration commands.
fn handle_config_command(
    action: ConfigAction,
    custom_path: Option<&std::path::Path>,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            let config_path = custom_path
                .map(std::path::PathBuf::from)
                .unwrap_or_else(Config::default_path);
            println!("{}", config_path.display());
        }
    }

    Ok(())
}
