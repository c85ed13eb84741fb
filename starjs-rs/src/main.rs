use std::sync::Arc;

use anyhow::Context;

use starjs::cli::{self, CliArgs, Command};
use starjs::config::{self, Config};
use starjs::serve;
use starjs::Gateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = match cli::parse_argv(std::env::args_os()) {
        Ok(a) => a,
        Err(e) => e.exit(),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli::log_level(args.verbose)),
    )
    .init();

    let config = load_config(&args)?;
    let gateway = Gateway::new(config);

    match args.command {
        Command::Run { file, function, args: call_args } => {
            let source = cli::read_source(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            let outcome = gateway.run(cli::host_args(source, function, &call_args));
            let text = if args.pretty {
                serde_json::to_string_pretty(&outcome)?
            } else {
                serde_json::to_string(&outcome)?
            };
            println!("{text}");
            if !outcome.is_success() {
                std::process::exit(1);
            }
        }
        Command::Serve => {
            log::info!("serving requests on stdin");
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            serve::serve(Arc::new(gateway), stdin, tokio::io::stdout()).await?;
        }
    }
    Ok(())
}

/// Load the configuration file chosen by [`config::resolve_config_path`],
/// or the defaults when there is none.
fn load_config(args: &CliArgs) -> anyhow::Result<Config> {
    match config::resolve_config_path(args.config.as_ref()) {
        Some(path) => {
            log::debug!("loading configuration from {}", path.display());
            Config::load_file(&path).with_context(|| format!("starjs: {}", path.display()))
        }
        None => Ok(Config::default()),
    }
}
