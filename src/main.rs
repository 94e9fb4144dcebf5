mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use cli::Commands;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let raw_args: Vec<String> = std::env::args().collect();
    let args = cli::parse();
    settings::init_logging(args.verbose);

    match args.command {
        Commands::Preview {
            layers,
            metrics,
            min_score,
            format,
            output,
        } => commands::run_preview(
            &raw_args,
            args.config,
            layers,
            metrics,
            min_score,
            format,
            output,
        ),
        Commands::Adjust {
            group,
            key,
            value,
            layers,
            metrics,
            format,
            output,
        } => commands::run_adjust(args.config, group, key, value, layers, metrics, format, output),
        Commands::Presets {
            layers,
            metrics,
            format,
            output,
        } => commands::run_presets(args.config, layers, metrics, format, output),
        Commands::ApplyPreset {
            name,
            remote,
            format,
            output,
        } => commands::run_apply_preset(args.config, name, remote, format, output).await,
        Commands::Pull { format, output } => commands::run_pull(args.config, format, output).await,
        Commands::Push {
            layers,
            metrics,
            format,
            output,
        } => commands::run_push(args.config, layers, metrics, format, output).await,
    }
}
