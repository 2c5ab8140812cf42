mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_audit, run_images, run_rules, run_simplify, ImagesArgs};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Simplify {
            source,
            extractors,
            format,
            output,
        } => run_simplify(args.config, source, extractors, format, output).await,
        Commands::Audit {
            source,
            format,
            output,
            disable,
            no_ai,
            fail_on_issues,
        } => {
            run_audit(
                args.config,
                args.verbose,
                source,
                format,
                output,
                disable,
                no_ai,
                fail_on_issues,
            )
            .await
        }
        Commands::Images {
            source,
            dest,
            render,
            svg,
            png_scale,
            no_fills,
            output,
        } => {
            let options = ImagesArgs {
                dest,
                render,
                svg,
                png_scale,
                no_fills,
                output,
            };
            run_images(args.config, source, options).await
        }
        Commands::Rules { format } => run_rules(args.config, format).await,
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over
/// `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "figma_audit=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
