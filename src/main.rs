use clap::Parser;
use element_ids::cli::commands::{cmd_assign, cmd_hash, cmd_inspect, cmd_live, cmd_strip};
use element_ids::cli::config::{Cli, Commands, load_config, resolve_mode, resolve_trace_path};
use element_ids::cli::logging::init_logging;
use element_ids::trace::logger::TraceLogger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref());

    // Resolve trace file: CLI > config
    let tracer = TraceLogger::from_path(resolve_trace_path(cli.trace.as_deref(), &config));

    match cli.command {
        Commands::Assign {
            input,
            mode,
            output,
        } => {
            cmd_assign(&input, resolve_mode(mode, &config), output.as_deref(), &tracer)?;
        }
        Commands::Inspect { input, mode } => {
            cmd_inspect(&input, resolve_mode(mode, &config))?;
        }
        Commands::Hash { text } => cmd_hash(&text),
        Commands::Strip {
            input,
            drop_ids,
            output,
        } => {
            cmd_strip(&input, drop_ids, output.as_deref(), &config)?;
        }
        Commands::Live {
            url,
            mode,
            script,
            output,
        } => {
            let script = script.as_deref().unwrap_or(&config.browser.script);
            cmd_live(
                &url,
                resolve_mode(mode, &config),
                script,
                output.as_deref(),
                &config,
                &tracer,
            )?;
        }
    }

    Ok(())
}
