//! namemask - mask person names in password wordlists
//!
//! Main entry point for the scanning command.

use clap::Parser;
use std::process;

use namemask::cli::Args;
use namemask::processor::{Processor, ProcessorConfig};
use namemask::progress::{print_banner, print_error, print_header, print_info};

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up logging
    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    } else if !args.quiet {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    // Configure thread pool
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }

    // Run the application
    if let Err(e) = run(args) {
        print_error(&format!("{}", e));

        // Print chain of errors
        let mut source = e.source();
        while let Some(err) = source {
            print_error(&format!("  Caused by: {}", err));
            source = err.source();
        }

        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    // Print banner unless quiet mode
    if !args.quiet {
        print_banner();
    }

    // Validate arguments
    validate_args(&args)?;

    // Create processor configuration
    let config = ProcessorConfig::from_args(&args)?;

    // Show configuration
    if !args.quiet && args.verbose {
        print_config(&args, &config);
    }

    // Create and run processor
    let processor = Processor::new(config);
    processor.process(&args.patterns, &args.wordlist)?;

    Ok(())
}

/// Validate command-line arguments
fn validate_args(args: &Args) -> anyhow::Result<()> {
    if !args.patterns.is_file() {
        anyhow::bail!("Pattern file does not exist: {:?}", args.patterns);
    }

    if !args.wordlist.is_file() {
        anyhow::bail!("Wordlist does not exist: {:?}", args.wordlist);
    }

    args.validate_placeholder()?;

    Ok(())
}

/// Print configuration summary
fn print_config(args: &Args, config: &ProcessorConfig) {
    print_header("Configuration");

    print_info(&format!("Patterns:     {:?}", args.patterns));
    print_info(&format!("Wordlist:     {:?}", args.wordlist));
    print_info(&format!("Output dir:   {:?}", config.output_dir));
    print_info(&format!("Mask file:    {}", config.masks_name));
    print_info(&format!("Stats file:   {}", config.stats_name));
    print_info(&format!("Placeholder:  {:?}", config.placeholder));
    print_info(&format!("Engine:       {:?}", config.engine));
    print_info(&format!("Batch size:   {} lines", config.batch_lines));
    print_info(&format!("Buffer size:  {} MB", config.buffer_size / (1024 * 1024)));
    print_info(&format!("Threads:      {}", config.threads));
}
