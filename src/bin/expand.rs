//! namemask-expand - substitute names back into ranked mask lines
//!
//! Reads a mask file (count column optional) and emits one password
//! candidate per indexed name of matching length. Candidates go to
//! stdout by default so the output can be piped straight into a cracker.

use clap::Parser;
use std::process;

use namemask::cli::{validate_placeholder, ExpandArgs};
use namemask::expand::{run_expand, ExpandOptions};
use namemask::progress::{print_error, print_success};

fn main() {
    let args = ExpandArgs::parse();

    // Set up logging; all diagnostics go to stderr so candidate output
    // stays pipeable.
    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    } else if !args.quiet {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    if let Err(e) = run(args) {
        print_error(&format!("{}", e));

        let mut source = e.source();
        while let Some(err) = source {
            print_error(&format!("  Caused by: {}", err));
            source = err.source();
        }

        process::exit(1);
    }
}

fn run(args: ExpandArgs) -> anyhow::Result<()> {
    if !args.patterns.is_file() {
        anyhow::bail!("Pattern file does not exist: {:?}", args.patterns);
    }
    if !args.masks.is_file() {
        anyhow::bail!("Mask file does not exist: {:?}", args.masks);
    }
    validate_placeholder(args.placeholder)?;

    let to_file = args.output.is_some();
    let options = ExpandOptions {
        patterns: args.patterns,
        masks: args.masks,
        output: args.output,
    };
    let summary = run_expand(&options, args.placeholder)?;

    log::info!(
        "expanded {} mask lines into {} candidates ({} lines had no usable run)",
        summary.mask_lines,
        summary.candidates,
        summary.skipped
    );
    if to_file && !args.quiet {
        if let Some(path) = &options.output {
            print_success(&format!("Candidates written to: {:?}", path));
        }
    }

    Ok(())
}
