use std::fs;
use std::process::ExitCode;

use clap::Parser;
use lockcheck_cli::{App, Command, GenerateArgs, VerifyArgs};
use lockcheck_core::trace::display::format_trace;
use lockcheck_core::Verdict;
use lockcheck_parser::read_trace_dir;
use lockcheck_testgen::{generate_trace_set, GenParams};
use tracing_subscriber::EnvFilter;

/// Exit status for a run with recorded violations.
const FAIL: u8 = 1;
/// Exit status for a run that aborted before producing a verdict.
const FATAL: u8 = 2;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app = App::parse();
    match &app.command {
        Command::Verify(args) => verify(args),
        Command::Generate(args) => generate(args),
    }
}

fn verify(args: &VerifyArgs) -> ExitCode {
    let bundle = match read_trace_dir(&args.trace_dir, &args.suffix) {
        Ok(bundle) => bundle,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(FATAL);
        }
    };

    let report = match lockcheck_core::verify(&bundle.traces, &args.policy()) {
        Ok(report) => report,
        Err(e) => {
            for warning in &bundle.warnings {
                eprintln!("warning: {warning}");
            }
            eprintln!("{e}");
            return ExitCode::from(FATAL);
        }
    };

    if args.json {
        let result = serde_json::json!({
            "warnings": bundle.warnings,
            "diagnostics": report.diagnostics,
            "violations": report.violations(),
            "verdict": report.verdict(),
        });
        println!("{}", serde_json::to_string(&result).unwrap());
    } else {
        for warning in &bundle.warnings {
            println!("warning: {warning}");
        }
        for diagnostic in &report.diagnostics {
            println!("{diagnostic}");
        }
        match report.verdict() {
            Verdict::Pass => println!("consistency check finished: no violations"),
            Verdict::Fail => println!(
                "consistency check finished: {} violation(s)",
                report.violations()
            ),
        }
    }

    match report.verdict() {
        Verdict::Pass => ExitCode::SUCCESS,
        Verdict::Fail => ExitCode::from(FAIL),
    }
}

fn generate(args: &GenerateArgs) -> ExitCode {
    if args.n_proc == 0 {
        eprintln!("--n-proc must be at least 1");
        return ExitCode::from(FATAL);
    }
    if let Err(e) = fs::create_dir_all(&args.output_dir) {
        eprintln!("Failed to create output directory: {e}");
        return ExitCode::from(FATAL);
    }

    let params = GenParams {
        n_proc: args.n_proc,
        n_round: args.n_round,
        seed: args.seed,
    };
    let traces = generate_trace_set(&params);

    for (pid, trace) in &traces {
        let path = args.output_dir.join(format!("{pid}{}", args.suffix));
        if let Err(e) = fs::write(&path, format_trace(trace)) {
            eprintln!("Failed to write {}: {e}", path.display());
            return ExitCode::from(FATAL);
        }
    }

    println!(
        "Generated {} trace files to {}",
        traces.len(),
        args.output_dir.display()
    );
    ExitCode::SUCCESS
}
