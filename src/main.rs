use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use kira_qpcr::cli::{BasisArg, Cli, Commands, StatsArgs};
use kira_qpcr::config::AnalysisConfig;
use kira_qpcr::ctx::{Ctx, OutputPaths};
use kira_qpcr::io;
use kira_qpcr::io::stats_writer;
use kira_qpcr::io::table_writer::read_table;
use kira_qpcr::pipeline::Pipeline;
use kira_qpcr::scores::significance::{SignificanceBasis, SignificanceOptions, evaluate_table};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = AnalysisConfig::load(&args.config)?;
            let mut ctx = Ctx::new(
                args.input,
                args.out,
                &args.prefix,
                config,
                env!("CARGO_PKG_VERSION"),
            );
            ctx.skiplines = args.skiplines;
            ctx.write_chart = !args.no_chart;
            ctx.write_json = !args.no_json;
            ctx.threads = args.threads;

            Pipeline::analysis().run(&mut ctx)?;
            print_summary(&ctx)?;
            println!("Table saved to {}", ctx.output.table_path.display());
            if ctx.write_chart {
                println!("Plot saved to {}", ctx.output.chart_path.display());
            }
        }
        Commands::Validate(args) => {
            let config = AnalysisConfig::load(&args.config)?;
            let mut ctx = Ctx::new(
                args.input,
                PathBuf::from("."),
                "qpcr",
                config,
                env!("CARGO_PKG_VERSION"),
            );
            ctx.skiplines = args.skiplines;
            ctx.write_table = false;
            ctx.write_chart = false;
            ctx.write_json = false;

            Pipeline::validation().run(&mut ctx)?;
            print_validate_summary(&ctx);
        }
        Commands::Stats(args) => run_stats(args)?,
    }

    Ok(())
}

fn print_summary(ctx: &Ctx) -> Result<()> {
    let summary = io::summary::format_summary(ctx)?;
    print!("{}", summary);
    print_warnings(&ctx.warnings);
    Ok(())
}

fn print_validate_summary(ctx: &Ctx) {
    println!("kira-qpcr validate ok");
    println!("input: {}", ctx.input_label());
    println!("measurements: {}", ctx.measurements.len());
    if let Some(clean) = &ctx.clean {
        println!("kept: {}", clean.cleaned.len());
        println!("ct means: {}", clean.means.len());
    }
    print_warnings(&ctx.warnings);
}

fn print_warnings(warnings: &[String]) {
    if !warnings.is_empty() {
        println!("warnings:");
        for warning in warnings {
            println!("- {}", warning);
        }
    }
}

fn run_stats(args: StatsArgs) -> Result<()> {
    let rows = read_table(&args.table)?;
    let options = SignificanceOptions {
        basis: match args.basis {
            BasisArg::Summary => SignificanceBasis::Summary,
            BasisArg::Sample => SignificanceBasis::Sample,
        },
        welch: args.welch,
    };
    let (results, failures) = evaluate_table(&rows, options);

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;
    let paths = OutputPaths::new(args.out.clone(), &args.prefix);
    let written = stats_writer::write_target_outputs(&paths, &results, &rows)?;
    for (result, outputs) in results.iter().zip(&written) {
        print!("{}", stats_writer::format_stats(result));
        println!("Saved to {}", outputs.stats_path.display());
        println!("Plot saved to {}", outputs.plot_path.display());
    }
    for f in &failures {
        tracing::warn!(target_gene = %f.target, detail = %f.detail, "statistic undefined");
    }
    Ok(())
}
