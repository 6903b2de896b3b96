#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::process::ExitCode;

use anyhow::Result;
use cbz_converter::{runner, scan, Event, JobConfig, RunStatus, SUPPORTED_EXTENSIONS};
use clap::Parser;
use cli_table::{print_stdout, WithTitle};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::args::{Args, Jobs, Run, Scan, Subcommands};
use crate::tables::{JobRow, SourceRow};

mod args;
mod tables;

async fn run(Run {
    target_dir,
    job,
    jobs_file,
}: Run) -> Result<ExitCode> {
    let config = JobConfig::load(&jobs_file)?;
    let job = config.find(job.as_deref())?;
    let pipeline = job.pipeline()?;
    info!("starting job {} on {target_dir}", job.name);

    let mut handle = runner::spawn(pipeline, target_dir);
    let cancel = handle.cancel_handle();
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar().template("[{elapsed_precise}] [{wide_bar}] {pos}/{len}")?,
    );

    loop {
        tokio::select! {
            event = handle.next_event() => {
                let Some(event) = event else {
                    break;
                };
                match &event {
                    Event::Scanned { count } => bar.set_length(*count as u64),
                    Event::Packed { .. } | Event::FileFailed { .. } => bar.inc(1),
                    _ => {}
                }
                bar.println(event.to_string());
            }
            _ = tokio::signal::ctrl_c() => {
                bar.println("cancelling, the run stops before the next page");
                cancel.cancel();
            }
        }
    }
    bar.finish();

    Ok(match handle.wait().await {
        RunStatus::Completed(_) => ExitCode::SUCCESS,
        RunStatus::Failed(_) => ExitCode::FAILURE,
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    match args.command {
        Subcommands::Run(run_args) => run(run_args).await,
        Subcommands::Jobs(Jobs { jobs_file }) => {
            let config = JobConfig::load(&jobs_file)?;

            let jobs = config.jobs.iter().map(JobRow::from).collect::<Vec<_>>();

            print_stdout(jobs.with_title())?;

            Ok(ExitCode::SUCCESS)
        }
        Subcommands::Scan(Scan { target_dir }) => {
            let files = scan(&target_dir)?;

            if files.is_empty() {
                println!(
                    "no supported file found, supported formats: {}",
                    SUPPORTED_EXTENSIONS.join(", ")
                );
            } else {
                let files = files.iter().map(SourceRow::from).collect::<Vec<_>>();

                print_stdout(files.with_title())?;
            }

            Ok(ExitCode::SUCCESS)
        }
    }
}
