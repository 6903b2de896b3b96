use camino::Utf8PathBuf;
use cbz_converter::jobs::DEFAULT_JOBS_FILE;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
pub struct Run {
    /// Directory holding the files to convert
    pub target_dir: Utf8PathBuf,
    /// Name of the job to run, defaults to the first configured job
    #[clap(short, long)]
    pub job: Option<String>,
    /// Jobs configuration file
    #[clap(long, default_value = DEFAULT_JOBS_FILE)]
    pub jobs_file: Utf8PathBuf,
}

#[derive(Parser, Debug)]
pub struct Jobs {
    /// Jobs configuration file
    #[clap(long, default_value = DEFAULT_JOBS_FILE)]
    pub jobs_file: Utf8PathBuf,
}

#[derive(Parser, Debug)]
pub struct Scan {
    /// Directory to look for convertible files in
    pub target_dir: Utf8PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Subcommands {
    /// Convert every supported file of a directory to Cbz
    #[clap(alias = "r")]
    Run(Run),
    /// List the configured jobs
    #[clap(alias = "j")]
    Jobs(Jobs),
    /// List the files a run would convert, without touching them
    #[clap(alias = "s")]
    Scan(Scan),
}

#[derive(Parser, Debug)]
#[clap(about, author, version)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Subcommands,
}
