use std::{fs, io};

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{pipeline::convert_dir, Error, Result, RunContext, Summary};

pub static DEFAULT_JOBS_FILE: &str = "jobs.json";

/// A conversion that can be run on a target directory
pub trait ConversionPipeline: Send + Sync {
    /// Identifier jobs refer to the pipeline by
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// ## Errors
    ///
    /// Fails if the run can't be carried out at all, per-file failures are only reported
    fn run(&self, target_dir: &Utf8Path, ctx: &RunContext) -> Result<Summary>;
}

/// Converts every PDF, MOBI/AZW3, EPUB, CBZ and CBR file of a directory into a CBZ
#[derive(Debug, Clone, Copy, Default)]
pub struct MangaConverter;

impl ConversionPipeline for MangaConverter {
    fn id(&self) -> &'static str {
        "manga-converter"
    }

    fn description(&self) -> &'static str {
        "Convert manga files (PDF, MOBI, AZW3, EPUB, CBZ, CBR) to CBZ"
    }

    fn run(&self, target_dir: &Utf8Path, ctx: &RunContext) -> Result<Summary> {
        convert_dir(target_dir, ctx)
    }
}

/// Every pipeline a job can use
pub static PIPELINES: &[&dyn ConversionPipeline] = &[&MangaConverter];

/// ## Errors
///
/// Fails with `Error::UnknownPipeline` if no registered pipeline has this id
pub fn find_pipeline(id: &str) -> Result<&'static dyn ConversionPipeline> {
    PIPELINES
        .iter()
        .copied()
        .find(|pipeline| pipeline.id() == id)
        .ok_or_else(|| Error::UnknownPipeline(id.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub pipeline: String,
}

impl Job {
    /// ## Errors
    ///
    /// Fails with `Error::UnknownPipeline` if the job refers to an unregistered pipeline
    pub fn pipeline(&self) -> Result<&'static dyn ConversionPipeline> {
        find_pipeline(&self.pipeline)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    pub jobs: Vec<Job>,
}

impl Default for JobConfig {
    fn default() -> Self {
        let pipeline = MangaConverter;

        Self {
            jobs: vec![Job {
                name: "Manga Converter".to_string(),
                description: pipeline.description().to_string(),
                pipeline: pipeline.id().to_string(),
            }],
        }
    }
}

impl JobConfig {
    /// ## Errors
    ///
    /// Fails if the json is invalid or a job refers to an unregistered pipeline
    pub fn from_json(json: &str) -> Result<Self> {
        let config = serde_json::from_str::<Self>(json)?;
        for job in &config.jobs {
            job.pipeline()?;
        }

        Ok(config)
    }

    /// Loads the jobs file at `path`, the built-in configuration is used when it doesn't exist
    ///
    /// ## Errors
    ///
    /// Fails if the file can't be read or isn't a valid configuration
    pub fn load(path: &Utf8Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("{path} not found, using the default jobs");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// The job called `name`, or the first one when no name is given
    ///
    /// ## Errors
    ///
    /// Fails with `Error::UnknownJob` if no job has this name, or with `Error::NoJob` if there is no job at all
    pub fn find(&self, name: Option<&str>) -> Result<&Job> {
        match name {
            Some(name) => self
                .jobs
                .iter()
                .find(|job| job.name == name)
                .ok_or_else(|| Error::UnknownJob(name.to_string())),
            None => self.jobs.first().ok_or(Error::NoJob),
        }
    }
}
