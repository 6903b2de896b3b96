#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub use crate::{
    context::{CancelHandle, RunContext},
    errors::{Error, ErrorKind, ExtractionError, Result},
    events::{Event, Summary},
    format::{Format, SUPPORTED_EXTENSIONS},
    jobs::{find_pipeline, ConversionPipeline, Job, JobConfig, MangaConverter, PIPELINES},
    pipeline::{convert_dir, convert_file, scan},
    runner::{RunHandle, RunStatus},
    staging::{ImageSink, StagingArea, STAGING_DIR_NAME},
    types::{ExtractedImage, SourceFile},
};

mod archive;
pub mod context;
mod epub;
pub mod errors;
pub mod events;
pub mod format;
pub mod jobs;
mod mobi;
mod pdf;
pub mod pipeline;
mod render;
pub mod runner;
pub mod staging;
pub mod types;
