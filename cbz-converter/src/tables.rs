use cbz_converter::{Job, SourceFile};
use cli_table::Table;

#[derive(Debug, Clone, Table)]
pub struct JobRow {
    #[table(title = "Name")]
    name: String,
    #[table(title = "Pipeline")]
    pipeline: String,
    #[table(title = "Description")]
    description: String,
}

impl From<&Job> for JobRow {
    fn from(job: &Job) -> Self {
        Self {
            name: job.name.clone(),
            pipeline: job.pipeline.clone(),
            description: job.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Table)]
pub struct SourceRow {
    #[table(title = "File")]
    name: String,
    #[table(title = "Format")]
    format: String,
}

impl From<&SourceFile> for SourceRow {
    fn from(source: &SourceFile) -> Self {
        Self {
            name: source.file_name().to_string(),
            format: source.format().to_string(),
        }
    }
}
