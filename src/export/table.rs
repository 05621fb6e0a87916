use crate::config::ExportConfig;
use crate::pipeline::{Assignment, PipelineError, PipelineResult};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writes (row, tube) assignments as a two-column delimited table.
pub struct TableExporter {
    config: ExportConfig,
}

impl Default for TableExporter {
    fn default() -> Self {
        Self::new(ExportConfig::default())
    }
}

impl TableExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn default_extension(&self) -> &str {
        &self.config.default_extension
    }

    /// Append the default extension when `path` has none.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.extension().is_some() {
            path.to_path_buf()
        } else {
            path.with_extension(&self.config.default_extension)
        }
    }

    /// Header record followed by one record per assignment, in the given
    /// order. Headers are quoted as needed.
    pub fn write_records<W: Write>(&self, out: W, assignments: &[Assignment]) -> io::Result<()> {
        let delimiter = u8::try_from(self.config.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("delimiter {:?} is not a single ASCII character", self.config.delimiter),
                )
            })?;

        let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_writer(out);
        writer.write_record([&self.config.row_header, &self.config.tube_header])?;
        for a in assignments {
            writer.write_record([a.row.to_string(), a.tube.to_string()])?;
        }
        writer.flush()
    }

    /// Write the table to `path` (default extension applied) and return the
    /// final location.
    ///
    /// The table goes to a temporary file next to the target and is renamed
    /// into place, so the target is either fully written or left untouched.
    /// An empty assignment list is rejected before the filesystem is touched.
    pub fn write(&self, assignments: &[Assignment], path: &Path) -> PipelineResult<PathBuf> {
        if assignments.is_empty() {
            return Err(PipelineError::EmptyFeatureSet);
        }

        let target = self.resolve_path(path);
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let write_error = |source: std::io::Error| PipelineError::ExportWrite {
            path: target.clone(),
            source,
        };

        let mut file = NamedTempFile::new_in(&dir).map_err(write_error)?;
        self.write_records(file.as_file_mut(), assignments)
            .map_err(write_error)?;
        file.as_file().sync_all().map_err(write_error)?;
        file.persist(&target).map_err(|e| write_error(e.error))?;

        tracing::info!(
            path = %target.display(),
            lines = assignments.len(),
            "Table written"
        );
        Ok(target)
    }
}
