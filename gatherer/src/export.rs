use queue_eta_estimator::TickReport;
use std::{
    fs::{
        File,
        OpenOptions,
    },
    io::{
        BufWriter,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
};

/// Appends one JSON object per sample to a file.
pub struct JsonLinesExporter {
    path: PathBuf,
    writer: BufWriter<File>,
    failures: u64,
}

impl JsonLinesExporter {
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            failures: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Samples that could not be written.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Flushes after every line so an interrupted run keeps complete samples.
    pub fn append(&mut self, report: &TickReport) -> std::io::Result<()> {
        let result = self.write_line(report);
        if result.is_err() {
            self.failures += 1;
        }
        result
    }

    fn write_line(&mut self, report: &TickReport) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, report)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}
