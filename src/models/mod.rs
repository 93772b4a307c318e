pub mod batch;
pub mod job;
pub mod loaders;
pub mod snapshot;

pub use batch::{BatchRun, BatchSummary, UnresolvedJob};
pub use job::{ConversionJob, JobStatus};
pub use loaders::{discover_pdf_files, PdfFiles};
pub use snapshot::DirectorySnapshot;
