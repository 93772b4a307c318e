pub mod archiver;
pub mod bounded_wait;
pub mod download_watcher;

pub use archiver::{archive_directory, ArchiveReport};
pub use bounded_wait::{poll_until, WaitOutcome};
pub use download_watcher::{is_accepted_output, DownloadWatcher};
