pub mod pdf_loader;

pub use pdf_loader::{discover_pdf_files, PdfFiles};
