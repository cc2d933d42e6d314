//! # docstamp
//!
//! Audit-row and title stamping for Word documents in a document library.
//!
//! This library opens a `.docx` package in memory, appends an audit row
//! (`id` / `author` / `date`) to the table whose header row carries the
//! expected literals, rewrites the document title placeholder — a tagged
//! structured content control, with a paragraph-style fallback — across the
//! body, headers, and footers, updates `dc:title` in the core properties,
//! and re-serializes the package. Untouched parts round-trip byte-for-byte;
//! no schema validation is attempted.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docstamp::{stamp_file, AuditRow, StampOptions};
//!
//! let row = AuditRow::new("1233", "Pedro", "12/08/2025");
//! let options = StampOptions::new(row, "Informe revisado");
//! let (bytes, report) = stamp_file("informe.docx", &options)?;
//! std::fs::write("informe-edited.docx", bytes)?;
//! println!("headers updated: {}", report.headers_updated);
//! # Ok::<(), docstamp::Error>(())
//! ```
//!
//! ## Document stores
//!
//! ```no_run
//! use docstamp::store::{DocumentStore, LocalStore};
//!
//! let store = LocalStore::new("/srv/docs");
//! for entry in store.list_documents("contratos")? {
//!     println!("{}", entry.name);
//! }
//! # Ok::<(), docstamp::Error>(())
//! ```
//!
//! With the `remote` feature (default), [`store::RestStore`] talks to a
//! content-management site over its REST surface instead.
//!
//! ## Features
//!
//! - `remote` (default): REST document-store client.

pub mod docx;
pub mod error;
pub mod package;
pub mod stamp;
pub mod store;

// Re-exports
pub use docx::inspect::{list_sdt_controls, SdtInfo};
pub use docx::split::split_at_first_page_break;
pub use docx::table::AuditRow;
pub use error::{Error, Result};
pub use package::DocxPackage;
pub use stamp::{stamp_bytes, stamp_file, StampOptions, StampReport};
pub use store::{stamped_name, DocumentEntry, DocumentStore, LocalStore};

#[cfg(feature = "remote")]
pub use store::RestStore;
