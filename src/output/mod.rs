//! Report formatters for both subcommands.
//!
//! - text for people (colored unless disabled)
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! Every formatter writes to any `std::io::Write`, so reports can go to
//! stdout or be captured in tests.
//!
//! # Example
//!
//! ```no_run
//! use hdcleaner::catalog::Catalog;
//! use hdcleaner::duplicates::DuplicateFinder;
//! use hdcleaner::error::ExitCode;
//! use hdcleaner::output::JsonScanOutput;
//! use std::path::Path;
//!
//! let catalog = Catalog::from_entries(vec![("/data/a.bin", Some(3)), ("/data/b.bin", Some(3))]);
//! let (groups, summary) = DuplicateFinder::with_defaults().find(&catalog).unwrap();
//!
//! let output = JsonScanOutput::new(Path::new("/data"), &groups, &summary, ExitCode::Success);
//! output.write_to(&mut std::io::stdout()).unwrap();
//! ```

pub mod csv;
pub mod json;
pub mod text;

pub use csv::{CsvOutput, CsvOutputError, ReconcileCsvOutput};
pub use json::{JsonOutputError, JsonReconcileOutput, JsonScanOutput};
pub use text::TextOutput;
