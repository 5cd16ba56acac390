//! Human-readable report.
//!
//! ```text
//! Group 1: 2 files of 10 B (hash 3f1c0a9e2b7d4c61)
//!   /data/x.txt
//!   /data/y.txt
//!
//! 1 duplicate group, 1 redundant file, 10 B reclaimable
//! ```
//!
//! Colors go through `yansi` and are switched off with `--no-color` or
//! `NO_COLOR`.

use std::io::{self, Write};
use std::path::Path;

use bytesize::ByteSize;
use yansi::{Condition, Paint};

use crate::duplicates::{DuplicateGroup, FindSummary, ReconcileSummary, ReconciliationMatch};

/// Number of hash characters shown per group.
const SHORT_HASH_LEN: usize = 16;

/// Plain-text formatter for both subcommands.
#[derive(Clone, Copy)]
pub struct TextOutput {
    condition: Condition,
}

impl TextOutput {
    /// Create a formatter. `color = false` never emits escape codes.
    #[must_use]
    pub fn new(color: bool) -> Self {
        let condition = if color { Condition::ALWAYS } else { Condition::NEVER };
        Self { condition }
    }

    /// Write duplicate groups and a summary line.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from `writer`.
    pub fn write_groups<W: Write>(
        &self,
        writer: &mut W,
        groups: &[DuplicateGroup],
        summary: &FindSummary,
    ) -> io::Result<()> {
        for (idx, group) in groups.iter().enumerate() {
            let hash = group.hash_hex();
            let short = &hash[..SHORT_HASH_LEN.min(hash.len())];
            writeln!(
                writer,
                "{} {} files of {} (hash {})",
                format!("Group {}:", idx + 1).bold().whenever(self.condition),
                group.len(),
                ByteSize::b(group.size),
                short.dim().whenever(self.condition),
            )?;
            for path in &group.members {
                writeln!(writer, "  {}", path.display())?;
            }
            writeln!(writer)?;
        }

        if groups.is_empty() {
            writeln!(writer, "{}", "No duplicates found.".yellow().whenever(self.condition))?;
        } else {
            writeln!(
                writer,
                "{} duplicate {}, {} redundant {}, {} reclaimable",
                summary.duplicate_groups,
                plural(summary.duplicate_groups, "group", "groups"),
                summary.duplicate_files,
                plural(summary.duplicate_files, "file", "files"),
                summary.reclaimable_display().green().whenever(self.condition),
            )?;
        }
        self.write_unreadable(writer, &summary.unreadable)
    }

    /// Write reconciliation matches and a summary line.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from `writer`.
    pub fn write_matches<W: Write>(
        &self,
        writer: &mut W,
        matches: &[ReconciliationMatch],
        summary: &ReconcileSummary,
    ) -> io::Result<()> {
        for m in matches {
            writeln!(
                writer,
                "{} {} {} ({})",
                m.client_path.display(),
                "==".dim().whenever(self.condition),
                m.master_path.display(),
                ByteSize::b(m.size),
            )?;
        }
        if matches.is_empty() {
            writeln!(
                writer,
                "{}",
                "No client files found in master.".yellow().whenever(self.condition)
            )?;
        } else {
            writeln!(writer)?;
            writeln!(
                writer,
                "{} client {} already in master, {} reclaimable",
                summary.matched_client_files,
                plural(summary.matched_client_files, "file", "files"),
                summary.reclaimable_display().green().whenever(self.condition),
            )?;
        }
        self.write_unreadable(writer, &summary.unreadable)
    }

    fn write_unreadable<W: Write, P: AsRef<Path>>(&self, writer: &mut W, paths: &[P]) -> io::Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        writeln!(
            writer,
            "{}",
            format!("Skipped {} unreadable {}:", paths.len(), plural(paths.len(), "file", "files"))
                .red()
                .whenever(self.condition)
        )?;
        for path in paths {
            writeln!(writer, "  {}", path.as_ref().display())?;
        }
        Ok(())
    }
}

fn plural(n: usize, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 {
        one
    } else {
        many
    }
}
