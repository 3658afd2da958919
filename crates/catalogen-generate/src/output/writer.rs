use std::collections::BTreeMap;
use std::fs::{File, create_dir_all};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::sql::{Row, insert_statement};
use super::tables::TableId;

const PREAMBLE: [&str; 10] = [
    "/*!40101 SET @OLD_CHARACTER_SET_CLIENT=@@CHARACTER_SET_CLIENT */;",
    "/*!40101 SET @OLD_CHARACTER_SET_RESULTS=@@CHARACTER_SET_RESULTS */;",
    "/*!40101 SET @OLD_COLLATION_CONNECTION=@@COLLATION_CONNECTION */;",
    "/*!40101 SET NAMES utf8 */;",
    "/*!40103 SET @OLD_TIME_ZONE=@@TIME_ZONE */;",
    "/*!40103 SET TIME_ZONE='+00:00' */;",
    "/*!40014 SET @OLD_UNIQUE_CHECKS=@@UNIQUE_CHECKS, UNIQUE_CHECKS=0 */;",
    "/*!40014 SET @OLD_FOREIGN_KEY_CHECKS=@@FOREIGN_KEY_CHECKS, FOREIGN_KEY_CHECKS=0 */;",
    "/*!40101 SET @OLD_SQL_MODE=@@SQL_MODE, SQL_MODE='NO_AUTO_VALUE_ON_ZERO' */;",
    "/*!40111 SET @OLD_SQL_NOTES=@@SQL_NOTES, SQL_NOTES=0 */;",
];

const POSTAMBLE: [&str; 8] = [
    "/*!40103 SET TIME_ZONE=@OLD_TIME_ZONE */;",
    "/*!40101 SET SQL_MODE=@OLD_SQL_MODE */;",
    "/*!40014 SET FOREIGN_KEY_CHECKS=@OLD_FOREIGN_KEY_CHECKS */;",
    "/*!40014 SET UNIQUE_CHECKS=@OLD_UNIQUE_CHECKS */;",
    "/*!40101 SET CHARACTER_SET_CLIENT=@OLD_CHARACTER_SET_CLIENT */;",
    "/*!40101 SET CHARACTER_SET_RESULTS=@OLD_CHARACTER_SET_RESULTS */;",
    "/*!40101 SET COLLATION_CONNECTION=@OLD_COLLATION_CONNECTION */;",
    "/*!40111 SET SQL_NOTES=@OLD_SQL_NOTES */;",
];

/// Per-table write accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub statements: u64,
    pub rows: u64,
    pub dropped: u64,
}

/// Totals reported once the streams are finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputSummary {
    pub script_bytes: u64,
    pub manifest_bytes: u64,
    pub statements: u64,
    pub rows: u64,
}

/// Buffers generated rows per table and writes them as multi-row
/// INSERT statements to the script stream.
pub struct OutputWriter {
    script: CountingWriter<Box<dyn Write>>,
    manifest: Option<CountingWriter<Box<dyn Write>>>,
    buffers: BTreeMap<TableId, Vec<Row>>,
    stats: BTreeMap<TableId, TableStats>,
    captured: Option<BTreeMap<TableId, Vec<Row>>>,
    finished: bool,
}

impl OutputWriter {
    /// Creates the script file (and the manifest file when requested).
    pub fn create(script_path: &Path, manifest_path: Option<&Path>) -> io::Result<Self> {
        let script = open_buffered(script_path)?;
        let manifest = match manifest_path {
            Some(path) => Some(open_buffered(path)?),
            None => None,
        };
        Self::from_writers(script, manifest)
    }

    /// Wraps arbitrary sinks; the preamble is written immediately.
    pub fn from_writers(
        script: Box<dyn Write>,
        manifest: Option<Box<dyn Write>>,
    ) -> io::Result<Self> {
        let mut writer = Self {
            script: CountingWriter::new(script),
            manifest: manifest.map(CountingWriter::new),
            buffers: BTreeMap::new(),
            stats: BTreeMap::new(),
            captured: None,
            finished: false,
        };
        for line in PREAMBLE {
            writeln!(writer.script, "{line}")?;
        }
        writeln!(writer.script)?;
        Ok(writer)
    }

    /// Keeps a copy of every flushed row for inspection.
    pub fn capture_rows(mut self) -> Self {
        self.captured = Some(BTreeMap::new());
        self
    }

    pub fn has_manifest(&self) -> bool {
        self.manifest.is_some()
    }

    pub fn push(&mut self, table: TableId, row: Row) {
        self.buffers.entry(table).or_default().push(row);
    }

    pub fn pending(&self, table: TableId) -> usize {
        self.buffers.get(&table).map_or(0, Vec::len)
    }

    /// Appends one media path to the manifest; a no-op without a manifest.
    pub fn push_manifest(&mut self, path: &str) -> io::Result<()> {
        if let Some(manifest) = self.manifest.as_mut() {
            writeln!(manifest, "{path}")?;
        }
        Ok(())
    }

    /// Writes the buffer of `table` as one statement and clears it.
    pub fn flush(&mut self, table: TableId) -> io::Result<()> {
        let Some(rows) = self.buffers.remove(&table) else {
            return Ok(());
        };
        let Some(statement) = insert_statement(table.name(), &rows) else {
            return Ok(());
        };

        self.script.write_all(statement.sql.as_bytes())?;

        let stats = self.stats.entry(table).or_default();
        stats.statements += 1;
        stats.rows += statement.rows as u64;
        stats.dropped += statement.dropped as u64;
        if statement.dropped > 0 {
            debug!(
                table = table.name(),
                dropped = statement.dropped,
                "rows with divergent columns dropped"
            );
        }

        if let Some(captured) = self.captured.as_mut() {
            captured.entry(table).or_default().extend(rows);
        }
        Ok(())
    }

    /// Flushes every non-empty buffer in table declaration order.
    pub fn flush_all(&mut self) -> io::Result<()> {
        let tables: Vec<TableId> = self.buffers.keys().copied().collect();
        for table in tables {
            self.flush(table)?;
        }
        Ok(())
    }

    /// Flushes pending rows, writes the postamble and flushes both streams.
    pub fn finish(&mut self) -> io::Result<OutputSummary> {
        if !self.finished {
            self.flush_all()?;
            writeln!(self.script)?;
            for line in POSTAMBLE {
                writeln!(self.script, "{line}")?;
            }
            self.script.flush()?;
            if let Some(manifest) = self.manifest.as_mut() {
                manifest.flush()?;
            }
            self.finished = true;
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> OutputSummary {
        let (statements, rows) = self
            .stats
            .values()
            .fold((0, 0), |(s, r), stats| (s + stats.statements, r + stats.rows));
        OutputSummary {
            script_bytes: self.script.bytes_written(),
            manifest_bytes: self
                .manifest
                .as_ref()
                .map_or(0, CountingWriter::bytes_written),
            statements,
            rows,
        }
    }

    pub fn stats(&self) -> &BTreeMap<TableId, TableStats> {
        &self.stats
    }

    /// Rows flushed so far for `table`; empty unless capture is enabled.
    pub fn captured(&self, table: TableId) -> &[Row] {
        self.captured
            .as_ref()
            .and_then(|captured| captured.get(&table))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Captured rows of every table whose id satisfies `filter`.
    pub fn captured_where(&self, filter: impl Fn(TableId) -> bool) -> Vec<&Row> {
        self.captured
            .iter()
            .flat_map(|captured| captured.iter())
            .filter(|(table, _)| filter(**table))
            .flat_map(|(_, rows)| rows.iter())
            .collect()
    }
}

impl Drop for OutputWriter {
    fn drop(&mut self) {
        let _ = self.script.flush();
        if let Some(manifest) = self.manifest.as_mut() {
            let _ = manifest.flush();
        }
    }
}

fn open_buffered(path: &Path) -> io::Result<Box<dyn Write>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.bytes += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Shared in-memory sink, readable after the writer consumed a clone.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.buffer
            .lock()
            .map(|buffer| String::from_utf8_lossy(&buffer).into_owned())
            .unwrap_or_default()
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| io::Error::other("failed to lock memory sink"))?;
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::sql::SqlValue;
    use catalogen_core::BackendType;

    fn writer() -> (OutputWriter, MemorySink, MemorySink) {
        let script = MemorySink::new();
        let manifest = MemorySink::new();
        let writer = OutputWriter::from_writers(
            Box::new(script.clone()),
            Some(Box::new(manifest.clone())),
        )
        .expect("writer")
        .capture_rows();
        (writer, script, manifest)
    }

    #[test]
    fn three_rows_flush_as_one_statement() {
        let (mut writer, script, _) = writer();
        for i in 1..=3_i64 {
            writer.push(
                TableId::CustomerGroup,
                Row::new().with("a", i).with("b", SqlValue::Null),
            );
        }
        writer.flush(TableId::CustomerGroup).expect("flush");
        writer.flush(TableId::CustomerGroup).expect("second flush is a no-op");

        let output = script.contents();
        assert_eq!(output.matches("INSERT INTO").count(), 1);
        assert!(output.contains("INSERT INTO `customer_group` (`a`, `b`) VALUES (1, NULL),(2, NULL),(3, NULL);"));
        assert_eq!(writer.pending(TableId::CustomerGroup), 0);
        assert_eq!(writer.captured(TableId::CustomerGroup).len(), 3);
    }

    #[test]
    fn finish_wraps_script_with_session_settings() {
        let (mut writer, script, manifest) = writer();
        writer.push(
            TableId::ProductValue(BackendType::Int),
            Row::new().with("value", 1_i64),
        );
        writer.push_manifest("/a/b/ab_00000001_01.jpg").expect("manifest");
        let summary = writer.finish().expect("finish");

        let output = script.contents();
        assert!(output.starts_with("/*!40101 SET @OLD_CHARACTER_SET_CLIENT"));
        assert!(output.contains("SQL_MODE='NO_AUTO_VALUE_ON_ZERO'"));
        assert!(output.contains("INSERT INTO `catalog_product_entity_int`"));
        assert!(output.trim_end().ends_with("/*!40111 SET SQL_NOTES=@OLD_SQL_NOTES */;"));
        assert_eq!(manifest.contents(), "/a/b/ab_00000001_01.jpg\n");
        assert_eq!(summary.statements, 1);
        assert_eq!(summary.rows, 1);
        assert_eq!(summary.script_bytes, output.len() as u64);
    }

    #[test]
    fn flush_all_follows_table_order() {
        let (mut writer, script, _) = writer();
        writer.push(TableId::UrlRewrite, Row::new().with("x", 1_i64));
        writer.push(TableId::ProductEntity, Row::new().with("x", 1_i64));
        writer.push(TableId::CategoryEntity, Row::new().with("x", 1_i64));
        writer.flush_all().expect("flush");

        let output = script.contents();
        let category = output.find("`catalog_category_entity`").expect("category");
        let product = output.find("`catalog_product_entity`").expect("product");
        let url = output.find("`url_rewrite`").expect("url");
        assert!(category < product && product < url);
    }
}
