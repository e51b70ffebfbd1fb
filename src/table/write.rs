// src/table/write.rs

use csv::WriterBuilder;
use parquet::{
    arrow::ArrowWriter,
    basic::{BrotliLevel, Compression},
    file::properties::WriterProperties,
};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use super::ResponseTable;
use crate::error::Result;
use crate::schema::table_to_record_batch;

/// Write to `.<name>.tmp` next to `path`, then rename over `path`.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(File) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".into());
    let tmp_path: PathBuf = path.with_file_name(format!(".{}.tmp", file_name));

    let file = File::create(&tmp_path)?;
    if let Err(e) = write(file) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    fs::rename(&tmp_path, path)?;
    debug!(path = %path.display(), "renamed into place");
    Ok(())
}

/// Write the table as CSV; missing cells become empty fields.
#[tracing::instrument(level = "info", skip(table, path), fields(path = %path.as_ref().display()))]
pub fn write_csv<P: AsRef<Path>>(table: &ResponseTable, path: P) -> Result<()> {
    write_atomically(path.as_ref(), |file| {
        let mut wtr = WriterBuilder::new().from_writer(file);
        wtr.write_record(table.columns())?;
        for row in table.rows() {
            wtr.write_record(row.cells().iter().map(|c| c.render().into_owned()))?;
        }
        wtr.flush()?;
        Ok(())
    })?;
    info!(rows = table.num_rows(), "wrote CSV");
    Ok(())
}

/// Write the table as a single-row-group Parquet file.
#[tracing::instrument(level = "info", skip(table, path), fields(path = %path.as_ref().display()))]
pub fn write_parquet<P: AsRef<Path>>(table: &ResponseTable, path: P) -> Result<()> {
    let batch = table_to_record_batch(table)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::BROTLI(BrotliLevel::try_new(5)?))
        .set_dictionary_enabled(true)
        .build();

    write_atomically(path.as_ref(), |file| {
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    })?;
    info!(rows = batch.num_rows(), "wrote Parquet");
    Ok(())
}
