use std::io::{BufWriter, Write};

use crate::runner::PlannedDay;

pub(crate) fn export_to_json_impl(
    days: &[PlannedDay],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, days)?;
    writer.flush()?;
    Ok(())
}
