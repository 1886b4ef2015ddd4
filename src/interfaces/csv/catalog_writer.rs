use crate::domain::product::CatalogEntry;
use crate::error::Result;
use std::io::Write;

/// Writes catalog listings as CSV (`id,name,price,stock,image`).
pub struct CatalogWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CatalogWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_entries(&mut self, entries: impl IntoIterator<Item = CatalogEntry>) -> Result<()> {
        for entry in entries {
            self.writer.serialize(entry)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
