use crate::domain::account::AccountSnapshot;
use crate::error::Result;
use std::io::Write;

/// Writes final account balances as CSV (`id,balance`).
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Serializes every snapshot and flushes the sink.
    pub fn write_accounts<'a>(
        &mut self,
        accounts: impl IntoIterator<Item = &'a AccountSnapshot>,
    ) -> Result<()> {
        for account in accounts {
            self.writer.serialize(account)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
