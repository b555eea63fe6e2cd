use std::io::Write;

use anyhow::Result;
use taq_core::Quote;
use taq_core::wire::{WireRecordV1, write_frame};

use crate::cli::OutputFormat;

/// Выход котировок в выбранном формате
pub(crate) struct QuoteSink<W: Write> {
    out: W,
    format: OutputFormat,
    written: u64,
}

impl<W: Write> QuoteSink<W> {
    pub(crate) fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            written: 0,
        }
    }

    pub(crate) fn write_quote(&mut self, q: &Quote) -> Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{q}")?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, q)?;
                self.out.write_all(b"\n")?;
            }
            OutputFormat::Postcard => {
                write_frame(&mut self.out, &WireRecordV1::Quote(q.clone()))?;
            }
        }
        self.written += 1;
        Ok(())
    }

    /// Закрывает поток (для postcard — запись `End`) и сбрасывает буфер
    pub(crate) fn finish(mut self) -> Result<W> {
        if self.format == OutputFormat::Postcard {
            write_frame(
                &mut self.out,
                &WireRecordV1::End {
                    quotes: self.written,
                },
            )?;
        }
        self.out.flush()?;
        Ok(self.out)
    }
}
