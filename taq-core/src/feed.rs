use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use log::debug;

use crate::constants::{HEADER_PREFIX, TRAILER_PREFIX};
use crate::Result;
use crate::parser::parse_taq_line;
use crate::types::Quote;

/// Итератор по записям TAQ-файла: `(номер строки, строка)`.
///
/// - номера строк физические, с 1 (заголовок тоже считается)
/// - заголовок `Time|...` в первой строке пропускается
/// - чтение заканчивается на строке `END|...`
/// - завершающий `\r` срезается, остальные пробелы остаются как есть
pub struct TaqLines<R> {
    lines: io::Lines<R>,
    line_number: u64,
    done: bool,
}

impl<R: BufRead> TaqLines<R> {
    /// Оборачивает любой `BufRead`
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for TaqLines<R> {
    type Item = io::Result<(u64, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let mut line = match self.lines.next()? {
                Ok(l) => l,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            self.line_number += 1;

            if line.ends_with('\r') {
                line.pop();
            }

            if self.line_number == 1 && line.starts_with(HEADER_PREFIX) {
                debug!("skipping TAQ header");
                continue;
            }
            if line.starts_with(TRAILER_PREFIX) {
                debug!("TAQ trailer at line #{}", self.line_number);
                self.done = true;
                break;
            }

            return Some(Ok((self.line_number, line)));
        }
        None
    }
}

/// Читает и разбирает все котировки, останавливаясь на первой ошибке
pub fn read_quotes<R: io::Read>(reader: R) -> Result<Vec<Quote>> {
    let mut out = Vec::new();
    for item in TaqLines::new(BufReader::new(reader)) {
        let (line_number, line) = item?;
        out.push(parse_taq_line(line_number, &line)?);
    }
    Ok(out)
}

/// Чтение котировок из файла
pub fn read_quotes_from_path(path: impl AsRef<Path>) -> Result<Vec<Quote>> {
    let f = File::open(path)?;
    read_quotes(f)
}
