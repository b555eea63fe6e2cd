use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::WireError;
use crate::types::Quote;

/// Версия бинарного формата (первый байт записи)
pub const WIRE_VERSION: u8 = 1;

/// Максимальный размер одного кадра
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Запись бинарного потока v1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WireRecordV1 {
    /// Котировка
    Quote(Quote),
    /// Конец потока
    End {
        /// Сколько котировок было отправлено
        quotes: u64,
    },
}

/// Версия + postcard payload
pub fn encode_v1(rec: &WireRecordV1) -> Result<Vec<u8>, WireError> {
    let mut out = vec![WIRE_VERSION];
    out.extend_from_slice(&postcard::to_allocvec(rec)?);
    Ok(out)
}

/// Обратно к записи, с проверкой версии
pub fn decode(buf: &[u8]) -> Result<WireRecordV1, WireError> {
    let (&ver, payload) = buf.split_first().ok_or(WireError::PacketTooShort)?;
    if ver != WIRE_VERSION {
        return Err(WireError::UnsupportedWireVersion(ver));
    }
    Ok(postcard::from_bytes(payload)?)
}

/// Пишет кадр: u32 LE длина + закодированная запись
pub fn write_frame<W: Write>(w: &mut W, rec: &WireRecordV1) -> Result<(), WireError> {
    let bytes = encode_v1(rec)?;
    if bytes.len() > MAX_FRAME_LEN {
        return Err(WireError::FrameTooLarge(bytes.len()));
    }
    w.write_all(&(bytes.len() as u32).to_le_bytes())?;
    w.write_all(&bytes)?;
    Ok(())
}

/// Читает следующий кадр. `Ok(None)` — чистый EOF между кадрами.
pub fn read_frame<R: Read>(r: &mut R) -> Result<Option<WireRecordV1>, WireError> {
    let mut len_buf = [0u8; 4];
    match read_full(r, &mut len_buf)? {
        0 => return Ok(None),
        4 => {}
        _ => return Err(WireError::PacketTooShort),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(WireError::FrameTooLarge(len));
    }

    let mut buf = vec![0u8; len];
    if read_full(r, &mut buf)? != len {
        return Err(WireError::PacketTooShort);
    }
    decode(&buf).map(Some)
}

/// Как `read_exact`, но возвращает количество прочитанного до EOF
fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
