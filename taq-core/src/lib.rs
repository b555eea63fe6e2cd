//! # taq-core
//!
//! Разбор строк TAQ-фида (котировки, поля через `|`) в структурированные [`Quote`].
//!
//! Этот крейт содержит:
//!
//! - [`parser`] — разбор одной строки: `parse_taq_line(номер, строка)`
//! - [`feed`] — чтение TAQ-файла (заголовок, `END|`-трейлер, номера строк)
//! - [`wire`] — компактный бинарный формат (версия + postcard payload) и кадры
//! - [`types`] — доменные типы
//! - [`error`] — типы ошибок, которые возвращают компоненты `taq-core`
//!
//! ## Быстрый пример: разбор строки
//!
//! ```rust
//! use taq_core::parse_taq_line;
//!
//! let q = parse_taq_line(1, "093000000000000|Q|IBM|100.25|200|100.30|150").unwrap();
//! assert_eq!(q.timestamp_ns, (9 * 3600 + 30 * 60) * 1_000_000_000);
//! assert_eq!(q.ticker, "IBM");
//! assert_eq!(q.bid_qty, 200);
//! assert_eq!(q.offer_px, 100.30);
//! ```
//!
//! ## Пример: ошибка с контекстом строки
//!
//! ```rust
//! use taq_core::{parse_taq_line, ParseErrorKind};
//!
//! let err = parse_taq_line(2, "093000000000000|Q|IBM|100.25|200").unwrap_err();
//! assert_eq!(err.kind(), ParseErrorKind::MissingField);
//! assert_eq!(
//!     err.to_string(),
//!     "missing Offer_Price field in line #2 (093000000000000|Q|IBM|100.25|200)"
//! );
//! ```
//!
//! ## Пример: чтение фида
//!
//! ```rust
//! use taq_core::feed::read_quotes;
//! use std::io::Cursor;
//!
//! let input = "Time|Exchange|Symbol|Bid_Price|Bid_Size|Offer_Price|Offer_Size\n\
//!              093000000000000|Q|IBM|100.25|200|100.30|150\n\
//!              END|20161024|1\n";
//! let quotes = read_quotes(Cursor::new(input)).unwrap();
//! assert_eq!(quotes.len(), 1);
//! ```
//!
//! ## Дизайн
//!
//! Парсер — чистая функция без состояния и без I/O: её можно вызывать
//! параллельно из любого количества потоков. Политика на ошибочных строках
//! (остановиться или пропустить) решается вызывающей стороной.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Разбор одной TAQ-строки.
pub mod parser;

/// Чтение TAQ-файла построчно.
pub mod feed;

/// Доменные типы (котировка, поля).
pub mod types;

/// Бинарный формат для передачи котировок дальше.
pub mod wire;

/// Ошибки `taq-core`.
pub mod error;

/// Константы формата
mod constants;
pub use constants::{FIELD_DELIMITER, TIMESTAMP_LEN};

// --- Re-exports (публичный фасад API) ---

pub use crate::error::{FieldError, ParseError, ParseErrorKind, TaqCoreError, WireError};
pub use crate::parser::parse_taq_line;
pub use crate::types::{Field, Quote};

/// `Result` с ошибкой крейта по умолчанию
pub type Result<T, E = TaqCoreError> = std::result::Result<T, E>;
