use std::io;
use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

use crate::types::Field;

/// Верхнеуровневый тип ошибок крейта
#[derive(Debug, Error)]
pub enum TaqCoreError {
    /// Ошибки разбора строки
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Ошибки чтения фида
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Категория ошибки разбора
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Поле времени не из 15 символов
    MalformedTimestamp,
    /// Токен не конвертируется в число
    NumericConversion,
    /// Токенов меньше, чем требует формат
    MissingField,
}

/// Ошибка конкретного поля, без контекста строки
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Поле времени не из 15 символов
    #[error("timestamp field ({token}) is not in HHMMSSNNNNNNNNN format")]
    MalformedTimestamp {
        /// Поле как есть
        token: String,
    },

    /// В числовом поле времени не только цифры
    #[error("invalid {field} value ({token}): expected decimal digits")]
    NotDigits {
        /// Какое поле
        field: Field,
        /// Значение как есть
        token: String,
    },

    /// Целое число не разбирается (или вне диапазона)
    #[error("invalid {field} value ({token}): {source}")]
    InvalidInteger {
        /// Какое поле
        field: Field,
        /// Значение как есть
        token: String,
        /// Исходная ошибка std
        #[source]
        source: ParseIntError,
    },

    /// Число с плавающей точкой не разбирается
    #[error("invalid {field} value ({token}): {source}")]
    InvalidFloat {
        /// Какое поле
        field: Field,
        /// Значение как есть
        token: String,
        /// Исходная ошибка std
        #[source]
        source: ParseFloatError,
    },

    /// Строка закончилась раньше, чем нужное поле
    #[error("missing {0} field")]
    MissingField(Field),
}

impl FieldError {
    /// Категория ошибки
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            FieldError::MalformedTimestamp { .. } => ParseErrorKind::MalformedTimestamp,
            FieldError::NotDigits { .. }
            | FieldError::InvalidInteger { .. }
            | FieldError::InvalidFloat { .. } => ParseErrorKind::NumericConversion,
            FieldError::MissingField(_) => ParseErrorKind::MissingField,
        }
    }
}

/// Ошибка разбора TAQ-строки: причина + номер и текст строки
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source} in line #{line_number} ({line})")]
pub struct ParseError {
    /// Номер строки (как его передал вызывающий)
    pub line_number: u64,
    /// Полный текст строки
    pub line: String,
    /// Первая ошибка поля
    #[source]
    pub source: FieldError,
}

impl ParseError {
    /// Категория ошибки
    pub fn kind(&self) -> ParseErrorKind {
        self.source.kind()
    }
}

/// Ошибки сериализации
#[derive(Debug, Error)]
pub enum WireError {
    /// Пакет слишком короткий (не соотв. заявленной длине)
    #[error("packet too short")]
    PacketTooShort,

    /// Неверная версия формата
    #[error("unsupported wire version: {0}")]
    UnsupportedWireVersion(u8),

    /// Кадр больше допустимого размера
    #[error("frame too large: {0} bytes")]
    FrameTooLarge(usize),

    /// Ошибка сериализации/десериализации
    #[error("postcard encode/decode error: {0}")]
    Postcard(#[from] postcard::Error),

    /// Ошибка чтения/записи кадра
    #[error("frame i/o error: {0}")]
    Io(#[from] io::Error),
}
