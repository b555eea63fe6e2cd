/// Разделитель полей TAQ-строки
pub const FIELD_DELIMITER: char = '|';

/// Длина поля времени в формате HHMMSSNNNNNNNNN
pub const TIMESTAMP_LEN: usize = 15;

pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Заголовок TAQ-файла начинается с этого префикса
pub const HEADER_PREFIX: &str = "Time|";

/// Последняя (служебная) строка TAQ-файла
pub const TRAILER_PREFIX: &str = "END|";
