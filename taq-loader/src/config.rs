use std::time::Duration;

/// Количество потоков-парсеров по умолчанию
pub(crate) const DEFAULT_WORKERS: usize = 4;

/// Ёмкость каналов reader -> workers -> writer
pub(crate) const CHANNEL_CAPACITY: usize = 1024;

/// Тикеры для `generate`, если не заданы явно
pub(crate) const DEFAULT_TICKERS: &str = "AAPL,IBM,MSFT,TSLA";

pub(crate) const DEFAULT_GENERATE_COUNT: u64 = 1000;

/// Начало торговой сессии: 09:30:00
pub(crate) const SESSION_OPEN: Duration = Duration::from_secs(9 * 3600 + 30 * 60);

/// Максимальный шаг времени между соседними котировками
pub(crate) const MAX_QUOTE_GAP: Duration = Duration::from_millis(5);
