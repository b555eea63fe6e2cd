use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Котировка, разобранная из одной TAQ-строки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Наносекунды от локальной полуночи
    pub timestamp_ns: u64,
    /// Символ как есть, без trim и смены регистра
    pub ticker: String,
    /// Цена bid
    pub bid_px: f64,
    /// Объём bid
    pub bid_qty: i64,
    /// Цена offer
    pub offer_px: f64,
    /// Объём offer
    pub offer_qty: i64,
}

impl Quote {
    /// Время от полуночи как `Duration`
    pub fn time_of_day(&self) -> Duration {
        Duration::from_nanos(self.timestamp_ns)
    }
}

/// Текстовый формат: TIMESTAMP_NS|TICKER|BID_PX|BID_QTY|OFFER_PX|OFFER_QTY
impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}|{}",
            self.timestamp_ns,
            self.ticker,
            self.bid_px,
            self.bid_qty,
            self.offer_px,
            self.offer_qty
        )
    }
}

/// Поле TAQ-строки (для сообщений об ошибках)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Время целиком (HHMMSSNNNNNNNNN)
    Timestamp,
    /// Часы (HH)
    Hours,
    /// Минуты (MM)
    Minutes,
    /// Секунды (SS)
    Seconds,
    /// Наносекунды (NNNNNNNNN)
    Nanos,
    /// Биржа (не используется)
    Exchange,
    /// Тикер
    Symbol,
    /// Цена bid
    BidPrice,
    /// Объём bid
    BidSize,
    /// Цена offer
    OfferPrice,
    /// Объём offer
    OfferSize,
}

impl Field {
    /// Имя поля как в заголовке TAQ-файла
    pub fn name(self) -> &'static str {
        match self {
            Field::Timestamp => "Time",
            Field::Hours => "Time.hours",
            Field::Minutes => "Time.minutes",
            Field::Seconds => "Time.seconds",
            Field::Nanos => "Time.nanos",
            Field::Exchange => "Exchange",
            Field::Symbol => "Symbol",
            Field::BidPrice => "Bid_Price",
            Field::BidSize => "Bid_Size",
            Field::OfferPrice => "Offer_Price",
            Field::OfferSize => "Offer_Size",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
