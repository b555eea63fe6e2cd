use std::collections::HashSet;
use std::io::{self, Write};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config;

const HEADER: &str = "Time|Exchange|Symbol|Bid_Price|Bid_Size|Offer_Price|Offer_Size|Quote_Condition|Sequence_Number";

const EXCHANGES: [char; 6] = ['Q', 'N', 'P', 'Z', 'K', 'T'];

/// Последняя наносекунда суток: время дальше не растёт
const LAST_NS_OF_DAY: u64 = 24 * 3600 * 1_000_000_000 - 1;

#[derive(Debug, Clone)]
pub(crate) struct GeneratorConfig {
    /// Максимальный относительный шаг цены за тик (пример: 0.002 = 0.2%)
    pub(crate) max_rel_step: f64,
    /// Минимальная допустимая цена
    pub(crate) min_price: f64,
    /// Шаг цены
    pub(crate) tick: f64,
    pub(crate) start_ns: u64,
    pub(crate) max_gap_ns: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_rel_step: 0.002,
            min_price: 0.01,
            tick: 0.01,
            start_ns: config::SESSION_OPEN.as_nanos() as u64,
            max_gap_ns: config::MAX_QUOTE_GAP.as_nanos() as u64,
        }
    }
}

/// Внутреннее состояние тикера.
#[derive(Debug, Clone)]
struct TickerState {
    ticker: String,
    mid: f64,
}

/// Генератор синтетического TAQ-файла (random walk по mid-цене)
pub(crate) struct FeedGenerator {
    cfg: GeneratorConfig,
    rng: StdRng,
    states: Vec<TickerState>,
    clock_ns: u64,
    seq: u64,

    /// Набор "высоколиквидных" тикеров для более крупного объёма.
    high_volume: HashSet<String>,
}

impl FeedGenerator {
    pub(crate) fn new(tickers: Vec<String>, seed: Option<u64>, cfg: GeneratorConfig) -> Self {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };

        let states = tickers
            .into_iter()
            .map(|ticker| TickerState {
                ticker,
                mid: rng.random_range(20.0..500.0),
            })
            .collect();

        let high_volume = ["AAPL", "MSFT", "TSLA"]
            .into_iter()
            .map(|s| s.to_string())
            .collect::<HashSet<_>>();

        Self {
            clock_ns: cfg.start_ns,
            cfg,
            rng,
            states,
            seq: 0,
            high_volume,
        }
    }

    /// следующая строка фида
    pub(crate) fn next_line(&mut self) -> String {
        self.clock_ns = (self.clock_ns + self.rng.random_range(0..=self.cfg.max_gap_ns)).min(LAST_NS_OF_DAY);
        self.seq += 1;

        let idx = self.rng.random_range(0..self.states.len());
        let delta = self
            .rng
            .random_range(-self.cfg.max_rel_step..self.cfg.max_rel_step);
        let st = &mut self.states[idx];
        st.mid = ((1.0 + delta) * st.mid).max(self.cfg.min_price);

        let half_spread = self.cfg.tick * self.rng.random_range(1..=5) as f64;
        let bid = (st.mid - half_spread).max(self.cfg.tick);
        let offer = st.mid + half_spread;

        // объём: популярные -> больше
        let (bid_qty, offer_qty) = if self.high_volume.contains(&st.ticker) {
            (
                10 + self.rng.random_range(0..500),
                10 + self.rng.random_range(0..500),
            )
        } else {
            (
                1 + self.rng.random_range(0..100),
                1 + self.rng.random_range(0..100),
            )
        };
        let exchange = EXCHANGES[self.rng.random_range(0..EXCHANGES.len())];

        format!(
            "{}|{}|{}|{:.2}|{}|{:.2}|{}|R|{}",
            format_time(self.clock_ns),
            exchange,
            st.ticker,
            bid,
            bid_qty,
            offer,
            offer_qty,
            self.seq
        )
    }

    /// Пишет файл целиком: заголовок, `count` котировок, трейлер `END|`
    pub(crate) fn write_feed<W: Write>(&mut self, out: &mut W, count: u64) -> io::Result<()> {
        writeln!(out, "{HEADER}")?;
        for _ in 0..count {
            writeln!(out, "{}", self.next_line())?;
        }
        writeln!(out, "END|{count}||||||||")?;
        out.flush()
    }
}

/// наносекунды от полуночи -> HHMMSSNNNNNNNNN
fn format_time(ns: u64) -> String {
    let nanos = ns % 1_000_000_000;
    let secs = ns / 1_000_000_000;
    format!(
        "{:02}{:02}{:02}{:09}",
        secs / 3600,
        secs / 60 % 60,
        secs % 60,
        nanos
    )
}
