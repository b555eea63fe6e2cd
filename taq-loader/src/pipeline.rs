use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use anyhow::anyhow;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};
use taq_core::feed::TaqLines;
use taq_core::{ParseError, Quote, parse_taq_line};
use thiserror::Error;

use crate::cli::ErrorPolicy;
use crate::sink::QuoteSink;

#[derive(Debug, Error)]
pub(crate) enum LoadError {
    #[error("load aborted: {0}")]
    Aborted(ParseError),

    #[error("too many bad lines: {skipped} (allowed {max})")]
    TooManyErrors { skipped: u64, max: u64 },
}

#[derive(Debug, Clone)]
pub(crate) struct PipelineConfig {
    pub(crate) workers: usize,
    pub(crate) policy: ErrorPolicy,
    pub(crate) max_errors: Option<u64>,
    pub(crate) channel_capacity: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct LoadStats {
    pub(crate) lines: u64,
    pub(crate) quotes: u64,
    pub(crate) skipped: u64,
    pub(crate) interrupted: bool,
    /// Максимальный размер буфера переупорядочивания
    pub(crate) peak_pending: usize,
}

impl fmt::Display for LoadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lines={} quotes={} skipped={}",
            self.lines, self.quotes, self.skipped
        )?;
        if self.interrupted {
            write!(f, " (interrupted)")?;
        }
        Ok(())
    }
}

/// Строка фида с порядковым номером для восстановления порядка
struct Job {
    seq: u64,
    line_number: u64,
    line: String,
}

type Parsed = (u64, Result<Quote, ParseError>);

/// Разбирает фид в несколько потоков и пишет котировки в исходном порядке.
///
/// reader -> [bounded] -> N workers -> [bounded] -> writer (текущий поток).
/// Строк "в полёте" (прочитано, но ещё не записано) не больше
/// `channel_capacity`: reader берёт кредит перед отправкой, writer возвращает
/// его после записи по порядку. Так буфер переупорядочивания ограничен, даже
/// если один воркер застрял.
/// `shutdown` проверяется между строками: уже прочитанные строки дописываются.
pub(crate) fn run<R, W>(
    input: R,
    sink: &mut QuoteSink<W>,
    cfg: &PipelineConfig,
    shutdown: &AtomicBool,
) -> anyhow::Result<LoadStats>
where
    R: BufRead + Send,
    W: Write,
{
    let stop = AtomicBool::new(false);
    let mut stats = LoadStats::default();

    let outcome = thread::scope(|s| {
        let (line_tx, line_rx) = crossbeam_channel::bounded::<Job>(cfg.channel_capacity);
        let (result_tx, result_rx) = crossbeam_channel::bounded::<Parsed>(cfg.channel_capacity);
        let (credit_tx, credit_rx) = crossbeam_channel::bounded::<()>(cfg.channel_capacity);
        for _ in 0..cfg.channel_capacity {
            credit_tx.send(())?;
        }

        let stop = &stop;
        let reader = s.spawn(move || read_lines(input, line_tx, credit_rx, stop, shutdown));

        for id in 0..cfg.workers {
            let rx = line_rx.clone();
            let tx = result_tx.clone();
            s.spawn(move || parse_worker(id, rx, tx));
        }
        drop(line_rx);
        drop(result_tx);

        let outcome = write_in_order(&result_rx, &credit_tx, sink, cfg, &mut stats);
        if outcome.is_err() {
            stop.store(true, Ordering::Relaxed);
        }
        // reader, ждущий кредит, получит Disconnected и завершится
        drop(credit_tx);
        // дочитываем, чтобы воркеры не зависли на send
        for _ in result_rx.iter() {}

        match reader.join() {
            Ok(Ok(lines)) => stats.lines = lines,
            Ok(Err(e)) => return Err(anyhow::Error::new(e).context("failed to read input")),
            Err(_) => return Err(anyhow!("reader thread panicked")),
        }
        outcome
    });

    outcome?;
    stats.interrupted = shutdown.load(Ordering::Relaxed);
    Ok(stats)
}

fn read_lines<R: BufRead>(
    input: R,
    tx: Sender<Job>,
    credits: Receiver<()>,
    stop: &AtomicBool,
    shutdown: &AtomicBool,
) -> io::Result<u64> {
    let mut seq = 0;

    for item in TaqLines::new(input) {
        if stop.load(Ordering::Relaxed) {
            debug!("reader stopped after {seq} lines");
            break;
        }
        if shutdown.load(Ordering::Relaxed) {
            info!("interrupted, no more lines will be read");
            break;
        }

        let (line_number, line) = item?;
        if credits.recv().is_err() {
            break;
        }
        let job = Job {
            seq,
            line_number,
            line,
        };
        if tx.send(job).is_err() {
            break;
        }
        seq += 1;
    }

    Ok(seq)
}

fn parse_worker(id: usize, rx: Receiver<Job>, tx: Sender<Parsed>) {
    let mut parsed = 0u64;
    for job in rx.iter() {
        let res = parse_taq_line(job.line_number, &job.line);
        if tx.send((job.seq, res)).is_err() {
            break;
        }
        parsed += 1;
    }
    debug!("worker {id} done, parsed={parsed}");
}

fn write_in_order<W: Write>(
    rx: &Receiver<Parsed>,
    credits: &Sender<()>,
    sink: &mut QuoteSink<W>,
    cfg: &PipelineConfig,
    stats: &mut LoadStats,
) -> anyhow::Result<()> {
    let mut pending: BTreeMap<u64, Result<Quote, ParseError>> = BTreeMap::new();
    let mut next_seq = 0u64;

    for (seq, res) in rx.iter() {
        pending.insert(seq, res);
        stats.peak_pending = stats.peak_pending.max(pending.len());

        while let Some(res) = pending.remove(&next_seq) {
            next_seq += 1;
            match res {
                Ok(q) => {
                    sink.write_quote(&q)?;
                    stats.quotes += 1;
                }
                Err(e) => handle_bad_line(e, cfg, stats)?,
            }
            // кредитов в обороте ровно channel_capacity, место в канале есть
            let _ = credits.try_send(());
        }
    }

    Ok(())
}

fn handle_bad_line(e: ParseError, cfg: &PipelineConfig, stats: &mut LoadStats) -> anyhow::Result<()> {
    match cfg.policy {
        ErrorPolicy::Abort => Err(LoadError::Aborted(e).into()),
        ErrorPolicy::Skip => {
            warn!("skipping: {e}");
            stats.skipped += 1;
            match cfg.max_errors {
                Some(max) if stats.skipped > max => Err(LoadError::TooManyErrors {
                    skipped: stats.skipped,
                    max,
                }
                .into()),
                _ => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::io::Cursor;

    fn cfg(workers: usize, policy: ErrorPolicy, max_errors: Option<u64>) -> PipelineConfig {
        PipelineConfig {
            workers,
            policy,
            max_errors,
            channel_capacity: 4,
        }
    }

    fn feed(records: &[String]) -> String {
        let mut s = String::from("Time|Exchange|Symbol|Bid_Price|Bid_Size|Offer_Price|Offer_Size\n");
        for r in records {
            s.push_str(r);
            s.push('\n');
        }
        s.push_str("END|0\n");
        s
    }

    fn good_line(i: u64) -> String {
        format!("0930{:02}{:09}|Q|T{i}|{i}.5|{i}|{i}.75|{i}", i % 60, i)
    }

    fn run_text(input: &str, cfg: &PipelineConfig) -> (anyhow::Result<LoadStats>, String) {
        let mut sink = QuoteSink::new(Vec::new(), OutputFormat::Text);
        let shutdown = AtomicBool::new(false);
        let res = run(Cursor::new(input.to_string()), &mut sink, cfg, &shutdown);
        let out = sink.finish().unwrap();
        (res, String::from_utf8(out).unwrap())
    }

    #[test]
    fn output_keeps_input_order_with_many_workers() {
        let records: Vec<String> = (0..500).map(good_line).collect();
        let (res, out) = run_text(&feed(&records), &cfg(8, ErrorPolicy::Abort, None));

        let stats = res.unwrap();
        assert_eq!(stats.lines, 500);
        assert_eq!(stats.quotes, 500);
        assert_eq!(stats.skipped, 0);

        let tickers: Vec<&str> = out.lines().map(|l| l.split('|').nth(1).unwrap()).collect();
        let expected: Vec<String> = (0..500).map(|i| format!("T{i}")).collect();
        assert_eq!(tickers, expected);
    }

    #[test]
    fn reorder_buffer_is_bounded_by_channel_capacity() {
        let records: Vec<String> = (0..2000).map(good_line).collect();
        let cfg = cfg(8, ErrorPolicy::Abort, None);
        let (res, out) = run_text(&feed(&records), &cfg);

        let stats = res.unwrap();
        assert_eq!(stats.quotes, 2000);
        assert_eq!(out.lines().count(), 2000);
        assert!(stats.peak_pending >= 1);
        assert!(
            stats.peak_pending <= cfg.channel_capacity,
            "peak_pending={} capacity={}",
            stats.peak_pending,
            cfg.channel_capacity
        );
    }

    #[test]
    fn abort_with_long_tail_does_not_hang() {
        let mut records: Vec<String> = (0..1000).map(good_line).collect();
        records[1] = "bad".to_string();

        let (res, out) = run_text(&feed(&records), &cfg(2, ErrorPolicy::Abort, None));

        assert!(res.is_err());
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn abort_stops_at_first_bad_line() {
        let mut records: Vec<String> = (0..50).map(good_line).collect();
        records[10] = "093000000000000|Q|IBM|abc|200|100.30|150".to_string();
        records[20] = "bad".to_string();

        let (res, out) = run_text(&feed(&records), &cfg(4, ErrorPolicy::Abort, None));

        let err = res.unwrap_err();
        let msg = err.to_string();
        // заголовок — строка 1, records[10] — строка 12
        assert!(msg.contains("in line #12"), "{msg}");
        assert!(msg.contains("invalid Bid_Price value (abc)"), "{msg}");
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::Aborted(_))
        ));

        // до плохой строки всё записано
        assert_eq!(out.lines().count(), 10);
    }

    #[test]
    fn skip_counts_bad_lines() {
        let mut records: Vec<String> = (0..30).map(good_line).collect();
        records[3] = "093000000000000|Q|IBM|100.25|200".to_string();
        records[7] = "09300000000000|Q|IBM|100.25|200|100.30|150".to_string();

        let (res, out) = run_text(&feed(&records), &cfg(3, ErrorPolicy::Skip, None));

        let stats = res.unwrap();
        assert_eq!(stats.lines, 30);
        assert_eq!(stats.quotes, 28);
        assert_eq!(stats.skipped, 2);
        assert_eq!(out.lines().count(), 28);
        assert_eq!(stats.to_string(), "lines=30 quotes=28 skipped=2");
    }

    #[test]
    fn skip_fails_when_max_errors_exceeded() {
        let records: Vec<String> = (0..10).map(|_| "garbage".to_string()).collect();
        let (res, _) = run_text(&feed(&records), &cfg(2, ErrorPolicy::Skip, Some(3)));

        let err = res.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::TooManyErrors { skipped: 4, max: 3 })
        ));
    }

    #[test]
    fn shutdown_before_start_reads_nothing() {
        let records: Vec<String> = (0..10).map(good_line).collect();
        let mut sink = QuoteSink::new(Vec::new(), OutputFormat::Text);
        let shutdown = AtomicBool::new(true);

        let stats = run(
            Cursor::new(feed(&records)),
            &mut sink,
            &cfg(2, ErrorPolicy::Abort, None),
            &shutdown,
        )
        .unwrap();

        assert_eq!(stats.lines, 0);
        assert!(stats.interrupted);
        assert!(sink.finish().unwrap().is_empty());
    }

    #[test]
    fn read_error_is_reported() {
        struct FailingReader;

        impl io::Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk on fire"))
            }
        }

        let mut sink = QuoteSink::new(Vec::new(), OutputFormat::Text);
        let shutdown = AtomicBool::new(false);
        let err = run(
            io::BufReader::new(FailingReader),
            &mut sink,
            &cfg(1, ErrorPolicy::Abort, None),
            &shutdown,
        )
        .unwrap_err();

        assert!(format!("{err:#}").contains("disk on fire"));
    }
}
