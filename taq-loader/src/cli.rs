use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use crate::config;

/// TAQ Loader - разбирает TAQ-файлы котировок и выгружает результат.
#[derive(Parser, Debug, Clone)]
#[command(name = "taq-loader", version, about)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Разобрать TAQ-файл
    Load(LoadArgs),
    /// Сгенерировать синтетический TAQ-файл
    Generate(GenerateArgs),
}

/// Формат вывода котировок
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    /// TIMESTAMP_NS|TICKER|BID_PX|BID_QTY|OFFER_PX|OFFER_QTY
    Text,
    /// JSON, один объект на строку
    Json,
    /// Бинарные кадры (postcard)
    Postcard,
}

/// Что делать со строкой, которая не разбирается
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorPolicy {
    /// Остановить загрузку на первой ошибке
    Abort,
    /// Залогировать и продолжить
    Skip,
}

#[derive(clap::Args, Debug, Clone)]
pub(crate) struct LoadArgs {
    /// Входной TAQ-файл
    #[arg(long)]
    pub(crate) input: PathBuf,

    /// Куда писать котировки (по умолчанию stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,

    #[arg(long, value_enum, default_value_t = ErrorPolicy::Abort)]
    pub(crate) on_error: ErrorPolicy,

    /// Количество потоков-парсеров
    #[arg(long, default_value_t = config::DEFAULT_WORKERS)]
    pub(crate) workers: usize,

    /// Для --on-error skip: сколько плохих строк допустимо
    #[arg(long)]
    pub(crate) max_errors: Option<u64>,
}

impl LoadArgs {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("--workers must be at least 1");
        }

        let md = std::fs::metadata(&self.input)
            .with_context(|| format!("input file not found: {:?}", self.input))?;
        if !md.is_file() {
            bail!("--input must point to a file: {:?}", self.input);
        }

        if self.max_errors.is_some() && self.on_error != ErrorPolicy::Skip {
            bail!("--max-errors only makes sense with --on-error skip");
        }

        Ok(())
    }
}

#[derive(clap::Args, Debug, Clone)]
pub(crate) struct GenerateArgs {
    /// Количество котировок
    #[arg(long, default_value_t = config::DEFAULT_GENERATE_COUNT)]
    pub(crate) count: u64,

    /// Список тикеров через запятую, например "AAPL,TSLA"
    #[arg(long, default_value = config::DEFAULT_TICKERS)]
    pub(crate) tickers: String,

    /// Seed для воспроизводимого результата
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Куда писать файл (по умолчанию stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

impl GenerateArgs {
    /// Тикеры из --tickers: trim, без пустых, в верхнем регистре
    pub(crate) fn ticker_list(&self) -> Result<Vec<String>> {
        let tickers: Vec<String> = self
            .tickers
            .split(',')
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_ascii_uppercase())
            .collect();

        if tickers.is_empty() {
            bail!("tickers list is empty (--tickers value: {:?})", self.tickers);
        }
        Ok(tickers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("taq-loader").chain(args.iter().copied())).unwrap()
    }

    fn load_args(args: &[&str]) -> LoadArgs {
        match parse(args).command {
            Command::Load(a) => a,
            other => panic!("expected load, got {other:?}"),
        }
    }

    #[test]
    fn load_defaults() {
        let a = load_args(&["load", "--input", "x.taq"]);
        assert_eq!(a.format, OutputFormat::Text);
        assert_eq!(a.on_error, ErrorPolicy::Abort);
        assert_eq!(a.workers, config::DEFAULT_WORKERS);
        assert!(a.output.is_none());
    }

    #[test]
    fn validate_rejects_zero_workers_and_missing_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();

        let a = load_args(&["load", "--input", path, "--workers", "0"]);
        assert!(a.validate().is_err());

        let a = load_args(&["load", "--input", "/definitely/not/here.taq"]);
        assert!(a.validate().is_err());

        let a = load_args(&["load", "--input", path]);
        assert!(a.validate().is_ok());
    }

    #[test]
    fn max_errors_requires_skip() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();

        let a = load_args(&["load", "--input", path, "--max-errors", "3"]);
        assert!(a.validate().is_err());

        let a = load_args(&["load", "--input", path, "--on-error", "skip", "--max-errors", "3"]);
        assert!(a.validate().is_ok());
    }

    #[test]
    fn ticker_list_normalizes() {
        let Command::Generate(g) = parse(&["generate", "--tickers", " ibm, ,msft "]).command else {
            panic!("expected generate");
        };
        assert_eq!(g.ticker_list().unwrap(), vec!["IBM", "MSFT"]);

        let Command::Generate(g) = parse(&["generate", "--tickers", " , "]).command else {
            panic!("expected generate");
        };
        assert!(g.ticker_list().is_err());
    }
}
