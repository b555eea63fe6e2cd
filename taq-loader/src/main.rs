//! Точка входа `taq-loader`.
//!
//! Команды:
//! - `load` — чтение TAQ-файла, параллельный разбор строк, вывод котировок
//!   в исходном порядке (text / json / postcard), политика abort/skip
//! - `generate` — синтетический TAQ-файл для демо и тестов
//!
//! `Ctrl+C` во время `load` останавливает чтение новых строк, уже прочитанные
//! дописываются в выход.

mod cli;
mod config;
mod generator;
mod pipeline;
mod sink;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};

use anyhow::Context;
use clap::Parser;
use log::info;

use crate::cli::{Cli, Command, GenerateArgs, LoadArgs};
use crate::generator::{FeedGenerator, GeneratorConfig};
use crate::pipeline::PipelineConfig;
use crate::sink::QuoteSink;

fn main() -> anyhow::Result<()> {
    init_logger();

    let cli = Cli::parse();
    match cli.command {
        Command::Load(args) => {
            args.validate()?;
            run_load(&args)
        }
        Command::Generate(args) => run_generate(&args),
    }
}

fn run_load(args: &LoadArgs) -> anyhow::Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));

    // Ctrl+C => ставим shutdown=true
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
            info!("shutting down...");
        })?;
    }

    info!(
        "Starting load: input={:?}, format={:?}, on_error={:?}, workers={}",
        args.input, args.format, args.on_error, args.workers
    );

    let input = File::open(&args.input)
        .with_context(|| format!("failed to open input file: {:?}", args.input))?;
    let mut sink = QuoteSink::new(open_output(args.output.as_deref())?, args.format);

    let cfg = PipelineConfig {
        workers: args.workers,
        policy: args.on_error,
        max_errors: args.max_errors,
        channel_capacity: config::CHANNEL_CAPACITY,
    };

    let stats = pipeline::run(BufReader::new(input), &mut sink, &cfg, &shutdown)?;
    sink.finish().context("failed to flush output")?;

    info!("load finished: {stats}");
    Ok(())
}

fn run_generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let tickers = args.ticker_list()?;
    info!(
        "Generating {} quotes for {}",
        args.count,
        tickers.join(",")
    );

    let mut out = open_output(args.output.as_deref())?;
    let mut generator = FeedGenerator::new(tickers, args.seed, GeneratorConfig::default());
    generator
        .write_feed(&mut out, args.count)
        .context("failed to write generated feed")?;
    Ok(())
}

fn open_output(path: Option<&std::path::Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => {
            let f = File::create(p)
                .with_context(|| format!("failed to create output file: {p:?}"))?;
            Box::new(BufWriter::new(f))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn init_logger() {
    // Логи через RUST_LOG=debug/trace, по умолчанию info, в stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
