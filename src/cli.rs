//! CLI definition and dispatch.

use chrono::Duration;
use clap::{Parser, Subcommand};
use chrono::Datelike;
use std::fmt::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::cached_source::MarketDataSource;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::positions_csv::load_ledger;
use crate::domain::config_validation::{configured_indicators, validate_config};
use crate::domain::error::AltairError;
use crate::domain::indicator::{IndicatorSeries, IndicatorType, compute_indicator};
use crate::domain::locale::{Language, Localizer, weekday_name};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::period::{Interval, Period};
use crate::domain::portfolio::{
    PortfolioSummary, PositionValuation, RebalanceAction, RebalanceOrder, Valuation,
};
use crate::domain::quote::Quote;
use crate::domain::settings::{Settings, SourceKind};
use crate::ports::clock_port::SystemClock;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;

#[derive(Parser, Debug)]
#[command(name = "altair", about = "Market quotes, technical indicators and portfolio valuation")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Display language (tr or en)
    #[arg(long, global = true)]
    pub lang: Option<String>,
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the last price and change for one or more tickers
    Quote {
        #[arg(required = true)]
        tickers: Vec<String>,
        #[arg(long)]
        period: Option<String>,
        #[arg(long)]
        interval: Option<String>,
    },
    /// Compute moving averages and RSI for a ticker
    Indicators {
        ticker: String,
        /// e.g. ema(20), sma:50, rsi
        #[arg(short, long = "indicator")]
        indicators: Vec<String>,
        #[arg(long)]
        period: Option<String>,
        #[arg(long)]
        interval: Option<String>,
        /// Number of most recent bars to print
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Value a positions CSV at the latest prices
    Portfolio {
        positions: PathBuf,
        /// Also print orders that move holdings to their targets
        #[arg(long)]
        rebalance: bool,
    },
    /// Session move for the configured watchlist
    Overview,
    /// List the tickers the data source holds bars for
    Tickers {
        #[arg(long)]
        interval: Option<String>,
    },
    /// Translate financial terms
    Translate {
        #[arg(required = true)]
        terms: Vec<String>,
    },
    /// Validate the configuration and print the resolved settings
    Validate,
}

pub type Source = MarketDataSource<Box<dyn MarketDataPort>>;

pub fn run(cli: Cli) -> ExitCode {
    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let mut settings = match build_settings(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    if let Some(lang) = cli.lang.as_deref() {
        match lang.parse::<Language>() {
            Ok(l) => settings.language = l,
            Err(e) => return fail(&e),
        }
    }
    let loc = Localizer::new(settings.language);

    match cli.command {
        Command::Translate { terms } => {
            for term in terms {
                println!("{}", loc.t(&term));
            }
            ExitCode::SUCCESS
        }
        Command::Quote {
            tickers,
            period,
            interval,
        } => with_source(&settings, &config, |source| {
            let (period, interval) =
                resolve_range(&settings, period.as_deref(), interval.as_deref())?;
            run_quote(source, &tickers, period, interval, &loc)
        }),
        Command::Indicators {
            ticker,
            indicators,
            period,
            interval,
            rows,
        } => with_source(&settings, &config, |source| {
            let (period, interval) =
                resolve_range(&settings, period.as_deref(), interval.as_deref())?;
            let indicators = if indicators.is_empty() {
                settings.indicators.clone()
            } else {
                parse_indicators(&indicators)?
            };
            run_indicators(source, &ticker, period, interval, &indicators, rows, &loc)
        }),
        Command::Portfolio {
            positions,
            rebalance,
        } => with_source(&settings, &config, |source| {
            run_portfolio(source, &positions, &settings, rebalance, &loc)
        }),
        Command::Overview => with_source(&settings, &config, |source| {
            run_overview(source, &settings, &loc)
        }),
        Command::Tickers { interval } => with_source(&settings, &config, |source| {
            let (_, interval) = resolve_range(&settings, None, interval.as_deref())?;
            run_tickers(source, interval)
        }),
        Command::Validate => {
            print_settings(&settings, cli.config.as_deref());
            ExitCode::SUCCESS
        }
    }
}

fn fail(err: &AltairError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn with_source<F>(settings: &Settings, config: &dyn ConfigPort, f: F) -> ExitCode
where
    F: FnOnce(&mut Source) -> Result<(), AltairError>,
{
    let mut source = match build_source(settings, config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    match f(&mut source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

/// Loads the INI file at `path`, or an empty configuration when none is given.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, AltairError> {
    match path {
        Some(p) => {
            info!(path = %p.display(), "loading config");
            FileConfigAdapter::from_file(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// Validates `config` and layers it over `Settings::default()`.
pub fn build_settings(config: &dyn ConfigPort) -> Result<Settings, AltairError> {
    validate_config(config)?;
    let mut settings = Settings::default();

    if let Some(source) = config.get_string("data", "source") {
        settings.source = source.parse()?;
    }
    if let Some(dir) = config.get_string("data", "data_dir") {
        settings.data_dir = PathBuf::from(dir.trim());
    }
    settings.cache_ttl_secs = config.get_int("data", "cache_ttl_secs", settings.cache_ttl_secs);
    if let Some(period) = config.get_string("data", "period") {
        settings.period = period.parse()?;
    }
    if let Some(interval) = config.get_string("data", "interval") {
        settings.interval = interval.parse()?;
    }
    if let Some(language) = config.get_string("display", "language") {
        settings.language = language.parse()?;
    }
    if let Some(indicators) = configured_indicators(config)? {
        settings.indicators = indicators;
    }
    let watchlist = config.get_list("market", "watchlist");
    if !watchlist.is_empty() {
        settings.watchlist = watchlist;
    }

    Ok(settings)
}

/// Picks the provider named by `settings.source` and puts the TTL cache in front of it.
pub fn build_source(settings: &Settings, config: &dyn ConfigPort) -> Result<Source, AltairError> {
    let provider: Box<dyn MarketDataPort> = match settings.source {
        SourceKind::Csv => {
            info!(dir = %settings.data_dir.display(), "using CSV price files");
            Box::new(CsvAdapter::new(settings.data_dir.clone()))
        }
        SourceKind::Yahoo => yahoo_provider(config)?,
    };
    let ttl = Duration::try_seconds(settings.cache_ttl_secs)
        .filter(|ttl| *ttl > Duration::zero())
        .ok_or_else(|| AltairError::ConfigInvalid {
            section: "data".to_string(),
            key: "cache_ttl_secs".to_string(),
            reason: format!("{} seconds is out of range", settings.cache_ttl_secs),
        })?;
    Ok(MarketDataSource::with_clock(provider, SystemClock, ttl))
}

#[cfg(feature = "yahoo")]
fn yahoo_provider(config: &dyn ConfigPort) -> Result<Box<dyn MarketDataPort>, AltairError> {
    use crate::adapters::yahoo::client::YahooAdapter;

    info!("using Yahoo Finance chart API");
    Ok(Box::new(YahooAdapter::from_config(config)?))
}

#[cfg(not(feature = "yahoo"))]
fn yahoo_provider(_config: &dyn ConfigPort) -> Result<Box<dyn MarketDataPort>, AltairError> {
    Err(AltairError::ConfigInvalid {
        section: "data".to_string(),
        key: "source".to_string(),
        reason: "yahoo source requires the `yahoo` feature".to_string(),
    })
}

fn resolve_range(
    settings: &Settings,
    period: Option<&str>,
    interval: Option<&str>,
) -> Result<(Period, Interval), AltairError> {
    let period = match period {
        Some(p) => p.parse()?,
        None => settings.period,
    };
    let interval = match interval {
        Some(i) => i.parse()?,
        None => settings.interval,
    };
    Ok((period, interval))
}

pub fn parse_indicators(raw: &[String]) -> Result<Vec<IndicatorType>, AltairError> {
    raw.iter().map(|s| s.parse()).collect()
}

fn print_settings(settings: &Settings, path: Option<&Path>) {
    let name = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    println!("{name}: ok");
    println!("  source: {:?}", settings.source);
    println!("  range: {} / {}", settings.period, settings.interval);
    println!("  cache ttl: {}s", settings.cache_ttl_secs);
    println!("  language: {}", settings.language.code());
    let labels: Vec<String> = settings.indicators.iter().map(|i| i.to_string()).collect();
    println!("  indicators: {}", labels.join(", "));
    println!("  watchlist: {}", settings.watchlist.join(", "));
}

/// Quotes every ticker it can; data errors are logged and skipped. Fails
/// only when no ticker could be quoted.
pub fn run_quote(
    source: &mut Source,
    tickers: &[String],
    period: Period,
    interval: Interval,
    loc: &Localizer,
) -> Result<(), AltairError> {
    let quotes = collect_quotes(source, tickers, period, interval, Quote::from_series)?;
    let mut out = String::new();
    render_quotes(&mut out, &quotes, loc)?;
    print!("{out}");
    Ok(())
}

/// Session move (last close against last open) for each watchlist ticker.
pub fn run_overview(
    source: &mut Source,
    settings: &Settings,
    loc: &Localizer,
) -> Result<(), AltairError> {
    let quotes = collect_quotes(
        source,
        &settings.watchlist,
        Period::FiveDays,
        settings.interval,
        Quote::intraday,
    )?;
    let mut out = String::new();
    writeln!(out, "{}", loc.t("Market Summary"))?;
    render_quotes(&mut out, &quotes, loc)?;
    print!("{out}");
    Ok(())
}

/// Prints the provider's catalogue for `interval`, one ticker per line.
pub fn run_tickers(source: &mut Source, interval: Interval) -> Result<(), AltairError> {
    let tickers = source.provider().list_tickers(interval)?;
    if tickers.is_empty() {
        warn!(%interval, "no tickers found");
        return Ok(());
    }
    let mut out = String::new();
    render_tickers(&mut out, &tickers)?;
    print!("{out}");
    info!(count = tickers.len(), "tickers found");
    Ok(())
}

fn collect_quotes(
    source: &mut Source,
    tickers: &[String],
    period: Period,
    interval: Interval,
    make: fn(&PriceSeries) -> Quote,
) -> Result<Vec<Quote>, AltairError> {
    let mut quotes = Vec::with_capacity(tickers.len());
    let mut first_err = None;
    for ticker in tickers {
        match source.get_series(ticker, period, interval) {
            Ok(series) => quotes.push(make(&series)),
            Err(e) if e.is_recoverable() => {
                warn!(%ticker, error = %e, "no quote");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
            Err(e) => return Err(e),
        }
    }
    match first_err {
        Some(e) if quotes.is_empty() => Err(e),
        _ => Ok(quotes),
    }
}

pub fn run_indicators(
    source: &mut Source,
    ticker: &str,
    period: Period,
    interval: Interval,
    indicators: &[IndicatorType],
    rows: usize,
    loc: &Localizer,
) -> Result<(), AltairError> {
    let series = source.get_series(ticker, period, interval)?;
    let computed = indicators
        .iter()
        .map(|&t| compute_indicator(&series, t))
        .collect::<Result<Vec<_>, _>>()?;
    let mut out = String::new();
    render_indicators(&mut out, &series, &computed, rows, loc)?;
    print!("{out}");
    Ok(())
}

pub fn run_portfolio(
    source: &mut Source,
    positions: &Path,
    settings: &Settings,
    rebalance: bool,
    loc: &Localizer,
) -> Result<(), AltairError> {
    info!(path = %positions.display(), "loading positions");
    let ledger = load_ledger(positions)?;
    let (prices, _errors) =
        source.latest_closes(&ledger.tickers(), settings.period, settings.interval);

    let valuation = ledger.valuate(&prices);
    for err in valuation.unavailable_errors() {
        warn!(error = %err, "position left unvalued");
    }
    let summary = ledger.summary(&prices);
    let mut out = String::new();
    render_valuation(&mut out, &valuation, &summary, loc)?;
    if rebalance {
        render_rebalance(&mut out, &ledger.rebalance_orders(), loc)?;
    }
    print!("{out}");
    Ok(())
}

pub fn render_quotes(out: &mut impl Write, quotes: &[Quote], loc: &Localizer) -> fmt::Result {
    writeln!(
        out,
        "{:<12} {:>16} {:>14} {:>12}",
        loc.t("Symbol"),
        loc.t("Price"),
        loc.t("Change"),
        loc.t("Change %")
    )?;
    for q in quotes {
        let marker = if q.is_up() {
            '▲'
        } else if q.change < 0.0 {
            '▼'
        } else {
            ' '
        };
        writeln!(
            out,
            "{:<12} {:>16} {:>14} {:>12} {}",
            q.ticker,
            loc.number(q.price, 2),
            loc.number(q.change, 2),
            loc.percent(q.change_pct),
            marker
        )?;
    }
    Ok(())
}

/// Tail of the close column next to each indicator; undefined values print as `-`.
/// Intraday bars are labelled with weekday and time.
pub fn render_indicators(
    out: &mut impl Write,
    series: &PriceSeries,
    indicators: &[IndicatorSeries],
    rows: usize,
    loc: &Localizer,
) -> fmt::Result {
    let intraday = series.interval().is_intraday();
    let width = if intraday { 32 } else { 20 };

    write!(out, "{:<width$} {:>12}", loc.t("Date"), loc.t("Close"))?;
    for ind in indicators {
        write!(out, " {:>10}", ind.label())?;
    }
    writeln!(out)?;

    let start = series.len().saturating_sub(rows);
    for (i, bar) in series.bars().iter().enumerate().skip(start) {
        let mut date = loc.date(bar.timestamp.date_naive());
        if intraday {
            date = format!(
                "{} {} {}",
                weekday_name(bar.timestamp.weekday(), loc.language),
                date,
                bar.timestamp.format("%H:%M")
            );
        }
        write!(out, "{:<width$} {:>12}", date, loc.number(bar.close, 2))?;
        for ind in indicators {
            let cell = ind.values[i]
                .value
                .map(|v| loc.number(v, 2))
                .unwrap_or_else(|| "-".to_string());
            write!(out, " {:>10}", cell)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn render_valuation(
    out: &mut impl Write,
    valuation: &Valuation,
    summary: &PortfolioSummary,
    loc: &Localizer,
) -> fmt::Result {
    writeln!(
        out,
        "{:<12} {:>10} {:>14} {:>14} {:>16} {:>16} {:>10}",
        loc.t("Symbol"),
        loc.t("Quantity"),
        loc.t("Average Cost"),
        loc.t("Price"),
        loc.t("Market Value"),
        loc.t("Profit/Loss"),
        loc.t("Weight")
    )?;
    for pos in &valuation.positions {
        match pos {
            PositionValuation::Priced(line) => writeln!(
                out,
                "{:<12} {:>10} {:>14} {:>14} {:>16} {:>16} {:>10}",
                line.ticker,
                loc.number(line.quantity, 2),
                loc.number(line.avg_cost, 2),
                loc.number(line.price, 2),
                loc.currency(line.market_value),
                loc.percent(line.unrealized_pnl_pct),
                loc.number(line.weight_pct, 1)
            )?,
            PositionValuation::PriceUnavailable { ticker } => {
                writeln!(out, "{:<12} {}", ticker, loc.t("Price Unavailable"))?
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", loc.t("Portfolio Summary"))?;
    writeln!(out, "  {}: {}", loc.t("Total Value"), loc.currency(summary.total_value))?;
    writeln!(out, "  {}: {}", loc.t("Total Cost"), loc.currency(summary.total_cost))?;
    writeln!(
        out,
        "  {}: {} ({})",
        loc.t("Profit/Loss"),
        loc.currency(summary.pnl),
        loc.percent(summary.pnl_pct)
    )?;
    writeln!(out, "  {}: {}", loc.t("Holdings"), summary.holdings)
}

/// One line per order with how much of the target is already held.
pub fn render_rebalance(
    out: &mut impl Write,
    orders: &[RebalanceOrder],
    loc: &Localizer,
) -> fmt::Result {
    writeln!(out, "{}", loc.t("Rebalance"))?;
    for order in orders {
        let action = match order.action {
            RebalanceAction::Buy => loc.t("Buy"),
            RebalanceAction::Sell => loc.t("Sell"),
        };
        let progress = order
            .progress_pct
            .map(|p| format!("{}%", loc.number(p, 0)))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "  {:<6} {:<12} {:>10} {:>8}",
            action,
            order.ticker,
            loc.number(order.quantity, 2),
            progress
        )?;
    }
    Ok(())
}

pub fn render_tickers(out: &mut impl Write, tickers: &[String]) -> fmt::Result {
    for ticker in tickers {
        writeln!(out, "{}", ticker)?;
    }
    Ok(())
}
