use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;

use pivot_scout::{
    CandleSeries, PivotParams, TradeKind, TradeSetup, get_lasttime, get_pivots,
    get_pivots_lasttime,
};

/// Select and score the pivots relevant to a trade setup's SR level.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Candle series cache file (JSON)
    #[arg(long)]
    candles: PathBuf,

    /// Trade id, e.g. "EUR_GBP 28JAN2007D"
    #[arg(long, default_value = "ad hoc")]
    id: String,

    /// SR level the area band is centred on
    #[arg(long)]
    sr: f64,

    /// Stop-loss price
    #[arg(long)]
    sl: f64,

    /// Take-profit price
    #[arg(long)]
    tp: f64,

    /// Entry price
    #[arg(long)]
    entry: f64,

    /// Trade direction
    #[arg(long, value_enum, default_value_t = CliKind::Long)]
    kind: CliKind,

    /// Trade start time (RFC 3339); defaults to the last candle's time
    #[arg(long)]
    start: Option<DateTime<Utc>>,

    /// Pivot parameter overrides (JSON file)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Also report only the pivots after the SR area's last-visited time
    #[arg(long, default_value_t = false)]
    lasttime: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum CliKind {
    Long,
    Short,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let series: CandleSeries = {
        let file = File::open(&cli.candles)
            .with_context(|| format!("opening candle cache {:?}", cli.candles))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing candle cache {:?}", cli.candles))?
    };
    log::info!(
        "loaded {} {} candles for {}",
        series.len(),
        series.granularity,
        series.instrument
    );

    let params = match &cli.params {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("opening params file {path:?}"))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("parsing params file {path:?}"))?
        }
        None => PivotParams::default(),
    };

    let start = cli
        .start
        .or_else(|| series.last_time())
        .context("candle series is empty")?;

    let trade = TradeSetup {
        id: cli.id.clone(),
        pair: series.instrument.clone(),
        timeframe: series.granularity.clone(),
        kind: match cli.kind {
            CliKind::Long => TradeKind::Long,
            CliKind::Short => TradeKind::Short,
        },
        start,
        entry_time: None,
        sr: cli.sr,
        sl: cli.sl,
        tp: cli.tp,
        entry: cli.entry,
        series: Arc::new(series),
    };

    let pivots = get_pivots(&trade, &params)?;

    println!("{} pivots in area for {}:", pivots.len(), trade.id);
    for p in &pivots.plist {
        println!(
            "  {}  {:?}  close {:.5}  score {:.1}",
            p.time(),
            p.kind,
            p.candle.mid_close(),
            p.score.unwrap_or(0.0)
        );
    }
    println!("total score: {:.1}", pivots.total_score());

    if cli.lasttime {
        match get_lasttime(&trade, &params) {
            Some(cutoff) => {
                let recent = get_pivots_lasttime(&pivots, cutoff);
                println!("pivots since lasttime {cutoff}:");
                for p in &recent.plist {
                    println!("  {}  {:?}", p.time(), p.kind);
                }
            }
            None => println!("no lasttime: candle series is empty"),
        }
    }

    Ok(())
}
