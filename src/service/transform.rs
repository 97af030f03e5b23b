//! Response normalization
//!
//! Pure functions turning raw API payloads into the shapes the UI consumes.
//! Missing series or fields degrade to empty or zeroed values; nothing here
//! fails.

use chrono::{NaiveDate, NaiveDateTime};
use rand::seq::SliceRandom;

use crate::models::{
    ChartPoint, ChartRange, MarketMovers, RawBar, RawDailySeries, RawIntradaySeries,
    RawMarketMovers, RawMover, StockRecord,
};

/// Trading day of 5-minute bars (6.5h * 12)
pub const INTRADAY_POINTS: usize = 78;

/// First id assigned to gainers and losers respectively
const GAINER_ID_BASE: u32 = 1;
const LOSER_ID_BASE: u32 = 100;

/// Cosmetic color tags for list rows
pub const COLOR_PALETTE: [&str; 12] = [
    "#007AFF", "#34c759", "#ff3b30", "#ff9500", "#5856d6", "#af52de", "#ff2d92", "#64d2ff",
    "#5ac8fa", "#30b0c7", "#32d74b", "#ffcc02",
];

const INTRADAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DAILY_FORMAT: &str = "%Y-%m-%d";

// == Market Movers ==

/// Normalizes the gainers/losers payload.
///
/// Gainers are numbered from 1 and losers from 100, in API order.
pub fn market_movers(raw: RawMarketMovers) -> MarketMovers {
    MarketMovers {
        top_gainers: stock_records(raw.top_gainers.unwrap_or_default(), GAINER_ID_BASE),
        top_losers: stock_records(raw.top_losers.unwrap_or_default(), LOSER_ID_BASE),
    }
}

fn stock_records(rows: Vec<RawMover>, id_base: u32) -> Vec<StockRecord> {
    let mut rng = rand::thread_rng();
    (id_base..)
        .zip(rows)
        .map(|(id, row)| StockRecord {
            id,
            ticker: row.ticker.unwrap_or_default(),
            price: row.price.unwrap_or_default(),
            change_amount: row.change_amount.unwrap_or_default(),
            change_percentage: row.change_percentage.unwrap_or_default(),
            volume: row.volume.unwrap_or_default(),
            color: COLOR_PALETTE
                .choose(&mut rng)
                .copied()
                .unwrap_or(COLOR_PALETTE[0])
                .to_string(),
        })
        .collect()
}

// == Intraday ==

/// Last trading day of 5-minute closes, oldest first, labelled `HH:MM`.
pub fn intraday_points(raw: RawIntradaySeries) -> Vec<ChartPoint> {
    let series = raw.series.unwrap_or_default();
    let skip = series.len().saturating_sub(INTRADAY_POINTS);

    series
        .into_iter()
        .skip(skip)
        .map(|(timestamp, bar)| ChartPoint {
            x: intraday_label(&timestamp),
            y: close_price(&bar),
            timestamp,
        })
        .collect()
}

fn intraday_label(timestamp: &str) -> String {
    match NaiveDateTime::parse_from_str(timestamp, INTRADAY_FORMAT) {
        Ok(time) => time.format("%H:%M").to_string(),
        // Fall back to whatever follows the date part
        Err(_) => timestamp
            .split_once(' ')
            .map(|(_, time)| time.to_string())
            .unwrap_or_else(|| timestamp.to_string()),
    }
}

// == Daily ==

/// Trailing `range` window of daily closes, oldest first.
pub fn daily_points(raw: RawDailySeries, range: ChartRange) -> Vec<ChartPoint> {
    let series = raw.series.unwrap_or_default();
    let skip = series.len().saturating_sub(range.points());

    series
        .into_iter()
        .skip(skip)
        .map(|(date, bar)| ChartPoint {
            x: daily_label(&date, range),
            y: close_price(&bar),
            timestamp: date,
        })
        .collect()
}

/// `M/D` for short ranges, `M/YY` for long ones.
fn daily_label(date: &str, range: ChartRange) -> String {
    let Ok(day) = NaiveDate::parse_from_str(date, DAILY_FORMAT) else {
        return date.to_string();
    };

    if range.is_long() {
        day.format("%-m/%y").to_string()
    } else {
        day.format("%-m/%-d").to_string()
    }
}

fn close_price(bar: &RawBar) -> f64 {
    bar.close
        .as_deref()
        .and_then(|close| close.trim().parse::<f64>().ok())
        .filter(|price| price.is_finite())
        .unwrap_or(0.0)
}
