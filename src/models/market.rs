//! Market data shapes
//!
//! Raw API responses are modelled with every field optional, so a missing
//! or renamed field degrades to `None` instead of failing the whole payload.
//! Normalized shapes are what the service caches and hands to the UI.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// == Symbol Search ==

/// Symbol search results, kept in the API's own field layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolSearchResults {
    #[serde(rename = "bestMatches", default)]
    pub best_matches: Vec<SymbolMatch>,
}

/// One symbol search hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolMatch {
    #[serde(rename = "1. symbol", default)]
    pub symbol: Option<String>,
    #[serde(rename = "2. name", default)]
    pub name: Option<String>,
    #[serde(rename = "3. type", default)]
    pub kind: Option<String>,
    #[serde(rename = "4. region", default)]
    pub region: Option<String>,
    #[serde(rename = "5. marketOpen", default)]
    pub market_open: Option<String>,
    #[serde(rename = "6. marketClose", default)]
    pub market_close: Option<String>,
    #[serde(rename = "7. timezone", default)]
    pub timezone: Option<String>,
    #[serde(rename = "8. currency", default)]
    pub currency: Option<String>,
    #[serde(rename = "9. matchScore", default)]
    pub match_score: Option<String>,
}

// == Company Overview ==

/// Company fundamentals, kept in the API's own field layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompanyOverview {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub market_capitalization: Option<String>,
    #[serde(rename = "PERatio", default)]
    pub pe_ratio: Option<String>,
    #[serde(default)]
    pub dividend_yield: Option<String>,
    #[serde(rename = "EPS", default)]
    pub eps: Option<String>,
    #[serde(default)]
    pub beta: Option<String>,
    #[serde(rename = "52WeekHigh", default)]
    pub week_52_high: Option<String>,
    #[serde(rename = "52WeekLow", default)]
    pub week_52_low: Option<String>,
}

// == Market Movers ==

/// Raw top gainers/losers response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMarketMovers {
    #[serde(default)]
    pub top_gainers: Option<Vec<RawMover>>,
    #[serde(default)]
    pub top_losers: Option<Vec<RawMover>>,
}

/// Raw mover row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMover {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub change_amount: Option<String>,
    #[serde(default)]
    pub change_percentage: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
}

/// Normalized gainers and losers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMovers {
    pub top_gainers: Vec<StockRecord>,
    pub top_losers: Vec<StockRecord>,
}

/// Uniform stock row shown in lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: u32,
    pub ticker: String,
    pub price: String,
    pub change_amount: String,
    pub change_percentage: String,
    pub volume: String,
    /// Presentational tag only
    pub color: String,
}

// == Time Series ==

/// Raw 5-minute intraday series.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIntradaySeries {
    #[serde(rename = "Time Series (5min)", default)]
    pub series: Option<BTreeMap<String, RawBar>>,
}

/// Raw daily series.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDailySeries {
    #[serde(rename = "Time Series (Daily)", default)]
    pub series: Option<BTreeMap<String, RawBar>>,
}

/// One OHLC bar; only the close is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBar {
    #[serde(rename = "4. close", default)]
    pub close: Option<String>,
}

/// Chart point: `x` label, `y` closing price and the source timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: String,
    pub y: f64,
    pub timestamp: String,
}

// == Chart Range ==

/// Trailing window requested for a daily chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChartRange {
    OneWeek,
    #[default]
    OneMonth,
    ThreeMonths,
    OneYear,
}

impl ChartRange {
    /// Parses `1W`, `1M`, `3M` or `1Y`; anything else falls back to one month.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "1W" => ChartRange::OneWeek,
            "3M" => ChartRange::ThreeMonths,
            "1Y" => ChartRange::OneYear,
            _ => ChartRange::OneMonth,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartRange::OneWeek => "1W",
            ChartRange::OneMonth => "1M",
            ChartRange::ThreeMonths => "3M",
            ChartRange::OneYear => "1Y",
        }
    }

    /// Number of trading days shown.
    pub fn points(&self) -> usize {
        match self {
            ChartRange::OneWeek => 7,
            ChartRange::OneMonth => 22,
            ChartRange::ThreeMonths => 66,
            ChartRange::OneYear => 252,
        }
    }

    /// Whether labels show month/year instead of month/day.
    pub fn is_long(&self) -> bool {
        matches!(self, ChartRange::ThreeMonths | ChartRange::OneYear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chart_range_parse() {
        assert_eq!(ChartRange::parse("1W"), ChartRange::OneWeek);
        assert_eq!(ChartRange::parse("3m"), ChartRange::ThreeMonths);
        assert_eq!(ChartRange::parse("1Y"), ChartRange::OneYear);
        assert_eq!(ChartRange::parse("5Y"), ChartRange::OneMonth);
        assert_eq!(ChartRange::parse(""), ChartRange::OneMonth);
    }

    #[test]
    fn test_chart_range_points() {
        let points: Vec<_> = ["1W", "1M", "3M", "1Y"]
            .iter()
            .map(|r| ChartRange::parse(r).points())
            .collect();
        assert_eq!(points, vec![7, 22, 66, 252]);
    }

    #[test]
    fn test_overview_partial_fields() {
        let overview: CompanyOverview = serde_json::from_value(json!({
            "Symbol": "IBM",
            "Name": "International Business Machines",
            "PERatio": "22.1",
            "52WeekHigh": "199.18",
            "Unexpected": "ignored"
        }))
        .unwrap();

        assert_eq!(overview.symbol.as_deref(), Some("IBM"));
        assert_eq!(overview.pe_ratio.as_deref(), Some("22.1"));
        assert_eq!(overview.week_52_high.as_deref(), Some("199.18"));
        assert!(overview.sector.is_none());
    }

    #[test]
    fn test_search_results_empty_object() {
        let results: SymbolSearchResults = serde_json::from_value(json!({})).unwrap();
        assert!(results.best_matches.is_empty());
    }

    #[test]
    fn test_search_results_keep_api_layout() {
        let results: SymbolSearchResults = serde_json::from_value(json!({
            "bestMatches": [{"1. symbol": "TSLA", "2. name": "Tesla Inc", "9. matchScore": "0.8889"}]
        }))
        .unwrap();

        assert_eq!(results.best_matches[0].symbol.as_deref(), Some("TSLA"));
        let back = serde_json::to_value(&results).unwrap();
        assert_eq!(back["bestMatches"][0]["1. symbol"], "TSLA");
    }

    #[test]
    fn test_movers_serialize_camel_case() {
        let json = serde_json::to_value(MarketMovers::default()).unwrap();
        assert!(json["topGainers"].is_array());
        assert!(json["topLosers"].is_array());
    }
}
