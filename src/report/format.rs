//! Formatted terminal output.
//!
//! Formatting lives here so the indicator and model code stays free of
//! presentation concerns, and output changes stay localized.

use crate::app::pipeline::RunOutput;
use crate::domain::{EnrichedRow, EnrichedSeries, PipelineConfig};

/// How many forest importances the summary lists.
const TOP_IMPORTANCES: usize = 5;

/// Dataset summary, latest indicators, per-model metrics and importances.
pub fn format_run_summary(run: &RunOutput, config: &PipelineConfig) -> String {
    let mut out = String::new();

    out.push_str("=== stx - Stock Indicators & Next-Day Close Models ===\n");
    out.push_str(&format!("Symbol: {}\n", run.series.symbol()));
    out.push_str(&format!("Source: {}\n", config.source.display_name()));
    if let Some((first, last)) = run.series.date_range() {
        out.push_str(&format!("Range: {first} .. {last}\n"));
    }
    out.push_str(&format!(
        "Rows: raw={} | enriched={} | train={} | test={}\n",
        run.series.len(),
        run.enriched.len(),
        run.split.train.len(),
        run.split.test.len(),
    ));
    let p = &config.indicators;
    out.push_str(&format!(
        "Params: MACD({},{},{}) | RSI({}) | BB({}, {:.1}σ)\n",
        p.macd_fast, p.macd_slow, p.macd_signal, p.rsi_window, p.bollinger_window, p.bollinger_k
    ));

    if let Some(latest) = run.enriched.latest() {
        out.push_str("\nLatest indicators:\n");
        out.push_str(&format_latest(latest));
    }

    out.push_str("\nModel evaluation (test partition):\n");
    out.push_str(&format!("  {:<20} {:>12} {:>12} {:>10}\n", "model", "RMSE", "MAE", "R²"));
    for model in run.training.runs() {
        out.push_str(&format!(
            "  {:<20} {:>12.4} {:>12.4} {:>10.4}\n",
            model.name, model.metrics.rmse, model.metrics.mae, model.metrics.r2
        ));
    }

    if !run.training.importances.is_empty() {
        out.push_str("\nRandom forest feature importances:\n");
        for (name, imp) in run.training.importances.iter().take(TOP_IMPORTANCES) {
            out.push_str(&format!("  {name:<10} {imp:>7.3}\n"));
        }
    }

    out
}

fn format_latest(row: &EnrichedRow) -> String {
    let ind = &row.indicators;
    let mut out = String::new();
    out.push_str(&format!("- date : {}\n", row.point.date));
    out.push_str(&format!("- close: {:.2}\n", row.point.close));
    out.push_str(&format!(
        "- MACD : {:.4} (signal {:.4}, hist {:.4})\n",
        ind.macd, ind.signal, ind.histogram
    ));
    out.push_str(&format!("- RSI  : {:.2} ({})\n", ind.rsi, rsi_zone(ind.rsi)));
    out.push_str(&format!(
        "- BB   : {:.2} / {:.2} / {:.2}\n",
        ind.bb_lower, ind.bb_middle, ind.bb_upper
    ));
    out
}

fn rsi_zone(rsi: f64) -> &'static str {
    if rsi >= crate::plot::RSI_OVERBOUGHT {
        "overbought"
    } else if rsi <= crate::plot::RSI_OVERSOLD {
        "oversold"
    } else {
        "neutral"
    }
}

/// Table of the last `tail` enriched rows.
pub fn format_indicator_tail(enriched: &EnrichedSeries, tail: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<10} {:>10} {:>9} {:>9} {:>9} {:>7} {:>10} {:>10} {:>10}",
            "date", "close", "macd", "signal", "hist", "rsi", "bb_lower", "bb_middle", "bb_upper"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<10} {:-<10} {:-<9} {:-<9} {:-<9} {:-<7} {:-<10} {:-<10} {:-<10}\n",
        "", "", "", "", "", "", "", "", ""
    ));

    let skip = enriched.len().saturating_sub(tail);
    for row in enriched.rows.iter().skip(skip) {
        let ind = &row.indicators;
        out.push_str(&format!(
            "{:<10} {:>10.2} {:>9.4} {:>9.4} {:>9.4} {:>7.2} {:>10.2} {:>10.2} {:>10.2}\n",
            row.point.date,
            row.point.close,
            ind.macd,
            ind.signal,
            ind.histogram,
            ind.rsi,
            ind.bb_lower,
            ind.bb_middle,
            ind.bb_upper,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{IndicatorParams, IndicatorRow, PricePoint};

    fn row(day: u32, close: f64, rsi: f64) -> EnrichedRow {
        EnrichedRow {
            point: PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0,
            },
            indicators: IndicatorRow {
                macd: 0.5,
                signal: 0.25,
                histogram: 0.25,
                rsi,
                bb_middle: close,
                bb_upper: close + 2.0,
                bb_lower: close - 2.0,
                bb_std: 1.0,
            },
        }
    }

    fn enriched() -> EnrichedSeries {
        EnrichedSeries {
            symbol: "TEST".into(),
            params: IndicatorParams::default(),
            rows: vec![row(1, 100.0, 50.0), row(2, 101.0, 75.0), row(5, 99.5, 20.0)],
        }
    }

    #[test]
    fn tail_prints_last_rows_only() {
        let txt = format_indicator_tail(&enriched(), 2);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("2024-02-02"));
        assert!(lines[3].starts_with("2024-02-05"));
        assert!(lines[3].contains("99.50"));
    }

    #[test]
    fn tail_larger_than_series_prints_everything() {
        let txt = format_indicator_tail(&enriched(), 50);
        assert_eq!(txt.lines().count(), 2 + 3);
    }

    #[test]
    fn latest_block_labels_rsi_zone() {
        let txt = format_latest(&row(2, 101.0, 75.0));
        assert!(txt.contains("RSI  : 75.00 (overbought)"));
        assert_eq!(rsi_zone(20.0), "oversold");
        assert_eq!(rsi_zone(50.0), "neutral");
    }
}
