//! Card-style report on stdout.

use headroom_core::commentary::CommentaryError;
use headroom_core::data::RateSource;
use headroom_core::screener::SkipReason;
use headroom_core::{
    Analysis, CommentaryOutcome, PositionRecommendation, ScreenReport, ScreenerConfig, TickerReport,
};

pub fn print_report(report: &ScreenReport, config: &ScreenerConfig, provider: &str) {
    let account = &config.account;
    let fx = &config.fx;

    println!();
    println!("=== Headroom Screen ===");
    println!("Data:           {provider}");
    println!(
        "FX ({}):    {:.2} {} per {} ({})",
        fx.pair,
        report.fx.rate,
        fx.account_currency,
        fx.quote_currency,
        match report.fx.source {
            RateSource::Live => "live",
            RateSource::Fallback => "fallback",
        }
    );
    println!(
        "Capital:        {} {}",
        group_thousands(account.initial_capital),
        fx.account_currency
    );
    println!(
        "Risk:           {:.1}% ({} {}), stop at {:.1} x ATR",
        account.risk_tolerance * 100.0,
        group_thousands(account.allowable_risk()),
        fx.account_currency,
        account.atr_multiplier
    );

    for ticker in &report.tickers {
        print_card(ticker, config);
    }

    println!();
    if report.failures() > 0 {
        println!(
            "{} of {} ticker(s) could not be analyzed.",
            report.failures(),
            report.tickers.len()
        );
        println!();
    }
}

fn print_card(ticker: &TickerReport, config: &ScreenerConfig) {
    println!();
    println!("--- {} ---", ticker.instrument.label());

    let analysis = match &ticker.outcome {
        Ok(a) => a,
        Err(e) => {
            println!("ERROR: {e}");
            return;
        }
    };

    let snap = &analysis.snapshot;
    let class = &analysis.classification;
    println!("As of:          {}", analysis.as_of);
    println!("Price:          ${:.2}", analysis.close);
    println!("RSI(14):        {:.1}", snap.rsi);
    println!(
        "Trend:          {} (200-day SMA ${:.2})",
        class.trend, snap.sma_200
    );
    println!(
        "Opportunity:    {} ({:.1}% to 52-week high ${:.2})",
        class.opportunity, class.distance_to_high_pct, snap.high_52w
    );
    println!("Position:       {}", describe_position(analysis, &config.fx.account_currency));
    if let Some(line) = describe_commentary(&analysis.commentary) {
        println!("AI:             {line}");
    }
}

fn describe_position(analysis: &Analysis, currency: &str) -> String {
    match &analysis.position {
        PositionRecommendation::NoPosition => "not an entry candidate".to_string(),
        PositionRecommendation::Enter(plan) => {
            let mut line = format!(
                "{} shares, stop-loss ${:.2}, {} {} at risk",
                plan.shares,
                plan.stop_loss,
                group_thousands(plan.risk_exposure()),
                currency
            );
            if plan.capital_constrained {
                line.push_str(" (capital constrained)");
            }
            line
        }
    }
}

fn describe_commentary(outcome: &CommentaryOutcome) -> Option<String> {
    match outcome {
        CommentaryOutcome::Skipped(SkipReason::Disabled) => None,
        CommentaryOutcome::Skipped(SkipReason::Bearish) => None,
        CommentaryOutcome::Comment(text) => Some(text.clone()),
        CommentaryOutcome::Failed(CommentaryError::RateLimited) => {
            Some("busy (rate limited), try again in a moment".to_string())
        }
        CommentaryOutcome::Failed(CommentaryError::ModelNotFound { model }) => {
            Some(format!("model {model} not found (404)"))
        }
        CommentaryOutcome::Failed(CommentaryError::Other(msg)) => Some(format!("error: {msg}")),
    }
}

/// 200000.0 -> "200,000"
fn group_thousands(amount: f64) -> String {
    let rounded = format!("{:.0}", amount.abs());
    let mut out = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if amount < 0.0 && rounded != "0" {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(200_000.0), "200,000");
        assert_eq!(group_thousands(10_000.4), "10,000");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1_234_567.0), "1,234,567");
        assert_eq!(group_thousands(-1_500.0), "-1,500");
        assert_eq!(group_thousands(0.0), "0");
    }

    #[test]
    fn commentary_lines() {
        assert_eq!(
            describe_commentary(&CommentaryOutcome::Skipped(SkipReason::Bearish)),
            None
        );
        assert_eq!(
            describe_commentary(&CommentaryOutcome::Failed(CommentaryError::ModelNotFound {
                model: "gemini-x".into()
            })),
            Some("model gemini-x not found (404)".into())
        );
        assert!(describe_commentary(&CommentaryOutcome::Failed(CommentaryError::RateLimited))
            .unwrap()
            .contains("rate limited"));
    }
}
