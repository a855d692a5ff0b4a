//! Loads holdings from a CSV file into a `PortfolioLedger`.
//!
//! Columns: `ticker,quantity,avg_cost[,target_quantity[,date_added]]`.
//! Repeated tickers are merged through `add_or_update`, so the file can be
//! a plain list of buys. The file is only read, never written back.

use chrono::{NaiveDate, Utc};
use std::path::Path;

use crate::domain::error::AltairError;
use crate::domain::portfolio::PortfolioLedger;

pub fn load_ledger<P: AsRef<Path>>(path: P) -> Result<PortfolioLedger, AltairError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    parse_ledger(&content)
}

pub fn parse_ledger(content: &str) -> Result<PortfolioLedger, AltairError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut ledger = PortfolioLedger::new();
    let today = Utc::now().date_naive();

    for (line, result) in rdr.records().enumerate() {
        let row = line + 2;
        let record =
            result.map_err(|e| AltairError::invalid(format!("positions row {}: {}", row, e)))?;

        let ticker = record
            .get(0)
            .ok_or_else(|| AltairError::invalid(format!("positions row {}: missing ticker", row)))?;
        let quantity = number(&record, 1, "quantity", row)?
            .ok_or_else(|| AltairError::invalid(format!("positions row {}: missing quantity", row)))?;
        let avg_cost = number(&record, 2, "avg_cost", row)?
            .ok_or_else(|| AltairError::invalid(format!("positions row {}: missing avg_cost", row)))?;
        let target = number(&record, 3, "target_quantity", row)?;
        let date = match record.get(4).filter(|s| !s.is_empty()) {
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                AltairError::invalid(format!("positions row {}: invalid date_added '{}'", row, s))
            })?,
            None => today,
        };

        ledger.add_or_update_on(ticker, quantity, avg_cost, date)?;
        if let Some(target) = target {
            // a zero-quantity row never creates a position to target
            if ledger.contains(ticker) {
                ledger.set_target(ticker, target)?;
            }
        }
    }

    Ok(ledger)
}

fn number(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
    row: usize,
) -> Result<Option<f64>, AltairError> {
    match record.get(idx).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s.parse::<f64>().map(Some).map_err(|_| {
            AltairError::invalid(format!("positions row {}: invalid {} '{}'", row, name, s))
        }),
    }
}
