//! In-memory portfolio ledger and valuation.
//!
//! The ledger is a plain value owned by the caller; nothing here is global
//! or shared between users.

use chrono::{NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};

use super::error::AltairError;
use super::ohlcv::normalize_ticker;
use super::position::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct ValuationLine {
    pub ticker: String,
    pub quantity: f64,
    pub avg_cost: f64,
    pub price: f64,
    pub market_value: f64,
    pub cost_basis: f64,
    pub unrealized_pnl: f64,
    pub unrealized_pnl_pct: f64,
    /// Share of the priced portfolio's market value, in percent.
    pub weight_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PositionValuation {
    Priced(ValuationLine),
    PriceUnavailable { ticker: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub positions: Vec<PositionValuation>,
    pub total_value: f64,
    pub total_cost: f64,
    pub unrealized_pnl: f64,
}

impl Valuation {
    pub fn priced(&self) -> impl Iterator<Item = &ValuationLine> {
        self.positions.iter().filter_map(|p| match p {
            PositionValuation::Priced(line) => Some(line),
            PositionValuation::PriceUnavailable { .. } => None,
        })
    }

    pub fn unavailable(&self) -> impl Iterator<Item = &str> {
        self.positions.iter().filter_map(|p| match p {
            PositionValuation::PriceUnavailable { ticker } => Some(ticker.as_str()),
            PositionValuation::Priced(_) => None,
        })
    }

    /// One `PriceUnavailable` error per unpriced position, for callers that
    /// report them alongside other failures.
    pub fn unavailable_errors(&self) -> Vec<AltairError> {
        self.unavailable()
            .map(|ticker| AltairError::PriceUnavailable {
                ticker: ticker.to_string(),
            })
            .collect()
    }

    pub fn unrealized_pnl_pct(&self) -> f64 {
        if self.total_cost == 0.0 {
            0.0
        } else {
            self.unrealized_pnl / self.total_cost * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub total_cost: f64,
    pub pnl: f64,
    pub pnl_pct: f64,
    pub holdings: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalanceAction {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RebalanceOrder {
    pub ticker: String,
    pub action: RebalanceAction,
    pub quantity: f64,
    /// Share of the target already held, in percent.
    pub progress_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioLedger {
    positions: BTreeMap<String, Position>,
}

impl PortfolioLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buys `quantity` at `cost`, dated today.
    pub fn add_or_update(
        &mut self,
        ticker: &str,
        quantity: f64,
        cost: f64,
    ) -> Result<(), AltairError> {
        self.add_or_update_on(ticker, quantity, cost, Utc::now().date_naive())
    }

    /// Buys `quantity` at `cost`. An existing position gets a
    /// quantity-weighted average cost; its `date_added` is left alone.
    pub fn add_or_update_on(
        &mut self,
        ticker: &str,
        quantity: f64,
        cost: f64,
        date: NaiveDate,
    ) -> Result<(), AltairError> {
        let ticker = normalize_ticker(ticker)?;
        check_non_negative("quantity", quantity)?;
        check_non_negative("cost", cost)?;

        match self.positions.get_mut(&ticker) {
            Some(pos) => {
                let total = pos.quantity + quantity;
                if total > 0.0 {
                    pos.avg_cost = (pos.quantity * pos.avg_cost + quantity * cost) / total;
                }
                pos.quantity = total;
            }
            None => {
                self.positions.insert(
                    ticker.clone(),
                    Position {
                        ticker: ticker.clone(),
                        quantity,
                        avg_cost: cost,
                        target_quantity: None,
                        date_added: date,
                    },
                );
            }
        }

        self.drop_if_empty(&ticker);
        Ok(())
    }

    /// Sells part of a holding. Average cost is unchanged; selling
    /// everything removes the position.
    pub fn reduce(&mut self, ticker: &str, quantity: f64) -> Result<(), AltairError> {
        let ticker = normalize_ticker(ticker)?;
        check_non_negative("quantity", quantity)?;

        let pos = self
            .positions
            .get_mut(&ticker)
            .ok_or_else(|| AltairError::NotFound {
                ticker: ticker.clone(),
            })?;
        if quantity > pos.quantity {
            return Err(AltairError::invalid(format!(
                "cannot sell {} of {}, only {} held",
                quantity, ticker, pos.quantity
            )));
        }
        pos.quantity -= quantity;

        self.drop_if_empty(&ticker);
        Ok(())
    }

    pub fn remove(&mut self, ticker: &str) -> Option<Position> {
        self.positions.remove(&ticker.trim().to_uppercase())
    }

    pub fn set_target(&mut self, ticker: &str, target_quantity: f64) -> Result<(), AltairError> {
        let ticker = normalize_ticker(ticker)?;
        check_non_negative("target quantity", target_quantity)?;

        let pos = self
            .positions
            .get_mut(&ticker)
            .ok_or_else(|| AltairError::NotFound {
                ticker: ticker.clone(),
            })?;
        pos.target_quantity = Some(target_quantity);
        Ok(())
    }

    pub fn get(&self, ticker: &str) -> Option<&Position> {
        self.positions.get(&ticker.trim().to_uppercase())
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.get(ticker).is_some()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn tickers(&self) -> Vec<String> {
        self.positions.keys().cloned().collect()
    }

    /// Values every position against `prices`. Positions with no (finite)
    /// price are flagged and left out of the totals instead of failing.
    pub fn valuate(&self, prices: &HashMap<String, f64>) -> Valuation {
        let mut positions = Vec::with_capacity(self.positions.len());
        let mut total_value = 0.0;
        let mut total_cost = 0.0;

        for pos in self.positions.values() {
            match prices.get(&pos.ticker).copied().filter(|p| p.is_finite()) {
                Some(price) => {
                    let line = ValuationLine {
                        ticker: pos.ticker.clone(),
                        quantity: pos.quantity,
                        avg_cost: pos.avg_cost,
                        price,
                        market_value: pos.market_value(price),
                        cost_basis: pos.cost_basis(),
                        unrealized_pnl: pos.unrealized_pnl(price),
                        unrealized_pnl_pct: pos.unrealized_pnl_pct(price),
                        weight_pct: 0.0,
                    };
                    total_value += line.market_value;
                    total_cost += line.cost_basis;
                    positions.push(PositionValuation::Priced(line));
                }
                None => positions.push(PositionValuation::PriceUnavailable {
                    ticker: pos.ticker.clone(),
                }),
            }
        }

        if total_value > 0.0 {
            for p in positions.iter_mut() {
                if let PositionValuation::Priced(line) = p {
                    line.weight_pct = line.market_value / total_value * 100.0;
                }
            }
        }

        Valuation {
            positions,
            total_value,
            total_cost,
            unrealized_pnl: total_value - total_cost,
        }
    }

    pub fn summary(&self, prices: &HashMap<String, f64>) -> PortfolioSummary {
        let valuation = self.valuate(prices);
        PortfolioSummary {
            total_value: valuation.total_value,
            total_cost: valuation.total_cost,
            pnl: valuation.unrealized_pnl,
            pnl_pct: valuation.unrealized_pnl_pct(),
            holdings: self.len(),
        }
    }

    /// Orders needed to bring each targeted position to its target quantity.
    pub fn rebalance_orders(&self) -> Vec<RebalanceOrder> {
        self.positions
            .values()
            .filter_map(|pos| {
                let delta = pos.target_delta()?;
                let (action, quantity) = if delta > 0.0 {
                    (RebalanceAction::Buy, delta)
                } else if delta < 0.0 {
                    (RebalanceAction::Sell, -delta)
                } else {
                    return None;
                };
                Some(RebalanceOrder {
                    ticker: pos.ticker.clone(),
                    action,
                    quantity,
                    progress_pct: pos.target_progress_pct(),
                })
            })
            .collect()
    }

    fn drop_if_empty(&mut self, ticker: &str) {
        if self
            .positions
            .get(ticker)
            .is_some_and(|pos| pos.quantity <= 0.0)
        {
            self.positions.remove(ticker);
        }
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<(), AltairError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AltairError::invalid(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn prices(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries.iter().map(|(t, p)| (t.to_string(), *p)).collect()
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = PortfolioLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn add_inserts_position() {
        let mut ledger = PortfolioLedger::new();
        ledger.add_or_update_on("thyao.is", 10.0, 100.0, day()).unwrap();

        let pos = ledger.get("THYAO.IS").unwrap();
        assert_eq!(pos.ticker, "THYAO.IS");
        assert_relative_eq!(pos.quantity, 10.0);
        assert_relative_eq!(pos.avg_cost, 100.0);
        assert_eq!(pos.date_added, day());
        assert!(pos.target_quantity.is_none());
    }

    #[test]
    fn add_twice_averages_cost() {
        let mut ledger = PortfolioLedger::new();
        ledger.add_or_update_on("A", 10.0, 100.0, day()).unwrap();
        ledger.add_or_update_on("A", 10.0, 200.0, day()).unwrap();

        let pos = ledger.get("A").unwrap();
        assert_relative_eq!(pos.quantity, 20.0);
        assert_relative_eq!(pos.avg_cost, 150.0);
    }

    #[test]
    fn add_keeps_original_date_and_target() {
        let mut ledger = PortfolioLedger::new();
        ledger.add_or_update_on("A", 10.0, 100.0, day()).unwrap();
        ledger.set_target("A", 50.0).unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        ledger.add_or_update_on("A", 5.0, 90.0, later).unwrap();

        let pos = ledger.get("A").unwrap();
        assert_eq!(pos.date_added, day());
        assert_eq!(pos.target_quantity, Some(50.0));
    }

    #[test]
    fn add_rejects_negative_quantity() {
        let mut ledger = PortfolioLedger::new();
        let err = ledger.add_or_update_on("A", -1.0, 100.0, day()).unwrap_err();
        assert!(matches!(err, AltairError::InvalidParameter { .. }));
        assert!(ledger.is_empty());
    }

    #[test]
    fn add_rejects_negative_or_nan_cost() {
        let mut ledger = PortfolioLedger::new();
        assert!(ledger.add_or_update_on("A", 1.0, -5.0, day()).is_err());
        assert!(ledger.add_or_update_on("A", 1.0, f64::NAN, day()).is_err());
    }

    #[test]
    fn add_rejects_empty_ticker() {
        let mut ledger = PortfolioLedger::new();
        assert!(ledger.add_or_update_on("  ", 1.0, 5.0, day()).is_err());
    }

    #[test]
    fn add_zero_quantity_does_not_insert() {
        let mut ledger = PortfolioLedger::new();
        ledger.add_or_update_on("A", 0.0, 100.0, day()).unwrap();
        assert!(!ledger.contains("A"));
    }

    #[test]
    fn reduce_keeps_average_cost() {
        let mut ledger = PortfolioLedger::new();
        ledger.add_or_update_on("A", 10.0, 100.0, day()).unwrap();
        ledger.reduce("A", 4.0).unwrap();

        let pos = ledger.get("A").unwrap();
        assert_relative_eq!(pos.quantity, 6.0);
        assert_relative_eq!(pos.avg_cost, 100.0);
    }

    #[test]
    fn reduce_to_zero_removes_position() {
        let mut ledger = PortfolioLedger::new();
        ledger.add_or_update_on("A", 10.0, 100.0, day()).unwrap();
        ledger.reduce("A", 10.0).unwrap();
        assert!(!ledger.contains("A"));
    }

    #[test]
    fn reduce_errors() {
        let mut ledger = PortfolioLedger::new();
        assert!(matches!(
            ledger.reduce("A", 1.0),
            Err(AltairError::NotFound { .. })
        ));

        ledger.add_or_update_on("A", 10.0, 100.0, day()).unwrap();
        assert!(matches!(
            ledger.reduce("A", 11.0),
            Err(AltairError::InvalidParameter { .. })
        ));
        assert_relative_eq!(ledger.get("A").unwrap().quantity, 10.0);
    }

    #[test]
    fn remove_position() {
        let mut ledger = PortfolioLedger::new();
        ledger.add_or_update_on("A", 10.0, 100.0, day()).unwrap();
        let removed = ledger.remove("a");
        assert!(removed.is_some());
        assert!(ledger.is_empty());
    }

    #[test]
    fn remove_nonexistent_is_noop() {
        let mut ledger = PortfolioLedger::new();
        ledger.add_or_update_on("A", 10.0, 100.0, day()).unwrap();
        let before = ledger.clone();

        assert!(ledger.remove("XYZ").is_none());
        assert_eq!(ledger, before);
    }

    #[test]
    fn set_target_requires_position() {
        let mut ledger = PortfolioLedger::new();
        let err = ledger.set_target("A", 10.0).unwrap_err();
        assert!(matches!(err, AltairError::NotFound { ticker } if ticker == "A"));
    }

    #[test]
    fn set_target_rejects_negative() {
        let mut ledger = PortfolioLedger::new();
        ledger.add_or_update_on("A", 10.0, 100.0, day()).unwrap();
        assert!(matches!(
            ledger.set_target("A", -1.0),
            Err(AltairError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn valuate_flags_missing_price() {
        let mut ledger = PortfolioLedger::new();
        ledger.add_or_update_on("A", 10.0, 40.0, day()).unwrap();
        ledger.add_or_update_on("B", 5.0, 20.0, day()).unwrap();

        let valuation = ledger.valuate(&prices(&[("A", 50.0)]));

        let priced: Vec<_> = valuation.priced().collect();
        assert_eq!(priced.len(), 1);
        assert_eq!(priced[0].ticker, "A");
        assert_relative_eq!(priced[0].market_value, 500.0);
        assert_relative_eq!(priced[0].weight_pct, 100.0);

        assert_eq!(valuation.unavailable().collect::<Vec<_>>(), vec!["B"]);
        assert_relative_eq!(valuation.total_value, 500.0);
        assert_relative_eq!(valuation.total_cost, 400.0);
        assert_relative_eq!(valuation.unrealized_pnl, 100.0);

        let errors = valuation.unavailable_errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], AltairError::PriceUnavailable { ticker } if ticker == "B"));
    }

    #[test]
    fn valuate_treats_nan_price_as_unavailable() {
        let mut ledger = PortfolioLedger::new();
        ledger.add_or_update_on("A", 10.0, 40.0, day()).unwrap();
        let valuation = ledger.valuate(&prices(&[("A", f64::NAN)]));
        assert_eq!(valuation.unavailable().count(), 1);
        assert_relative_eq!(valuation.total_value, 0.0);
    }

    #[test]
    fn valuate_total_is_sum_of_lines() {
        let mut ledger = PortfolioLedger::new();
        ledger.add_or_update_on("A", 3.0, 10.1, day()).unwrap();
        ledger.add_or_update_on("B", 7.0, 0.3, day()).unwrap();
        ledger.add_or_update_on("C", 1.5, 99.9, day()).unwrap();

        let valuation = ledger.valuate(&prices(&[("A", 10.7), ("B", 0.1), ("C", 101.3)]));
        let sum: f64 = valuation.priced().map(|l| l.market_value).sum();
        assert_eq!(sum, valuation.total_value);

        let weights: f64 = valuation.priced().map(|l| l.weight_pct).sum();
        assert_relative_eq!(weights, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn summary_counts_all_holdings() {
        let mut ledger = PortfolioLedger::new();
        ledger.add_or_update_on("A", 10.0, 100.0, day()).unwrap();
        ledger.add_or_update_on("B", 10.0, 100.0, day()).unwrap();

        let summary = ledger.summary(&prices(&[("A", 110.0)]));
        assert_eq!(summary.holdings, 2);
        assert_relative_eq!(summary.total_value, 1_100.0);
        assert_relative_eq!(summary.total_cost, 1_000.0);
        assert_relative_eq!(summary.pnl, 100.0);
        assert_relative_eq!(summary.pnl_pct, 10.0);
    }

    #[test]
    fn summary_of_empty_ledger() {
        let summary = PortfolioLedger::new().summary(&HashMap::new());
        assert_eq!(summary.holdings, 0);
        assert_relative_eq!(summary.pnl_pct, 0.0);
    }

    #[test]
    fn rebalance_orders_buy_and_sell() {
        let mut ledger = PortfolioLedger::new();
        ledger.add_or_update_on("A", 10.0, 100.0, day()).unwrap();
        ledger.add_or_update_on("B", 10.0, 100.0, day()).unwrap();
        ledger.add_or_update_on("C", 10.0, 100.0, day()).unwrap();
        ledger.add_or_update_on("D", 10.0, 100.0, day()).unwrap();
        ledger.set_target("A", 15.0).unwrap();
        ledger.set_target("B", 4.0).unwrap();
        ledger.set_target("C", 10.0).unwrap();

        let orders = ledger.rebalance_orders();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].ticker, "A");
        assert_eq!(orders[0].action, RebalanceAction::Buy);
        assert_relative_eq!(orders[0].quantity, 5.0);
        assert_eq!(orders[1].ticker, "B");
        assert_eq!(orders[1].action, RebalanceAction::Sell);
        assert_relative_eq!(orders[1].quantity, 6.0);
    }

    #[test]
    fn rebalance_orders_carry_target_progress() {
        let mut ledger = PortfolioLedger::new();
        ledger.add_or_update_on("A", 10.0, 100.0, day()).unwrap();
        ledger.add_or_update_on("B", 10.0, 100.0, day()).unwrap();
        ledger.set_target("A", 40.0).unwrap();
        ledger.set_target("B", 0.0).unwrap();

        let orders = ledger.rebalance_orders();
        assert_relative_eq!(orders[0].progress_pct.unwrap(), 25.0);
        // a zero target sells everything and has no progress figure
        assert_eq!(orders[1].action, RebalanceAction::Sell);
        assert!(orders[1].progress_pct.is_none());
    }
}
