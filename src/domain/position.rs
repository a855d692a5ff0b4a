//! Portfolio positions.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub ticker: String,
    pub quantity: f64,
    pub avg_cost: f64,
    pub target_quantity: Option<f64>,
    pub date_added: NaiveDate,
}

impl Position {
    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.avg_cost
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity * (price - self.avg_cost)
    }

    /// P&L as a percentage of cost basis; 0 when the position cost nothing.
    pub fn unrealized_pnl_pct(&self, price: f64) -> f64 {
        let cost = self.cost_basis();
        if cost == 0.0 {
            0.0
        } else {
            self.unrealized_pnl(price) / cost * 100.0
        }
    }

    /// Shares to buy (positive) or sell (negative) to reach the target.
    pub fn target_delta(&self) -> Option<f64> {
        self.target_quantity.map(|t| t - self.quantity)
    }

    /// Fraction of the target already held, in percent.
    pub fn target_progress_pct(&self) -> Option<f64> {
        match self.target_quantity {
            Some(t) if t > 0.0 => Some(self.quantity / t * 100.0),
            _ => None,
        }
    }
}
