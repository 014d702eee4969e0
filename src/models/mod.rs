mod filter;
mod portfolio;
mod trade;
mod valuation;

pub use filter::{FilteredTrades, SortDirection, SortField, TradeFilter};
pub use portfolio::{PortfolioSnapshot, RiskMetrics, RiskRequest, SymbolPerformance};
pub use trade::{CreateTrade, Position, SellTrade, Trade, UpdateTrade};
pub use valuation::TradeValuation;
