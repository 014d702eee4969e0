use std::cmp::Ordering;
use std::collections::HashMap;

use crate::errors::AppError;
use crate::models::{FilteredTrades, SortDirection, SortField, Trade, TradeFilter, TradeValuation};
use crate::services::valuation_service;

/// Apply a declarative filter and sort to a trade collection.
///
/// Narrowing order: symbol equality, open/closed, buy-date bounds
/// (inclusive); valuation happens next so the gain bounds can filter on the
/// derived gain. Totals are computed over the final filtered set. The sort
/// is stable, and repeated application with the same filter is idempotent.
pub fn filter_and_sort(
    trades: &[Trade],
    filter: &TradeFilter,
    prices: &HashMap<String, f64>,
) -> Result<FilteredTrades, AppError> {
    if filter.open_only && filter.closed_only {
        return Err(AppError::Validation(
            "open_only and closed_only are mutually exclusive".to_string(),
        ));
    }

    let mut selected: Vec<&Trade> = trades.iter().collect();

    if let Some(symbol) = &filter.symbol {
        let wanted = symbol.trim().to_uppercase();
        selected.retain(|t| t.symbol == wanted);
    }
    if filter.open_only {
        selected.retain(|t| t.is_open());
    } else if filter.closed_only {
        selected.retain(|t| !t.is_open());
    }
    if let Some(from) = filter.date_from {
        selected.retain(|t| t.buy_date >= from);
    }
    if let Some(to) = filter.date_to {
        selected.retain(|t| t.buy_date <= to);
    }

    let mut valuations: Vec<TradeValuation> = selected
        .into_iter()
        .map(|t| valuation_service::valuate(t, prices.get(&t.symbol).copied()))
        .collect();

    if let Some(min) = filter.min_gain {
        valuations.retain(|v| v.gain >= min);
    }
    if let Some(max) = filter.max_gain {
        valuations.retain(|v| v.gain <= max);
    }

    if let Some(field) = filter.sort_by.as_deref().and_then(SortField::parse) {
        valuations.sort_by(|a, b| {
            let ord = match field {
                SortField::Date => a.trade.buy_date.cmp(&b.trade.buy_date),
                SortField::Symbol => a.trade.symbol.cmp(&b.trade.symbol),
                SortField::Gain => a.gain.partial_cmp(&b.gain).unwrap_or(Ordering::Equal),
                SortField::Quantity => a.trade.quantity.cmp(&b.trade.quantity),
            };
            match filter.sort_direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }

    let total_value = valuations.iter().map(|v| v.current_value).sum();
    let total_gain = valuations.iter().map(|v| v.gain).sum();
    let open_positions = valuations.iter().filter(|v| v.trade.is_open()).count();

    Ok(FilteredTrades {
        total_count: valuations.len(),
        total_value,
        total_gain,
        open_positions,
        closed_positions: valuations.len() - open_positions,
        trades: valuations,
    })
}
