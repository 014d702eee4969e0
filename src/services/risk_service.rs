//! Advisory risk metrics over caller-supplied series. Short series return
//! neutral values instead of erroring.

/// Sample standard deviation of a returns series (Bessel-corrected, n-1).
/// Returns 0 for fewer than 2 points.
pub fn volatility(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);

    variance.sqrt()
}

/// Largest peak-to-trough percentage decline in a value series, found in a
/// single left-to-right scan tracking the running peak. Returns 0 for fewer
/// than 2 points.
pub fn max_drawdown(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let mut peak = values[0];
    let mut max_dd = 0.0;
    for &value in values {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = (peak - value) / peak * 100.0;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

/// Beta of the portfolio against a market series:
/// covariance(portfolio, market) / variance(market), computed over the
/// overlapping prefix of the two series. Defaults to 1.0 when market data is
/// absent, too short, or carries no variance.
pub fn beta(portfolio_returns: &[f64], market_returns: &[f64]) -> f64 {
    let n = portfolio_returns.len().min(market_returns.len());
    if n < 2 {
        return 1.0;
    }

    let portfolio = &portfolio_returns[..n];
    let market = &market_returns[..n];

    let mean_p = portfolio.iter().sum::<f64>() / n as f64;
    let mean_m = market.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_m = 0.0;
    for (r, b) in portfolio.iter().zip(market.iter()) {
        cov += (r - mean_p) * (b - mean_m);
        var_m += (b - mean_m).powi(2);
    }

    if var_m.abs() < f64::EPSILON {
        return 1.0;
    }

    cov / var_m
}
