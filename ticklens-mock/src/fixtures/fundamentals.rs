use chrono::NaiveDate;
use ticklens_core::{BalanceSheetRow, IncomeStatementRow, Period};

use super::usd;

fn fiscal_year_end(year: i32) -> Option<Period> {
    NaiveDate::from_ymd_opt(year, 9, 28).map(Period::Date)
}

pub fn balance_sheet_by_symbol(s: &str) -> Vec<BalanceSheetRow> {
    let scale = match s {
        "AAPL" => 1,
        "MSFT" => 2,
        _ => return vec![],
    };
    [(2024, 364_980, 308_030, 56_950, 29_943, 85_750), (2023, 352_583, 290_437, 62_146, 29_965, 95_281)]
        .into_iter()
        .filter_map(|(year, assets, liabilities, equity, cash, debt)| {
            let m = |millions: i64| usd(millions * scale * 1_000_000);
            Some(BalanceSheetRow {
                period: fiscal_year_end(year)?,
                total_assets: m(assets),
                total_liabilities: m(liabilities),
                total_equity: m(equity),
                cash: m(cash),
                long_term_debt: m(debt),
                shares_outstanding: None,
            })
        })
        .collect()
}

pub fn income_stmt_by_symbol(s: &str) -> Vec<IncomeStatementRow> {
    let scale = match s {
        "AAPL" => 1,
        "MSFT" => 2,
        _ => return vec![],
    };
    [(2024, 391_035, 180_683, 123_216, 93_736), (2023, 383_285, 169_148, 114_301, 96_995)]
        .into_iter()
        .filter_map(|(year, revenue, gross, operating, net)| {
            let m = |millions: i64| usd(millions * scale * 1_000_000);
            Some(IncomeStatementRow {
                period: fiscal_year_end(year)?,
                total_revenue: m(revenue),
                gross_profit: m(gross),
                operating_income: m(operating),
                net_income: m(net),
            })
        })
        .collect()
}
