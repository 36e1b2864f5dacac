//! The per-request dashboard pipeline.
//!
//! Sections are fetched concurrently and never fail the whole run: each
//! provider error becomes a [`Notice`] on its own section.

use chrono::{Days, Utc};
use ticklens_core::{
    DashboardRequest, LensError, RangeSpec, Sampling, aggregate_monthly_volume,
    compute_moving_average,
};

use crate::Dashboard;
use crate::report::{
    CompanyInfo, DashboardReport, Financials, HistoryTail, LatestPrice, LongRunHistory, Notice,
    NoticeLevel, Overlay, PriceHistory, Section, VolumePie,
};

pub(crate) const FETCH_OK: &str = "Data fetched successfully.";
pub(crate) const NO_DATA: &str = "No data found. Please check the ticker symbol.";
pub(crate) const FETCH_ERROR: &str = "Error fetching data. Please ensure the ticker is correct.";
pub(crate) const NO_LATEST_PRICE: &str = "Real-time price not available.";

type SectionResult<T> = (Option<T>, Vec<Notice>);

impl Dashboard {
    fn failure_notice(&self, section: Section, err: &LensError) -> Notice {
        #[cfg(feature = "tracing")]
        tracing::warn!(section = ?section, error = %err, "section degraded");
        match err.root_cause() {
            LensError::EmptyResult { .. } | LensError::NotFound { .. } => {
                Notice::new(NoticeLevel::Warning, section, NO_DATA)
            }
            LensError::Unsupported { .. } => Notice::new(
                NoticeLevel::Warning,
                section,
                format!("Not available from {}.", self.connector.vendor()),
            ),
            _ => Notice::new(NoticeLevel::Error, section, FETCH_ERROR),
        }
    }

    /// Assemble the full dashboard for one request.
    ///
    /// Never fails; inspect [`DashboardReport::notices`] for degraded sections.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ticklens::run",
            skip(self, req),
            fields(symbol = %req.symbol(), range = %req.range(), window = req.window()),
        )
    )]
    pub async fn run(&self, req: &DashboardRequest) -> DashboardReport {
        let symbol = req.symbol();
        let (
            (price_history, n1),
            (company, n2),
            (long_run, n3),
            (latest_price, n4),
            (financials, n5),
            (monthly_volume, n6),
        ) = tokio::join!(
            self.price_history_section(symbol, *req.range(), req.window()),
            self.company_section(symbol),
            self.long_run_section(symbol),
            self.latest_price_section(symbol),
            self.financials_section(symbol),
            self.monthly_volume_section(symbol),
        );

        DashboardReport {
            symbol: symbol.to_string(),
            range: *req.range(),
            window: req.window(),
            source: self.connector.name().to_string(),
            generated_at: Utc::now(),
            price_history,
            company: company.unwrap_or_default(),
            long_run,
            latest_price,
            financials,
            monthly_volume,
            notices: [n1, n2, n3, n4, n5, n6].concat(),
        }
    }

    async fn price_history_section(
        &self,
        symbol: &str,
        range: RangeSpec,
        window: usize,
    ) -> SectionResult<PriceHistory> {
        let section = Section::PriceHistory;
        let table = match self.fetch_ohlcv(symbol, range).await {
            Ok(t) => t,
            Err(e) => return (None, vec![self.failure_notice(section, &e)]),
        };
        let mut notices = vec![Notice::new(NoticeLevel::Success, section, FETCH_OK)];

        let closes = table.closes();
        let ma = match compute_moving_average(&closes, window) {
            Ok(ma) => ma,
            Err(e) => {
                notices.push(self.failure_notice(section, &e));
                return (None, notices);
            }
        };
        if ma.is_insufficient() {
            notices.push(Notice::new(
                NoticeLevel::Warning,
                section,
                format!(
                    "Not enough data for a {window}-period moving average ({} rows).",
                    closes.len()
                ),
            ));
        }

        let history = PriceHistory {
            table: HistoryTail::new(&table, self.cfg.table_tail_rows),
            overlay: Overlay::new(&closes, &ma),
        };
        (Some(history), notices)
    }

    async fn company_section(&self, symbol: &str) -> SectionResult<CompanyInfo> {
        match self.fetch_company_info(symbol).await {
            Ok(info) => (Some(info), vec![]),
            Err(e) => (None, vec![self.failure_notice(Section::CompanyInfo, &e)]),
        }
    }

    async fn long_run_section(&self, symbol: &str) -> SectionResult<LongRunHistory> {
        let section = Section::LongRunHistory;
        let since = self.cfg.history_since;
        let today = Utc::now().date_naive();
        let range = RangeSpec::between(
            since,
            today.checked_add_days(Days::new(1)).unwrap_or(today),
            Sampling::D1,
        );
        let table = match range {
            Ok(range) => self.fetch_ohlcv(symbol, range).await,
            Err(e) => Err(e),
        };
        match table {
            Ok(t) => (
                Some(LongRunHistory {
                    since,
                    table: HistoryTail::new(&t, self.cfg.table_tail_rows),
                }),
                vec![],
            ),
            Err(e) => (None, vec![self.failure_notice(section, &e)]),
        }
    }

    async fn latest_price_section(&self, symbol: &str) -> SectionResult<LatestPrice> {
        let range = RangeSpec::lookback(self.cfg.latest_price_lookback, Sampling::D1);
        let latest = self.fetch_ohlcv(symbol, range).await.and_then(|t| {
            let obs = t
                .latest_close()
                .ok_or_else(|| LensError::empty(format!("close for {symbol}")))?;
            Ok(LatestPrice {
                title: format!("{symbol} Real-Time Price (Close)"),
                ts: obs.ts,
                close: obs.value,
                currency: t.currency().cloned(),
            })
        });
        match latest {
            Ok(p) => (Some(p), vec![]),
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(symbol, error = %e, "latest close unavailable");
                #[cfg(not(feature = "tracing"))]
                let _ = e;
                (
                    None,
                    vec![Notice::new(
                        NoticeLevel::Warning,
                        Section::LatestPrice,
                        NO_LATEST_PRICE,
                    )],
                )
            }
        }
    }

    async fn financials_section(&self, symbol: &str) -> SectionResult<Financials> {
        match self.fetch_financials(symbol).await {
            Ok(f) => (Some(f), vec![]),
            Err(e) => (None, vec![self.failure_notice(Section::Financials, &e)]),
        }
    }

    async fn monthly_volume_section(&self, symbol: &str) -> SectionResult<VolumePie> {
        let section = Section::MonthlyVolume;
        let lookback = self.cfg.volume_lookback;
        let range = RangeSpec::lookback(lookback, Sampling::D1);
        let table = match self.fetch_ohlcv(symbol, range).await {
            Ok(t) => t,
            Err(e) => return (None, vec![self.failure_notice(section, &e)]),
        };
        let agg = aggregate_monthly_volume(&table.volumes());
        let pie = VolumePie::new(symbol, lookback, &agg);
        let notices = if pie.total == 0 {
            vec![Notice::new(
                NoticeLevel::Warning,
                section,
                "No trading volume reported for this period.",
            )]
        } else {
            vec![]
        };
        (Some(pie), notices)
    }
}
