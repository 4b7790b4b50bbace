//! Dashboard statistics and sales history

use tracing::{debug, instrument};

use crate::{
    backend::{Backend, BackendError},
    sales::{RECENT_SALES_WINDOW, Sale, Stats, recent_sales},
};

/// What the dashboard shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary<'a> {
    /// Aggregate figures, if they have been fetched
    pub stats: Option<Stats>,

    /// Newest sales first
    pub recent: Vec<&'a Sale>,
}

/// Cached copies of the backend's reporting endpoints.
#[derive(Debug, Clone, Default)]
pub struct SalesReport {
    stats: Option<Stats>,
    sales: Vec<Sale>,
}

impl SalesReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last fetched statistics.
    pub fn stats(&self) -> Option<Stats> {
        self.stats
    }

    /// Last fetched sales history, in backend order.
    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    /// Refetch the dashboard statistics.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the previous figures are kept.
    #[instrument(skip_all)]
    pub async fn refresh_stats<B>(&mut self, backend: &B) -> Result<Stats, BackendError>
    where
        B: Backend + ?Sized,
    {
        let stats = backend.stats().await?;

        self.stats = Some(stats);

        Ok(stats)
    }

    /// Refetch the sales history.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the previous history is kept.
    #[instrument(skip_all)]
    pub async fn refresh_sales<B>(&mut self, backend: &B) -> Result<&[Sale], BackendError>
    where
        B: Backend + ?Sized,
    {
        let sales = backend.list_sales().await?;

        debug!(count = sales.len(), "sales history refreshed");

        self.sales = sales;

        Ok(&self.sales)
    }

    /// Statistics plus the newest few sales.
    pub fn summary(&self) -> Summary<'_> {
        Summary {
            stats: self.stats,
            recent: recent_sales(&self.sales, RECENT_SALES_WINDOW),
        }
    }

    /// Sale by invoice number; a leading `#` is ignored.
    pub fn find(&self, invoice: &str) -> Option<&Sale> {
        let invoice = invoice.trim().trim_start_matches('#');

        self.sales.iter().find(|sale| sale.invoice_id == invoice)
    }
}
