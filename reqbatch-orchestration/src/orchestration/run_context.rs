//! Per-run state fixed when the operator starts a run.

use chrono::{Days, Local, NaiveDate};
use reqbatch_shared::models::RequisitionGroup;
use uuid::Uuid;

/// Delivery date format expected by the terminal
pub const DELIVERY_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Attached to every log line of the run
    pub correlation_id: Uuid,
    pub requisition_group: RequisitionGroup,
    pub delivery_date: NaiveDate,
}

impl RunContext {
    pub fn new(requisition_group: RequisitionGroup, delivery_date: NaiveDate) -> Self {
        Self {
            correlation_id: Uuid::now_v7(),
            requisition_group,
            delivery_date,
        }
    }

    /// Delivery date is the local date plus `lookahead_days`
    pub fn for_today(requisition_group: RequisitionGroup, lookahead_days: u32) -> Self {
        let today = Local::now().date_naive();
        Self::new(requisition_group, delivery_date_from(today, lookahead_days))
    }

    pub fn delivery_date_text(&self) -> String {
        self.delivery_date.format(DELIVERY_DATE_FORMAT).to_string()
    }
}

/// `today` plus `lookahead_days`, saturating at the last representable date
pub fn delivery_date_from(today: NaiveDate, lookahead_days: u32) -> NaiveDate {
    today
        .checked_add_days(Days::new(u64::from(lookahead_days)))
        .unwrap_or(NaiveDate::MAX)
}
