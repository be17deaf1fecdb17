//! Stateless date formatting for query parameters.

use crate::{Error, ErrorContext, Result};
use chrono::NaiveDateTime;

/// Format used by the dialog conversation export (`date_from` / `date_to`).
pub const DIALOG_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render `date` with a `strftime`-style `format`. Holds no state between calls.
pub fn format_date(date: &NaiveDateTime, format: &str) -> String {
    date.format(format).to_string()
}

/// Reject a range whose start is after its end.
pub fn ensure_ordered(operation: &str, from: &NaiveDateTime, to: &NaiveDateTime) -> Result<()> {
    if from > to {
        return Err(Error::invalid_input_with_context(
            "'from' is greater than 'to'",
            ErrorContext::new()
                .with_operation(operation)
                .with_field("from")
                .with_details(format!("{} > {}", from, to)),
        ));
    }
    Ok(())
}
