//! Small stateless helpers shared by the bindings.

pub mod date;

pub use date::{ensure_ordered, format_date, DIALOG_DATE_FORMAT};
