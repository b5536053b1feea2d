use chrono::NaiveDateTime;

use crate::errors::ParserError;

/// Tries `primary_fmt` first, then `fallback_fmt`, the way every layout's
/// timestamp column accepts two historical spellings.
pub fn parse_with_fallback(
    layout: &'static str,
    row_index: usize,
    value: &str,
    primary_fmt: &str,
    fallback_fmt: &str,
) -> Result<NaiveDateTime, ParserError> {
    NaiveDateTime::parse_from_str(value, primary_fmt)
        .or_else(|_| NaiveDateTime::parse_from_str(value, fallback_fmt))
        .map_err(|_| ParserError::BadDateTime {
            layout,
            row_index,
            value: value.to_string(),
        })
}
