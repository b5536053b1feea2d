mod inbo;
mod vliz_v1;
mod vliz_v2;
mod vue;

pub use inbo::InboLayout;
pub use vliz_v1::VlizV1Layout;
pub use vliz_v2::VlizV2Layout;
pub use vue::VueLayout;

use std::collections::HashMap;

use csv::StringRecord;

use crate::errors::ParserError;
use crate::model::Detection;

/// Maps a header's column names to their positional index, so each layout
/// can look columns up by name regardless of the order they appear in.
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    pub fn build(header: &StringRecord) -> Self {
        let positions = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();
        Self { positions }
    }

    pub fn get<'a>(&self, row: &'a StringRecord, column: &str) -> Option<&'a str> {
        self.positions.get(column).and_then(|&i| row.get(i))
    }
}

/// One recognised tabular export layout: a column signature plus the rules
/// for turning a matching row into a canonical `Detection`.
pub trait DetectionLayout {
    fn name(&self) -> &'static str;

    /// The exact set of column names this layout requires, order irrelevant.
    fn columns(&self) -> &'static [&'static str];

    fn recognise(&self, header: &StringRecord) -> bool {
        same_columns(header, self.columns())
    }

    fn parse_row(
        &self,
        idx: &ColumnIndex,
        row: &StringRecord,
        row_index: usize,
    ) -> Result<Detection, ParserError>;
}

/// Compares a header against a layout's required columns as multisets:
/// same size, same names, order and duplicates aside.
pub fn same_columns(header: &StringRecord, expected: &[&'static str]) -> bool {
    if header.len() != expected.len() {
        return false;
    }
    let mut have: Vec<&str> = header.iter().collect();
    let mut want: Vec<&str> = expected.to_vec();
    have.sort_unstable();
    want.sort_unstable();
    have == want
}

pub fn station_name_valid(name: &str) -> bool {
    crate::patterns::STATION_NAME.is_match(name)
}

pub fn first_non_empty<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    candidates.into_iter().find(|s| !s.is_empty())
}
