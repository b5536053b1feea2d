//! A line-oriented pre-filter for raw detection exports, independent of the
//! column-signature layout dispatch in [`crate::registry`]. It validates
//! four delimited fields against fixed shapes rather than recognising a
//! tabular schema; useful for sanity-checking a raw export before it is
//! ever run through the full pipeline.

use crate::patterns::{RECEIVER_ID, TRANSMITTER_ID};

pub struct Validator;

impl Validator {
    pub fn validate_datetime(value: &str) -> bool {
        chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").is_ok()
    }

    pub fn validate_transmitter_id(value: &str) -> bool {
        TRANSMITTER_ID.is_match(value)
    }

    pub fn validate_receiver_id(value: &str) -> bool {
        RECEIVER_ID.is_match(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidatedFields {
    pub datetime: String,
    pub receiver_id: String,
    pub transmitter_id: String,
    pub receiver_code: String,
}

pub struct LineParser {
    delimiter: char,
    datetime_index: usize,
    receiver_id_index: usize,
    transmitter_id_index: usize,
    receiver_code_index: usize,
}

impl Default for LineParser {
    fn default() -> Self {
        Self {
            delimiter: ',',
            datetime_index: 0,
            receiver_id_index: 1,
            transmitter_id_index: 2,
            receiver_code_index: 3,
        }
    }
}

impl LineParser {
    pub fn new(
        delimiter: char,
        datetime_index: usize,
        receiver_id_index: usize,
        transmitter_id_index: usize,
        receiver_code_index: usize,
    ) -> Self {
        Self {
            delimiter,
            datetime_index,
            receiver_id_index,
            transmitter_id_index,
            receiver_code_index,
        }
    }

    pub fn parse_line(&self, line: &str) -> Option<ConsolidatedFields> {
        let fields: Vec<&str> = line.trim().split(self.delimiter).collect();
        let datetime = *fields.get(self.datetime_index)?;
        let receiver_id = *fields.get(self.receiver_id_index)?;
        let transmitter_id = *fields.get(self.transmitter_id_index)?;
        let receiver_code = *fields.get(self.receiver_code_index)?;

        if Validator::validate_datetime(datetime)
            && Validator::validate_transmitter_id(transmitter_id)
            && Validator::validate_receiver_id(receiver_id)
        {
            Some(ConsolidatedFields {
                datetime: datetime.to_string(),
                receiver_id: receiver_id.to_string(),
                transmitter_id: transmitter_id.to_string(),
                receiver_code: receiver_code.to_string(),
            })
        } else {
            None
        }
    }
}
