use chrono::NaiveDateTime;

/// A single receiver hearing of a transmitter at an instant, already
/// normalised out of whichever tabular layout it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub timestamp: NaiveDateTime,
    pub transmitter_id: String,
    pub station_name: String,
    pub receiver_id: String,
}
