use chrono::NaiveDateTime;

/// A maximal contiguous presence of one transmitter at one station, bounded
/// by a time gap or a station change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub transmitter_id: String,
    pub station_name: String,
    pub start: NaiveDateTime,
    pub stop: NaiveDateTime,
}

impl Interval {
    pub fn new(
        transmitter_id: impl Into<String>,
        station_name: impl Into<String>,
        start: NaiveDateTime,
        stop: NaiveDateTime,
    ) -> Self {
        Self {
            transmitter_id: transmitter_id.into(),
            station_name: station_name.into(),
            start,
            stop,
        }
    }
}

/// `start`/`stop` as the unix-seconds string encoding the external engine's
/// range key needs so lexicographic order equals numeric order.
pub fn zero_padded_unix(ts: NaiveDateTime) -> String {
    format!("{:010}", ts.and_utc().timestamp())
}
