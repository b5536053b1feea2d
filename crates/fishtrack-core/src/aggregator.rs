use chrono::Duration;
use fishtrack_parser::Detection;
use tracing::debug;

use crate::model::Interval;

/// How start/stop timestamps are rendered when an interval batch is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    Unix,
    Iso,
}

impl Interval {
    pub fn format_start(&self, format: TimeFormat) -> String {
        format_timestamp(self.start, format)
    }

    pub fn format_stop(&self, format: TimeFormat) -> String {
        format_timestamp(self.stop, format)
    }
}

fn format_timestamp(ts: chrono::NaiveDateTime, format: TimeFormat) -> String {
    match format {
        TimeFormat::Unix => ts.and_utc().timestamp().to_string(),
        TimeFormat::Iso => ts.format("%Y-%m-%dT%H:%M:%S").to_string(),
    }
}

struct Keyed<'a> {
    time_gap_key: u64,
    station_run_key: u64,
    transmitter_id: &'a str,
    station_name: &'a str,
    timestamp: chrono::NaiveDateTime,
}

/// Collapses a sequence of detections into maximal continuous presence
/// intervals, using two independent monotone "run-break" signals: a
/// cross-row time gap and a per-adjacent-row station change.
pub fn aggregate(detections: &[Detection], gap_minutes: i64) -> Vec<Interval> {
    if detections.is_empty() {
        return Vec::new();
    }

    debug!(count = detections.len(), gap_minutes, "aggregator: sorting detections");
    let mut sorted: Vec<&Detection> = detections.iter().collect();
    sorted.sort_by(|a, b| {
        a.transmitter_id
            .cmp(&b.transmitter_id)
            .then(a.timestamp.cmp(&b.timestamp))
    });

    debug!("aggregator: computing run-break keys");
    let threshold = Duration::minutes(gap_minutes);
    let keyed = compute_keys(&sorted, threshold);

    debug!("aggregator: grouping contiguous runs");
    let mut intervals = Vec::new();
    let mut group_start_idx = 0;
    for i in 1..=keyed.len() {
        let boundary = i == keyed.len() || !same_group(&keyed[group_start_idx], &keyed[i]);
        if boundary {
            intervals.push(emit_interval(&keyed[group_start_idx..i]));
            group_start_idx = i;
        }
    }

    debug!(intervals = intervals.len(), "aggregator: done");
    intervals
}

fn compute_keys<'a>(sorted: &[&'a Detection], threshold: Duration) -> Vec<Keyed<'a>> {
    let mut out = Vec::with_capacity(sorted.len());
    let mut time_gap_key = 0u64;
    let mut station_run_key = 0u64;

    for (i, detection) in sorted.iter().enumerate() {
        if i > 0 {
            let prev = sorted[i - 1];
            // equal consecutive timestamps never break a run: the diff is
            // zero, which never meets the >= threshold.
            if detection.timestamp - prev.timestamp >= threshold {
                time_gap_key += 1;
            }
            if detection.station_name != prev.station_name {
                station_run_key += 1;
            }
        }
        out.push(Keyed {
            time_gap_key,
            station_run_key,
            transmitter_id: &detection.transmitter_id,
            station_name: &detection.station_name,
            timestamp: detection.timestamp,
        });
    }
    out
}

fn same_group(a: &Keyed, b: &Keyed) -> bool {
    a.time_gap_key == b.time_gap_key
        && a.station_run_key == b.station_run_key
        && a.transmitter_id == b.transmitter_id
        && a.station_name == b.station_name
}

fn emit_interval(group: &[Keyed]) -> Interval {
    let start = group.iter().map(|k| k.timestamp).min().expect("non-empty group");
    let stop = group.iter().map(|k| k.timestamp).max().expect("non-empty group");
    Interval::new(group[0].transmitter_id, group[0].station_name, start, stop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn detection(ts: &str, transmitter: &str, station: &str) -> Detection {
        Detection {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            transmitter_id: transmitter.to_string(),
            station_name: station.to_string(),
            receiver_id: "VR92S".to_string(),
        }
    }

    /// S1 — time-only aggregation.
    #[test]
    fn s1_time_only_aggregation_gap_30() {
        let detections = vec![
            detection("2015-01-01 10:30:10", "id1", "vr1"),
            detection("2015-01-01 10:50:00", "id1", "vr1"),
            detection("2015-01-01 11:30:00", "id1", "vr1"),
            detection("2015-01-01 10:40:00", "id1", "vr1"),
        ];
        let intervals = aggregate(&detections, 30);
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].format_start(TimeFormat::Unix), "1420108210");
        assert_eq!(intervals[0].format_stop(TimeFormat::Unix), "1420109400");
        assert_eq!(intervals[1].format_start(TimeFormat::Unix), "1420111800");
        assert_eq!(intervals[1].format_stop(TimeFormat::Unix), "1420111800");
    }

    #[test]
    fn s1_time_only_aggregation_gap_10() {
        let detections = vec![
            detection("2015-01-01 10:30:10", "id1", "vr1"),
            detection("2015-01-01 10:50:00", "id1", "vr1"),
            detection("2015-01-01 11:30:00", "id1", "vr1"),
            detection("2015-01-01 10:40:00", "id1", "vr1"),
        ];
        let intervals = aggregate(&detections, 10);
        assert_eq!(intervals.len(), 3);
    }

    /// S2 — station split across two transmitters that share a timestamp.
    #[test]
    fn s2_station_split() {
        let detections = vec![
            detection("2015-01-01 10:30:10", "id1", "vr1"),
            detection("2015-01-01 10:50:00", "id2", "vr1"),
            detection("2015-01-01 10:51:00", "id1", "vr1"),
            detection("2015-01-01 11:30:00", "id1", "vr1"),
            detection("2015-01-01 10:40:00", "id1", "vr2"),
        ];
        let mut intervals = aggregate(&detections, 30);
        intervals.sort_by_key(|iv| iv.start);

        let rendered: Vec<(String, String, String)> = intervals
            .iter()
            .map(|iv| {
                (
                    iv.format_start(TimeFormat::Unix),
                    iv.station_name.clone(),
                    iv.transmitter_id.clone(),
                )
            })
            .collect();

        assert_eq!(
            rendered,
            vec![
                ("1420108210".to_string(), "vr1".to_string(), "id1".to_string()),
                ("1420108800".to_string(), "vr2".to_string(), "id1".to_string()),
                ("1420109400".to_string(), "vr1".to_string(), "id2".to_string()),
                ("1420109460".to_string(), "vr1".to_string(), "id1".to_string()),
                ("1420111800".to_string(), "vr1".to_string(), "id1".to_string()),
            ]
        );
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(aggregate(&[], 30).is_empty());
    }

    #[test]
    fn single_detection_group_has_equal_start_and_stop() {
        let detections = vec![detection("2015-01-01 10:30:10", "id1", "vr1")];
        let intervals = aggregate(&detections, 30);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].start, intervals[0].stop);
    }
}
