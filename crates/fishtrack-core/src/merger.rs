use chrono::{Duration, NaiveDateTime};

use crate::model::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Fresh,
    Existing,
}

struct Current {
    origin: Origin,
    interval: Interval,
    merged: bool,
}

#[derive(Debug, Default)]
pub struct MergeResult {
    pub new_elements: Vec<Interval>,
    pub elements_to_delete: Vec<NaiveDateTime>,
}

/// Two intervals are merge-compatible iff they share a station and each
/// one's bridged span reaches into the other.
fn mergeable(a: &Interval, b: &Interval, bridge: Duration) -> bool {
    a.station_name == b.station_name && a.start - bridge <= b.stop && a.stop + bridge >= b.start
}

fn merged_bounds(a: &Interval, b: &Interval) -> (NaiveDateTime, NaiveDateTime) {
    (a.start.min(b.start), a.stop.max(b.stop))
}

/// Fuses a freshly aggregated batch of intervals for one transmitter into
/// the previously persisted intervals for that transmitter, both sorted by
/// `start` ascending. Returns the rows to insert (including merged ones)
/// and the original `start` values of existing rows absorbed into a merge.
///
/// Preserves a known quirk: when a merge step's `next` element comes from
/// `fresh`, the absorbed row's start is taken from `current` even when
/// `current` itself originated from `fresh` (not just from `existing`).
/// This matches the documented scenarios and is not "fixed" here.
pub fn merge_sorted_intervals(
    fresh: &[Interval],
    existing: &[Interval],
    bridge: Duration,
) -> MergeResult {
    if fresh.is_empty() {
        return MergeResult::default();
    }
    if existing.is_empty() {
        return MergeResult {
            new_elements: fresh.to_vec(),
            elements_to_delete: Vec::new(),
        };
    }

    let max_ts = fresh[fresh.len() - 1].stop + bridge;

    let mut i1: i64 = -1;
    let mut i2: i64 = -1;

    let mut current = if fresh[0].start > existing[0].start {
        i2 = 0;
        Current {
            origin: Origin::Existing,
            interval: existing[0].clone(),
            merged: false,
        }
    } else {
        i1 = 0;
        Current {
            origin: Origin::Fresh,
            interval: fresh[0].clone(),
            merged: false,
        }
    };

    let mut new_elements = Vec::new();
    let mut elements_to_delete: Vec<NaiveDateTime> = Vec::new();

    loop {
        if !(current.interval.start < max_ts && i1 < fresh.len() as i64) {
            break;
        }

        let has_fresh_next = i1 < fresh.len() as i64 - 1;
        let has_existing_next = i2 < existing.len() as i64 - 1;

        let next = if has_fresh_next && has_existing_next {
            let fresh_next = &fresh[(i1 + 1) as usize];
            let existing_next = &existing[(i2 + 1) as usize];
            if fresh_next.start < existing_next.start {
                i1 += 1;
                Current {
                    origin: Origin::Fresh,
                    interval: fresh[i1 as usize].clone(),
                    merged: false,
                }
            } else {
                i2 += 1;
                Current {
                    origin: Origin::Existing,
                    interval: existing[i2 as usize].clone(),
                    merged: false,
                }
            }
        } else if has_existing_next {
            i2 += 1;
            Current {
                origin: Origin::Existing,
                interval: existing[i2 as usize].clone(),
                merged: false,
            }
        } else if has_fresh_next {
            i1 += 1;
            Current {
                origin: Origin::Fresh,
                interval: fresh[i1 as usize].clone(),
                merged: false,
            }
        } else {
            if current.merged || current.origin == Origin::Fresh {
                new_elements.push(current.interval);
            }
            break;
        };

        if mergeable(&current.interval, &next.interval, bridge) {
            let remove_start = if next.origin == Origin::Existing {
                next.interval.start
            } else {
                current.interval.start
            };
            let (start, stop) = merged_bounds(&current.interval, &next.interval);

            let mut merged_next = next;
            merged_next.interval.start = start;
            merged_next.interval.stop = stop;
            merged_next.merged = true;
            merged_next.origin = Origin::Fresh;

            if !elements_to_delete.contains(&remove_start) {
                elements_to_delete.push(remove_start);
            }
            current = merged_next;
        } else {
            if current.origin == Origin::Fresh {
                new_elements.push(current.interval.clone());
            }
            current = next;
        }
    }

    MergeResult {
        new_elements,
        elements_to_delete,
    }
}
