use std::collections::HashMap;
use std::path::Path;

use crate::errors::ParserError;

/// An external translation table from legacy station names or receiver
/// identifiers to canonical station names. Loaded once per run and treated
/// as immutable afterward.
pub struct StationMapping {
    by_old_name: HashMap<String, String>,
    by_receiver_id: HashMap<String, String>,
}

impl StationMapping {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParserError> {
        let reader =
            csv::Reader::from_path(path.as_ref()).map_err(|e| ParserError::BadStationMapping {
                message: e.to_string(),
            })?;
        Self::from_reader(reader)
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self, ParserError> {
        let headers = reader
            .headers()
            .map_err(|e| ParserError::BadStationMapping {
                message: e.to_string(),
            })?
            .clone();
        let old_name_pos = headers.iter().position(|h| h == "old_name").ok_or_else(|| {
            ParserError::BadStationMapping {
                message: "missing 'old_name' column".to_string(),
            }
        })?;
        let new_name_pos = headers.iter().position(|h| h == "new_name").ok_or_else(|| {
            ParserError::BadStationMapping {
                message: "missing 'new_name' column".to_string(),
            }
        })?;
        let receiver_id_pos = headers
            .iter()
            .position(|h| h == "receiver_id")
            .ok_or_else(|| ParserError::BadStationMapping {
                message: "missing 'receiver_id' column".to_string(),
            })?;

        let mut by_old_name = HashMap::new();
        let mut by_receiver_id = HashMap::new();

        for record in reader.records() {
            let record = record.map_err(|e| ParserError::BadStationMapping {
                message: e.to_string(),
            })?;
            let new_name = record.get(new_name_pos).unwrap_or_default().trim().to_string();
            let receiver_id = record.get(receiver_id_pos).unwrap_or_default().trim().to_string();
            let old_name_raw = record.get(old_name_pos).unwrap_or_default().trim();
            // a null old_name is back-filled from this row's receiver_id
            let old_name = if old_name_raw.is_empty() {
                receiver_id.clone()
            } else {
                old_name_raw.to_string()
            };

            by_old_name.insert(old_name, new_name.clone());
            by_receiver_id.insert(receiver_id, new_name);
        }

        Ok(Self {
            by_old_name,
            by_receiver_id,
        })
    }

    /// Applies the two-pass reconciliation: first a match on `old_name`,
    /// then on `receiver_id`, each using the current value as the key.
    pub fn reconcile(&self, station_name: &str, receiver_id: &str) -> String {
        let seed = if station_name.trim().is_empty() {
            receiver_id.to_string()
        } else {
            station_name.to_string()
        };

        let after_old_name = self
            .by_old_name
            .get(seed.trim())
            .cloned()
            .unwrap_or(seed);

        self.by_receiver_id
            .get(after_old_name.trim())
            .cloned()
            .unwrap_or(after_old_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(csv: &str) -> StationMapping {
        let reader = csv::Reader::from_reader(csv.as_bytes());
        StationMapping::from_reader(reader).expect("mapping should load")
    }

    #[test]
    fn reconciles_by_old_name_then_receiver_id() {
        let mapping = load(
            "old_name,new_name,receiver_id\n\
             legacy-1,canon-1,VR92S\n\
             ,canon-2,VR93S\n",
        );
        assert_eq!(mapping.reconcile("legacy-1", "VR92S"), "canon-1");
        // empty old_name is back-filled from receiver_id, then matched by the receiver_id pass
        assert_eq!(mapping.reconcile("", "VR93S"), "canon-2");
        assert_eq!(mapping.reconcile("unmapped-9", "VR00Z"), "unmapped-9");
    }

    #[test]
    fn trims_whitespace_before_matching() {
        let mapping = load("old_name,new_name,receiver_id\n legacy-1 , canon-1 ,VR92S\n");
        assert_eq!(mapping.reconcile(" legacy-1 ", "VR92S"), "canon-1");
    }
}
