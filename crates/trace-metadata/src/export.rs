use alloc::string::String;
use thiserror::Error;

use crate::record::{MetadataRecord, RecordRepr, ValidationError};

/// An error while exporting or importing a metadata record.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The decoded payload violates a record invariant.
    #[error("invalid metadata payload\nCaused by:\n  {0}")]
    Validation(#[from] ValidationError),

    /// The payload is not well-formed JSON for the metadata mapping.
    #[error("malformed metadata payload\nCaused by:\n  {0}")]
    Json(#[from] serde_json::Error),
}

/// Export a record as the JSON mapping consumed by trace readers.
///
/// Field names and nesting are stable across versions; see
/// [`MetadataRecord`] for the exact shape.
pub fn to_json(record: &MetadataRecord) -> Result<String, MetadataError> {
    Ok(serde_json::to_string(record)?)
}

/// Export a record as an in-memory JSON value, for emitters that merge the
/// mapping into a larger trace payload before writing.
pub fn to_json_value(record: &MetadataRecord) -> Result<serde_json::Value, MetadataError> {
    Ok(serde_json::to_value(record)?)
}

/// Decode a record from its exported JSON mapping.
///
/// Validation runs again on the decoded values, so a malformed payload
/// surfaces as [`MetadataError::Validation`] rather than producing a record
/// that violates the construction invariants.
pub fn from_json(json: &str) -> Result<MetadataRecord, MetadataError> {
    let repr: RecordRepr = serde_json::from_str(json)?;
    Ok(MetadataRecord::build(repr.gpus, repr.distributed)?)
}

/// Decode a record from an in-memory JSON value.
pub fn from_json_value(value: serde_json::Value) -> Result<MetadataRecord, MetadataError> {
    let repr: RecordRepr = serde_json::from_value(value)?;
    Ok(MetadataRecord::build(repr.gpus, repr.distributed)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeviceDescriptor, DistributedRole, MetadataBuilder};
    use alloc::string::ToString;
    use alloc::vec;

    fn example_record() -> MetadataRecord {
        MetadataRecord::build(
            vec![DeviceDescriptor::new(0, "A100".to_string(), 42949672960)],
            DistributedRole::new("nccl".to_string(), 0, 4),
        )
        .unwrap()
    }

    #[test]
    fn export_shape_is_stable() {
        let json = to_json_value(&example_record()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "gpus": [{"id": 0, "name": "A100", "totalMemory": 42949672960u64}],
                "distributed": {"backend": "nccl", "rank": 0, "worldSize": 4},
            })
        );
    }

    #[test]
    fn round_trip_reconstructs_equal_record() {
        let record = example_record();
        let json = to_json(&record).unwrap();

        assert_eq!(from_json(&json).unwrap(), record);
    }

    #[test]
    fn round_trip_of_non_distributed_record() {
        let record = MetadataBuilder::new()
            .device(0, "".to_string(), 0)
            .build()
            .unwrap();
        let json = to_json(&record).unwrap();

        assert_eq!(from_json(&json).unwrap(), record);
    }

    #[test]
    fn import_revalidates_duplicate_ids() {
        let payload = r#"{
            "gpus": [
                {"id": 1, "name": "a", "totalMemory": 0},
                {"id": 1, "name": "b", "totalMemory": 0}
            ],
            "distributed": {"backend": "", "rank": -1, "worldSize": 0}
        }"#;

        assert!(matches!(
            from_json(payload),
            Err(MetadataError::Validation(
                ValidationError::DuplicateDeviceId { id: 1 }
            ))
        ));
    }

    #[test]
    fn import_revalidates_distributed_role() {
        let payload = r#"{
            "gpus": [],
            "distributed": {"backend": "nccl", "rank": 4, "worldSize": 4}
        }"#;

        assert!(matches!(
            from_json(payload),
            Err(MetadataError::Validation(
                ValidationError::InconsistentDistributedRole { .. }
            ))
        ));
    }

    #[test]
    fn import_rejects_malformed_json() {
        assert!(matches!(
            from_json("{\"gpus\":"),
            Err(MetadataError::Json(_))
        ));
    }

    #[test]
    fn deserialize_impl_validates_when_embedded() {
        // Records embedded in a larger payload go through serde directly.
        let payload = serde_json::json!({
            "gpus": [{"id": 0, "name": "a", "totalMemory": 0}],
            "distributed": {"backend": "nccl", "rank": 0, "worldSize": 1},
        });
        let record: MetadataRecord = serde_json::from_value(payload).unwrap();
        assert_eq!(record.num_devices(), 1);

        let bad = serde_json::json!({
            "gpus": [],
            "distributed": {"backend": "nccl", "rank": 0, "worldSize": 0},
        });
        assert!(serde_json::from_value::<MetadataRecord>(bad).is_err());
    }
}
