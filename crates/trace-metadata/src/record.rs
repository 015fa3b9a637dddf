use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashSet;
use thiserror::Error;

use crate::device::DeviceDescriptor;
use crate::distributed::DistributedRole;

/// The record is structurally malformed and must not be emitted.
///
/// Raised synchronously by [`MetadataRecord::build`]; no partial record is
/// ever returned and there is no auto-repair. Callers decide whether to
/// abort the reporting cycle or substitute an empty record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Two devices in the sequence share the same id.
    #[error("duplicate device id {id} in metadata record")]
    DuplicateDeviceId {
        /// The id that appeared more than once.
        id: u32,
    },

    /// A non-empty backend was reported together with a world size below 1
    /// or a rank outside `0..world_size`.
    #[error(
        "inconsistent distributed role for backend \"{backend}\": rank {rank}, world size {world_size}"
    )]
    InconsistentDistributedRole {
        /// The reported backend name.
        backend: String,
        /// The reported rank.
        rank: i32,
        /// The reported world size.
        world_size: i32,
    },
}

/// Aggregate of per-device identity and the distributed role of the
/// reporting process, assembled once per reporting cycle and handed to a
/// trace emitter.
///
/// A record is immutable after construction: fields are private and only
/// read-only accessors are exposed, so sharing a reference across threads
/// after construction needs no locking. Construction validates shape, see
/// [`MetadataRecord::build`].
///
/// Serialization produces the stable mapping consumed by trace readers:
///
/// ```json
/// {"gpus": [{"id": 0, "name": "A100", "totalMemory": 42949672960}],
///  "distributed": {"backend": "nccl", "rank": 0, "worldSize": 4}}
/// ```
///
/// Deserialization re-runs the same validation, so a decoded record always
/// upholds the construction invariants.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MetadataRecord {
    #[serde(rename = "gpus")]
    devices: Vec<DeviceDescriptor>,
    distributed: DistributedRole,
}

/// Unvalidated wire shape of a [`MetadataRecord`].
#[derive(serde::Deserialize)]
pub(crate) struct RecordRepr {
    pub(crate) gpus: Vec<DeviceDescriptor>,
    pub(crate) distributed: DistributedRole,
}

impl MetadataRecord {
    /// Assemble a record from already-discovered values.
    ///
    /// Device order is preserved exactly as given. Fails when a device id
    /// appears twice, or when `distributed` names a backend but its rank is
    /// outside `0..world_size` (a role with an empty backend is always
    /// accepted, whatever its rank and world size).
    pub fn build(
        devices: Vec<DeviceDescriptor>,
        distributed: DistributedRole,
    ) -> Result<Self, ValidationError> {
        if let Err(err) = validate(&devices, &distributed) {
            log::warn!("rejecting metadata record: {err}");
            return Err(err);
        }

        log::debug!(
            "assembled metadata record with {} device(s), {}",
            devices.len(),
            distributed
        );

        Ok(Self {
            devices,
            distributed,
        })
    }

    /// The devices of this record, in discovery order.
    pub fn devices(&self) -> &[DeviceDescriptor] {
        &self.devices
    }

    /// The device with the given id, if present.
    pub fn device(&self, id: u32) -> Option<&DeviceDescriptor> {
        self.devices.iter().find(|device| device.id == id)
    }

    /// Number of devices in this record.
    pub fn num_devices(&self) -> usize {
        self.devices.len()
    }

    /// The distributed role of the reporting process.
    pub fn distributed(&self) -> &DistributedRole {
        &self.distributed
    }
}

impl<'de> serde::Deserialize<'de> for MetadataRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let repr = RecordRepr::deserialize(deserializer)?;
        MetadataRecord::build(repr.gpus, repr.distributed).map_err(serde::de::Error::custom)
    }
}

fn validate(
    devices: &[DeviceDescriptor],
    distributed: &DistributedRole,
) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(devices.len());
    for device in devices {
        if !seen.insert(device.id) {
            return Err(ValidationError::DuplicateDeviceId { id: device.id });
        }
    }

    if distributed.is_distributed() {
        let in_range =
            distributed.world_size >= 1 && (0..distributed.world_size).contains(&distributed.rank);
        if !in_range {
            return Err(ValidationError::InconsistentDistributedRole {
                backend: distributed.backend.clone(),
                rank: distributed.rank,
                world_size: distributed.world_size,
            });
        }
    }

    Ok(())
}

/// Incremental construction of a [`MetadataRecord`], one device at a time.
///
/// Matches the call pattern of discovery code that enumerates devices in a
/// loop before asking the distributed runtime for its role. [`build`]
/// performs the same validation as [`MetadataRecord::build`]; no partially
/// built record escapes.
///
/// [`build`]: MetadataBuilder::build
#[derive(Debug, Default)]
pub struct MetadataBuilder {
    devices: Vec<DeviceDescriptor>,
    distributed: DistributedRole,
}

impl MetadataBuilder {
    /// Start a builder with no devices and a non-distributed role.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a device descriptor.
    pub fn device(mut self, id: u32, name: String, total_memory: u64) -> Self {
        self.push_device(DeviceDescriptor::new(id, name, total_memory));
        self
    }

    /// Append an already constructed device descriptor.
    pub fn push_device(&mut self, device: DeviceDescriptor) {
        self.devices.push(device);
    }

    /// Set the distributed role of the reporting process.
    pub fn distributed(mut self, distributed: DistributedRole) -> Self {
        self.distributed = distributed;
        self
    }

    /// Validate and produce the record.
    pub fn build(self) -> Result<MetadataRecord, ValidationError> {
        MetadataRecord::build(self.devices, self.distributed)
    }
}
