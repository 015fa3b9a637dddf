use alloc::string::String;

/// Identity of a single accelerator device as reported by the discovery
/// layer.
///
/// The discovery layer enumerates devices in driver order; descriptors are
/// kept in that order inside a [record](crate::MetadataRecord). The `id` is
/// the driver-assigned device index and must be unique within a record, but
/// ids are not required to be contiguous (devices can be masked out).
#[derive(new, Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceDescriptor {
    /// Driver-assigned device index.
    pub id: u32,
    /// Human-readable device name. May be empty when the driver does not
    /// report one, never absent.
    pub name: String,
    /// Total device memory in bytes. 0 means unknown/unreported and is a
    /// valid value, not an error.
    #[serde(rename = "totalMemory")]
    pub total_memory: u64,
}

impl core::fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "device {} \"{}\" {}B", self.id, self.name, self.total_memory)
    }
}
