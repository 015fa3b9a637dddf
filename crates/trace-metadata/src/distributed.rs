use alloc::string::String;

/// The distributed-training role of the reporting process.
///
/// An empty `backend` is the sentinel for "not part of a distributed job";
/// in that case `rank` and `world_size` carry no meaning and any values are
/// accepted. When `backend` is non-empty the role must be consistent, see
/// [`MetadataRecord::build`](crate::MetadataRecord::build).
#[derive(new, Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DistributedRole {
    /// Name of the collective-communication backend in use, e.g. `nccl` or
    /// `gloo`. Empty when the process is not part of a distributed job.
    pub backend: String,
    /// Zero-based index of this process within the collective group.
    /// Conventionally -1 or 0 when not participating.
    pub rank: i32,
    /// Number of processes participating in the collective group.
    #[serde(rename = "worldSize")]
    pub world_size: i32,
}

impl DistributedRole {
    /// The role of a process that is not part of a distributed job.
    pub fn not_distributed() -> Self {
        Self {
            backend: String::new(),
            rank: -1,
            world_size: 0,
        }
    }

    /// Whether this process participates in a distributed job.
    pub fn is_distributed(&self) -> bool {
        !self.backend.is_empty()
    }
}

impl Default for DistributedRole {
    fn default() -> Self {
        Self::not_distributed()
    }
}

impl core::fmt::Display for DistributedRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_distributed() {
            write!(f, "{} rank {}/{}", self.backend, self.rank, self.world_size)
        } else {
            write!(f, "not distributed")
        }
    }
}
