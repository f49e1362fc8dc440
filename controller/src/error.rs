use thiserror::Error;

/// Failures raised while constructing controller inputs.
///
/// The per-frame tick never returns these: missing geometry and ray misses are valid
/// states with defined defaults. Only building meshes, parsing configuration and
/// resolving ids can fail.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("mesh index buffer length {0} is not a multiple of 3")]
    IndexCountNotTriangles(usize),

    #[error("mesh index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("mesh contains non-finite vertex data")]
    NonFiniteVertex,

    #[error("mesh has no non-degenerate triangles")]
    EmptyMesh,

    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("no building loaded")]
    NoBuilding,

    #[error("unknown building `{0}`")]
    UnknownBuilding(String),

    #[error("unknown location `{location}` in building `{building}`")]
    UnknownLocation { building: String, location: String },

    #[error("duplicate id `{id}` in building `{building}`")]
    DuplicateId { building: String, id: String },
}

impl ControllerError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            name,
            reason: reason.into(),
        }
    }
}
