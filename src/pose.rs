#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    /// Position in meters.
    pub position: [f32; 3],
    /// Orientation quaternion (x, y, z, w).
    pub rotation: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StabilityStage {
    Initializing = 0,
    Inertial3Dof = 1,
    Blind6Dof = 2,
    Full6Dof = 3,
    Unknown,
}

impl From<u32> for StabilityStage {
    fn from(value: u32) -> Self {
        match value {
            0 => StabilityStage::Initializing,
            1 => StabilityStage::Inertial3Dof,
            2 => StabilityStage::Blind6Dof,
            3 => StabilityStage::Full6Dof,
            _ => StabilityStage::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stability {
    pub stage: StabilityStage,
    pub value: f32,
}

/// Snapshot of a tracking solution, forward-projected by a short horizon to
/// compensate for processing latency. Recomputed on every query.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtrapolatedState {
    pub pose: Pose,
    pub stability: Stability,
    /// Linear velocity in meters per second.
    pub velocity: [f32; 3],
    /// Angular velocity in the node's local frame, radians per second.
    pub local_angular_velocity: [f32; 3],
}

/// Mounting offset of the sensor relative to the tracked object.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub position: [f32; 3],
    /// Quaternion (x, y, z, w).
    pub rotation: [f32; 4],
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Spatial map the tracking task anchors to: the positions of the reference
/// markers in the working volume.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Environment {
    /// Marker positions in meters. Never empty for a decoded environment.
    pub markers: Vec<[f32; 3]>,
}
