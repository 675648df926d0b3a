use std::fmt;

/// Network change counter. Increments (and may eventually wrap) every time a
/// node attaches or detaches, or a task starts or stops on any node. Equal
/// values across two polls mean nothing changed in between.
pub type UpdateId = u32;

/// Opaque identifier of a physical node within a device network. Only valid
/// while the network that produced it is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(u32);

impl NodeHandle {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn into_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Idle,
    Busy,
    /// The node has left the network; its handle is stale.
    Invalid,
}

/// A live device network session. Constructing one is backend-specific; this
/// trait covers everything the session loop needs from it afterwards.
pub trait DeviceNetwork {
    /// False once the underlying network has been destroyed. Handles derived
    /// from a dead network must not be used.
    fn is_alive(&self) -> bool;

    fn update_id(&self) -> UpdateId;

    fn node_status(&self, node: NodeHandle) -> NodeStatus;
}
