mod codec;
mod error;
mod network;
mod pose;
mod session;
#[cfg(feature = "sim")]
pub mod sim;
mod storage;
mod tracking;

pub use codec::{
    decode_environment, decode_placement, encode_environment, encode_placement,
    CODE_KIND_ENVIRONMENT, CODE_KIND_PLACEMENT, CODE_VERSION,
};
pub use error::{Error, Result};
pub use network::{DeviceNetwork, NodeHandle, NodeStatus, UpdateId};
pub use pose::{Environment, ExtrapolatedState, Placement, Pose, Stability, StabilityStage};
pub use session::{select_idle_node, Session, SessionConfig};
pub use storage::{LocalStorage, Storage};
pub use tracking::{TaskConstructor, TrackingTask};
