pub mod config;
pub mod grid;
pub mod local;
pub mod net;
pub mod session;

pub use config::{LocalConfig, SessionConfig, SyncConfig};
pub use grid::{Direction, GridSize, Position};
pub use local::{ItemKind, LocalEngine, LocalState, LocalStatus, StepOutcome};
pub use net::{
    ConnectionState, Connector, DeathReason, Identity, NetworkSyncClient, OpponentMode,
    RemoteSession, SyncEvent, Transport, TransportError, TransportEvent,
};
pub use session::{
    Board, ControllerInput, SessionController, SessionMode, SessionView, Severity, Toast,
};
