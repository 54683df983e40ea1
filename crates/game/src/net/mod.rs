mod color;
mod loopback;
mod protocol;
mod session;
mod sync;
mod transport;

pub use color::{Hsl, LOCAL_PLAYER_COLOR, Rgb, SnakeColor, base_hsl, player_color, seed_hash};
pub use loopback::{LoopbackConnector, LoopbackServer, LoopbackTransport};
pub use protocol::{
    ClientMessage, Identity, MoveRecord, OpponentMode, ParticipantKind, ProtocolError, RankEntry,
    RoomStatus, RosterEntry, ServerMessage, Snapshot, SnapshotSnake, StartingPlayer,
};
pub use session::{PlayerEntry, RemoteSession, SnakeEntry};
pub use sync::{DeathReason, JoinInfo, NetworkSyncClient, RoundSummary, SyncEvent};
pub use transport::{ConnectionState, Connector, Transport, TransportError, TransportEvent};
