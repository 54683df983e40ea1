#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Frame(String),
    /// The channel failed; a `Closed` event follows.
    Failed(String),
    Closed { reason: Option<String> },
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("channel is not open")]
    NotOpen,
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("transport failure: {0}")]
    Io(String),
}

/// A duplex text-frame channel. Implementations must not block.
pub trait Transport {
    fn state(&self) -> ConnectionState;

    fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Next pending event, in arrival order.
    fn poll(&mut self) -> Option<TransportEvent>;

    fn close(&mut self);

    fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }
}

pub trait Connector {
    type Transport: Transport;

    fn open(&mut self) -> Result<Self::Transport, TransportError>;
}
