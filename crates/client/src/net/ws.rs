//! WebSocket transport. Socket I/O runs on a tokio runtime owned by the
//! connector; frames cross to the game loop over unbounded channels.

use std::sync::Arc;

use coil::{ConnectionState, Connector, Transport, TransportError, TransportEvent};
use futures_util::{SinkExt, StreamExt};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

pub struct WsConnector {
    url: String,
    runtime: Arc<Runtime>,
}

impl WsConnector {
    pub fn new(url: &str) -> Result<Self, TransportError> {
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(TransportError::InvalidEndpoint(url.to_string()));
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("coil-ws")
            .enable_all()
            .build()
            .map_err(|e| TransportError::Io(e.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            runtime: Arc::new(runtime),
        })
    }
}

impl Connector for WsConnector {
    type Transport = WsTransport;

    fn open(&mut self) -> Result<Self::Transport, TransportError> {
        let (outbound_tx, outbound_rx) = unbounded_channel::<String>();
        let (inbound_tx, inbound_rx) = unbounded_channel::<TransportEvent>();

        log::debug!("Opening {}", self.url);
        self.runtime
            .spawn(run_socket(self.url.clone(), outbound_rx, inbound_tx));

        Ok(WsTransport {
            state: ConnectionState::Connecting,
            outbound: Some(outbound_tx),
            inbound: inbound_rx,
        })
    }
}

pub struct WsTransport {
    state: ConnectionState,
    outbound: Option<UnboundedSender<String>>,
    inbound: UnboundedReceiver<TransportEvent>,
}

impl Transport for WsTransport {
    fn state(&self) -> ConnectionState {
        self.state
    }

    fn send(&mut self, frame: String) -> Result<(), TransportError> {
        if self.state != ConnectionState::Open {
            return Err(TransportError::NotOpen);
        }

        let outbound = self.outbound.as_ref().ok_or(TransportError::NotOpen)?;
        outbound
            .send(frame)
            .map_err(|_| TransportError::Io(String::from("socket task has stopped")))
    }

    fn poll(&mut self) -> Option<TransportEvent> {
        if self.state == ConnectionState::Disconnected {
            return None;
        }

        let event = self.inbound.try_recv().ok()?;
        match event {
            TransportEvent::Opened => self.state = ConnectionState::Open,
            TransportEvent::Closed { .. } => {
                self.state = ConnectionState::Disconnected;
                self.outbound = None;
            }
            _ => {}
        }
        Some(event)
    }

    fn close(&mut self) {
        // Dropping the sender tells the socket task to send a close frame and exit.
        self.outbound = None;
        self.state = ConnectionState::Disconnected;
    }
}

async fn run_socket(
    url: String,
    mut outbound: UnboundedReceiver<String>,
    inbound: UnboundedSender<TransportEvent>,
) {
    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            let _ = inbound.send(TransportEvent::Failed(e.to_string()));
            let _ = inbound.send(TransportEvent::Closed { reason: None });
            return;
        }
    };

    log::info!("Connected to {}", url);
    let _ = inbound.send(TransportEvent::Opened);
    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(text) => {
                    if let Err(e) = sink.send(Message::text(text)).await {
                        let _ = inbound.send(TransportEvent::Failed(e.to_string()));
                        let _ = inbound.send(TransportEvent::Closed { reason: None });
                        return;
                    }
                }
                None => {
                    let _ = sink.send(Message::Close(None)).await;
                    log::debug!("Socket task finished after client close");
                    return;
                }
            },
            message = source.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let _ = inbound.send(TransportEvent::Frame(text.as_str().to_owned()));
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame.map(|f| f.reason.as_str().to_owned());
                    let _ = inbound.send(TransportEvent::Closed { reason });
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    let _ = inbound.send(TransportEvent::Failed(e.to_string()));
                    let _ = inbound.send(TransportEvent::Closed { reason: None });
                    return;
                }
                None => {
                    let _ = inbound.send(TransportEvent::Closed { reason: None });
                    return;
                }
            },
        }
    }
}
