//! In-process transport for running the client without a socket.
//!
//! [`LoopbackConnector`] hands out transports that share one link with a
//! [`LoopbackServer`] handle. The handle scripts what the "server" sends and
//! records what the client wrote.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::transport::{ConnectionState, Connector, Transport, TransportError, TransportEvent};

#[derive(Debug)]
struct Link {
    state: ConnectionState,
    inbound: VecDeque<TransportEvent>,
    sent: Vec<String>,
    opened: u32,
    closed_by_client: bool,
    refuse_next: bool,
    auto_accept: bool,
}

impl Default for Link {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            inbound: VecDeque::new(),
            sent: Vec::new(),
            opened: 0,
            closed_by_client: false,
            refuse_next: false,
            auto_accept: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoopbackServer {
    link: Rc<RefCell<Link>>,
}

impl LoopbackServer {
    pub fn push(&self, frame: impl Into<String>) {
        self.link
            .borrow_mut()
            .inbound
            .push_back(TransportEvent::Frame(frame.into()));
    }

    pub fn push_json(&self, value: serde_json::Value) {
        self.push(value.to_string());
    }

    /// Completes a pending handshake when auto-accept is off.
    pub fn accept(&self) {
        self.link
            .borrow_mut()
            .inbound
            .push_back(TransportEvent::Opened);
    }

    pub fn hang_up(&self, reason: &str) {
        self.link.borrow_mut().inbound.push_back(TransportEvent::Closed {
            reason: Some(reason.to_string()),
        });
    }

    pub fn fail(&self, message: &str) {
        let mut link = self.link.borrow_mut();
        link.inbound
            .push_back(TransportEvent::Failed(message.to_string()));
        link.inbound.push_back(TransportEvent::Closed { reason: None });
    }

    pub fn refuse_next(&self) {
        self.link.borrow_mut().refuse_next = true;
    }

    pub fn set_auto_accept(&self, auto_accept: bool) {
        self.link.borrow_mut().auto_accept = auto_accept;
    }

    pub fn sent(&self) -> Vec<String> {
        self.link.borrow().sent.clone()
    }

    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.link
            .borrow()
            .sent
            .iter()
            .filter_map(|frame| serde_json::from_str(frame).ok())
            .collect()
    }

    pub fn take_sent(&self) -> Vec<String> {
        std::mem::take(&mut self.link.borrow_mut().sent)
    }

    pub fn connections_opened(&self) -> u32 {
        self.link.borrow().opened
    }

    pub fn closed_by_client(&self) -> bool {
        self.link.borrow().closed_by_client
    }

    pub fn state(&self) -> ConnectionState {
        self.link.borrow().state
    }
}

#[derive(Debug, Default)]
pub struct LoopbackConnector {
    server: LoopbackServer,
}

impl LoopbackConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server(&self) -> LoopbackServer {
        self.server.clone()
    }
}

impl Connector for LoopbackConnector {
    type Transport = LoopbackTransport;

    fn open(&mut self) -> Result<Self::Transport, TransportError> {
        let mut link = self.server.link.borrow_mut();
        if std::mem::take(&mut link.refuse_next) {
            return Err(TransportError::Io(String::from("connection refused")));
        }

        link.opened += 1;
        link.state = ConnectionState::Connecting;
        link.closed_by_client = false;
        link.inbound.clear();
        if link.auto_accept {
            link.inbound.push_back(TransportEvent::Opened);
        }

        Ok(LoopbackTransport {
            link: Rc::clone(&self.server.link),
            generation: link.opened,
        })
    }
}

#[derive(Debug)]
pub struct LoopbackTransport {
    link: Rc<RefCell<Link>>,
    generation: u32,
}

impl LoopbackTransport {
    fn is_current(&self) -> bool {
        self.link.borrow().opened == self.generation
    }
}

impl Transport for LoopbackTransport {
    fn state(&self) -> ConnectionState {
        if self.is_current() {
            self.link.borrow().state
        } else {
            ConnectionState::Disconnected
        }
    }

    fn send(&mut self, frame: String) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::NotOpen);
        }
        self.link.borrow_mut().sent.push(frame);
        Ok(())
    }

    fn poll(&mut self) -> Option<TransportEvent> {
        if !self.is_current() {
            return None;
        }

        let mut link = self.link.borrow_mut();
        if link.state == ConnectionState::Disconnected {
            return None;
        }

        let event = link.inbound.pop_front()?;
        match event {
            TransportEvent::Opened => link.state = ConnectionState::Open,
            TransportEvent::Closed { .. } => link.state = ConnectionState::Disconnected,
            _ => {}
        }
        Some(event)
    }

    fn close(&mut self) {
        if !self.is_current() {
            return;
        }

        let mut link = self.link.borrow_mut();
        if link.state != ConnectionState::Disconnected {
            link.closed_by_client = true;
        }
        link.state = ConnectionState::Disconnected;
        link.inbound.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_first_poll() {
        let mut connector = LoopbackConnector::new();
        let server = connector.server();
        let mut transport = connector.open().unwrap();

        assert_eq!(transport.state(), ConnectionState::Connecting);
        assert!(transport.send(String::from("early")).is_err());

        assert_eq!(transport.poll(), Some(TransportEvent::Opened));
        assert!(transport.is_open());

        transport.send(String::from("hello")).unwrap();
        assert_eq!(server.sent(), vec![String::from("hello")]);
    }

    #[test]
    fn refused_connection() {
        let mut connector = LoopbackConnector::new();
        connector.server().refuse_next();

        assert!(connector.open().is_err());
        assert!(connector.open().is_ok());
    }

    #[test]
    fn stale_transport_goes_quiet() {
        let mut connector = LoopbackConnector::new();
        let server = connector.server();
        let mut first = connector.open().unwrap();
        let mut second = connector.open().unwrap();

        server.push("frame");
        assert_eq!(first.poll(), None);
        assert_eq!(first.state(), ConnectionState::Disconnected);
        assert_eq!(second.poll(), Some(TransportEvent::Opened));
        assert_eq!(second.poll(), Some(TransportEvent::Frame(String::from("frame"))));
    }

    #[test]
    fn close_marks_client_side_close() {
        let mut connector = LoopbackConnector::new();
        let server = connector.server();
        let mut transport = connector.open().unwrap();
        transport.poll();

        transport.close();
        assert!(server.closed_by_client());
        assert_eq!(transport.poll(), None);
    }
}
