use std::time::Instant;

use super::mode::SessionMode;
use super::toast::{Severity, Toast, ranking_message};
use crate::config::SessionConfig;
use crate::grid::{Direction, GridSize};
use crate::local::{LocalEngine, LocalState, LocalStatus, StepOutcome};
use crate::net::{
    Connector, Identity, JoinInfo, NetworkSyncClient, RemoteSession, RoomStatus, SyncEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerInput {
    Direction(Direction),
    /// Leave local play and start the join countdown.
    RequestOnline,
    /// Skip the rest of the countdown.
    ConnectNow,
    StayOnline,
    PlayLocal,
    RestartLocal,
}

/// What the renderer should draw underneath the overlays.
#[derive(Debug, Clone, Copy)]
pub enum Board<'a> {
    Local(&'a LocalState),
    Online(&'a RemoteSession),
    Empty,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub mode: SessionMode,
    pub countdown: u32,
    pub frame: u64,
    pub toast: Option<&'a Toast>,
    pub show_mode_menu: bool,
    pub board: Board<'a>,
    pub grid: GridSize,
}

pub struct SessionController<C: Connector> {
    config: SessionConfig,
    identity: Identity,
    mode: SessionMode,
    local: LocalEngine,
    network: NetworkSyncClient<C>,
    countdown: u32,
    next_countdown_tick: Option<Instant>,
    menu_reveal_at: Option<Instant>,
    show_mode_menu: bool,
    toast: Option<Toast>,
    suppress_close: bool,
    frame: u64,
}

impl<C: Connector> SessionController<C> {
    pub fn new(connector: C, identity: Identity, config: SessionConfig) -> Self {
        let local = LocalEngine::new(&config.local);
        Self::with_engine(connector, identity, config, local)
    }

    pub fn with_seed(connector: C, identity: Identity, config: SessionConfig, seed: u64) -> Self {
        let local = LocalEngine::with_seed(&config.local, seed);
        Self::with_engine(connector, identity, config, local)
    }

    fn with_engine(
        connector: C,
        identity: Identity,
        config: SessionConfig,
        local: LocalEngine,
    ) -> Self {
        let network = NetworkSyncClient::new(connector, config.sync.clone());
        Self {
            countdown: config.countdown_secs,
            config,
            identity,
            mode: SessionMode::Local,
            local,
            network,
            next_countdown_tick: None,
            menu_reveal_at: None,
            show_mode_menu: false,
            toast: None,
            suppress_close: false,
            frame: 0,
        }
    }

    pub fn handle_input(&mut self, input: ControllerInput, now: Instant) {
        match (input, self.mode) {
            (ControllerInput::Direction(direction), _) => self.route_direction(direction),
            (ControllerInput::RequestOnline, SessionMode::Local) => self.start_countdown(now),
            (ControllerInput::ConnectNow, SessionMode::Connecting) => self.go_online(now),
            (ControllerInput::StayOnline, SessionMode::Finished) => self.stay_online(now),
            (ControllerInput::PlayLocal, SessionMode::Finished) => self.play_local(),
            (ControllerInput::RestartLocal, SessionMode::Local) => {
                if self.local.state().status == LocalStatus::GameOver {
                    log::info!("Restarting local game");
                    self.local.reset();
                }
            }
            (input, mode) => log::trace!("Ignoring {:?} while {}", input, mode.as_str()),
        }
    }

    /// Fires due timers and applies pending network traffic.
    pub fn update(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
        }

        while let Some(deadline) = self.next_countdown_tick {
            if now < deadline {
                break;
            }

            self.countdown = self.countdown.saturating_sub(1);
            if self.countdown == 0 {
                self.go_online(now);
                break;
            }
            self.next_countdown_tick = Some(deadline + self.config.countdown_interval);
        }

        if self.menu_reveal_at.is_some_and(|at| now >= at) {
            self.menu_reveal_at = None;
            self.show_mode_menu = true;
        }

        for event in self.network.poll(self.mode) {
            self.dispatch(event, now);
        }
    }

    /// Advances the local simulation by one tick when it owns the screen.
    pub fn step(&mut self) -> Option<StepOutcome> {
        self.frame = self.frame.wrapping_add(1);
        match self.mode {
            SessionMode::Local | SessionMode::Connecting => Some(self.local.step(self.mode)),
            SessionMode::Online | SessionMode::Finished => None,
        }
    }

    pub fn view(&self) -> SessionView<'_> {
        let (board, grid) = match self.mode {
            SessionMode::Local | SessionMode::Connecting => {
                (Board::Local(self.local.state()), self.local.grid())
            }
            SessionMode::Online => {
                let session = self.network.session();
                (Board::Online(session), session.map_size)
            }
            SessionMode::Finished => (Board::Empty, self.network.session().map_size),
        };

        SessionView {
            mode: self.mode,
            countdown: self.countdown,
            frame: self.frame,
            toast: self.toast.as_ref(),
            show_mode_menu: self.show_mode_menu,
            board,
            grid,
        }
    }

    /// Drops the connection and every pending timer.
    pub fn shutdown(&mut self) {
        self.toast = None;
        self.disconnect();
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    pub fn show_mode_menu(&self) -> bool {
        self.show_mode_menu
    }

    pub fn local(&self) -> &LocalEngine {
        &self.local
    }

    pub fn network(&self) -> &NetworkSyncClient<C> {
        &self.network
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    fn route_direction(&mut self, direction: Direction) {
        match self.mode {
            SessionMode::Local | SessionMode::Connecting => {
                if direction != self.local.state().direction.opposite() {
                    self.local.set_next_direction(direction);
                }
            }
            SessionMode::Online => self.network.send_input(direction),
            SessionMode::Finished => {}
        }
    }

    fn start_countdown(&mut self, now: Instant) {
        self.toast = None;
        self.mode = SessionMode::Connecting;
        self.countdown = self.config.countdown_secs;
        self.local.resume();
        log::info!("Joining {} in {}s", self.identity.room_id(), self.countdown);

        if self.countdown == 0 {
            self.go_online(now);
        } else {
            self.next_countdown_tick = Some(now + self.config.countdown_interval);
        }
    }

    fn go_online(&mut self, now: Instant) {
        self.next_countdown_tick = None;
        self.countdown = 0;
        self.suppress_close = false;
        self.toast = None;
        self.local.park();
        self.mode = SessionMode::Online;

        if let Err(e) = self.network.connect(&self.identity) {
            log::error!("Failed to connect: {}", e);
            self.on_error("CONNECT_FAILED", now);
        }
    }

    fn stay_online(&mut self, now: Instant) {
        self.toast = None;
        self.disconnect();
        self.show_mode_menu = false;
        self.start_countdown(now);
    }

    fn play_local(&mut self) {
        self.show_mode_menu = false;
        self.toast = None;
        self.disconnect();
        self.mode = SessionMode::Local;
        self.local.reset();
        log::info!("Back to local play");
    }

    /// Tears down the connection without reporting it as a drop.
    fn disconnect(&mut self) {
        self.next_countdown_tick = None;
        self.menu_reveal_at = None;
        self.suppress_close = true;
        if self.network.disconnect() {
            self.on_closed();
        }
    }

    fn dispatch(&mut self, event: SyncEvent, now: Instant) {
        match event {
            SyncEvent::JoinOk(info) => self.on_join(&info, now),
            SyncEvent::GameStart => self.show_mode_menu = false,
            SyncEvent::PlayerDied { name, reason } => {
                self.show_toast(
                    format!("💀 {} {}", name, reason.describe()),
                    Severity::Danger,
                    now,
                );
            }
            SyncEvent::AiDemoStart => {
                self.show_toast(
                    "Every player is out, an AI vs AI demo match follows",
                    Severity::Warning,
                    now,
                );
            }
            SyncEvent::GameOver(summary) => {
                if let Some(message) = ranking_message(&summary.ranks, self.network.session()) {
                    self.show_toast(message, Severity::Warning, now);
                }
                self.mode = SessionMode::Finished;
                self.menu_reveal_at = Some(now + self.config.menu_reveal_delay);
                log::info!("Round finished");
            }
            SyncEvent::Error(code) => self.on_error(&code, now),
            SyncEvent::Closed => {
                let dropped = self.on_closed();
                if dropped {
                    self.show_toast("Disconnected from server", Severity::Warning, now);
                }
            }
        }
    }

    fn on_join(&mut self, info: &JoinInfo, now: Instant) {
        self.mode = SessionMode::Online;
        self.local.park();

        match info.status {
            RoomStatus::Waiting => self.show_toast(
                "Joined the room, the round starts in about 5 seconds",
                Severity::Warning,
                now,
            ),
            RoomStatus::Running => self.show_toast(
                "Round in progress, joined the current match",
                Severity::Warning,
                now,
            ),
            RoomStatus::Idle | RoomStatus::Finished => {}
        }
    }

    fn on_error(&mut self, code: &str, now: Instant) {
        log::warn!("Session error {}", code);
        match code {
            "ROOM_FULL" => self.show_toast(
                "The room is full, pick another room",
                Severity::Warning,
                now,
            ),
            "ROOM_NOT_FOUND" => self.show_toast("That room does not exist", Severity::Danger, now),
            code => self.show_toast(format!("Connection error ({code})"), Severity::Danger, now),
        }

        self.mode = SessionMode::Finished;
        self.menu_reveal_at = None;
        self.show_mode_menu = true;
    }

    /// Returns true when the close was unexpected and ended the session.
    fn on_closed(&mut self) -> bool {
        if std::mem::take(&mut self.suppress_close) {
            log::debug!("Swallowed close of our own disconnect");
            return false;
        }

        if !self.mode.is_networked() {
            return false;
        }

        log::warn!("Connection lost while {}", self.mode.as_str());
        self.mode = SessionMode::Finished;
        self.menu_reveal_at = None;
        self.show_mode_menu = true;
        true
    }

    fn show_toast(&mut self, message: impl Into<String>, severity: Severity, now: Instant) {
        self.toast = Some(Toast::new(
            message,
            severity,
            now,
            self.config.toast_duration,
        ));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::net::{LoopbackConnector, LoopbackServer, OpponentMode};

    fn controller() -> (SessionController<LoopbackConnector>, LoopbackServer) {
        let connector = LoopbackConnector::new();
        let server = connector.server();
        let identity = Identity {
            name: String::from("me"),
            room: 2,
            mode: OpponentMode::Neat,
        };
        let controller =
            SessionController::with_seed(connector, identity, SessionConfig::default(), 7);
        (controller, server)
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn starts_local() {
        let (controller, _server) = controller();
        let view = controller.view();

        assert_eq!(view.mode, SessionMode::Local);
        assert!(matches!(view.board, Board::Local(_)));
        assert!(!view.show_mode_menu);
        assert!(view.toast.is_none());
    }

    #[test]
    fn reverse_direction_is_rejected_locally() {
        let (mut controller, _server) = controller();
        let now = Instant::now();

        controller.handle_input(ControllerInput::Direction(Direction::Down), now);
        assert_eq!(controller.local().state().next_direction, Direction::Up);

        controller.handle_input(ControllerInput::Direction(Direction::Left), now);
        assert_eq!(controller.local().state().next_direction, Direction::Left);
    }

    #[test]
    fn countdown_runs_down_to_connect() {
        let (mut controller, server) = controller();
        let start = Instant::now();
        controller.handle_input(ControllerInput::RequestOnline, start);

        assert_eq!(controller.mode(), SessionMode::Connecting);
        assert_eq!(controller.countdown(), 20);
        assert!(matches!(
            controller.step(),
            Some(StepOutcome::Moved | StepOutcome::Grew)
        ));

        controller.update(start + secs(5));
        assert_eq!(controller.countdown(), 15);
        assert_eq!(server.connections_opened(), 0);

        controller.update(start + secs(20));
        assert_eq!(controller.mode(), SessionMode::Online);
        assert_eq!(controller.countdown(), 0);
        assert_eq!(server.connections_opened(), 1);
        assert_eq!(controller.local().state().status, LocalStatus::Idle);
    }

    #[test]
    fn connect_now_skips_countdown() {
        let (mut controller, server) = controller();
        let now = Instant::now();
        controller.handle_input(ControllerInput::RequestOnline, now);
        controller.handle_input(ControllerInput::ConnectNow, now + secs(2));

        assert_eq!(controller.mode(), SessionMode::Online);
        assert_eq!(controller.countdown(), 0);

        controller.update(now + secs(3));
        assert_eq!(server.sent_json()[0]["mode"], "NEAT");
        assert_eq!(server.sent_json()[0]["room_id"], "room-2");

        controller.update(now + secs(40));
        assert_eq!(server.connections_opened(), 1);
    }

    #[test]
    fn refused_connection_finishes_with_error() {
        let (mut controller, server) = controller();
        let now = Instant::now();
        server.refuse_next();
        controller.handle_input(ControllerInput::RequestOnline, now);
        controller.handle_input(ControllerInput::ConnectNow, now);

        assert_eq!(controller.mode(), SessionMode::Finished);
        assert!(controller.show_mode_menu());
        let toast = controller.toast().unwrap();
        assert_eq!(toast.message, "Connection error (CONNECT_FAILED)");
        assert_eq!(toast.severity, Severity::Danger);
    }

    #[test]
    fn room_full_is_a_warning() {
        let (mut controller, server) = controller();
        let now = Instant::now();
        controller.handle_input(ControllerInput::RequestOnline, now);
        controller.handle_input(ControllerInput::ConnectNow, now);
        controller.update(now);

        server.push_json(json!({"t": "err", "code": "ROOM_FULL"}));
        controller.update(now + secs(1));

        assert_eq!(controller.mode(), SessionMode::Finished);
        assert!(controller.show_mode_menu());
        let toast = controller.toast().unwrap();
        assert_eq!(toast.severity, Severity::Warning);
        assert!(toast.message.contains("full"));
    }

    #[test]
    fn toast_expires() {
        let (mut controller, server) = controller();
        let now = Instant::now();
        controller.handle_input(ControllerInput::RequestOnline, now);
        controller.handle_input(ControllerInput::ConnectNow, now);
        server.push_json(json!({
            "t": "join_ok", "your_id": "me", "room_id": "room-2", "status": "WAITING"
        }));
        controller.update(now);

        assert!(controller.toast().is_some());
        controller.update(now + secs(2));
        assert!(controller.toast().is_some());
        controller.update(now + secs(3));
        assert!(controller.toast().is_none());
    }

    #[test]
    fn restart_only_after_game_over() {
        let (mut controller, _server) = controller();
        let now = Instant::now();
        controller.handle_input(ControllerInput::Direction(Direction::Left), now);
        controller.step();
        let head = controller.local().state().head();

        controller.handle_input(ControllerInput::RestartLocal, now);
        assert_eq!(controller.local().state().head(), head);

        while controller.local().state().status != LocalStatus::GameOver {
            controller.step();
        }
        controller.handle_input(ControllerInput::RestartLocal, now);
        assert_eq!(controller.local().state().status, LocalStatus::Playing);
        assert_eq!(controller.local().state().score, 0);
    }

    #[test]
    fn frame_counter_advances_in_every_mode() {
        let (mut controller, _server) = controller();
        let now = Instant::now();
        controller.step();
        controller.handle_input(ControllerInput::RequestOnline, now);
        controller.handle_input(ControllerInput::ConnectNow, now);
        assert_eq!(controller.step(), None);
        assert_eq!(controller.view().frame, 2);
    }

    #[test]
    fn shutdown_leaves_quietly() {
        let (mut controller, server) = controller();
        let now = Instant::now();
        controller.handle_input(ControllerInput::RequestOnline, now);
        controller.handle_input(ControllerInput::ConnectNow, now);
        controller.update(now);

        controller.shutdown();
        assert!(server.closed_by_client());
        assert_eq!(server.sent_json().last().unwrap()["t"], "exit");
        assert!(controller.toast().is_none());
    }

    #[test]
    fn shutdown_while_online_stays_quiet() {
        let (mut controller, server) = controller();
        let now = Instant::now();
        controller.handle_input(ControllerInput::RequestOnline, now);
        controller.handle_input(ControllerInput::ConnectNow, now);
        controller.update(now);
        assert!(controller.network().is_open());

        controller.shutdown();
        controller.update(now + secs(1));

        assert!(server.closed_by_client());
        assert_eq!(controller.mode(), SessionMode::Online);
        assert!(!controller.show_mode_menu());
        assert!(controller.toast().is_none());
    }
}
