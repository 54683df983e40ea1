use std::collections::VecDeque;

use super::color::player_color;
use super::protocol::{
    ClientMessage, Identity, MoveRecord, ParticipantKind, RankEntry, RoomStatus, RosterEntry,
    ServerMessage, Snapshot, StartingPlayer,
};
use super::session::{PlayerEntry, RemoteSession, SnakeEntry};
use super::transport::{ConnectionState, Connector, Transport, TransportError, TransportEvent};
use crate::config::SyncConfig;
use crate::grid::{Direction, GridSize, Position};
use crate::session::SessionMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeathReason {
    Wall,
    Body,
    HeadOn,
    Collision,
    Other(Option<String>),
}

impl DeathReason {
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("wall") => DeathReason::Wall,
            Some("body") => DeathReason::Body,
            Some("head-on") => DeathReason::HeadOn,
            Some("collision") => DeathReason::Collision,
            other => DeathReason::Other(other.map(str::to_string)),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            DeathReason::Wall => "hit a wall",
            DeathReason::Body => "ran into a snake",
            DeathReason::HeadOn => "crashed head-on",
            DeathReason::Collision => "was out",
            DeathReason::Other(_) => "is out",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinInfo {
    pub your_id: String,
    pub room_id: String,
    pub status: RoomStatus,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoundSummary {
    pub ranks: Vec<RankEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    JoinOk(JoinInfo),
    GameStart,
    PlayerDied { name: String, reason: DeathReason },
    AiDemoStart,
    GameOver(RoundSummary),
    Error(String),
    Closed,
}

struct PendingDeath {
    name: String,
    reason: Option<String>,
    bot: bool,
}

pub struct NetworkSyncClient<C: Connector> {
    connector: C,
    channel: Option<C::Transport>,
    pending_join: Option<Identity>,
    config: SyncConfig,
    session: RemoteSession,
    demo_announced: bool,
}

impl<C: Connector> NetworkSyncClient<C> {
    pub fn new(connector: C, config: SyncConfig) -> Self {
        Self {
            connector,
            channel: None,
            pending_join: None,
            config,
            session: RemoteSession::default(),
            demo_announced: false,
        }
    }

    pub fn connect(&mut self, identity: &Identity) -> Result<(), TransportError> {
        if let Some(mut stale) = self.channel.take() {
            log::debug!("Replacing an existing channel");
            stale.close();
        }

        log::info!(
            "Connecting as {} to {} ({:?})",
            identity.name,
            identity.room_id(),
            identity.mode
        );

        let transport = self.connector.open()?;
        self.channel = Some(transport);
        self.pending_join = Some(identity.clone());
        self.demo_announced = false;
        Ok(())
    }

    /// Tears the channel down and forgets the room. Returns whether a channel was closed.
    pub fn disconnect(&mut self) -> bool {
        let closed = match self.channel.take() {
            Some(mut channel) => {
                if channel.is_open() {
                    if let Ok(frame) = ClientMessage::Leave.encode() {
                        let _ = channel.send(frame);
                    }
                }
                channel.close();
                log::info!("Disconnected from server");
                true
            }
            None => false,
        };

        self.pending_join = None;
        self.demo_announced = false;
        self.session.clear();
        closed
    }

    pub fn send_input(&mut self, direction: Direction) {
        if self.is_open() {
            self.send(&ClientMessage::Input { direction });
        }
    }

    /// Drains pending transport events in arrival order.
    ///
    /// Draining pauses after a round-over frame so the caller can leave the
    /// networked mode before later ticks are gated against it.
    pub fn poll(&mut self, mode: SessionMode) -> Vec<SyncEvent> {
        let mut events = Vec::new();

        while let Some(event) = self.channel.as_mut().and_then(|c| c.poll()) {
            match event {
                TransportEvent::Opened => self.handle_open(),
                TransportEvent::Frame(text) => {
                    self.handle_frame(&text, mode, &mut events);
                    if matches!(events.last(), Some(SyncEvent::GameOver(_))) {
                        break;
                    }
                }
                TransportEvent::Failed(message) => log::error!("Connection error: {}", message),
                TransportEvent::Closed { reason } => {
                    log::info!(
                        "Connection closed by remote: {}",
                        reason.as_deref().unwrap_or("no reason")
                    );
                    self.channel = None;
                    self.pending_join = None;
                    events.push(SyncEvent::Closed);
                }
            }
        }

        events
    }

    pub fn session(&self) -> &RemoteSession {
        &self.session
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.channel
            .as_ref()
            .map_or(ConnectionState::Disconnected, |c| c.state())
    }

    pub fn is_open(&self) -> bool {
        self.connection_state() == ConnectionState::Open
    }

    fn send(&mut self, message: &ClientMessage) {
        let Some(channel) = self.channel.as_mut() else {
            return;
        };

        match message.encode() {
            Ok(frame) => {
                if let Err(e) = channel.send(frame) {
                    log::debug!("Dropped outbound frame: {}", e);
                }
            }
            Err(e) => log::warn!("{}", e),
        }
    }

    fn handle_open(&mut self) {
        if let Some(identity) = self.pending_join.take() {
            log::debug!("Channel open, joining {}", identity.room_id());
            self.send(&identity.join_message());
        }
    }

    fn handle_frame(&mut self, text: &str, mode: SessionMode, events: &mut Vec<SyncEvent>) {
        match ServerMessage::decode(text) {
            Ok(message) => self.apply(message, mode, events),
            Err(e) => log::warn!("Dropping frame: {}", e),
        }
    }

    fn apply(&mut self, message: ServerMessage, mode: SessionMode, events: &mut Vec<SyncEvent>) {
        match message {
            ServerMessage::JoinAck {
                your_id,
                room_id,
                status,
                map,
                players,
                snapshot,
            } => self.apply_join_ack(your_id, room_id, status, map, players, snapshot, events),
            ServerMessage::RoundStart { food, players } => {
                self.apply_round_start(food, players);
                events.push(SyncEvent::GameStart);
            }
            ServerMessage::Tick { food, moves } => {
                if !mode.is_networked() {
                    log::trace!("Ignoring tick while {:?}", mode);
                    return;
                }
                self.apply_tick(food, moves, events);
            }
            ServerMessage::RoundOver { ranks } => {
                log::info!("Round over");
                self.session.status = RoomStatus::Finished;
                events.push(SyncEvent::GameOver(RoundSummary {
                    ranks: ranks.unwrap_or_default(),
                }));
            }
            ServerMessage::Error { code } => {
                let code = code.unwrap_or_else(|| String::from("UNKNOWN"));
                log::warn!("Server reported error {}", code);
                self.session.status = RoomStatus::Idle;
                events.push(SyncEvent::Error(code));
                if self.disconnect() {
                    events.push(SyncEvent::Closed);
                }
            }
            ServerMessage::Unknown => log::debug!("Ignoring frame with unknown tag"),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_join_ack(
        &mut self,
        your_id: String,
        room_id: String,
        status: RoomStatus,
        map: Option<GridSize>,
        players: Vec<RosterEntry>,
        snapshot: Option<Snapshot>,
        events: &mut Vec<SyncEvent>,
    ) {
        log::info!("Joined {} as {} ({:?})", room_id, your_id, status);

        self.demo_announced = false;
        self.session.my_id = Some(your_id.clone());
        self.session.room_id = Some(room_id.clone());
        self.session.status = status;
        if let Some(map) = map {
            self.session.map_size = map;
        }

        // Until a snapshot says otherwise, nobody joining a running round is alive.
        let default_alive = status != RoomStatus::Running;
        self.session.players = players
            .into_iter()
            .map(|p| {
                let entry = PlayerEntry {
                    name: p.name,
                    score: 0,
                    alive: p.alive.unwrap_or(default_alive),
                    connected: p.connected.unwrap_or(true),
                    kind: p.kind,
                };
                (p.id, entry)
            })
            .collect();

        let mid_round = snapshot.is_some() && status == RoomStatus::Running;
        if let Some(snapshot) = snapshot {
            self.apply_snapshot(snapshot);
        }

        events.push(SyncEvent::JoinOk(JoinInfo {
            your_id,
            room_id,
            status,
        }));

        // No game_start frame follows a mid-round join.
        if mid_round {
            events.push(SyncEvent::GameStart);
        }
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        if let Some(food) = snapshot.food {
            self.session.food = food;
        }

        self.session.snakes.clear();
        for (id, snake) in snapshot.snakes {
            let is_me = self.session.is_me(&id);
            let name = snake
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| self.session.display_name(&id));

            let player = self
                .session
                .players
                .entry(id.clone())
                .or_insert_with(|| PlayerEntry::new(name.clone()));
            player.score = snake.score;
            player.alive = snake.alive;
            player.connected = true;

            if is_me {
                self.session.score = snake.score;
            }

            let entry = SnakeEntry {
                body: snake.body.into(),
                color: player_color(&id, &name, is_me),
                alive: snake.alive,
                name,
                score: snake.score,
            };
            self.session.snakes.insert(id, entry);
        }

        let session = &mut self.session;
        for (id, player) in session.players.iter_mut() {
            if !session.snakes.contains_key(id) {
                player.alive = false;
            }
        }
    }

    fn apply_round_start(&mut self, food: Vec<Position>, players: Vec<StartingPlayer>) {
        log::info!("Round started with {} players", players.len());

        self.demo_announced = false;
        self.session.status = RoomStatus::Running;
        self.session.food = food;
        self.session.score = 0;
        self.session.players.clear();
        self.session.snakes.clear();

        for p in players {
            let is_me = self.session.is_me(&p.id);
            let snake = SnakeEntry {
                body: p.body.into(),
                color: player_color(&p.id, &p.name, is_me),
                alive: true,
                name: p.name.clone(),
                score: 0,
            };
            let player = PlayerEntry {
                name: p.name,
                score: 0,
                alive: true,
                connected: p.connected.unwrap_or(true),
                kind: p.kind,
            };
            self.session.snakes.insert(p.id.clone(), snake);
            self.session.players.insert(p.id, player);
        }
    }

    fn apply_tick(
        &mut self,
        food: Option<Vec<Position>>,
        moves: Vec<MoveRecord>,
        events: &mut Vec<SyncEvent>,
    ) {
        if let Some(food) = food {
            self.session.food = food;
        }

        let mut deaths = Vec::new();
        let mut demo_bot_revived = false;
        for record in moves {
            self.apply_move(record, &mut deaths, &mut demo_bot_revived);
        }

        let demo_starting = demo_bot_revived && !self.demo_announced && self.demo_conditions_met();

        for death in deaths {
            // The demo notice replaces the human's death notice.
            if demo_starting && !death.bot {
                continue;
            }
            events.push(SyncEvent::PlayerDied {
                name: death.name,
                reason: DeathReason::from_code(death.reason.as_deref()),
            });
        }

        if demo_starting {
            log::info!("No humans left, AI demo round begins");
            self.demo_announced = true;
            events.push(SyncEvent::AiDemoStart);
        }
    }

    fn apply_move(
        &mut self,
        record: MoveRecord,
        deaths: &mut Vec<PendingDeath>,
        demo_bot_revived: &mut bool,
    ) {
        let id = record.id;
        let is_me = self.session.is_me(&id);
        let name = record
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.session.display_name(&id));

        let player = self
            .session
            .players
            .entry(id.clone())
            .or_insert_with(|| PlayerEntry::new(name.clone()));
        if record.name.is_some() {
            player.name = name.clone();
        }
        if record.kind.is_some() {
            player.kind = record.kind;
        }
        let bot = is_bot(&self.config, &id, player.kind);

        if record.dead {
            if let Some(snake) = self.session.snakes.get_mut(&id) {
                snake.alive = false;
                snake.body.clear();
            }
            player.alive = false;
            deaths.push(PendingDeath {
                name,
                reason: record.reason,
                bot,
            });
            return;
        }

        let mut initialized = false;
        if record.revived || !self.session.snakes.contains_key(&id) {
            initialized = record.body.is_some() || record.head_add.is_some();
            let body: VecDeque<Position> = match (record.body, record.head_add) {
                (Some(body), _) => body.into(),
                (None, Some(head)) => VecDeque::from([head]),
                (None, None) => VecDeque::new(),
            };

            let snake = SnakeEntry {
                body,
                color: player_color(&id, &name, is_me),
                alive: true,
                name: name.clone(),
                score: record.score.unwrap_or(0),
            };
            self.session.snakes.insert(id.clone(), snake);
            player.alive = true;

            if record.revived && bot && name == self.config.demo_bot_name {
                *demo_bot_revived = true;
            }
        }

        let Some(snake) = self.session.snakes.get_mut(&id) else {
            return;
        };
        if record.name.is_some() {
            snake.name = name;
        }

        if !initialized {
            if let Some(head) = record.head_add {
                snake.body.push_front(head);
            }
            if record.tail_remove {
                snake.body.pop_back();
            }
        }

        if let Some(alive) = record.alive {
            snake.alive = alive;
            player.alive = alive;
        }

        if let Some(score) = record.score {
            snake.score = score;
            player.score = score;
            if is_me {
                self.session.score = score;
            }
        }
    }

    fn demo_conditions_met(&self) -> bool {
        let mut humans_alive = 0;
        let mut bots_alive = 0;
        for (id, player) in &self.session.players {
            if !player.alive {
                continue;
            }
            if is_bot(&self.config, id, player.kind) {
                bots_alive += 1;
            } else {
                humans_alive += 1;
            }
        }
        humans_alive == 0 && bots_alive >= 2
    }
}

fn is_bot(config: &SyncConfig, id: &str, kind: Option<ParticipantKind>) -> bool {
    match kind {
        Some(ParticipantKind::Bot) => true,
        Some(ParticipantKind::Human) => false,
        None => !config.bot_id_prefix.is_empty() && id.starts_with(&config.bot_id_prefix),
    }
}
