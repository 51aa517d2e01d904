//! WebSocket client session management.
//!
//! One session is one socket: a clock-sync round, then the join (or
//! subscribe) request, then a loop that multiplexes the beat tick, sync
//! probes, periodic re-sync, inbound frames and stdin commands. The session
//! owns the estimator and the scheduler, so neither is shared across tasks.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use tokio::{
    net::TcpStream,
    sync::mpsc,
    time::{Instant, Interval, MissedTickBehavior},
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use hyoshi_server::{
    domain::Bpm,
    infrastructure::dto::websocket::{
        BeatPayload, ClientMessage, ClientTypeDto, MotionInputPayload, RoomStateDto,
        ServerMessage, SetTempoPayload,
    },
};
use hyoshi_shared::time::now_millis;

use crate::{
    beat_scheduler::{BeatScheduler, BeatSink, FiredBeat},
    config::{ClientConfig, ClientKind},
    domain::{Command, parse_command, pending_beat},
    error::ClientError,
    formatter::MessageFormatter,
    sync_estimator::SyncEstimator,
    ui::redisplay_prompt,
};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Rate at which the beat scheduler is polled
const TICK_INTERVAL: Duration = Duration::from_millis(16);
/// How long a round waits for missing replies after its last probe
const SYNC_REPLY_GRACE: Duration = Duration::from_secs(1);

/// Prints beats to the console
pub struct ConsoleBeatSink {
    kind: ClientKind,
}

impl BeatSink for ConsoleBeatSink {
    fn beat_fired(&mut self, beat: FiredBeat) {
        match self.kind {
            ClientKind::Input => tracing::debug!("beat #{}", beat.beat_number),
            ClientKind::Output | ClientKind::Subscriber => {
                print!("{}", MessageFormatter::format_beat(&beat));
                redisplay_prompt(self.kind);
            }
        }
    }

    fn apply_tempo(&mut self, bpm: Bpm, ramp_ms: f64) {
        tracing::info!("Tempo -> {} bpm in {:.0} ms", bpm, ramp_ms);
    }
}

/// Whether the session loop keeps going after a stdin line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Progress of the clock-sync round in flight
struct SyncRound {
    probes_sent: usize,
    last_probe_at: Option<Instant>,
}

struct Session<'a> {
    config: &'a ClientConfig,
    write: WsSink,
    estimator: SyncEstimator,
    scheduler: BeatScheduler<ConsoleBeatSink>,
    round: Option<SyncRound>,
    join_sent: bool,
    joined: bool,
    user_id: Option<u64>,
    beats_since_sync: u64,
}

/// Failure of the socket, classified by how far the session got
fn connection_failure(joined: bool, reason: String) -> ClientError {
    if joined {
        ClientError::ConnectionLost(reason)
    } else {
        ClientError::ConnectionError(reason)
    }
}

async fn next_resync(resync: &mut Option<Interval>) {
    match resync {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Run one WebSocket client session
///
/// Returns `Ok(())` when the user quits, and an error when the socket fails
/// or the coordinator rejects the join.
pub async fn run_client_session(
    config: &ClientConfig,
    input: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(config.url.as_str())
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    tracing::info!("Connected to {}", config.url);

    let (write, mut read) = ws_stream.split();
    let mut session = Session::new(config, write);
    session.begin_sync_round();

    let mut tick = tokio::time::interval(TICK_INTERVAL);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut probe = tokio::time::interval(config.sync_interval);
    probe.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut resync = config
        .resync_every
        .map(|period| tokio::time::interval_at(Instant::now() + period, period));

    loop {
        tokio::select! {
            _ = tick.tick() => session.on_tick().await?,
            _ = probe.tick(), if session.round.is_some() => session.on_probe().await?,
            _ = next_resync(&mut resync) => session.begin_sync_round(),
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => session.on_text(text.as_str()).await?,
                Some(Ok(Message::Close(_))) | None => {
                    return Err(connection_failure(
                        session.joined,
                        "server closed the connection".to_string(),
                    ));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(connection_failure(session.joined, e.to_string())),
            },
            line = input.recv() => {
                let flow = match line {
                    Some(line) => session.on_line(&line).await?,
                    None => Flow::Quit,
                };
                if flow == Flow::Quit {
                    session.close().await;
                    return Ok(());
                }
            }
        }
    }
}

impl<'a> Session<'a> {
    fn new(config: &'a ClientConfig, write: WsSink) -> Self {
        Self {
            config,
            write,
            estimator: SyncEstimator::new(config.sync_samples),
            scheduler: BeatScheduler::new(ConsoleBeatSink { kind: config.kind }),
            round: None,
            join_sent: false,
            joined: false,
            user_id: None,
            beats_since_sync: 0,
        }
    }

    fn adjusted_now(&self) -> f64 {
        self.estimator.adjusted_now(now_millis())
    }

    async fn send(&mut self, message: ClientMessage) -> Result<(), ClientError> {
        let json = serde_json::to_string(&message)?;
        let joined = self.joined;
        self.write
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| connection_failure(joined, e.to_string()))
    }

    async fn close(&mut self) {
        if let Err(e) = self.write.close().await {
            tracing::debug!("Failed to close socket: {}", e);
        }
    }

    // ========================================
    // Clock sync
    // ========================================

    fn begin_sync_round(&mut self) {
        if self.round.is_some() {
            return;
        }
        tracing::debug!("Starting clock-sync round");
        self.estimator.begin_round();
        self.round = Some(SyncRound {
            probes_sent: 0,
            last_probe_at: None,
        });
    }

    async fn on_probe(&mut self) -> Result<(), ClientError> {
        let round_size = self.estimator.round_size();
        let Some(round) = self.round.as_mut() else {
            return Ok(());
        };

        if round.probes_sent < round_size {
            round.probes_sent += 1;
            round.last_probe_at = Some(Instant::now());
            return self.send(ClientMessage::Sync { t1: now_millis() }).await;
        }

        // All probes are out: stop waiting for stragglers after the grace period
        if round
            .last_probe_at
            .is_some_and(|sent| sent.elapsed() >= SYNC_REPLY_GRACE)
        {
            self.finish_sync_round().await?;
        }
        Ok(())
    }

    async fn on_sync_reply(&mut self, t1: f64, t2: f64, t3: f64) -> Result<(), ClientError> {
        let t4 = now_millis();
        if self.round.is_none() {
            return Ok(());
        }
        let sample = self.estimator.record(t1, t2, t3, t4);
        tracing::trace!("Sync sample: offset {} rtt {}", sample.offset, sample.rtt);
        if self.estimator.is_round_complete() {
            self.finish_sync_round().await?;
        }
        Ok(())
    }

    async fn finish_sync_round(&mut self) -> Result<(), ClientError> {
        self.round = None;
        let collected = self.estimator.samples_collected();
        match self.estimator.finish_round() {
            Some(best) => {
                print!("{}", MessageFormatter::format_sync_result(&best, collected));
                redisplay_prompt(self.config.kind);
                if !self.join_sent {
                    self.send_join().await?;
                }
                Ok(())
            }
            None if !self.join_sent => Err(ClientError::SyncFailed),
            None => {
                tracing::warn!("Clock-sync round got no reply, keeping previous offset");
                Ok(())
            }
        }
    }

    // ========================================
    // Room membership
    // ========================================

    async fn send_join(&mut self) -> Result<(), ClientError> {
        let room_name = self.config.room.clone();
        let message = match self.config.kind {
            ClientKind::Input => ClientMessage::JoinRoomRequest {
                room_name,
                client_type: ClientTypeDto::Input,
                bpm: None,
            },
            ClientKind::Output => ClientMessage::JoinRoomRequest {
                room_name,
                client_type: ClientTypeDto::Output,
                bpm: self.config.bpm,
            },
            ClientKind::Subscriber => ClientMessage::SubscribeToRoomRequest { room_name },
        };
        self.join_sent = true;
        self.send(message).await
    }

    /// Start or stop the local beat to match a room state
    fn apply_room_state(&mut self, state: &RoomStateDto) {
        match &state.beat {
            Some(beat) if !self.scheduler.is_running() => match Bpm::new(beat.bpm) {
                Ok(bpm) => {
                    self.beats_since_sync = 0;
                    self.scheduler
                        .start(bpm, beat.next_beat_timestamp, beat.last_beat_number + 1);
                }
                Err(e) => tracing::warn!("Ignoring room beat: {}", e),
            },
            Some(_) => {}
            None => {
                if self.scheduler.is_running() {
                    tracing::info!("Room beat stopped");
                    self.scheduler.stop();
                }
            }
        }
    }

    // ========================================
    // Inbound messages
    // ========================================

    async fn on_text(&mut self, text: &str) -> Result<(), ClientError> {
        let message = match serde_json::from_str::<ServerMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Ignoring unknown message ({}): {}", e, text);
                return Ok(());
            }
        };
        let kind = self.config.kind;

        match message {
            ServerMessage::SyncReply { t1, t2, t3 } => self.on_sync_reply(t1, t2, t3).await?,
            ServerMessage::JoinRoomReply {
                user_id,
                room_state,
            } => {
                self.joined = true;
                self.user_id = Some(user_id);
                tracing::info!("Joined room '{}' as user {}", self.config.room, user_id);
                print!(
                    "{}",
                    MessageFormatter::format_room_state(&self.config.room, &room_state, self.user_id)
                );
                redisplay_prompt(kind);
                self.apply_room_state(&room_state);
            }
            ServerMessage::SubscribeToRoomReply { room_name } => {
                self.joined = true;
                tracing::info!("Subscribed to room '{}'", room_name);
            }
            ServerMessage::RoomStateUpdate {
                room_name,
                room_state,
            } => {
                print!(
                    "{}",
                    MessageFormatter::format_room_state(&room_name, &room_state, self.user_id)
                );
                redisplay_prompt(kind);
                self.apply_room_state(&room_state);
            }
            ServerMessage::SetTempo(change) => self.on_tempo_change(&change),
            ServerMessage::SyncBeat(sync) => {
                if kind == ClientKind::Subscriber {
                    print!("{}", MessageFormatter::format_beat_sync(&sync));
                    redisplay_prompt(kind);
                }
                match Bpm::new(sync.bpm) {
                    Ok(bpm) if self.scheduler.is_running() => {
                        let (beat_number, timestamp) = pending_beat(
                            bpm,
                            sync.beat_number,
                            sync.beat_timestamp,
                            self.adjusted_now(),
                        );
                        self.scheduler.set_bpm(bpm);
                        self.scheduler.retarget(timestamp, beat_number);
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Ignoring beat sync: {}", e),
                }
            }
            ServerMessage::ScheduleBeat(beat) => {
                print!("{}", MessageFormatter::format_scheduled_beat(&beat));
                redisplay_prompt(kind);
            }
            ServerMessage::MotionInput(motion) => {
                print!("{}", MessageFormatter::format_motion(&motion));
                redisplay_prompt(kind);
            }
            ServerMessage::Error { message } => {
                print!("{}", MessageFormatter::format_server_error(&message));
                redisplay_prompt(kind);
                if !self.joined {
                    return Err(ClientError::Rejected(message));
                }
            }
        }
        Ok(())
    }

    fn on_tempo_change(&mut self, change: &SetTempoPayload) {
        let kind = self.config.kind;
        if kind != ClientKind::Input {
            print!("{}", MessageFormatter::format_tempo_change(change));
            redisplay_prompt(kind);
        }
        let bpm = match Bpm::new(change.bpm) {
            Ok(bpm) => bpm,
            Err(e) => {
                tracing::warn!("Ignoring tempo change: {}", e);
                return;
            }
        };
        if !self.scheduler.is_running() {
            return;
        }
        let now = self.adjusted_now();
        let (beat_number, timestamp) = pending_beat(
            bpm,
            change.next_beat_number,
            change.next_beat_timestamp,
            now,
        );
        self.scheduler
            .change_tempo(bpm, (change.next_beat_timestamp - now).max(0.0));
        self.scheduler.retarget(timestamp, beat_number);
    }

    // ========================================
    // Local events
    // ========================================

    async fn on_tick(&mut self) -> Result<(), ClientError> {
        let now = self.adjusted_now();
        let Some(fired) = self.scheduler.poll(now) else {
            return Ok(());
        };

        let every = self.config.beat_sync_every;
        if self.config.kind != ClientKind::Output || !self.joined || every == 0 {
            return Ok(());
        }
        self.beats_since_sync += 1;
        if self.beats_since_sync < every {
            return Ok(());
        }
        self.beats_since_sync = 0;
        self.send(ClientMessage::SyncBeat(BeatPayload {
            room_name: self.config.room.clone(),
            beat_number: fired.beat_number,
            beat_timestamp: fired.timestamp,
        }))
        .await
    }

    async fn on_line(&mut self, line: &str) -> Result<Flow, ClientError> {
        let kind = self.config.kind;
        let command = match parse_command(line, kind) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                redisplay_prompt(kind);
                return Ok(Flow::Continue);
            }
        };

        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Resync => self.begin_sync_round(),
            Command::Motion {
                front_to_back,
                around,
            } => {
                let Some(user_id) = self.user_id else {
                    println!("Not joined yet");
                    redisplay_prompt(kind);
                    return Ok(Flow::Continue);
                };
                let (last_beat_number, next_beat_timestamp) = self
                    .scheduler
                    .next_beat()
                    .map(|(number, timestamp)| (number - 1, timestamp))
                    .unwrap_or((0, 0.0));
                let message = ClientMessage::MotionInput(MotionInputPayload {
                    room_name: self.config.room.clone(),
                    user_id,
                    front_to_back,
                    around,
                    action_timestamp: self.adjusted_now(),
                    last_beat_number,
                    next_beat_timestamp,
                });
                self.send(message).await?;
            }
            Command::Tempo(bpm) => {
                let Some((next_beat_number, next_beat_timestamp)) = self.scheduler.next_beat()
                else {
                    println!("No beat running in this room");
                    redisplay_prompt(kind);
                    return Ok(Flow::Continue);
                };
                let now = self.adjusted_now();
                let message = ClientMessage::SetTempo(SetTempoPayload {
                    room_name: self.config.room.clone(),
                    bpm: bpm.value(),
                    action_timestamp: now,
                    next_beat_number,
                    next_beat_timestamp,
                });
                self.send(message).await?;
                // The coordinator relays to everyone else; apply our own change here
                self.scheduler
                    .change_tempo(bpm, (next_beat_timestamp - now).max(0.0));
            }
        }
        Ok(Flow::Continue)
    }
}
