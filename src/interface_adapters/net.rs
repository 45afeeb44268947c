// WebSocket session runner: join handshake, tick loop and inbound routing.

use crate::domain::{InputSampler, Presentation, SessionError, SessionIds, SessionStorage};
use crate::interface_adapters::protocol::{
    ClientMessage, Inbound, JoinPayload, decode_server_text,
};
use crate::use_cases::SessionController;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{Instrument, debug, info, info_span, trace, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

const LOG_THROTTLE: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub enum NetError {
    // Categorizes connection failures so callers can decide policy.
    Ws(tungstenite::Error),
    Serialization(serde_json::Error),
    Session(SessionError),
    JoinTimeout,
    ClosedBeforeJoin,
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Ws(e) => write!(f, "websocket error: {e}"),
            NetError::Serialization(e) => write!(f, "serialization error: {e}"),
            NetError::Session(e) => write!(f, "session error: {e}"),
            NetError::JoinTimeout => f.write_str("timed out waiting for join acceptance"),
            NetError::ClosedBeforeJoin => f.write_str("server closed the connection before join"),
        }
    }
}

impl std::error::Error for NetError {}

impl From<tungstenite::Error> for NetError {
    fn from(e: tungstenite::Error) -> Self {
        NetError::Ws(e)
    }
}

impl From<SessionError> for NetError {
    fn from(e: SessionError) -> Self {
        NetError::Session(e)
    }
}

#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub url: String,
    pub room: String,
    pub tick_interval: Duration,
    pub join_timeout: Duration,
}

/// Traffic counters for one connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnStats {
    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub invalid_json: u32,
    pub rejected_events: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    Shutdown,
    ServerClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ids: SessionIds,
    pub reason: DisconnectReason,
    pub ticks: u64,
    pub stats: ConnStats,
}

/// Connects, joins the configured room and drives the session until shutdown or
/// the server closes the channel.
///
/// The session is always torn down before returning, on success and on error.
pub async fn run_session<P, I, S>(
    settings: &RunnerSettings,
    session: &mut SessionController<P>,
    input: &mut I,
    storage: &S,
    shutdown: Arc<Notify>,
) -> Result<RunSummary, NetError>
where
    P: Presentation,
    I: InputSampler,
    S: SessionStorage + ?Sized,
{
    let span = info_span!("session", room = %settings.room, session_id = tracing::field::Empty);

    let result = async {
        session.begin_connect()?;
        let (ws, _response) = connect_async(settings.url.as_str()).await?;
        info!(url = %settings.url, "connected");

        let (mut sink, mut source) = ws.split();
        let mut stats = ConnStats::default();

        let ids = join(settings, storage, &mut sink, &mut source, &mut stats).await?;
        tracing::Span::current().record("session_id", ids.session_id.as_str());
        session.on_joined(ids.clone())?;
        // Reconnect support is best-effort; a failed save does not end the session.
        if let Err(e) = storage.save(&ids) {
            warn!(error = %e, "failed to persist session ids");
        }
        session.subscribe()?;

        let reason = run_loop(
            settings,
            session,
            input,
            &mut sink,
            &mut source,
            &mut stats,
            &shutdown,
        )
        .await?;

        if let Err(e) = sink.close().await {
            debug!(error = ?e, "socket close error");
        }

        Ok::<_, NetError>(RunSummary {
            ids,
            reason,
            ticks: session.ticks(),
            stats,
        })
    }
    .instrument(span.clone())
    .await;

    let _enter = span.enter();
    match &result {
        Ok(summary) => info!(
            reason = ?summary.reason,
            ticks = summary.ticks,
            msgs_in = summary.stats.msgs_in,
            msgs_out = summary.stats.msgs_out,
            bytes_in = summary.stats.bytes_in,
            bytes_out = summary.stats.bytes_out,
            invalid_json = summary.stats.invalid_json,
            rejected_events = summary.stats.rejected_events,
            "session ended"
        ),
        Err(e) => warn!(error = %e, "session ended with error"),
    }
    session.teardown();
    result
}

async fn join<S>(
    settings: &RunnerSettings,
    storage: &S,
    sink: &mut WsSink,
    source: &mut WsSource,
    stats: &mut ConnStats,
) -> Result<SessionIds, NetError>
where
    S: SessionStorage + ?Sized,
{
    let stored = match storage.load() {
        Ok(stored) => stored,
        Err(e) => {
            warn!(error = %e, "stored session unreadable; joining fresh");
            None
        }
    };
    if let Some(ids) = &stored {
        debug!(room_id = %ids.room_id, session_id = %ids.session_id, "resuming stored session");
    }

    let resumed = stored.is_some();
    let join = ClientMessage::Join(JoinPayload::new(settings.room.as_str(), stored));
    send_message(sink, &join, stats).await?;

    let result = match timeout(settings.join_timeout, read_joined(source, stats)).await {
        Ok(result) => result,
        Err(_) => Err(NetError::JoinTimeout),
    };

    // The server never accepted the stored ids; the next run joins fresh.
    if resumed && matches!(result, Err(NetError::JoinTimeout | NetError::ClosedBeforeJoin)) {
        warn!("stored session rejected; clearing it");
        if let Err(e) = storage.clear() {
            warn!(error = %e, "failed to clear stored session");
        }
    }

    result
}

async fn read_joined(source: &mut WsSource, stats: &mut ConnStats) -> Result<SessionIds, NetError> {
    loop {
        let Some(incoming) = source.next().await else {
            return Err(NetError::ClosedBeforeJoin);
        };

        match incoming? {
            Message::Text(text) => {
                stats.msgs_in += 1;
                stats.bytes_in += text.len() as u64;
                match decode_server_text(&text).map_err(NetError::Serialization)? {
                    Inbound::Joined(ids) => return Ok(ids),
                    other => debug!(message = ?other, "message before join acceptance dropped"),
                }
            }
            Message::Close(_) => return Err(NetError::ClosedBeforeJoin),
            _ => {}
        }
    }
}

async fn run_loop<P, I>(
    settings: &RunnerSettings,
    session: &mut SessionController<P>,
    input: &mut I,
    sink: &mut WsSink,
    source: &mut WsSource,
    stats: &mut ConnStats,
    shutdown: &Notify,
) -> Result<DisconnectReason, NetError>
where
    P: Presentation,
    I: InputSampler,
{
    let mut ticker = interval(settings.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let now = Instant::now() - LOG_THROTTLE;
    let mut last_rejected_log = now;
    let mut last_invalid_log = now;

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!("shutdown requested");
                return Ok(DisconnectReason::Shutdown);
            }

            _ = ticker.tick() => {
                let frame = input.sample();
                for command in session.tick(frame) {
                    send_message(sink, &ClientMessage::from(command), stats).await?;
                }
            }

            incoming = source.next() => {
                let message = match incoming {
                    Some(message) => message?,
                    None => return Ok(DisconnectReason::ServerClosed),
                };
                match message {
                    Message::Text(text) => {
                        stats.msgs_in += 1;
                        stats.bytes_in += text.len() as u64;
                        route_text(session, &text, stats, &mut last_rejected_log, &mut last_invalid_log);
                    }
                    Message::Close(frame) => {
                        info!(frame = ?frame, "server closed the connection");
                        return Ok(DisconnectReason::ServerClosed);
                    }
                    Message::Binary(_) => {
                        if should_log(&mut last_invalid_log) {
                            warn!("binary message ignored");
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

fn route_text<P: Presentation>(
    session: &mut SessionController<P>,
    text: &str,
    stats: &mut ConnStats,
    last_rejected_log: &mut Instant,
    last_invalid_log: &mut Instant,
) {
    match decode_server_text(text) {
        Ok(Inbound::Event(event)) => match session.handle_event(event) {
            Ok(outcome) => trace!(outcome = ?outcome, "event handled"),
            Err(e) => {
                stats.rejected_events += 1;
                if should_log(last_rejected_log) {
                    warn!(error = %e, count = stats.rejected_events, "event rejected");
                }
            }
        },
        Ok(Inbound::Joined(_)) => {
            if should_log(last_rejected_log) {
                warn!("duplicate join acceptance ignored");
            }
        }
        Ok(Inbound::Unhandled { command }) => debug!(%command, "unhandled server message"),
        Err(e) => {
            stats.invalid_json += 1;
            if should_log(last_invalid_log) {
                warn!(error = %e, count = stats.invalid_json, "invalid server message");
            }
        }
    }
}

async fn send_message(
    sink: &mut WsSink,
    msg: &ClientMessage,
    stats: &mut ConnStats,
) -> Result<(), NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    stats.msgs_out += 1;
    stats.bytes_out += txt.len() as u64;
    sink.send(Message::Text(txt.into())).await?;
    Ok(())
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}
