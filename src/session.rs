//! Live TCP streaming to a robot driver.
//!
//! A session owns a chain of three cursors. The write cursor applies
//! actions the instant the caller issues them and represents the state
//! the API "sees". It cascades into the stream cursor, which the sender
//! thread advances as actions go over the wire so the codec always
//! encodes against the exact state the device will reach. The stream
//! cursor cascades into the motion cursor, which only advances when the
//! device acknowledges execution and is therefore the best estimate of
//! the physical robot.
//!
//! Flow control is a credit window: at most `max_stream_count`
//! unacknowledged actions in flight; once the window fills, sending
//! pauses until acks drain it down to `send_new_batch_on`.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Context;
use crossbeam::channel::{unbounded, Receiver, Sender};
use tracing::{debug, error, info, warn};

use crate::action::Action;
use crate::config::RobotConfig;
use crate::cursor::RobotCursor;
use crate::error::{Error, Result};
use crate::geometry::{Quaternion, Vector};
use crate::protocol::{codec_for, DeviceEvent, WireProtocol};
use crate::types::Joints;

/// Credit window over unacknowledged in-flight actions.
///
/// Once full, the `device_full` latch holds sending off until the
/// backlog drains to the refill mark, so the device works through a
/// burst instead of being trickled one slot at a time.
pub(crate) struct StreamWindow {
    max_stream_count: usize,
    send_new_batch_on: usize,
    in_flight: usize,
    device_full: bool,
}

impl StreamWindow {
    pub(crate) fn new(max_stream_count: usize, send_new_batch_on: usize) -> Self {
        Self {
            max_stream_count,
            send_new_batch_on,
            in_flight: 0,
            device_full: false,
        }
    }

    pub(crate) fn can_send(&self) -> bool {
        !self.device_full && self.in_flight < self.max_stream_count
    }

    pub(crate) fn on_sent(&mut self) {
        self.in_flight += 1;
        if self.in_flight >= self.max_stream_count {
            self.device_full = true;
        }
    }

    pub(crate) fn on_ack(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.device_full && self.in_flight <= self.send_new_batch_on {
            self.device_full = false;
        }
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight
    }
}

pub struct StreamSession {
    write_cursor: Arc<Mutex<RobotCursor>>,
    motion_cursor: Arc<Mutex<RobotCursor>>,
    events: Receiver<DeviceEvent>,
    running: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl StreamSession {
    /// Open the socket, wait for the device's initial state broadcast
    /// and start the sender and receiver workers. Blocks for at most
    /// the configured handshake timeout.
    pub fn connect(config: &RobotConfig) -> Result<Self> {
        config.validate()?;
        let address = format!("{}:{}", config.host, config.port);
        let poll = Duration::from_millis(config.connection().poll_interval_ms());

        let socket = open_socket(&address, poll)
            .map_err(|e| Error::Connection(format!("{:#}", e)))?;
        let reader_socket = socket
            .try_clone()
            .map_err(|e| Error::Connection(format!("socket clone failed: {}", e)))?;
        info!("connected to {} ({:?} driver)", address, config.vendor);

        // write -> stream -> motion cascade
        let motion_cursor = Arc::new(Mutex::new(RobotCursor::new("motion", false)));
        let stream_cursor = Arc::new(Mutex::new(RobotCursor::new("stream", false)));
        let write_cursor = Arc::new(Mutex::new(RobotCursor::new("write", true)));
        if let (Ok(mut write), Ok(mut stream)) = (write_cursor.lock(), stream_cursor.lock()) {
            write.set_child(stream_cursor.clone());
            stream.set_child(motion_cursor.clone());
        }

        let buffer = config.buffer();
        let window = Arc::new(Mutex::new(StreamWindow::new(
            buffer.max_stream_count(),
            buffer.send_new_batch_on(),
        )));
        let running = Arc::new(AtomicBool::new(true));
        let primed = Arc::new(AtomicBool::new(false));
        let (events_tx, events_rx) = unbounded();

        let mut handles = Vec::new();
        handles.push(spawn_receiver(ReceiverContext {
            socket: reader_socket,
            codec: codec_for(config.vendor),
            cursors: [
                write_cursor.clone(),
                stream_cursor.clone(),
                motion_cursor.clone(),
            ],
            window: window.clone(),
            running: running.clone(),
            primed: primed.clone(),
            events: events_tx,
        }));

        // The sender starts only after the handshake: until the device
        // has broadcast its pose the stream cursor has no state to
        // encode against.
        let timeout = config.connection().handshake_timeout();
        if let Err(e) = wait_for_handshake(&primed, &running, timeout) {
            running.store(false, Ordering::Relaxed);
            for handle in handles {
                let _ = handle.join();
            }
            return Err(e);
        }
        info!("handshake complete, device state received");

        handles.push(spawn_sender(SenderContext {
            socket,
            codec: codec_for(config.vendor),
            cursor: stream_cursor,
            window,
            running: running.clone(),
            poll,
        }));

        Ok(Self {
            write_cursor,
            motion_cursor,
            events: events_rx,
            running,
            handles,
        })
    }

    /// Issue an action into the session; it applies to the write cursor
    /// immediately and streams to the device asynchronously.
    pub fn issue(&self, action: Action) -> bool {
        match self.write_cursor.lock() {
            Ok(mut cursor) => cursor.issue(action),
            Err(_) => {
                error!("write cursor lock poisoned, action dropped");
                false
            }
        }
    }

    /// Device events (acks, pose broadcasts) as they arrive.
    pub fn events(&self) -> &Receiver<DeviceEvent> {
        &self.events
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Last acknowledged TCP position of the physical robot.
    pub fn motion_position(&self) -> Option<Vector> {
        self.motion_cursor.lock().ok().and_then(|c| c.position)
    }

    pub fn motion_rotation(&self) -> Option<Quaternion> {
        self.motion_cursor.lock().ok().and_then(|c| c.rotation)
    }

    pub fn motion_joints(&self) -> Option<Joints> {
        self.motion_cursor.lock().ok().and_then(|c| c.joints)
    }

    /// Actions issued but not yet acknowledged by the device.
    pub fn pending_count(&self) -> usize {
        self.motion_cursor
            .lock()
            .map(|c| c.pending_count())
            .unwrap_or(0)
    }

    /// Stop both workers and wait for them to exit.
    pub fn disconnect(&mut self) {
        if !self.running.swap(false, Ordering::Relaxed) {
            return;
        }
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
        info!("session disconnected");
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn open_socket(address: &str, poll: Duration) -> anyhow::Result<TcpStream> {
    let socket = TcpStream::connect(address)
        .with_context(|| format!("failed to connect to {}", address))?;
    socket
        .set_read_timeout(Some(poll))
        .context("failed to set read timeout")?;
    socket.set_nodelay(true).context("failed to set nodelay")?;
    Ok(socket)
}

fn wait_for_handshake(
    primed: &AtomicBool,
    running: &AtomicBool,
    timeout_secs: u64,
) -> Result<()> {
    let deadline = Instant::now() + Duration::from_secs(timeout_secs);
    while Instant::now() < deadline {
        if primed.load(Ordering::Relaxed) {
            return Ok(());
        }
        if !running.load(Ordering::Relaxed) {
            return Err(Error::Connection(
                "connection lost during handshake".to_string(),
            ));
        }
        thread::sleep(Duration::from_millis(10));
    }
    Err(Error::HandshakeTimeout(timeout_secs))
}

struct SenderContext {
    socket: TcpStream,
    codec: Box<dyn WireProtocol>,
    cursor: Arc<Mutex<RobotCursor>>,
    window: Arc<Mutex<StreamWindow>>,
    running: Arc<AtomicBool>,
    poll: Duration,
}

fn spawn_sender(mut ctx: SenderContext) -> JoinHandle<()> {
    thread::spawn(move || {
        while ctx.running.load(Ordering::Relaxed) {
            thread::sleep(ctx.poll);
            let batch = drain_batch(&ctx);
            if batch.is_empty() {
                continue;
            }
            if let Ok(window) = ctx.window.lock() {
                debug!(
                    "sending batch of {} messages, {} in flight",
                    batch.len(),
                    window.in_flight()
                );
            }
            let framed = ctx.codec.frame(&batch);
            if let Err(e) = ctx.socket.write_all(&framed) {
                error!("socket write failed: {}", e);
                ctx.running.store(false, Ordering::Relaxed);
            }
        }
        debug!("sender worker stopped");
    })
}

/// Advance the stream cursor while the credit window allows, collecting
/// the wire form of every action that has one. Runs under both the
/// window and cursor locks so in-flight accounting and cursor state
/// stay consistent with what actually gets written.
fn drain_batch(ctx: &SenderContext) -> Vec<String> {
    let mut batch = Vec::new();
    let (Ok(mut window), Ok(mut cursor)) = (ctx.window.lock(), ctx.cursor.lock()) else {
        return batch;
    };
    while window.can_send() && cursor.are_pending() {
        let Some((action, ok)) = cursor.apply_next() else {
            break;
        };
        if !ok {
            continue;
        }
        if let Some(message) = ctx.codec.encode(&action, &cursor) {
            batch.push(message);
            window.on_sent();
        }
        // Actions without a wire form still cascaded to the motion
        // cursor; a later ack's catch-up consumes them there.
    }
    batch
}

struct ReceiverContext {
    socket: TcpStream,
    codec: Box<dyn WireProtocol>,
    /// write, stream, motion — all three primed from the handshake.
    cursors: [Arc<Mutex<RobotCursor>>; 3],
    window: Arc<Mutex<StreamWindow>>,
    running: Arc<AtomicBool>,
    primed: Arc<AtomicBool>,
    events: Sender<DeviceEvent>,
}

fn spawn_receiver(mut ctx: ReceiverContext) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut buf = [0u8; 4096];
        let mut last_pose: Option<(Vector, Quaternion)> = None;
        let mut last_joints: Option<Joints> = None;

        while ctx.running.load(Ordering::Relaxed) {
            let events = match ctx.socket.read(&mut buf) {
                Ok(0) => {
                    warn!("device closed the connection");
                    ctx.running.store(false, Ordering::Relaxed);
                    break;
                }
                Ok(n) => ctx.codec.feed(&buf[..n]),
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(e) => {
                    error!("socket read failed: {}", e);
                    ctx.running.store(false, Ordering::Relaxed);
                    break;
                }
            };

            for event in events {
                match &event {
                    DeviceEvent::Ack { id } => {
                        if let Ok(mut window) = ctx.window.lock() {
                            window.on_ack();
                        }
                        if let Ok(mut motion) = ctx.cursors[2].lock() {
                            let consumed = motion.apply_until_id(*id);
                            debug!("ack {} advanced motion cursor by {}", id, consumed);
                        }
                    }
                    DeviceEvent::Pose { position, rotation } => {
                        last_pose = Some((*position, *rotation));
                    }
                    DeviceEvent::Joints { joints } => {
                        last_joints = Some(*joints);
                    }
                    DeviceEvent::State {
                        position,
                        rotation,
                        joints,
                    } => {
                        last_pose = Some((*position, *rotation));
                        last_joints = Some(*joints);
                    }
                }

                if !ctx.primed.load(Ordering::Relaxed) {
                    if let (Some((position, rotation)), Some(joints)) = (last_pose, last_joints) {
                        for cursor in &ctx.cursors {
                            if let Ok(mut cursor) = cursor.lock() {
                                cursor.prime(position, rotation, joints);
                            }
                        }
                        ctx.primed.store(true, Ordering::Relaxed);
                    }
                }

                // Consumers may not be listening; that is fine.
                let _ = ctx.events.send(event);
            }
        }
        debug!("receiver worker stopped");
    })
}
