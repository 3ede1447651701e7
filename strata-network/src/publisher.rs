use crate::{
    frame::{Frame, FrameCodec},
    options::{tcp_endpoint, PublisherOptions},
    InvalidConfiguration, SessionError,
};
use futures::prelude::*;
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};
use strata_formats::Message;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::mpsc,
    task::JoinHandle,
};
use tokio_util::codec::FramedWrite;

/// how long `close` waits for the runner to stop before aborting it
const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

/// the sending side of a pub/sub channel
///
/// A publisher owns a listening socket; every subscriber that connects
/// receives a copy of every message sent afterwards, in send order. The
/// session moves `unconnected -> bound -> closed`: [`bind`] needs complete
/// [`PublisherOptions`], [`send`] only works while bound, and [`close`] is
/// idempotent and releases the socket.
///
/// [`send`] serializes the message into its `(type tag, payload)` frame
/// and enqueues it. The options' high-water mark bounds that queue: once
/// full, a send blocks until space frees up, the configured time out
/// elapses ([`SessionError::Timeout`]) or the session closes.
///
/// A publisher is safe to share across tasks; callers are expected to
/// serialize `send` calls (single writer), while [`close`] may be called
/// from anywhere, including while a send is blocked. Dropping the session
/// closes it.
///
/// [`bind`]: Publisher::bind
/// [`send`]: Publisher::send
/// [`close`]: Publisher::close
#[derive(Default)]
pub struct Publisher {
    link: Mutex<Link>,
}

#[derive(Default)]
enum Link {
    #[default]
    Unconnected,
    Bound(Arc<Bound>),
    Closed,
}

struct Bound {
    local_address: SocketAddr,
    outbox: Outbox,
    shutdown: mpsc::Sender<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
    time_out: Option<Duration>,
}

/// the outbound queue; its capacity is the session's high-water mark
#[derive(Clone)]
enum Outbox {
    Bounded(mpsc::Sender<Frame>),
    Unbounded(mpsc::UnboundedSender<Frame>),
}

enum FrameSource {
    Bounded(mpsc::Receiver<Frame>),
    Unbounded(mpsc::UnboundedReceiver<Frame>),
}

impl FrameSource {
    async fn recv(&mut self) -> Option<Frame> {
        match self {
            Self::Bounded(receiver) => receiver.recv().await,
            Self::Unbounded(receiver) => receiver.recv().await,
        }
    }
}

fn frame_queue(high_water_mark: usize) -> (Outbox, FrameSource) {
    if high_water_mark == 0 {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Outbox::Unbounded(sender), FrameSource::Unbounded(receiver))
    } else {
        let (sender, receiver) = mpsc::channel(high_water_mark);
        (Outbox::Bounded(sender), FrameSource::Bounded(receiver))
    }
}

struct Runner {
    listener: TcpListener,
    frames: FrameSource,
    shutdown: mpsc::Receiver<()>,
    sinks: Vec<FramedWrite<TcpStream, FrameCodec>>,
}

impl Publisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// bind the publisher to its configured address
    ///
    /// fails with [`SessionError::InvalidConfiguration`] when the options
    /// are incomplete, leaving the session unconnected.
    #[tracing::instrument(skip(self, options), level = "info")]
    pub async fn bind(&self, options: &PublisherOptions) -> Result<(), SessionError> {
        match &*self.link.lock().unwrap() {
            Link::Unconnected => {}
            Link::Bound(_) => {
                return Err(InvalidConfiguration::new("session is already bound").into())
            }
            Link::Closed => return Err(SessionError::NotConnected),
        }

        let address = options
            .address()
            .ok_or_else(|| InvalidConfiguration::new("no address set"))?;
        let endpoint = tcp_endpoint(address)?;

        let listener = TcpListener::bind(endpoint).await?;
        let local_address = listener.local_addr()?;

        // the handshake itself belongs to the transport layer; the policy
        // is validated by construction, we only hand it over
        tracing::info!(
            address = %local_address,
            security_level = %options.zap_options().security_level(),
            "publisher bound"
        );

        let (outbox, frames) = frame_queue(options.high_water_mark());
        let (shutdown_sender, shutdown_receiver) = mpsc::channel(1);

        let runner = Runner {
            listener,
            frames,
            shutdown: shutdown_receiver,
            sinks: Vec::new(),
        };
        let handle = tokio::spawn(runner.run());

        let bound = Arc::new(Bound {
            local_address,
            outbox,
            shutdown: shutdown_sender,
            handle: Mutex::new(Some(handle)),
            time_out: options.time_out(),
        });

        let mut link = self.link.lock().unwrap();
        match &*link {
            Link::Unconnected => {
                *link = Link::Bound(bound);
                Ok(())
            }
            // the session was closed while we were binding
            _ => {
                drop(link);
                bound.shut_down().await;
                Err(SessionError::NotConnected)
            }
        }
    }

    /// serialize and enqueue a message for every connected subscriber
    pub async fn send(&self, message: &dyn Message) -> Result<(), SessionError> {
        let bound = match &*self.link.lock().unwrap() {
            Link::Bound(bound) => bound.clone(),
            _ => return Err(SessionError::NotConnected),
        };

        let frame = Frame::from_message(message)?;

        match &bound.outbox {
            Outbox::Unbounded(sender) => {
                sender.send(frame).map_err(|_| SessionError::NotConnected)
            }
            Outbox::Bounded(sender) => match bound.time_out {
                None => sender
                    .send(frame)
                    .await
                    .map_err(|_| SessionError::NotConnected),
                Some(limit) => match tokio::time::timeout(limit, sender.send(frame)).await {
                    Err(_) => Err(SessionError::Timeout),
                    Ok(Err(_)) => Err(SessionError::NotConnected),
                    Ok(Ok(())) => Ok(()),
                },
            },
        }
    }

    /// the address the listener actually bound, useful with port 0
    pub fn local_address(&self) -> Result<SocketAddr, SessionError> {
        match &*self.link.lock().unwrap() {
            Link::Bound(bound) => Ok(bound.local_address),
            _ => Err(SessionError::NotConnected),
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(&*self.link.lock().unwrap(), Link::Bound(_))
    }

    /// close the session and release the socket
    ///
    /// idempotent; a send blocked on back-pressure returns
    /// [`SessionError::NotConnected`] promptly.
    pub async fn close(&self) {
        let previous = std::mem::replace(&mut *self.link.lock().unwrap(), Link::Closed);
        if let Link::Bound(bound) = previous {
            bound.shut_down().await;
        }
    }
}

impl Bound {
    async fn shut_down(&self) {
        let _ = self.shutdown.try_send(());

        let handle = self.handle.lock().unwrap().take();
        if let Some(mut handle) = handle {
            tokio::select! {
                result = &mut handle => { let _ = result; }
                _ = tokio::time::sleep(SHUTDOWN_GRACE) => {
                    handle.abort();
                    tracing::warn!("publisher runner did not stop in time, aborted");
                }
            }
        }
    }
}

impl Runner {
    async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.shutdown.recv() => break,

                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::info!(peer = %peer, "subscriber connected");
                        self.sinks.push(FramedWrite::new(stream, FrameCodec::new()));
                    }
                    Err(error) => {
                        tracing::warn!(reason = %error, "cannot accept a subscriber");
                    }
                },

                frame = self.frames.recv() => match frame {
                    // every sender is gone, the session was dropped
                    None => break,
                    Some(frame) => self.broadcast(frame).await,
                },
            }
        }
        tracing::debug!("publisher runner stopped");
    }

    /// fan the frame out to every connected subscriber, forgetting the
    /// ones that went away
    async fn broadcast(&mut self, frame: Frame) {
        let mut alive = Vec::with_capacity(self.sinks.len());
        for mut sink in self.sinks.drain(..) {
            match sink.send(frame.clone()).await {
                Ok(()) => alive.push(sink),
                Err(error) => {
                    tracing::debug!(reason = %error, "subscriber went away");
                }
            }
        }
        self.sinks = alive;
    }
}
