use crate::{
    frame::{Frame, FrameCodec},
    options::{tcp_endpoint, SubscriberOptions},
    InvalidConfiguration, SessionError,
};
use futures::prelude::*;
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};
use strata_formats::{Message, Messages};
use tokio::{
    net::TcpStream,
    sync::mpsc,
    task::JoinHandle,
    time::Instant,
};
use tokio_util::codec::FramedRead;

/// how long `close` waits for the runner to stop before aborting it
const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

/// the receiving side of a pub/sub channel
///
/// A subscriber connects to a publisher's address and accepts the message
/// kinds registered in its [`SubscriberOptions`]. The registry is copied
/// at connect time; mutating the caller's registry afterwards has no
/// effect on the session.
///
/// [`receive`] blocks until a message of a subscribed kind arrives, the
/// configured time out elapses ([`SessionError::Timeout`], the session
/// stays usable) or the session closes ([`SessionError::NotConnected`]).
/// Messages of kinds the session does not understand, or that fail to
/// decode, are logged and dropped while the call keeps waiting: a
/// long-lived subscriber stays up next to senders it does not know yet.
///
/// A subscriber is safe to share across tasks; `receive` serializes
/// readers internally (single reader), while [`close`] may be called from
/// anywhere, including while a receive is blocked. Dropping the session
/// closes it.
///
/// [`receive`]: Subscriber::receive
/// [`close`]: Subscriber::close
#[derive(Default)]
pub struct Subscriber {
    link: Mutex<Link>,
}

#[derive(Default)]
enum Link {
    #[default]
    Unconnected,
    Connected(Arc<Connected>),
    Closed,
}

struct Connected {
    peer_address: SocketAddr,
    inbox: tokio::sync::Mutex<Inbox>,
    message_types: Mutex<Messages>,
    shutdown: mpsc::Sender<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
    time_out: Option<Duration>,
}

/// the received-frame queue; its capacity is the session's high-water mark
enum Inbox {
    Bounded(mpsc::Receiver<Frame>),
    Unbounded(mpsc::UnboundedReceiver<Frame>),
}

impl Inbox {
    async fn recv(&mut self) -> Option<Frame> {
        match self {
            Self::Bounded(receiver) => receiver.recv().await,
            Self::Unbounded(receiver) => receiver.recv().await,
        }
    }
}

enum InboxSink {
    Bounded(mpsc::Sender<Frame>),
    Unbounded(mpsc::UnboundedSender<Frame>),
}

impl InboxSink {
    /// false once the receiving half is gone
    async fn send(&self, frame: Frame) -> bool {
        match self {
            Self::Bounded(sender) => sender.send(frame).await.is_ok(),
            Self::Unbounded(sender) => sender.send(frame).is_ok(),
        }
    }
}

fn frame_queue(high_water_mark: usize) -> (InboxSink, Inbox) {
    if high_water_mark == 0 {
        let (sender, receiver) = mpsc::unbounded_channel();
        (InboxSink::Unbounded(sender), Inbox::Unbounded(receiver))
    } else {
        let (sender, receiver) = mpsc::channel(high_water_mark);
        (InboxSink::Bounded(sender), Inbox::Bounded(receiver))
    }
}

struct Runner {
    frames: FramedRead<TcpStream, FrameCodec>,
    inbox: InboxSink,
    shutdown: mpsc::Receiver<()>,
}

impl Subscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// connect the subscriber to its configured address
    ///
    /// fails with [`SessionError::InvalidConfiguration`] when the options
    /// are incomplete (no address, or no message type registered), leaving
    /// the session unconnected.
    #[tracing::instrument(skip(self, options), level = "info")]
    pub async fn connect(&self, options: &SubscriberOptions) -> Result<(), SessionError> {
        match &*self.link.lock().unwrap() {
            Link::Unconnected => {}
            Link::Connected(_) => {
                return Err(InvalidConfiguration::new("session is already connected").into())
            }
            Link::Closed => return Err(SessionError::NotConnected),
        }

        let address = options
            .address()
            .ok_or_else(|| InvalidConfiguration::new("no address set"))?;
        if !options.have_message_types() {
            return Err(InvalidConfiguration::new("no message types registered").into());
        }
        let endpoint = tcp_endpoint(address)?;

        let stream = TcpStream::connect(endpoint).await?;
        let peer_address = stream.peer_addr()?;

        tracing::info!(
            peer = %peer_address,
            security_level = %options.zap_options().security_level(),
            "subscriber connected"
        );

        let (sink, inbox) = frame_queue(options.high_water_mark());
        let (shutdown_sender, shutdown_receiver) = mpsc::channel(1);

        let runner = Runner {
            frames: FramedRead::new(stream, FrameCodec::new()),
            inbox: sink,
            shutdown: shutdown_receiver,
        };
        let handle = tokio::spawn(runner.run());

        let connected = Arc::new(Connected {
            peer_address,
            inbox: tokio::sync::Mutex::new(inbox),
            message_types: Mutex::new(options.message_types().clone()),
            shutdown: shutdown_sender,
            handle: Mutex::new(Some(handle)),
            time_out: options.time_out(),
        });

        let mut link = self.link.lock().unwrap();
        match &*link {
            Link::Unconnected => {
                *link = Link::Connected(connected);
                Ok(())
            }
            // the session was closed while we were connecting
            _ => {
                drop(link);
                connected.shut_down().await;
                Err(SessionError::NotConnected)
            }
        }
    }

    /// register interest in one more message kind
    ///
    /// duplicates are rejected with [`strata_formats::RegistryError::DuplicateType`].
    pub fn add_subscription(&self, prototype: Box<dyn Message>) -> Result<(), SessionError> {
        let connected = match &*self.link.lock().unwrap() {
            Link::Connected(connected) => connected.clone(),
            _ => return Err(SessionError::NotConnected),
        };

        tracing::debug!(message_type = %prototype.message_type(), "adding subscription");
        let mut message_types = connected.message_types.lock().unwrap();
        message_types.add(prototype)?;
        Ok(())
    }

    /// block until the next message of a subscribed kind arrives
    pub async fn receive(&self) -> Result<Box<dyn Message>, SessionError> {
        let connected = match &*self.link.lock().unwrap() {
            Link::Connected(connected) => connected.clone(),
            _ => return Err(SessionError::NotConnected),
        };

        let mut inbox = connected.inbox.lock().await;
        let deadline = connected.time_out.map(|limit| Instant::now() + limit);

        loop {
            let frame = match deadline {
                None => inbox.recv().await,
                Some(deadline) => match tokio::time::timeout_at(deadline, inbox.recv()).await {
                    Err(_) => return Err(SessionError::Timeout),
                    Ok(frame) => frame,
                },
            };

            // the runner is gone: the session was closed or the publisher
            // hung up
            let Some(frame) = frame else {
                return Err(SessionError::NotConnected);
            };

            if let Some(message) = connected.unpack(frame) {
                return Ok(message);
            }
        }
    }

    /// the publisher's address
    pub fn peer_address(&self) -> Result<SocketAddr, SessionError> {
        match &*self.link.lock().unwrap() {
            Link::Connected(connected) => Ok(connected.peer_address),
            _ => Err(SessionError::NotConnected),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(&*self.link.lock().unwrap(), Link::Connected(_))
    }

    /// close the session and release the socket
    ///
    /// idempotent; a blocked receive returns
    /// [`SessionError::NotConnected`] promptly.
    pub async fn close(&self) {
        let previous = std::mem::replace(&mut *self.link.lock().unwrap(), Link::Closed);
        if let Link::Connected(connected) = previous {
            connected.shut_down().await;
        }
    }
}

impl Connected {
    async fn shut_down(&self) {
        let _ = self.shutdown.try_send(());

        let handle = self.handle.lock().unwrap().take();
        if let Some(mut handle) = handle {
            tokio::select! {
                result = &mut handle => { let _ = result; }
                _ = tokio::time::sleep(SHUTDOWN_GRACE) => {
                    handle.abort();
                    tracing::warn!("subscriber runner did not stop in time, aborted");
                }
            }
        }
    }

    /// materialize a frame through the registry; `None` drops the frame
    fn unpack(&self, frame: Frame) -> Option<Box<dyn Message>> {
        let created = self
            .message_types
            .lock()
            .unwrap()
            .create(frame.message_type());

        let mut message = match created {
            Ok(message) => message,
            Err(_) => {
                tracing::warn!(
                    message_type = %frame.message_type(),
                    "dropping message of an unhandled type"
                );
                return None;
            }
        };

        if let Err(error) = message.from_slice(frame.payload()) {
            tracing::warn!(
                message_type = %frame.message_type(),
                reason = %error,
                "dropping message that cannot be decoded"
            );
            return None;
        }

        Some(message)
    }
}

impl Runner {
    async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.shutdown.recv() => break,

                frame = self.frames.next() => match frame {
                    None => {
                        tracing::info!("publisher closed the connection");
                        break;
                    }
                    Some(Err(error)) => {
                        tracing::error!(reason = %error, "corrupt frame, closing the session");
                        break;
                    }
                    Some(Ok(frame)) => {
                        // a full inbox applies back-pressure here, which
                        // stops the socket reads until the caller drains it
                        if !self.inbox.send(frame).await {
                            break;
                        }
                    }
                },
            }
        }
        tracing::debug!("subscriber runner stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_formats::Text;

    #[tokio::test]
    async fn receive_before_connect_is_not_connected() {
        let subscriber = Subscriber::new();

        let error = subscriber.receive().await.unwrap_err();
        assert!(matches!(error, SessionError::NotConnected));
    }

    #[tokio::test]
    async fn connect_requires_message_types() {
        let mut options = SubscriberOptions::new();
        options.set_address("tcp://127.0.0.1:1").unwrap();

        let subscriber = Subscriber::new();
        let error = subscriber.connect(&options).await.unwrap_err();

        assert!(matches!(error, SessionError::InvalidConfiguration(_)));
        assert!(!subscriber.is_connected());
    }

    #[tokio::test]
    async fn add_subscription_requires_a_connection() {
        let subscriber = Subscriber::new();

        let error = subscriber
            .add_subscription(Box::new(Text::default()))
            .unwrap_err();
        assert!(matches!(error, SessionError::NotConnected));
    }
}
