//! Defines types and interfaces that drivers use to interact with the
//! host.
//!
//! A driver never inherits behavior from the host. Instead it is
//! handed two capabilities: a `PropertySink`, through which it
//! announces new values of the properties it manages, and a
//! `CommandSource`, from which it receives commands the host forwards
//! on behalf of a user.

use crate::{Error, Result, Value};
use std::future::Future;
use std::pin::Pin;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::{wrappers::ReceiverStream, Stream, StreamExt};

mod config;

pub use config::DriverConfig;

/// Accepts named, typed property updates from a driver.
///
/// Each driver instance is given its own sink so the names are
/// relative to the device the driver manages (`running`,
/// `remaining-duration`, etc.) The host decides what to do with the
/// value; it may store it, display it or forward it elsewhere.
pub trait PropertySink: Send + Sync {
    fn report(
        &self,
        name: &'static str,
        value: Value,
    ) -> impl Future<Output = ()> + Send;
}

/// The commands a host can forward to a driver.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Asks the driver to refresh its view of the hardware as soon as
    /// it's allowed to.
    Refresh,

    /// Asks the driver to set the named property to a value.
    Set(String, Value),
}

/// A closure type that defines how a driver replies to a command. It
/// can return `Ok()` to show what value was actually used or `Err()`
/// to indicate the command was rejected.
pub type SettingReply = Box<dyn FnOnce(Result<Value>) + Send>;

pub type CommandTransaction = (Command, SettingReply);

/// Delivers commands to a driver.
pub trait CommandSource: Send {
    /// Returns the next command, or `None` if the host will never
    /// send another one.
    fn next_command(
        &mut self,
    ) -> impl Future<Output = Option<CommandTransaction>> + Send;
}

/// This type represents the data that is transferred in the
/// communication channel between a host and a `ChannelSource`.
pub type CommandRequest = (Command, oneshot::Sender<Result<Value>>);

/// Used by a host to send commands to a driver.
pub type TxCommand = mpsc::Sender<CommandRequest>;

type CommandStream =
    Pin<Box<dyn Stream<Item = CommandTransaction> + Send>>;

/// A `CommandSource` fed by an `mpsc` channel. Each command carries a
/// `oneshot` which receives the driver's reply.
pub struct ChannelSource {
    stream: CommandStream,
}

impl ChannelSource {
    /// Creates a command channel with room for `depth` pending
    /// commands. The sending half is given to the host.
    pub fn new(depth: usize) -> (TxCommand, Self) {
        let (tx, rx) = mpsc::channel(depth);

        (tx, ChannelSource::from_receiver(rx))
    }

    // Wraps the receive handle in a stream which turns each reply
    // `oneshot` into a `SettingReply` closure. If the requester has
    // given up waiting, the reply is silently dropped.

    pub fn from_receiver(rx: mpsc::Receiver<CommandRequest>) -> Self {
        ChannelSource {
            stream: Box::pin(ReceiverStream::new(rx).map(|(cmd, tx_rpy)| {
                let f: SettingReply = Box::new(|v: Result<Value>| {
                    let _ = tx_rpy.send(v);
                });

                (cmd, f)
            })),
        }
    }
}

impl CommandSource for ChannelSource {
    fn next_command(
        &mut self,
    ) -> impl Future<Output = Option<CommandTransaction>> + Send {
        self.stream.next()
    }
}

/// Sends a command through a `TxCommand` handle and waits for the
/// driver's reply.
pub async fn send_command(tx: &TxCommand, cmd: Command) -> Result<Value> {
    let (tx_rpy, rx_rpy) = oneshot::channel();

    tx.send((cmd, tx_rpy)).await?;
    rx_rpy.await.map_err(Error::from)?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_source() {
        let (tx, mut src) = ChannelSource::new(20);
        let (os_tx, os_rx) = oneshot::channel();

        // Assert we can send to an active channel.

        assert!(tx
            .send((Command::Set("running".into(), true.into()), os_tx))
            .await
            .is_ok());

        // Assert there's an item in the stream and it's the command
        // we sent.

        let (cmd, reply) = src.next_command().await.unwrap();

        assert_eq!(cmd, Command::Set("running".into(), Value::Bool(true)));

        // Send back the reply -- changing it to `false`. Verify the
        // received reply is also `false`.

        reply(Ok(false.into()));

        assert_eq!(os_rx.await.unwrap(), Ok(Value::Bool(false)));

        // Dropping the sender ends the stream.

        std::mem::drop(tx);

        assert!(src.next_command().await.is_none());
    }

    #[tokio::test]
    async fn test_send_command() {
        let (tx, mut src) = ChannelSource::new(4);

        let driver = tokio::spawn(async move {
            while let Some((cmd, reply)) = src.next_command().await {
                match cmd {
                    Command::Refresh => reply(Ok(Value::Bool(true))),
                    Command::Set(_, v) => {
                        reply(Err(Error::InvArgument(format!("no {}", v))))
                    }
                }
            }
        });

        assert_eq!(
            send_command(&tx, Command::Refresh).await,
            Ok(Value::Bool(true))
        );
        assert!(matches!(
            send_command(&tx, Command::Set("mode".into(), 1.into())).await,
            Err(Error::InvArgument(_))
        ));

        std::mem::drop(tx);
        driver.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_command_without_driver() {
        let (tx, src) = ChannelSource::new(4);

        std::mem::drop(src);

        assert!(matches!(
            send_command(&tx, Command::Refresh).await,
            Err(Error::MissingPeer(_))
        ));
    }
}
