use crate::error::SendError;

/// One side of an SMTP conversation, as seen by the session driver.
///
/// Each exchange resolves to the final line of the server's reply when it is
/// positive (2xx/3xx), and to [`SendError::NegativeReply`] carrying that line
/// otherwise.
#[async_trait::async_trait]
pub trait Exchange: Send {
    /// Wait for a reply without sending anything (the greeting).
    async fn recv(&mut self) -> Result<String, SendError>;

    /// Send one command line and wait for its reply.
    async fn send(&mut self, command: &str) -> Result<String, SendError>;

    /// Write bytes verbatim, without framing or reply.
    async fn write_raw(&mut self, data: &[u8]) -> Result<(), SendError>;

    /// Release the underlying connection. Must be safe to call after a
    /// failure.
    async fn close(&mut self);
}

#[async_trait::async_trait]
impl<E: Exchange + ?Sized> Exchange for &mut E {
    async fn recv(&mut self) -> Result<String, SendError> {
        (**self).recv().await
    }

    async fn send(&mut self, command: &str) -> Result<String, SendError> {
        (**self).send(command).await
    }

    async fn write_raw(&mut self, data: &[u8]) -> Result<(), SendError> {
        (**self).write_raw(data).await
    }

    async fn close(&mut self) {
        (**self).close().await;
    }
}
