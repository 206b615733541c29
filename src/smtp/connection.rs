use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpStream,
};

use crate::{
    error::SendError, incoming, internal, mail::CRLF, outgoing, traits::exchange::Exchange,
};

use super::{
    command::display_token,
    reply::{is_last_reply, is_positive_reply},
};

/// A client connection to an SMTP server.
pub struct Connection<Stream: AsyncRead + AsyncWrite + Unpin + Send> {
    stream: BufReader<Stream>,
}

impl Connection<TcpStream> {
    /// Open a TCP connection to `address` (`host:port`).
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Io`] if the connection cannot be established.
    pub async fn connect(address: &str) -> Result<Self, SendError> {
        internal!("Connecting to {address}");
        Ok(Self::new(TcpStream::connect(address).await?))
    }
}

impl<Stream: AsyncRead + AsyncWrite + Unpin + Send> Connection<Stream> {
    pub fn new(stream: Stream) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    /// Write `command` followed by CRLF.
    pub(crate) async fn send_line(&mut self, command: &str) -> Result<(), SendError> {
        outgoing!(level = INFO, "send: {}", display_token(command));

        let stream = self.stream.get_mut();
        stream.write_all(format!("{command}{CRLF}").as_bytes()).await?;
        stream.flush().await?;

        Ok(())
    }

    /// Read lines until the final line of a reply arrives.
    pub(crate) async fn recv_line(&mut self) -> Result<String, SendError> {
        let mut buffer = Vec::new();

        loop {
            buffer.clear();
            if self.stream.read_until(b'\n', &mut buffer).await? == 0 {
                return Err(SendError::ConnectionClosed);
            }

            let line = String::from_utf8_lossy(&buffer);
            let line = line.trim_end_matches(['\r', '\n']);
            incoming!(level = INFO, "recv: {line}");

            if is_last_reply(line) {
                return if is_positive_reply(line) {
                    Ok(line.to_string())
                } else {
                    Err(SendError::NegativeReply(line.to_string()))
                };
            }
        }
    }
}

#[async_trait::async_trait]
impl<Stream: AsyncRead + AsyncWrite + Unpin + Send> Exchange for Connection<Stream> {
    async fn recv(&mut self) -> Result<String, SendError> {
        self.recv_line().await
    }

    async fn send(&mut self, command: &str) -> Result<String, SendError> {
        self.send_line(command).await?;
        self.recv_line().await
    }

    async fn write_raw(&mut self, data: &[u8]) -> Result<(), SendError> {
        let stream = self.stream.get_mut();
        stream.write_all(data).await?;
        stream.flush().await?;

        Ok(())
    }

    async fn close(&mut self) {
        if let Err(err) = self.stream.get_mut().shutdown().await {
            internal!("Error closing connection: {err}");
        }
    }
}
