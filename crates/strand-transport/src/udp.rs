use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use bytes::Bytes;
use strand_proto::{Frame, Opcode};
use tokio::{net::UdpSocket, sync::Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;

use crate::{
    error::TransportError,
    overlay::{decode_envelope, encode_envelope},
};

/// Datagrams larger than this are still sent and received correctly, but
/// risk IP fragmentation on real networks (spec.md §4.B: "on commodity
/// loopback, keep ≤ 8 KiB to avoid fragmentation issues"). Exceeding it logs
/// a warning rather than failing — this is operational guidance, not a wire
/// invariant.
const RECOMMENDED_MAX_DATAGRAM: usize = 8 * 1024;

/// A connection-oriented wrapper over a UDP datagram substrate, framing L5
/// messages with the overlay envelope (spec.md §4.B).
///
/// Two constructors model the two roles described by the spec: [`Transport::bind`]
/// creates a listener that services multiple peers and captures the first
/// sender's address for subsequent sends; [`Transport::dial`] creates a
/// transport fixed to one peer from the start.
pub struct Transport {
    socket: UdpSocket,
    peer: AsyncMutex<Option<SocketAddr>>,
    closed: Arc<AtomicBool>,
}

impl Transport {
    /// Bind a listener on `addr`. No peer is known until the first
    /// [`Self::recv`] captures one.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] if the socket cannot be bound.
    pub async fn bind(addr: SocketAddr) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr).await?;
        tracing::info!(local_addr = %socket.local_addr()?, "overlay transport listening");
        Ok(Self { socket, peer: AsyncMutex::new(None), closed: Arc::new(AtomicBool::new(false)) })
    }

    /// Open a transport with a fixed peer at `addr`, bound to an ephemeral
    /// local port.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] if the socket cannot be bound.
    pub async fn dial(addr: SocketAddr) -> Result<Self, TransportError> {
        let local: SocketAddr =
            if addr.is_ipv6() { "[::]:0".parse().unwrap_or_else(|_| unreachable!()) } else { "0.0.0.0:0".parse().unwrap_or_else(|_| unreachable!()) };
        let socket = UdpSocket::bind(local).await?;
        tracing::info!(peer = %addr, "overlay transport dialing");
        Ok(Self {
            socket,
            peer: AsyncMutex::new(Some(addr)),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Local address this transport is bound to.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] if the socket's address cannot be
    /// queried.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }

    /// Send one frame to the current peer.
    ///
    /// For a listener, the peer is whichever address [`Self::recv`] most
    /// recently captured; sending before any frame has been received fails
    /// with [`TransportError::NoPeer`].
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::TransportClosed`] after [`Self::close`],
    /// [`TransportError::NoPeer`] if no peer address is known yet, or
    /// [`TransportError::Cancelled`] if `ctx` fires before the datagram is
    /// sent.
    pub async fn send(
        &self,
        ctx: &CancellationToken,
        opcode: Opcode,
        payload: impl Into<Bytes>,
    ) -> Result<(), TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::TransportClosed);
        }
        let peer = self.peer.lock().await.ok_or(TransportError::NoPeer)?;
        let frame = Frame::new(opcode, payload.into());
        let frame_bytes = frame.encode()?;
        let datagram = encode_envelope(&frame_bytes);
        if datagram.len() > RECOMMENDED_MAX_DATAGRAM {
            tracing::warn!(
                size = datagram.len(),
                max = RECOMMENDED_MAX_DATAGRAM,
                "overlay datagram exceeds recommended size, may fragment"
            );
        }

        tokio::select! {
            biased;
            () = ctx.cancelled() => Err(TransportError::Cancelled),
            result = self.socket.send_to(&datagram, peer) => {
                result?;
                Ok(())
            }
        }
    }

    /// Receive one frame, blocking until a datagram arrives, `ctx` is
    /// cancelled, or the transport is closed.
    ///
    /// On a listener, the first successful receive captures its sender as
    /// the peer for subsequent [`Self::send`] calls.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::TransportClosed`] after [`Self::close`],
    /// [`TransportError::Cancelled`] if `ctx` fires first,
    /// [`TransportError::BadEnvelope`] if the datagram fails the overlay
    /// envelope check, or [`TransportError::Protocol`] if the frame itself
    /// fails to decode.
    pub async fn recv(&self, ctx: &CancellationToken) -> Result<(u8, Bytes), TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::TransportClosed);
        }

        let mut buf = vec![0u8; 64 * 1024];
        let (len, from) = tokio::select! {
            biased;
            () = ctx.cancelled() => return Err(TransportError::Cancelled),
            result = self.socket.recv_from(&mut buf) => result?,
        };
        buf.truncate(len);

        let frame_bytes = decode_envelope(&buf)?;
        let (frame, _consumed) = Frame::decode(frame_bytes)?;

        let mut peer = self.peer.lock().await;
        if peer.is_none() {
            tracing::debug!(sender = %from, "listener captured first peer");
            *peer = Some(from);
        }

        Ok((frame.opcode_byte, frame.payload))
    }

    /// Close the transport. Idempotent: repeated calls are no-ops.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Whether [`Self::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use strand_proto::Opcode;

    use super::*;

    #[tokio::test]
    async fn listener_captures_first_sender_and_round_trips() {
        let listener = Transport::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let listener_addr = listener.local_addr().unwrap();
        let dialer = Transport::dial(listener_addr).await.unwrap();
        let dialer_addr = dialer.local_addr().unwrap();

        let ctx = CancellationToken::new();
        dialer.send(&ctx, Opcode::Heartbeat, Bytes::from_static(b"ping")).await.unwrap();

        let (opcode_byte, payload) = listener.recv(&ctx).await.unwrap();
        assert_eq!(opcode_byte, Opcode::Heartbeat.to_u8());
        assert_eq!(payload.as_ref(), b"ping");

        // Listener now knows its peer and can reply without dialing.
        listener.send(&ctx, Opcode::Heartbeat, Bytes::from_static(b"pong")).await.unwrap();
        let (_, reply) = dialer.recv(&ctx).await.unwrap();
        assert_eq!(reply.as_ref(), b"pong");
        assert_eq!(dialer.peer.lock().await.unwrap(), listener_addr);
        let _ = dialer_addr;
    }

    #[tokio::test]
    async fn send_after_close_fails() {
        let a = Transport::dial("127.0.0.1:1".parse().unwrap()).await.unwrap();
        a.close();
        assert!(a.is_closed());
        let ctx = CancellationToken::new();
        let err = a.send(&ctx, Opcode::Heartbeat, Bytes::new()).await.unwrap_err();
        assert!(matches!(err, TransportError::TransportClosed));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let a = Transport::dial("127.0.0.1:1".parse().unwrap()).await.unwrap();
        a.close();
        a.close();
        assert!(a.is_closed());
    }

    #[tokio::test]
    async fn recv_is_cancellable() {
        let listener = Transport::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let ctx = CancellationToken::new();
        ctx.cancel();
        let err = listener.recv(&ctx).await.unwrap_err();
        assert!(matches!(err, TransportError::Cancelled));
    }

    #[tokio::test]
    async fn large_payload_round_trips() {
        let listener = Transport::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let listener_addr = listener.local_addr().unwrap();
        let dialer = Transport::dial(listener_addr).await.unwrap();

        let payload = vec![0xABu8; 8000];
        let ctx = CancellationToken::new();
        dialer.send(&ctx, Opcode::TensorTransfer, payload.clone()).await.unwrap();
        let (opcode_byte, received) = listener.recv(&ctx).await.unwrap();
        assert_eq!(opcode_byte, Opcode::TensorTransfer.to_u8());
        assert_eq!(received.as_ref(), payload.as_slice());
    }
}
