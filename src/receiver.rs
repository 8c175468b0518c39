use crate::common::{AudioPacket, AUDIO_PACKET_SIZE};
use crate::error::ReceiveError;
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

/// Kernel receive buffer, in packets. Anything older than this backlog is
/// dropped by the kernel, so reads stay close to realtime.
pub const RECV_BUFFER_PACKETS: usize = 5;

/// Somewhere audio packets come from.
pub trait PacketSource {
    /// Waits a bounded time for the next packet.
    ///
    /// `Ok(None)` means nothing arrived in time. That is the normal state
    /// while the stream is stopped, and is reported on every call.
    fn receive(&mut self) -> Result<Option<AudioPacket<'_>>, ReceiveError>;
}

pub struct UdpReceiver {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl UdpReceiver {
    pub fn bind(addr: SocketAddr, timeout: Duration) -> Result<UdpReceiver, ReceiveError> {
        let socket = UdpSocket::bind(addr).map_err(|source| ReceiveError::Bind { addr, source })?;

        socket
            .set_read_timeout(Some(timeout))
            .map_err(|source| ReceiveError::SocketOption {
                what: "read timeout",
                source,
            })?;
        set_recv_buffer(&socket, AUDIO_PACKET_SIZE * RECV_BUFFER_PACKETS).map_err(|source| {
            ReceiveError::SocketOption {
                what: "receive buffer size",
                source,
            }
        })?;

        Ok(UdpReceiver {
            socket,
            buf: vec![0; AUDIO_PACKET_SIZE],
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl PacketSource for UdpReceiver {
    fn receive(&mut self) -> Result<Option<AudioPacket<'_>>, ReceiveError> {
        match self.socket.recv_from(&mut self.buf) {
            // An empty datagram carries no audio; same as no datagram.
            Ok((0, _)) => Ok(None),
            Ok((len, peer)) => {
                log::trace!("{} bytes from {}", len, peer);
                Ok(Some(AudioPacket(&self.buf[..len])))
            }
            Err(err) if is_timeout(&err) => Ok(None),
            Err(err) => Err(ReceiveError::Recv(err)),
        }
    }
}

/// Unix reports an expired read timeout as WouldBlock, Windows as TimedOut.
/// A read cut short by a signal (Interrupted) also counts as no packet.
fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}

#[cfg(unix)]
fn set_recv_buffer(socket: &UdpSocket, bytes: usize) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let size = bytes as libc::c_int;
    // SAFETY: the fd is owned by `socket` and outlives the call,
    // and optval points at a c_int of the length we pass.
    let ret = unsafe {
        libc::setsockopt(
            socket.as_raw_fd(),
            libc::SOL_SOCKET,
            libc::SO_RCVBUF,
            &size as *const libc::c_int as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_recv_buffer(_socket: &UdpSocket, bytes: usize) -> io::Result<()> {
    log::warn!(
        "cannot size receive buffer to {} bytes on this platform, stale packets may queue",
        bytes
    );
    Ok(())
}
