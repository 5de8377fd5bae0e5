use std::{
    io::{self, Read, Write},
    net::{Shutdown, TcpStream},
};

use log::{trace, warn};

use crate::constants::{MAX_TX_QUEUE_SIZE, PLAINTEXT_FOOTER_SIZE, PLAINTEXT_HEADER_PADDING};

use super::{ApiError, FrameHelper, MessageInfo, ReadFrame};

const INDICATOR: u8 = 0x00;
const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;
const READ_CHUNK: usize = 512;

/// Byte stream a frame helper can sit on. Reads and writes are expected to
/// be non-blocking and report `WouldBlock` instead of waiting.
pub trait FrameStream: Read + Write {
    fn shutdown(&mut self) -> io::Result<()>;
}

impl FrameStream for TcpStream {
    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// Unencrypted framing: `0x00`, varint payload size, varint message type,
/// payload.
pub struct PlaintextFrameHelper<S: FrameStream> {
    stream: S,
    peer_name: String,
    rx_buffer: Vec<u8>,
    // bytes the socket refused; always sent before anything newer
    tx_buffer: Vec<u8>,
    tx_limit: usize,
    closed: bool,
}

impl<S: FrameStream> PlaintextFrameHelper<S> {
    pub fn new(stream: S, peer_name: &str) -> Self {
        Self {
            stream,
            peer_name: peer_name.to_string(),
            rx_buffer: Vec::new(),
            tx_buffer: Vec::new(),
            tx_limit: MAX_TX_QUEUE_SIZE,
            closed: false,
        }
    }

    /// Caps the bytes held back for a blocked socket. Writes that would
    /// push the queue past `limit` fail with [`ApiError::WouldBlock`].
    pub fn with_tx_limit(mut self, limit: usize) -> Self {
        self.tx_limit = limit;
        self
    }

    pub fn stream(&self) -> &S {
        &self.stream
    }

    /// Bytes waiting behind a socket that would have blocked
    pub fn pending_tx(&self) -> usize {
        self.tx_buffer.len()
    }

    fn check_open(&self) -> Result<(), ApiError> {
        if self.closed {
            return Err(ApiError::Closed);
        }
        Ok(())
    }

    /// Writes as much of `data` as the socket takes and returns how much
    /// that was
    fn write_some(&mut self, data: &[u8]) -> Result<usize, ApiError> {
        let mut sent = 0;
        while sent < data.len() {
            match self.stream.write(&data[sent..]) {
                Ok(0) => return Err(ApiError::ConnectionClosed),
                Ok(count) => sent += count,
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => break,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(ApiError::SocketWrite(error.kind())),
            }
        }
        Ok(sent)
    }

    fn try_send_tx_buffer(&mut self) -> Result<(), ApiError> {
        if self.tx_buffer.is_empty() {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.tx_buffer);
        let result = self.write_some(&pending);
        let sent = match result {
            Ok(sent) => sent,
            Err(error) => {
                self.tx_buffer = pending;
                return Err(error);
            }
        };
        self.tx_buffer = pending;
        self.tx_buffer.drain(..sent);
        Ok(())
    }

    /// Writes `data` or queues what the socket refuses. A write that does
    /// not fit the queue is refused as a whole.
    fn write_raw(&mut self, data: &[u8]) -> Result<(), ApiError> {
        self.try_send_tx_buffer()?;
        if !self.tx_buffer.is_empty() {
            if self.tx_buffer.len() + data.len() > self.tx_limit {
                trace!(
                    "{}: {} bytes already queued, refusing {} more",
                    self.peer_name,
                    self.tx_buffer.len(),
                    data.len()
                );
                return Err(ApiError::WouldBlock);
            }
            self.tx_buffer.extend_from_slice(data);
            return self.try_send_tx_buffer();
        }
        let sent = self.write_some(data)?;
        if sent < data.len() {
            trace!(
                "{}: socket took {} of {} bytes, queueing the rest",
                self.peer_name,
                sent,
                data.len()
            );
            self.tx_buffer.extend_from_slice(&data[sent..]);
        }
        Ok(())
    }

    fn parse_frame(&mut self) -> Result<Option<ReadFrame>, ApiError> {
        let Some(&indicator) = self.rx_buffer.first() else {
            return Ok(None);
        };
        if indicator != INDICATOR {
            return Err(ApiError::BadIndicator { indicator });
        }
        let Some((size, size_len)) = read_varint(&self.rx_buffer[1..], 3)? else {
            return Ok(None);
        };
        let type_start = 1 + size_len;
        let Some((message_type, type_len)) = read_varint(&self.rx_buffer[type_start..], 3)?
        else {
            return Ok(None);
        };
        let size = size as usize;
        if size > MAX_PAYLOAD_SIZE {
            return Err(ApiError::FrameTooLarge {
                size,
                max: MAX_PAYLOAD_SIZE,
            });
        }
        let message_type = u16::try_from(message_type).map_err(|_| ApiError::BadDataPacket {
            reason: "message type out of range",
        })?;
        let header_len = type_start + type_len;
        if self.rx_buffer.len() < header_len + size {
            return Ok(None);
        }
        let payload = self.rx_buffer[header_len..header_len + size].to_vec();
        self.rx_buffer.drain(..header_len + size);
        Ok(Some(ReadFrame {
            message_type,
            payload,
        }))
    }
}

/// Decodes a varint of at most `max_len` bytes. `None` means the varint has
/// not fully arrived yet.
fn read_varint(bytes: &[u8], max_len: usize) -> Result<Option<(u32, usize)>, ApiError> {
    let mut value: u32 = 0;
    for (index, byte) in bytes.iter().take(max_len).enumerate() {
        value |= u32::from(byte & 0x7f) << (7 * index);
        if byte & 0x80 == 0 {
            return Ok(Some((value, index + 1)));
        }
    }
    if bytes.len() >= max_len {
        return Err(ApiError::BadDataPacket {
            reason: "header varint too long",
        });
    }
    Ok(None)
}

/// Writes `value` as a varint into the end of `out`, returning how many
/// bytes it took
fn varint_bytes(mut value: usize, out: &mut [u8; 3]) -> usize {
    let mut len = 0;
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out[len] = byte;
            return len + 1;
        }
        out[len] = byte | 0x80;
        len += 1;
    }
}

/// Builds the header for one frame. Fails if it would not fit the padding.
fn frame_header(message_type: u16, payload_size: usize) -> Result<Vec<u8>, ApiError> {
    if payload_size > MAX_PAYLOAD_SIZE {
        return Err(ApiError::FrameTooLarge {
            size: payload_size,
            max: MAX_PAYLOAD_SIZE,
        });
    }
    let mut size_bytes = [0u8; 3];
    let size_len = varint_bytes(payload_size, &mut size_bytes);
    let mut type_bytes = [0u8; 3];
    let type_len = varint_bytes(usize::from(message_type), &mut type_bytes);

    let mut header = Vec::with_capacity(PLAINTEXT_HEADER_PADDING);
    header.push(INDICATOR);
    header.extend_from_slice(&size_bytes[..size_len]);
    header.extend_from_slice(&type_bytes[..type_len]);
    if header.len() > PLAINTEXT_HEADER_PADDING {
        return Err(ApiError::BadDataPacket {
            reason: "header does not fit its padding",
        });
    }
    Ok(header)
}

impl<S: FrameStream> FrameHelper for PlaintextFrameHelper<S> {
    fn init(&mut self) -> Result<(), ApiError> {
        self.check_open()
    }

    fn poll(&mut self) -> Result<(), ApiError> {
        self.check_open()?;
        self.try_send_tx_buffer()
    }

    fn read_frame(&mut self) -> Result<Option<ReadFrame>, ApiError> {
        self.check_open()?;
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(frame) = self.parse_frame()? {
                return Ok(Some(frame));
            }
            match self.stream.read(&mut chunk) {
                Ok(0) => return Err(ApiError::ConnectionClosed),
                Ok(count) => self.rx_buffer.extend_from_slice(&chunk[..count]),
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(ApiError::SocketRead(error.kind())),
            }
        }
    }

    fn can_write_without_blocking(&self) -> bool {
        !self.closed && self.tx_buffer.is_empty()
    }

    fn write_messages(
        &mut self,
        buffer: &mut Vec<u8>,
        messages: &[MessageInfo],
    ) -> Result<(), ApiError> {
        self.check_open()?;
        if messages.is_empty() {
            return Ok(());
        }

        // Frames are compacted to the front of the buffer: each header is
        // written right-aligned into its padding and the frame is moved down
        // to the write cursor, which never passes the frame's own start.
        let mut cursor = 0;
        for message in messages {
            let header = frame_header(message.message_type, message.payload_size)?;
            let payload_start = message.offset + PLAINTEXT_HEADER_PADDING;
            let payload_end = payload_start + message.payload_size;
            if payload_end > buffer.len() {
                return Err(ApiError::BadDataPacket {
                    reason: "message extends past the write buffer",
                });
            }
            let frame_start = payload_start - header.len();
            buffer[frame_start..payload_start].copy_from_slice(&header);
            buffer.copy_within(frame_start..payload_end, cursor);
            cursor += payload_end - frame_start;
        }

        let frames = std::mem::take(buffer);
        let result = self.write_raw(&frames[..cursor]);
        *buffer = frames;
        result
    }

    fn header_padding(&self) -> usize {
        PLAINTEXT_HEADER_PADDING
    }

    fn footer_size(&self) -> usize {
        PLAINTEXT_FOOTER_SIZE
    }

    fn close(&mut self) -> Result<(), ApiError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.rx_buffer.clear();
        if !self.tx_buffer.is_empty() {
            warn!(
                "{}: dropping {} unsent bytes on close",
                self.peer_name,
                self.tx_buffer.len()
            );
            self.tx_buffer.clear();
        }
        self.stream
            .shutdown()
            .map_err(|error| ApiError::CloseFailed(error.kind()))
    }

    fn peer_name(&self) -> &str {
        &self.peer_name
    }
}
