//! Packet stream reader

use std::io::{self, Read};

use bytes::Bytes;
use vellum_core::config::PacketReaderConfig;

use crate::error::{VellumError, VellumResult};
use crate::header::{self, BodyLength, PacketHeader};
use crate::packet::Packet;
use crate::types::PacketTag;

/// Reads a partial-length body as one logical stream
///
/// Chunk length octets between chunks are consumed transparently; the stream
/// ends after the first chunk announced with a definite length.
pub struct PartialBodyReader<'a, R: Read> {
    inner: &'a mut R,
    config: &'a PacketReaderConfig,
    /// Bytes left in the current chunk
    remaining: usize,
    /// The current chunk is the final one
    last: bool,
    chunks: usize,
    total: usize,
    failure: Option<VellumError>,
}

impl<'a, R: Read> PartialBodyReader<'a, R> {
    /// Start reading after a header that announced a first partial chunk
    ///
    /// # Arguments
    ///
    /// * `inner` - Stream positioned at the first chunk's data
    /// * `first_chunk` - Length of the first chunk, from the packet header
    /// * `config` - Bounds on the stitched body
    pub fn new(inner: &'a mut R, first_chunk: u32, config: &'a PacketReaderConfig) -> VellumResult<Self> {
        let mut reader = Self {
            inner,
            config,
            remaining: 0,
            last: false,
            chunks: 0,
            total: 0,
            failure: None,
        };
        reader.begin_chunk(first_chunk as usize, false)?;
        Ok(reader)
    }

    fn begin_chunk(&mut self, length: usize, last: bool) -> VellumResult<()> {
        self.chunks += 1;
        if self.chunks > self.config.max_partial_chunks {
            return Err(VellumError::structural(format!(
                "partial body exceeds {} chunks",
                self.config.max_partial_chunks
            )));
        }
        self.total = self.total.saturating_add(length);
        if self.total > self.config.max_packet_length {
            return Err(VellumError::structural(format!(
                "partial body exceeds maximum packet length {}",
                self.config.max_packet_length
            )));
        }
        self.remaining = length;
        self.last = last;
        Ok(())
    }

    fn next_chunk(&mut self) -> VellumResult<()> {
        match header::read_new_length(&mut *self.inner)? {
            BodyLength::Partial(length) => self.begin_chunk(length as usize, false),
            BodyLength::Definite(length) => self.begin_chunk(length as usize, true),
            BodyLength::Indeterminate => Err(VellumError::structural(
                "indeterminate length inside a partial body",
            )),
        }
    }

    fn fail(&mut self, err: VellumError) -> io::Error {
        let io_err = io::Error::new(io::ErrorKind::InvalidData, err.to_string());
        self.failure = Some(err);
        io_err
    }

    /// Number of chunks seen so far
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Read the whole stitched body
    pub fn read_body(mut self) -> VellumResult<Vec<u8>> {
        let mut body = Vec::new();
        match self.read_to_end(&mut body) {
            Ok(_) => Ok(body),
            Err(err) => Err(self.failure.take().unwrap_or(VellumError::Io(err))),
        }
    }
}

impl<R: Read> Read for PartialBodyReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.remaining == 0 {
            if self.last {
                return Ok(0);
            }
            if let Err(err) = self.next_chunk() {
                return Err(self.fail(err));
            }
        }
        let want = buf.len().min(self.remaining);
        let n = self.inner.read(&mut buf[..want])?;
        if n == 0 {
            let err = VellumError::structural(format!(
                "partial body truncated with {} bytes of chunk {} missing",
                self.remaining, self.chunks
            ));
            return Err(self.fail(err));
        }
        self.remaining -= n;
        Ok(n)
    }
}

/// Reads one packet at a time from a byte stream
///
/// ```
/// use vellum_pgp::{Packet, PacketReader};
///
/// let data = [0xCD, 0x03, b'b', b'o', b'b'];
/// let mut reader = PacketReader::new(&data[..]);
/// match reader.read_packet().unwrap() {
///     Some(Packet::UserId(uid)) => assert_eq!(uid.id().as_ref(), b"bob"),
///     other => panic!("unexpected {:?}", other),
/// }
/// assert!(reader.read_packet().unwrap().is_none());
/// ```
pub struct PacketReader<R: Read> {
    inner: R,
    /// First header octet taken by `next_packet_tag`
    peeked: Option<u8>,
    config: PacketReaderConfig,
}

impl<R: Read> PacketReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, PacketReaderConfig::default())
    }

    pub fn with_config(inner: R, config: PacketReaderConfig) -> Self {
        Self {
            inner,
            peeked: None,
            config,
        }
    }

    pub fn config(&self) -> &PacketReaderConfig {
        &self.config
    }

    fn peek_octet(&mut self) -> VellumResult<Option<u8>> {
        if self.peeked.is_none() {
            let mut buf = [0u8; 1];
            loop {
                match self.inner.read(&mut buf) {
                    Ok(0) => return Ok(None),
                    Ok(_) => {
                        self.peeked = Some(buf[0]);
                        break;
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Ok(self.peeked)
    }

    /// Tag of the next packet without consuming it
    ///
    /// # Returns
    ///
    /// `None` at the end of the stream. Repeated calls return the same tag
    /// until the packet is read.
    pub fn next_packet_tag(&mut self) -> VellumResult<Option<PacketTag>> {
        match self.peek_octet()? {
            Some(first) => PacketHeader::tag_of(first).map(Some),
            None => Ok(None),
        }
    }

    /// Header and raw body of the next packet
    pub fn read_raw(&mut self) -> VellumResult<Option<(PacketHeader, Bytes)>> {
        let Some(first) = self.peek_octet()? else {
            return Ok(None);
        };
        self.peeked = None;
        let header = PacketHeader::read_after(first, &mut self.inner)?;
        let max = self.config.max_packet_length;
        let body = match header.length() {
            BodyLength::Definite(length) => {
                let length = length as usize;
                if length > max {
                    return Err(VellumError::structural(format!(
                        "{} length {} exceeds maximum {}",
                        header.tag(),
                        length,
                        max
                    )));
                }
                let mut body = Vec::new();
                (&mut self.inner).take(length as u64).read_to_end(&mut body)?;
                if body.len() != length {
                    return Err(VellumError::structural(format!(
                        "{} truncated: announced {} bytes, got {}",
                        header.tag(),
                        length,
                        body.len()
                    )));
                }
                body
            }
            BodyLength::Partial(first_chunk) => {
                let reader = PartialBodyReader::new(&mut self.inner, first_chunk, &self.config)?;
                let body = reader.read_body()?;
                log::trace!("stitched partial body of {} bytes", body.len());
                body
            }
            BodyLength::Indeterminate => {
                log::warn!("{} with indeterminate length, reading to end of stream", header.tag());
                let mut body = Vec::new();
                (&mut self.inner).take(max as u64 + 1).read_to_end(&mut body)?;
                if body.len() > max {
                    return Err(VellumError::structural(format!(
                        "{} exceeds maximum length {}",
                        header.tag(),
                        max
                    )));
                }
                body
            }
        };
        log::trace!("read {} ({} bytes)", header.tag(), body.len());
        Ok(Some((header, Bytes::from(body))))
    }

    /// Read and decode exactly one packet
    ///
    /// # Returns
    ///
    /// `None` when the stream ends cleanly between packets.
    pub fn read_packet(&mut self) -> VellumResult<Option<Packet>> {
        match self.read_raw()? {
            Some((header, body)) => Packet::parse(header.tag(), body).map(Some),
            None => Ok(None),
        }
    }

    /// The underlying stream; a peeked header octet is lost
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Iterator for PacketReader<R> {
    type Item = VellumResult<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_packet().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_peek_does_not_consume() {
        let data = hex!("cd 03 626f62 b4 03 616c69");
        let mut reader = PacketReader::new(&data[..]);
        assert_eq!(reader.next_packet_tag().unwrap(), Some(PacketTag::UserId));
        assert_eq!(reader.next_packet_tag().unwrap(), Some(PacketTag::UserId));
        let packets: Vec<Packet> = reader.by_ref().collect::<VellumResult<_>>().unwrap();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[1].to_bytes().as_ref(), b"ali");
        assert_eq!(reader.next_packet_tag().unwrap(), None);
    }

    #[test]
    fn test_partial_body_stitching() {
        // 512 + 512 + 10 bytes of literal data
        let mut content = vec![b'b', 0, 0, 0, 0, 0];
        content.extend((0..1028).map(|i| i as u8));
        assert_eq!(content.len(), 1034);

        let mut data = vec![0xCB, 0xE9];
        data.extend_from_slice(&content[..512]);
        data.push(0xE9);
        data.extend_from_slice(&content[512..1024]);
        data.push(10);
        data.extend_from_slice(&content[1024..]);
        data.extend_from_slice(&hex!("cd 01 78"));

        let mut reader = PacketReader::new(&data[..]);
        let (header, body) = reader.read_raw().unwrap().unwrap();
        assert_eq!(header.length(), BodyLength::Partial(512));
        assert_eq!(body.as_ref(), &content[..]);

        match Packet::parse(header.tag(), body).unwrap() {
            Packet::Literal(literal) => assert_eq!(literal.data().len(), 1028),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(reader.next_packet_tag().unwrap(), Some(PacketTag::UserId));
    }

    #[test]
    fn test_partial_body_limits() {
        let mut data = vec![0xCB, 0xE9];
        data.extend_from_slice(&[0u8; 512]);
        data.push(0xE9);
        data.extend_from_slice(&[0u8; 512]);
        data.push(0);

        let config = PacketReaderConfig::default().with_max_partial_chunks(2);
        let err = PacketReader::with_config(&data[..], config).read_raw().unwrap_err();
        assert!(err.to_string().contains("chunks"));

        let config = PacketReaderConfig::default().with_max_packet_length(1000);
        let err = PacketReader::with_config(&data[..], config).read_raw().unwrap_err();
        assert!(err.to_string().contains("maximum packet length"));

        assert!(PacketReader::new(&data[..]).read_raw().is_ok());
    }

    #[test]
    fn test_truncated_partial_body() {
        let mut data = vec![0xCB, 0xE9];
        data.extend_from_slice(&[0u8; 100]);
        let err = PacketReader::new(&data[..]).read_raw().unwrap_err();
        assert!(matches!(err, VellumError::Structural(_)));
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_truncated_definite_body() {
        let data = hex!("cd 64 626f62");
        let err = PacketReader::new(&data[..]).read_packet().unwrap_err();
        assert!(matches!(err, VellumError::Structural(_)));

        let config = PacketReaderConfig::default().with_max_packet_length(2);
        let err = PacketReader::with_config(&hex!("cd 03 626f62")[..], config)
            .read_packet()
            .unwrap_err();
        assert!(err.to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_old_format_indeterminate_reads_to_end() {
        let data = hex!("b7 616c696365");
        let mut reader = PacketReader::new(&data[..]);
        let packet = reader.read_packet().unwrap().unwrap();
        assert_eq!(packet.to_bytes().as_ref(), b"alice");
        assert!(reader.read_packet().unwrap().is_none());
    }

    #[test]
    fn test_invalid_header_octet() {
        let err = PacketReader::new(&hex!("3f 00")[..]).next_packet_tag().unwrap_err();
        assert!(matches!(err, VellumError::Structural(_)));
    }
}
