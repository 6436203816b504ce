//! Packet stream writer

use std::io::Write;

use crate::error::{VellumError, VellumResult};
use crate::header::{self, BodyLength, HeaderFormat, PacketHeader, MIN_FIRST_PARTIAL_CHUNK};
use crate::packet::Packet;
use crate::types::PacketTag;

/// Writes packets with definite or partial lengths
pub struct PacketWriter<W: Write> {
    inner: W,
}

impl<W: Write> PacketWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    fn write_with(&mut self, packet: &Packet, format: HeaderFormat) -> VellumResult<()> {
        let body = packet.to_bytes();
        let length = u32::try_from(body.len()).map_err(|_| {
            VellumError::invalid_argument(format!("{} body of {} bytes is too long", packet.tag(), body.len()))
        })?;
        let header = PacketHeader::new(packet.tag(), format, BodyLength::Definite(length)).encode()?;
        self.inner.write_all(&header)?;
        self.inner.write_all(&body)?;
        log::trace!("wrote {} ({} bytes)", packet.tag(), body.len());
        Ok(())
    }

    /// Write `packet` with a new-format header
    pub fn write_packet(&mut self, packet: &Packet) -> VellumResult<()> {
        self.write_with(packet, HeaderFormat::New)
    }

    /// Write `packet` with an old-format header
    ///
    /// # Errors
    /// [`VellumError::InvalidArgument`] for tags above 15.
    pub fn write_packet_old_format(&mut self, packet: &Packet) -> VellumResult<()> {
        self.write_with(packet, HeaderFormat::Old)
    }

    /// Write `body` as a partial-length packet
    ///
    /// # Arguments
    ///
    /// * `tag` - Packet tag for the new-format header
    /// * `body` - Complete packet body
    /// * `chunk_power` - Chunks are `1 << chunk_power` bytes, from 9 (512) to 30
    ///
    /// Full chunks are written with partial lengths and the remainder, possibly
    /// empty, with a definite length. The body must fill at least one chunk.
    pub fn write_partial(&mut self, tag: PacketTag, body: &[u8], chunk_power: u8) -> VellumResult<()> {
        if !(9..=30).contains(&chunk_power) {
            return Err(VellumError::invalid_argument(format!(
                "partial chunk power {} outside 9..=30",
                chunk_power
            )));
        }
        let chunk = 1usize << chunk_power;
        if body.len() < chunk.max(MIN_FIRST_PARTIAL_CHUNK) {
            return Err(VellumError::invalid_argument(format!(
                "body of {} bytes is shorter than one {} byte chunk",
                body.len(),
                chunk
            )));
        }
        let first = PacketHeader::new(tag, HeaderFormat::New, BodyLength::Partial(chunk as u32)).encode()?;
        self.inner.write_all(&first)?;

        let mut rest = body;
        let mut chunks = 0usize;
        while rest.len() >= chunk {
            if chunks > 0 {
                self.inner.write_all(&[header::partial_length_octet(chunk as u32)?])?;
            }
            let (head, tail) = rest.split_at(chunk);
            self.inner.write_all(head)?;
            rest = tail;
            chunks += 1;
        }
        let mut last = Vec::with_capacity(5);
        header::encode_new_length(rest.len() as u32, &mut last);
        self.inner.write_all(&last)?;
        self.inner.write_all(rest)?;
        log::trace!("wrote {} in {} partial chunks of {} bytes", tag, chunks, chunk);
        Ok(())
    }

    pub fn flush(&mut self) -> VellumResult<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{LiteralPacket, MarkerPacket, UserIdPacket};
    use crate::reader::PacketReader;
    use bytes::Bytes;
    use hex_literal::hex;
    use proptest::prelude::*;

    #[test]
    fn test_write_new_and_old_format() {
        let uid = Packet::UserId(UserIdPacket::new(Bytes::from_static(b"bob")));
        let mut writer = PacketWriter::new(Vec::new());
        writer.write_packet(&uid).unwrap();
        writer.write_packet_old_format(&uid).unwrap();
        writer.write_packet(&Packet::Marker(MarkerPacket)).unwrap();
        let out = writer.into_inner();
        assert_eq!(out, hex!("cd 03 626f62 b4 03 626f62 ca 03 504750"));

        let packets: Vec<Packet> = PacketReader::new(&out[..]).collect::<VellumResult<_>>().unwrap();
        assert_eq!(packets, vec![uid.clone(), uid, Packet::Marker(MarkerPacket)]);
    }

    #[test]
    fn test_old_format_rejects_wide_tags() {
        let mdc = Packet::parse(PacketTag::ModDetectionCode, Bytes::from(vec![0u8; 20])).unwrap();
        let mut writer = PacketWriter::new(Vec::new());
        assert!(writer.write_packet_old_format(&mdc).is_err());
        writer.write_packet(&mdc).unwrap();
        assert_eq!(&writer.into_inner()[..2], &hex!("d3 14"));
    }

    #[test]
    fn test_write_partial_layout() {
        let body = vec![0x55u8; 1034];
        let mut writer = PacketWriter::new(Vec::new());
        writer.write_partial(PacketTag::Literal, &body, 9).unwrap();
        let out = writer.into_inner();
        assert_eq!(out[..2], hex!("cb e9"));
        assert_eq!(out[514], 0xE9);
        assert_eq!(out[1027], 10);
        assert_eq!(out.len(), 2 + 512 + 1 + 512 + 1 + 10);
    }

    #[test]
    fn test_write_partial_exact_multiple_ends_with_empty_chunk() {
        let body = vec![0u8; 1024];
        let mut writer = PacketWriter::new(Vec::new());
        writer.write_partial(PacketTag::SymEncData, &body, 9).unwrap();
        let out = writer.into_inner();
        assert_eq!(out.last(), Some(&0x00));

        let (_, stitched) = PacketReader::new(&out[..]).read_raw().unwrap().unwrap();
        assert_eq!(stitched.len(), 1024);
    }

    #[test]
    fn test_write_partial_rejects_bad_arguments() {
        let mut writer = PacketWriter::new(Vec::new());
        assert!(writer.write_partial(PacketTag::Literal, &[0u8; 100], 9).is_err());
        assert!(writer.write_partial(PacketTag::Literal, &[0u8; 600], 8).is_err());
        assert!(writer.write_partial(PacketTag::Literal, &[0u8; 600], 31).is_err());
        assert!(writer.into_inner().is_empty());
    }

    proptest! {
        #[test]
        fn prop_partial_round_trip(data in proptest::collection::vec(any::<u8>(), 0..3000), power in 9u8..=10) {
            let mut body = vec![b'b', 0, 0, 0, 0, 0];
            body.extend(std::iter::repeat_n(0u8, 1024));
            body.extend_from_slice(&data);
            let literal = LiteralPacket::parse(Bytes::from(body.clone())).unwrap();

            let mut writer = PacketWriter::new(Vec::new());
            writer.write_partial(PacketTag::Literal, &body, power).unwrap();
            let out = writer.into_inner();

            let mut reader = PacketReader::new(&out[..]);
            prop_assert_eq!(reader.read_packet().unwrap(), Some(Packet::Literal(literal)));
            prop_assert!(reader.read_packet().unwrap().is_none());
        }
    }
}
