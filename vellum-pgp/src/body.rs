//! Bounds-checked cursor over a packet body

use bytes::{Buf, Bytes};

use crate::error::{VellumError, VellumResult};
use crate::mpi::Mpi;

/// Reads fields from a packet body, failing with a structural error naming
/// the packet instead of panicking when the body is short
pub(crate) struct BodyCursor {
    data: Bytes,
    context: &'static str,
}

impl BodyCursor {
    pub(crate) fn new(data: Bytes, context: &'static str) -> Self {
        Self { data, context }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.remaining()
    }

    pub(crate) fn is_empty(&self) -> bool {
        !self.data.has_remaining()
    }

    pub(crate) fn error(&self, message: impl std::fmt::Display) -> VellumError {
        VellumError::structural(format!("{}: {}", self.context, message))
    }

    fn need(&self, count: usize) -> VellumResult<()> {
        if self.remaining() < count {
            return Err(self.error(format_args!(
                "truncated body, needed {} bytes but only {} remain",
                count,
                self.remaining()
            )));
        }
        Ok(())
    }

    pub(crate) fn u8(&mut self) -> VellumResult<u8> {
        self.need(1)?;
        Ok(self.data.get_u8())
    }

    pub(crate) fn u16(&mut self) -> VellumResult<u16> {
        self.need(2)?;
        Ok(self.data.get_u16())
    }

    pub(crate) fn u32(&mut self) -> VellumResult<u32> {
        self.need(4)?;
        Ok(self.data.get_u32())
    }

    pub(crate) fn array<const N: usize>(&mut self) -> VellumResult<[u8; N]> {
        self.need(N)?;
        let mut out = [0u8; N];
        self.data.copy_to_slice(&mut out);
        Ok(out)
    }

    /// The next `count` bytes, sharing the body buffer
    pub(crate) fn bytes(&mut self, count: usize) -> VellumResult<Bytes> {
        self.need(count)?;
        Ok(self.data.split_to(count))
    }

    /// Everything left in the body
    pub(crate) fn rest(&mut self) -> Bytes {
        std::mem::take(&mut self.data)
    }

    pub(crate) fn mpi(&mut self) -> VellumResult<Mpi> {
        let bits = self.u16()?;
        let magnitude = self.bytes(usize::from(bits).div_ceil(8))?;
        Mpi::from_parts(bits, magnitude).map_err(|e| match e {
            VellumError::Structural(message) => self.error(message),
            other => other,
        })
    }

    /// MPIs up to the end of the body
    pub(crate) fn mpis_to_end(&mut self) -> VellumResult<Vec<Mpi>> {
        let mut mpis = Vec::new();
        while !self.is_empty() {
            mpis.push(self.mpi()?);
        }
        Ok(mpis)
    }

    /// Fails if anything is left unread
    pub(crate) fn finish(self) -> VellumResult<()> {
        if self.data.has_remaining() {
            return Err(self.error(format_args!("{} trailing bytes", self.data.remaining())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_reads_and_bounds() {
        let mut cursor = BodyCursor::new(Bytes::from(hex!("01 0203 04050607 0809").to_vec()), "test");
        assert_eq!(cursor.u8().unwrap(), 0x01);
        assert_eq!(cursor.u16().unwrap(), 0x0203);
        assert_eq!(cursor.u32().unwrap(), 0x0405_0607);
        assert_eq!(cursor.remaining(), 2);
        let err = cursor.u32().unwrap_err();
        assert!(err.to_string().contains("test: truncated body"));
        assert_eq!(cursor.array::<2>().unwrap(), [0x08, 0x09]);
        cursor.finish().unwrap();
    }

    #[test]
    fn test_mpi_list() {
        let mut cursor = BodyCursor::new(Bytes::from(hex!("0009 01ff 0001 01").to_vec()), "test");
        let mpis = cursor.mpis_to_end().unwrap();
        assert_eq!(mpis.len(), 2);
        assert_eq!(mpis[0].bits(), 9);
        assert_eq!(mpis[1].magnitude().as_ref(), &[0x01]);

        let mut short = BodyCursor::new(Bytes::from(hex!("0010 01").to_vec()), "test");
        assert!(short.mpi().is_err());
    }
}
