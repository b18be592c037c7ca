use std::net::Ipv4Addr;

use bitstream_io::{BitRead, BitReader, BitWrite, BitWriter, Endianness};

use super::{
    ParseError,
    common::PacketComponent,
    enums::{DnsResourceClass, DnsResourceType},
};

/// An answer record. The server only ever emits A records (sinkhole or
/// upstream-resolved address), so `address` is the only RDATA this codec
/// knows how to write; reading back an arbitrary record keeps the raw bytes
/// in `raw_rdata` instead of failing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DnsResourceRecord {
    pub labels: Vec<String>,
    pub rtype: DnsResourceType,
    pub rclass: DnsResourceClass,
    pub ttl: u32,
    pub address: Option<Ipv4Addr>,
    pub raw_rdata: Vec<u8>,
}

impl DnsResourceRecord {
    pub fn a_record(labels: Vec<String>, ttl: u32, address: Ipv4Addr) -> Self {
        DnsResourceRecord {
            labels,
            rtype: DnsResourceType::A,
            rclass: DnsResourceClass::In,
            ttl,
            address: Some(address),
            raw_rdata: Vec::new(),
        }
    }
}

impl PacketComponent for DnsResourceRecord {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError> {
        self.write_labels(writer, &self.labels)?;
        writer.write_var::<u16>(16, self.rtype.into())?;
        writer.write_var::<u16>(16, self.rclass.into())?;
        writer.write_var::<u32>(32, self.ttl)?;

        match (self.rtype, self.address) {
            (DnsResourceType::A, Some(addr)) => {
                writer.write_var::<u16>(16, 4)?;
                writer.write_bytes(&addr.octets())?;
            }
            _ => {
                writer.write_var::<u16>(16, self.raw_rdata.len() as u16)?;
                writer.write_bytes(&self.raw_rdata)?;
            }
        }
        Ok(())
    }

    fn read<E: Endianness>(&mut self, reader: &mut BitReader<&[u8], E>) -> Result<(), ParseError> {
        let labels = self.read_labels(reader)?;
        let rtype: DnsResourceType = reader.read_var::<u16>(16)?.into();
        let rclass: DnsResourceClass = reader.read_var::<u16>(16)?.into();
        let ttl = reader.read_var::<u32>(32)?;
        let rdlength = reader.read_var::<u16>(16)?;

        let mut rdata = vec![0u8; rdlength as usize];
        reader.read_bytes(&mut rdata)?;

        let address = if rtype == DnsResourceType::A && rdata.len() == 4 {
            Some(Ipv4Addr::new(rdata[0], rdata[1], rdata[2], rdata[3]))
        } else {
            None
        };

        *self = DnsResourceRecord {
            labels,
            rtype,
            rclass,
            ttl,
            address,
            raw_rdata: if address.is_some() { Vec::new() } else { rdata },
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream_io::BigEndian;

    #[test]
    fn round_trips_an_a_record() {
        let rr = DnsResourceRecord::a_record(
            vec!["doubleclick".into(), "net".into()],
            300,
            Ipv4Addr::new(0, 0, 0, 0),
        );
        let mut bytes = Vec::new();
        let mut writer = BitWriter::<_, BigEndian>::new(&mut bytes);
        rr.write(&mut writer).unwrap();

        let mut reader = BitReader::<_, BigEndian>::new(bytes.as_slice());
        let mut parsed = DnsResourceRecord::default();
        parsed.read(&mut reader).unwrap();
        assert_eq!(parsed, rr);
    }
}
