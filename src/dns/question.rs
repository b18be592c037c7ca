use bitstream_io::{BitRead, BitReader, BitWrite, BitWriter, Endianness};

use super::{
    ParseError,
    common::PacketComponent,
    enums::{DnsResourceClass, DnsResourceType},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DnsQuestion {
    pub labels: Vec<String>,
    pub qtype: DnsResourceType,
    pub qclass: DnsResourceClass,
}

impl DnsQuestion {
    /// Dotted-string form of the labels, lowercased — the form the
    /// blocklist index and upstream resolver both key on.
    pub fn name(&self) -> String {
        self.labels.join(".").to_ascii_lowercase()
    }
}

impl PacketComponent for DnsQuestion {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError> {
        self.write_labels(writer, &self.labels)?;
        writer.write_var::<u16>(16, self.qtype.into())?;
        writer.write_var::<u16>(16, self.qclass.into())?;
        Ok(())
    }

    fn read<E: Endianness>(&mut self, reader: &mut BitReader<&[u8], E>) -> Result<(), ParseError> {
        let labels = self.read_labels(reader)?;
        let qtype = reader.read_var::<u16>(16)?.into();
        let qclass = reader.read_var::<u16>(16)?.into();
        *self = DnsQuestion {
            labels,
            qtype,
            qclass,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream_io::BigEndian;

    #[test]
    fn round_trips_a_question() {
        let q = DnsQuestion {
            labels: vec!["ads".into(), "example".into(), "com".into()],
            qtype: DnsResourceType::A,
            qclass: DnsResourceClass::In,
        };
        let mut bytes = Vec::new();
        let mut writer = BitWriter::<_, BigEndian>::new(&mut bytes);
        q.write(&mut writer).unwrap();

        let mut reader = BitReader::<_, BigEndian>::new(bytes.as_slice());
        let mut parsed = DnsQuestion::default();
        parsed.read(&mut reader).unwrap();
        assert_eq!(parsed, q);
        assert_eq!(parsed.name(), "ads.example.com");
    }
}
