use bitstream_io::{BitRead, BitReader, BitWrite, BitWriter, Endianness};

use super::ParseError;

const MAX_LABEL_LEN: u8 = 63;
const MAX_LABELS: usize = 128;

pub trait PacketComponent {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError>;
    fn read<E: Endianness>(&mut self, reader: &mut BitReader<&[u8], E>) -> Result<(), ParseError>;

    /// Read a sequence of length-prefixed labels terminated by a zero octet.
    /// Compression pointers are not supported: a freshly arrived query has
    /// nothing earlier in the packet worth pointing to, and this server
    /// never constructs pointer-bearing responses, so encountering one here
    /// is treated as a protocol error.
    fn read_labels<E: Endianness>(
        &mut self,
        reader: &mut BitReader<&[u8], E>,
    ) -> Result<Vec<String>, ParseError> {
        let mut labels = Vec::new();
        loop {
            let len = reader.read_var::<u8>(8)?;
            if len == 0 {
                break;
            }
            if len > MAX_LABEL_LEN || (len & 0xC0) != 0 {
                return Err(ParseError::InvalidLabel);
            }
            let mut buf = vec![0u8; len as usize];
            reader.read_bytes(&mut buf)?;
            labels.push(String::from_utf8(buf).map_err(|_| ParseError::InvalidLabel)?);
            if labels.len() > MAX_LABELS {
                return Err(ParseError::InvalidLabel);
            }
        }
        Ok(labels)
    }

    fn write_labels<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
        labels: &[String],
    ) -> Result<(), ParseError> {
        for label in labels {
            writer.write_var::<u8>(8, label.len() as u8)?;
            writer.write_bytes(label.as_bytes())?;
        }
        writer.write_var::<u8>(8, 0)?;
        Ok(())
    }
}
