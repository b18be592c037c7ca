use bitstream_io::{BigEndian, BitReader, BitWriter};

use super::{
    DnsHeader, DnsQuestion, DnsResourceRecord, ParseError, common::PacketComponent,
    enums::ResponseCode,
};

/// A decoded query, or a response this server is about to send. Only the
/// question-section fields a single-question, class IN, type A/AAAA query
/// needs are kept; authority and additional sections of an incoming packet
/// are never inspected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DnsPacket {
    pub header: DnsHeader,
    pub question: Option<DnsQuestion>,
    pub answers: Vec<DnsResourceRecord>,
}

impl DnsPacket {
    pub fn parse(buf: &[u8]) -> Result<Self, ParseError> {
        let mut reader = BitReader::<_, BigEndian>::new(buf);

        let mut header = DnsHeader::default();
        header.read(&mut reader)?;

        if header.qdcount == 0 {
            return Err(ParseError::NoQuestion);
        }

        let mut question = DnsQuestion::default();
        question.read(&mut reader)?;

        // Any further questions or records in the packet are ignored; this
        // server only ever answers the first question.
        Ok(DnsPacket {
            header,
            question: Some(question),
            answers: Vec::new(),
        })
    }

    pub fn serialize(&self) -> Result<Vec<u8>, ParseError> {
        let mut bytes = Vec::new();
        let mut writer = BitWriter::<_, BigEndian>::new(&mut bytes);

        let mut header = self.header.clone();
        header.qdcount = if self.question.is_some() { 1 } else { 0 };
        header.ancount = self.answers.len() as u16;
        header.nscount = 0;
        header.arcount = 0;
        header.write(&mut writer)?;

        if let Some(question) = &self.question {
            question.write(&mut writer)?;
        }
        for answer in &self.answers {
            answer.write(&mut writer)?;
        }

        Ok(bytes)
    }

    /// Build the response packet for a query, with the given response code
    /// and answer set. `ra` (recursion available) is always set since every
    /// response here is either a sinkhole answer or an upstream-resolved
    /// one.
    pub fn respond(
        query: &DnsPacket,
        rcode: ResponseCode,
        answers: Vec<DnsResourceRecord>,
    ) -> DnsPacket {
        let mut header = query.header.clone();
        header.qr = true;
        header.aa = false;
        header.tc = false;
        header.ra = true;
        header.rcode = rcode.into();

        DnsPacket {
            header,
            question: query.question.clone(),
            answers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::enums::{DnsResourceClass, DnsResourceType};
    use std::net::Ipv4Addr;

    fn sample_query() -> DnsPacket {
        DnsPacket {
            header: DnsHeader {
                id: 0x1234,
                rd: true,
                qdcount: 1,
                ..Default::default()
            },
            question: Some(DnsQuestion {
                labels: vec!["ads".into(), "example".into(), "com".into()],
                qtype: DnsResourceType::A,
                qclass: DnsResourceClass::In,
            }),
            answers: Vec::new(),
        }
    }

    #[test]
    fn round_trips_a_query() {
        let query = sample_query();
        let bytes = query.serialize().unwrap();
        let parsed = DnsPacket::parse(&bytes).unwrap();
        assert_eq!(parsed.header.id, 0x1234);
        assert_eq!(parsed.question.unwrap().name(), "ads.example.com");
    }

    #[test]
    fn respond_builds_answer_packet() {
        let query = sample_query();
        let answer = DnsResourceRecord::a_record(
            query.question.as_ref().unwrap().labels.clone(),
            300,
            Ipv4Addr::new(0, 0, 0, 0),
        );
        let response = DnsPacket::respond(&query, ResponseCode::NoError, vec![answer]);
        assert!(response.header.qr);
        assert!(response.header.ra);
        assert_eq!(response.answers.len(), 1);

        let bytes = response.serialize().unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn rejects_packet_without_question() {
        let mut header = DnsHeader::default();
        header.qdcount = 0;
        let mut bytes = Vec::new();
        let mut writer = BitWriter::<_, BigEndian>::new(&mut bytes);
        header.write(&mut writer).unwrap();
        assert!(matches!(DnsPacket::parse(&bytes), Err(ParseError::NoQuestion)));
    }
}
