/// DNS query/resource types this server recognizes. Every other on-wire
/// value round-trips through `Raw` so an unsupported question still gets a
/// well-formed response rather than a parse failure.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DnsResourceType {
    #[default]
    A,
    Aaaa,
    Raw(u16),
}

impl From<u16> for DnsResourceType {
    fn from(v: u16) -> Self {
        match v {
            1 => DnsResourceType::A,
            28 => DnsResourceType::Aaaa,
            other => DnsResourceType::Raw(other),
        }
    }
}

impl From<DnsResourceType> for u16 {
    fn from(t: DnsResourceType) -> u16 {
        match t {
            DnsResourceType::A => 1,
            DnsResourceType::Aaaa => 28,
            DnsResourceType::Raw(v) => v,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DnsResourceClass {
    #[default]
    In,
    Raw(u16),
}

impl From<u16> for DnsResourceClass {
    fn from(v: u16) -> Self {
        match v {
            1 => DnsResourceClass::In,
            other => DnsResourceClass::Raw(other),
        }
    }
}

impl From<DnsResourceClass> for u16 {
    fn from(c: DnsResourceClass) -> u16 {
        match c {
            DnsResourceClass::In => 1,
            DnsResourceClass::Raw(v) => v,
        }
    }
}

/// Response codes this server ever emits: an answer, or SERVFAIL on
/// internal failure; NXDOMAIN is included for completeness of the codec.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ResponseCode {
    #[default]
    NoError,
    ServFail,
    NxDomain,
    Refused,
}

impl From<ResponseCode> for u8 {
    fn from(rc: ResponseCode) -> u8 {
        match rc {
            ResponseCode::NoError => 0,
            ResponseCode::ServFail => 2,
            ResponseCode::NxDomain => 3,
            ResponseCode::Refused => 5,
        }
    }
}

impl From<u8> for ResponseCode {
    fn from(v: u8) -> Self {
        match v {
            0 => ResponseCode::NoError,
            3 => ResponseCode::NxDomain,
            5 => ResponseCode::Refused,
            _ => ResponseCode::ServFail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_type_round_trips() {
        assert_eq!(DnsResourceType::from(1u16), DnsResourceType::A);
        assert_eq!(u16::from(DnsResourceType::A), 1);
        assert_eq!(DnsResourceType::from(99u16), DnsResourceType::Raw(99));
    }

    #[test]
    fn response_code_round_trips() {
        assert_eq!(u8::from(ResponseCode::ServFail), 2);
        assert_eq!(ResponseCode::from(2u8), ResponseCode::ServFail);
    }
}
