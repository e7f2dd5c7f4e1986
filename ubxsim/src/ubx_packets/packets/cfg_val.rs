use core::fmt;

use bitflags::bitflags;

use crate::{
    ubx_packets::{
        cfg_val::parse_key_values,
        wire::{PayloadReader, PayloadWriter},
    },
    DecodeError, KeyId, KeyValuePair, UbxPacketCreator, UbxPacketMeta, UbxPacketParse,
    ValidationError,
};

/// At most this many keys are carried by one CFG-VALSET or CFG-VALGET
pub const MAX_CFG_KEYS: usize = 64;

const CFG_VAL_HEADER_LEN: usize = 4;

bitflags! {
    /// Layers a CFG-VALSET writes to
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CfgLayerSet: u8 {
        const RAM = 0b001;
        const BBR = 0b010;
        const FLASH = 0b100;
    }
}

impl Default for CfgLayerSet {
    fn default() -> Self {
        Self::RAM
    }
}

ubx_enum! {
    /// Layer a CFG-VALGET reads from
    pub enum CfgLayerGet {
        Ram = 0 => "RAM",
        Bbr = 1 => "BBR",
        Flash = 2 => "Flash",
        Default = 7 => "Default",
    }
}

fn check_key_count(
    packet: &'static str,
    field: &'static str,
    count: usize,
) -> Result<(), ValidationError> {
    if count == 0 {
        return Err(ValidationError::Empty { packet, field });
    }
    if count > MAX_CFG_KEYS {
        return Err(ValidationError::TooMany {
            packet,
            field,
            max: MAX_CFG_KEYS,
            got: count,
        });
    }
    Ok(())
}

fn write_pairs(out: &mut Vec<u8>, values: &[KeyValuePair]) -> Result<(), ValidationError> {
    for kv in values {
        KeyValuePair::new(kv.key(), kv.value().to_vec())?;
    }
    for kv in values {
        kv.extend_to(out);
    }
    Ok(())
}

/// Set configuration item values
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CfgValSet {
    /// 0 = simple set, 1 = transactional set
    pub version: u8,
    pub layers: CfgLayerSet,
    /// Transaction action for version 1, zero otherwise
    pub transaction: u8,
    pub values: Vec<KeyValuePair>,
}

impl CfgValSet {
    pub fn new(layers: CfgLayerSet, values: Vec<KeyValuePair>) -> Self {
        Self {
            version: 0,
            layers,
            transaction: 0,
            values,
        }
    }
}

impl UbxPacketMeta for CfgValSet {
    const CLASS: u8 = 0x06;
    const ID: u8 = 0x8a;
    const NAME: &'static str = "CFG-VALSET";
}

impl UbxPacketCreator for CfgValSet {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        check_key_count(Self::NAME, "key-value pairs", self.values.len())?;
        ValidationError::check_range(Self::NAME, "version", i64::from(self.version), 0, 1)?;
        ValidationError::check_range(
            Self::NAME,
            "layers",
            i64::from(self.layers.bits()),
            1,
            i64::from(CfgLayerSet::all().bits()),
        )?;
        let mut payload = Vec::with_capacity(
            CFG_VAL_HEADER_LEN + self.values.iter().map(KeyValuePair::wire_len).sum::<usize>(),
        );
        payload.put_u8(self.version);
        payload.put_u8(self.layers.bits());
        payload.put_u8(self.transaction);
        payload.put_u8(0);
        write_pairs(&mut payload, &self.values)?;
        out.extend_from_slice(&payload);
        Ok(())
    }
}

impl UbxPacketParse for CfgValSet {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() < CFG_VAL_HEADER_LEN {
            return Err(DecodeError::InvalidPacketLen {
                packet: Self::NAME,
                expect: CFG_VAL_HEADER_LEN,
                got: payload.len(),
            });
        }
        let mut r = PayloadReader::new(payload);
        let version = r.u8();
        let layers = CfgLayerSet::from_bits(r.u8()).ok_or(DecodeError::InvalidField {
            packet: Self::NAME,
            field: "layers",
        })?;
        let transaction = r.u8();
        let _reserved = r.u8();
        let values = parse_key_values(Self::NAME, r.rest())?;
        if values.is_empty() {
            return Err(DecodeError::InvalidField {
                packet: Self::NAME,
                field: "cfgData",
            });
        }
        Ok(Self {
            version,
            layers,
            transaction,
            values,
        })
    }
}

impl fmt::Display for CfgValSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Version={}, Layers=0x{:02X}, {} key-value pair(s)",
            self.version,
            self.layers.bits(),
            self.values.len()
        )
    }
}

/// Poll configuration item values
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CfgValGetRequest {
    pub layer: CfgLayerGet,
    /// Number of values to skip in the result set
    pub position: u16,
    pub keys: Vec<KeyId>,
}

impl UbxPacketMeta for CfgValGetRequest {
    const CLASS: u8 = 0x06;
    const ID: u8 = 0x8b;
    const NAME: &'static str = "CFG-VALGET";
}

pub(crate) const VALGET_REQUEST_VERSION: u8 = 0;
pub(crate) const VALGET_RESPONSE_VERSION: u8 = 1;

impl UbxPacketCreator for CfgValGetRequest {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        check_key_count(Self::NAME, "keys", self.keys.len())?;
        out.put_u8(VALGET_REQUEST_VERSION);
        out.put_u8(self.layer.into());
        out.put_u16(self.position);
        for key in &self.keys {
            out.put_u32(key.0);
        }
        Ok(())
    }
}

fn parse_valget_header(payload: &[u8]) -> Result<(u8, CfgLayerGet, u16), DecodeError> {
    if payload.len() < CFG_VAL_HEADER_LEN {
        return Err(DecodeError::ResponseTooShort {
            packet: CfgValGetRequest::NAME,
            min: CFG_VAL_HEADER_LEN,
            got: payload.len(),
        });
    }
    let mut r = PayloadReader::new(payload);
    let version = r.u8();
    let layer = CfgLayerGet::from_u8(r.u8()).ok_or(DecodeError::InvalidField {
        packet: CfgValGetRequest::NAME,
        field: "layer",
    })?;
    Ok((version, layer, r.u16()))
}

impl UbxPacketParse for CfgValGetRequest {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        let (version, layer, position) = parse_valget_header(payload)?;
        if version != VALGET_REQUEST_VERSION {
            return Err(DecodeError::InvalidField {
                packet: Self::NAME,
                field: "version",
            });
        }
        let keys = &payload[CFG_VAL_HEADER_LEN..];
        if keys.is_empty() || keys.len() % KeyId::SIZE != 0 {
            return Err(DecodeError::InvalidPacketLen {
                packet: Self::NAME,
                expect: CFG_VAL_HEADER_LEN + KeyId::SIZE * (keys.len() / KeyId::SIZE).max(1),
                got: payload.len(),
            });
        }
        let keys = keys
            .chunks_exact(KeyId::SIZE)
            .map(|c| KeyId(u32::from_le_bytes([c[0], c[1], c[2], c[3]])))
            .collect();
        Ok(Self {
            layer,
            position,
            keys,
        })
    }
}

impl fmt::Display for CfgValGetRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Version={}, Layer={}, Position={}, Keys={}",
            VALGET_REQUEST_VERSION,
            self.layer,
            self.position,
            self.keys.len()
        )
    }
}

/// Configuration item values returned for a CFG-VALGET poll
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CfgValGetResponse {
    pub layer: CfgLayerGet,
    pub position: u16,
    pub values: Vec<KeyValuePair>,
}

impl UbxPacketMeta for CfgValGetResponse {
    const CLASS: u8 = 0x06;
    const ID: u8 = 0x8b;
    const NAME: &'static str = "CFG-VALGET";
}

impl UbxPacketCreator for CfgValGetResponse {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        if self.values.len() > MAX_CFG_KEYS {
            return Err(ValidationError::TooMany {
                packet: Self::NAME,
                field: "key-value pairs",
                max: MAX_CFG_KEYS,
                got: self.values.len(),
            });
        }
        let mut payload = Vec::new();
        payload.put_u8(VALGET_RESPONSE_VERSION);
        payload.put_u8(self.layer.into());
        payload.put_u16(self.position);
        write_pairs(&mut payload, &self.values)?;
        out.extend_from_slice(&payload);
        Ok(())
    }
}

impl UbxPacketParse for CfgValGetResponse {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        let (version, layer, position) = parse_valget_header(payload)?;
        if version != VALGET_RESPONSE_VERSION {
            return Err(DecodeError::InvalidField {
                packet: Self::NAME,
                field: "version",
            });
        }
        Ok(Self {
            layer,
            position,
            values: parse_key_values(Self::NAME, &payload[CFG_VAL_HEADER_LEN..])?,
        })
    }
}

impl fmt::Display for CfgValGetResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layer={}, Position={}, {} key-value pair(s)",
            self.layer,
            self.position,
            self.values.len()
        )?;
        for kv in &self.values {
            write!(f, "; {}", kv)?;
        }
        Ok(())
    }
}
