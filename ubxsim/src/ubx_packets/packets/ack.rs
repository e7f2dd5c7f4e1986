use core::fmt;

use crate::{
    ubx_packets::wire::expect_len, DecodeError, UbxPacketCreator, UbxPacketMeta, UbxPacketParse,
    ValidationError,
};

/// Message acknowledged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AckAck {
    /// Class ID of the acknowledged message
    pub class: u8,
    /// Message ID of the acknowledged message
    pub msg_id: u8,
}

/// Message not acknowledged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AckNak {
    /// Class ID of the rejected message
    pub class: u8,
    /// Message ID of the rejected message
    pub msg_id: u8,
}

const ACK_PAYLOAD_LEN: usize = 2;

macro_rules! impl_ack {
    ($ty:ident, $id:literal, $name:literal) => {
        impl UbxPacketMeta for $ty {
            const CLASS: u8 = 0x05;
            const ID: u8 = $id;
            const NAME: &'static str = $name;
        }

        impl UbxPacketCreator for $ty {
            fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
                out.push(self.class);
                out.push(self.msg_id);
                Ok(())
            }
        }

        impl UbxPacketParse for $ty {
            fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
                expect_len(Self::NAME, payload, ACK_PAYLOAD_LEN)?;
                Ok(Self {
                    class: payload[0],
                    msg_id: payload[1],
                })
            }
        }

        impl $ty {
            pub fn is_ack_for<T: UbxPacketMeta>(&self) -> bool {
                self.class == T::CLASS && self.msg_id == T::ID
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "Class=0x{:02X} ID=0x{:02X}", self.class, self.msg_id)
            }
        }
    };
}

impl_ack!(AckAck, 0x01, "ACK-ACK");
impl_ack!(AckNak, 0x00, "ACK-NAK");
