use crate::{DecodeError, ValidationError};

/// Declares a `#[repr(u8)]` enum for a one-byte protocol field together with
/// its byte conversion and the label used in log summaries.
macro_rules! ubx_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal => $label:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant = $value,
            )+
        }

        impl $name {
            pub const fn from_u8(value: u8) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

mod cfg_val;
mod frame;
mod packets;
mod types;
pub(crate) mod wire;

pub use cfg_val::*;
pub use frame::UbxFrame;
pub(crate) use frame::hex_string;
pub use packets::*;
pub use types::*;
pub(crate) use types::{scaled, UtcFields};

ubx_enum! {
    /// Message classes the engine knows about
    pub enum UbxClass {
        Nav = 0x01 => "NAV",
        Inf = 0x04 => "INF",
        Ack = 0x05 => "ACK",
        Cfg = 0x06 => "CFG",
        Mon = 0x0a => "MON",
        Sec = 0x27 => "SEC",
    }
}

/// Information about a concrete UBX message type
pub trait UbxPacketMeta {
    const CLASS: u8;
    const ID: u8;
    const NAME: &'static str;
}

/// Outgoing message: validates its fields and writes the payload
pub trait UbxPacketCreator: UbxPacketMeta {
    /// Append the payload to `out`; on error nothing usable has been written
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError>;

    fn to_frame(&self) -> Result<UbxFrame, ValidationError> {
        let mut payload = Vec::new();
        self.write_payload(&mut payload)?;
        UbxFrame::new(Self::CLASS, Self::ID, payload)
    }

    /// Complete wire representation including sync chars and checksum
    fn to_packet_bytes(&self) -> Result<Vec<u8>, ValidationError> {
        Ok(self.to_frame()?.to_bytes())
    }
}

/// Incoming message: checks the payload layout and extracts the fields
pub trait UbxPacketParse: UbxPacketMeta + Sized {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError>;
}
