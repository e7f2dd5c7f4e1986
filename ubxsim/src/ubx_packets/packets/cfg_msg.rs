use core::fmt;

use crate::{
    ubx_packets::wire::PayloadWriter, DecodeError, UbxPacketCreator, UbxPacketMeta, UbxPacketParse,
    ValidationError,
};

/// Output rate of a message, either for the port the request came in on or for all six ports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CfgMsgRates {
    CurrentPort(u8),
    /// I2C, UART1, UART2, USB, SPI, reserved
    AllPorts([u8; 6]),
}

/// Set message rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CfgMsg {
    pub msg_class: u8,
    pub msg_id: u8,
    pub rates: CfgMsgRates,
}

impl CfgMsg {
    pub fn for_packet<T: UbxPacketMeta>(rate: u8) -> Self {
        Self {
            msg_class: T::CLASS,
            msg_id: T::ID,
            rates: CfgMsgRates::CurrentPort(rate),
        }
    }

    /// Rate on the current port, or on UART1 for the per-port form
    pub fn rate(&self) -> u8 {
        match self.rates {
            CfgMsgRates::CurrentPort(rate) => rate,
            CfgMsgRates::AllPorts(rates) => rates[1],
        }
    }
}

impl UbxPacketMeta for CfgMsg {
    const CLASS: u8 = 0x06;
    const ID: u8 = 0x01;
    const NAME: &'static str = "CFG-MSG";
}

impl UbxPacketCreator for CfgMsg {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        out.put_u8(self.msg_class);
        out.put_u8(self.msg_id);
        match self.rates {
            CfgMsgRates::CurrentPort(rate) => out.put_u8(rate),
            CfgMsgRates::AllPorts(rates) => out.extend_from_slice(&rates),
        }
        Ok(())
    }
}

impl UbxPacketParse for CfgMsg {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        let rates = match payload.len() {
            3 => CfgMsgRates::CurrentPort(payload[2]),
            8 => {
                let mut rates = [0u8; 6];
                rates.copy_from_slice(&payload[2..8]);
                CfgMsgRates::AllPorts(rates)
            },
            got => {
                return Err(DecodeError::InvalidPacketLen {
                    packet: Self::NAME,
                    expect: 8,
                    got,
                })
            },
        };
        Ok(Self {
            msg_class: payload[0],
            msg_id: payload[1],
            rates,
        })
    }
}

impl fmt::Display for CfgMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Class=0x{:02X} ID=0x{:02X} Rate={}",
            self.msg_class,
            self.msg_id,
            self.rate()
        )
    }
}
