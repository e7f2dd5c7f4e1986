use core::fmt;

use bitflags::bitflags;

use crate::{
    ubx_packets::wire::{expect_len, PayloadReader, PayloadWriter},
    DecodeError, UbxPacketCreator, UbxPacketMeta, UbxPacketParse, ValidationError,
};

bitflags! {
    /// A mask describing which input protocols are active
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct InProtoMask: u16 {
        const UBLOX = 0x01;
        const NMEA = 0x02;
        const RTCM = 0x04;
        const RTCM3 = 0x20;
    }
}

bitflags! {
    /// A mask describing which output protocols are active
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct OutProtoMask: u16 {
        const UBLOX = 0x01;
        const NMEA = 0x02;
        const RTCM3 = 0x20;
    }
}

/// Port configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CfgPrt {
    /// 0 = I2C, 1 = UART1, 2 = UART2, 3 = USB, 4 = SPI
    pub port_id: u8,
    pub tx_ready: u16,
    /// Character length, parity and stop bits for UART ports
    pub mode: u32,
    pub baud_rate: u32,
    pub in_proto_mask: InProtoMask,
    pub out_proto_mask: OutProtoMask,
    pub flags: u16,
}

/// 8 data bits, no parity, 1 stop bit
pub const UART_MODE_8N1: u32 = 0x0000_08d0;

const CFG_PRT_LEN: usize = 20;
const MAX_PORT_ID: u8 = 4;
const MIN_BAUD: u32 = 4800;
const MAX_BAUD: u32 = 921_600;

impl Default for CfgPrt {
    fn default() -> Self {
        Self {
            port_id: 1,
            tx_ready: 0,
            mode: UART_MODE_8N1,
            baud_rate: 115_200,
            in_proto_mask: InProtoMask::UBLOX | InProtoMask::NMEA,
            out_proto_mask: OutProtoMask::UBLOX,
            flags: 0,
        }
    }
}

impl CfgPrt {
    pub fn is_uart(&self) -> bool {
        matches!(self.port_id, 1 | 2)
    }
}

impl UbxPacketMeta for CfgPrt {
    const CLASS: u8 = 0x06;
    const ID: u8 = 0x00;
    const NAME: &'static str = "CFG-PRT";
}

impl UbxPacketCreator for CfgPrt {
    fn write_payload(&self, out: &mut Vec<u8>) -> Result<(), ValidationError> {
        ValidationError::check_range(
            Self::NAME,
            "portID",
            i64::from(self.port_id),
            0,
            i64::from(MAX_PORT_ID),
        )?;
        if self.is_uart() {
            ValidationError::check_range(
                Self::NAME,
                "baudRate",
                i64::from(self.baud_rate),
                i64::from(MIN_BAUD),
                i64::from(MAX_BAUD),
            )?;
        }
        out.put_u8(self.port_id);
        out.put_u8(0);
        out.put_u16(self.tx_ready);
        out.put_u32(self.mode);
        out.put_u32(self.baud_rate);
        out.put_u16(self.in_proto_mask.bits());
        out.put_u16(self.out_proto_mask.bits());
        out.put_u16(self.flags);
        out.put_u16(0);
        Ok(())
    }
}

impl UbxPacketParse for CfgPrt {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        expect_len(Self::NAME, payload, CFG_PRT_LEN)?;
        let mut r = PayloadReader::new(payload);
        let port_id = r.u8();
        if port_id > MAX_PORT_ID {
            return Err(DecodeError::InvalidField {
                packet: Self::NAME,
                field: "portID",
            });
        }
        let _reserved0 = r.u8();
        Ok(Self {
            port_id,
            tx_ready: r.u16(),
            mode: r.u32(),
            baud_rate: r.u32(),
            in_proto_mask: InProtoMask::from_bits_retain(r.u16()),
            out_proto_mask: OutProtoMask::from_bits_retain(r.u16()),
            flags: r.u16(),
        })
    }
}

impl fmt::Display for CfgPrt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Port={} Baud={} InProto=0x{:04X} OutProto=0x{:04X}",
            self.port_id,
            self.baud_rate,
            self.in_proto_mask.bits(),
            self.out_proto_mask.bits()
        )
    }
}
