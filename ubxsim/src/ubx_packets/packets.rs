use core::fmt;

use super::{UbxClass, UbxPacketMeta, UbxPacketParse};
use crate::DecodeError;

mod ack;
mod cfg_ant;
mod cfg_itfm;
mod cfg_msg;
mod cfg_nav5;
mod cfg_prt;
mod cfg_rate;
mod cfg_val;
mod inf;
mod mon_hw;
mod mon_rf;
mod mon_ver;
mod nav_pvt;
mod nav_sat;
mod nav_status;
mod nav_time_utc;
mod sec_uniq_id;

pub use ack::*;
pub use cfg_ant::*;
pub use cfg_itfm::*;
pub use cfg_msg::*;
pub use cfg_nav5::*;
pub use cfg_prt::*;
pub use cfg_rate::*;
pub use cfg_val::*;
pub use inf::*;
pub use mon_hw::*;
pub use mon_rf::*;
pub use mon_ver::*;
pub use nav_pvt::*;
pub use nav_sat::*;
pub use nav_status::*;
pub use nav_time_utc::*;
pub use sec_uniq_id::*;

macro_rules! define_packets {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub enum $name {
            $($variant($variant),)+
            Inf(Inf),
            /// Zero-length request for the current value of a message
            Poll { class: u8, msg_id: u8 },
        }

        impl $name {
            pub fn class_id(&self) -> (u8, u8) {
                match self {
                    $($name::$variant(_) => ($variant::CLASS, $variant::ID),)+
                    $name::Inf(inf) => (Inf::CLASS, inf.severity.into()),
                    $name::Poll { class, msg_id } => (*class, *msg_id),
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant(_) => $variant::NAME,)+
                    $name::Inf(inf) => inf.name(),
                    $name::Poll { class, msg_id } => {
                        message_name(*class, *msg_id).unwrap_or("UNKNOWN")
                    },
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $($name::$variant(p) => fmt::Display::fmt(p, f),)+
                    $name::Inf(inf) => f.write_str(&inf.text),
                    $name::Poll { .. } => write!(f, "{} poll", self.name()),
                }
            }
        }
    };
}

define_packets! {
    /// Any message the engine understands, decoded
    pub enum UbxPacket {
        AckAck,
        AckNak,
        CfgPrt,
        CfgMsg,
        CfgRate,
        CfgAnt,
        CfgNav5,
        CfgItfm,
        CfgValSet,
        CfgValGetRequest,
        CfgValGetResponse,
        NavPvt,
        NavStatus,
        NavSat,
        NavTimeUtc,
        MonVer,
        MonHw,
        MonRf,
        SecUniqId,
    }
}

/// Human readable name of a known `(class, id)` pair
pub fn message_name(class: u8, msg_id: u8) -> Option<&'static str> {
    let name = match (class, msg_id) {
        (AckAck::CLASS, AckAck::ID) => AckAck::NAME,
        (AckNak::CLASS, AckNak::ID) => AckNak::NAME,
        (CfgPrt::CLASS, CfgPrt::ID) => CfgPrt::NAME,
        (CfgMsg::CLASS, CfgMsg::ID) => CfgMsg::NAME,
        (CfgRate::CLASS, CfgRate::ID) => CfgRate::NAME,
        (CfgAnt::CLASS, CfgAnt::ID) => CfgAnt::NAME,
        (CfgNav5::CLASS, CfgNav5::ID) => CfgNav5::NAME,
        (CfgItfm::CLASS, CfgItfm::ID) => CfgItfm::NAME,
        (CfgValSet::CLASS, CfgValSet::ID) => CfgValSet::NAME,
        (CfgValGetRequest::CLASS, CfgValGetRequest::ID) => CfgValGetRequest::NAME,
        (NavPvt::CLASS, NavPvt::ID) => NavPvt::NAME,
        (NavStatus::CLASS, NavStatus::ID) => NavStatus::NAME,
        (NavSat::CLASS, NavSat::ID) => NavSat::NAME,
        (NavTimeUtc::CLASS, NavTimeUtc::ID) => NavTimeUtc::NAME,
        (MonVer::CLASS, MonVer::ID) => MonVer::NAME,
        (MonHw::CLASS, MonHw::ID) => MonHw::NAME,
        (MonRf::CLASS, MonRf::ID) => MonRf::NAME,
        (SecUniqId::CLASS, SecUniqId::ID) => SecUniqId::NAME,
        (Inf::CLASS, id) => InfSeverity::from_u8(id)?.as_str(),
        _ => return None,
    };
    Some(name)
}

fn decode<P: UbxPacketParse>(
    payload: &[u8],
    wrap: fn(P) -> UbxPacket,
) -> Result<UbxPacket, DecodeError> {
    P::parse(payload).map(wrap)
}

/// Decode the payload of a checksum-valid frame.
///
/// The class is classified first, so an unknown class and an unknown id of a
/// known class are reported differently. A zero-length frame of a message that
/// is otherwise never empty is reported as [`UbxPacket::Poll`].
pub fn match_packet(class: u8, msg_id: u8, payload: &[u8]) -> Result<UbxPacket, DecodeError> {
    let class_label = UbxClass::from_u8(class)
        .ok_or(DecodeError::UnknownClass { class })?
        .as_str();
    if message_name(class, msg_id).is_none() {
        return Err(DecodeError::UnknownMessage {
            class: class_label,
            msg_id,
        });
    }
    if payload.is_empty() && is_pollable(class, msg_id) {
        return Ok(UbxPacket::Poll { class, msg_id });
    }
    match (class, msg_id) {
        (AckAck::CLASS, AckAck::ID) => decode(payload, UbxPacket::AckAck),
        (AckNak::CLASS, AckNak::ID) => decode(payload, UbxPacket::AckNak),
        (CfgPrt::CLASS, CfgPrt::ID) => decode(payload, UbxPacket::CfgPrt),
        (CfgMsg::CLASS, CfgMsg::ID) => decode(payload, UbxPacket::CfgMsg),
        (CfgRate::CLASS, CfgRate::ID) => decode(payload, UbxPacket::CfgRate),
        (CfgAnt::CLASS, CfgAnt::ID) => decode(payload, UbxPacket::CfgAnt),
        (CfgNav5::CLASS, CfgNav5::ID) => decode(payload, UbxPacket::CfgNav5),
        (CfgItfm::CLASS, CfgItfm::ID) => decode(payload, UbxPacket::CfgItfm),
        (CfgValSet::CLASS, CfgValSet::ID) => decode(payload, UbxPacket::CfgValSet),
        (CfgValGetRequest::CLASS, CfgValGetRequest::ID) => match payload.first() {
            Some(&VALGET_RESPONSE_VERSION) => decode(payload, UbxPacket::CfgValGetResponse),
            _ => decode(payload, UbxPacket::CfgValGetRequest),
        },
        (NavPvt::CLASS, NavPvt::ID) => decode(payload, UbxPacket::NavPvt),
        (NavStatus::CLASS, NavStatus::ID) => decode(payload, UbxPacket::NavStatus),
        (NavSat::CLASS, NavSat::ID) => decode(payload, UbxPacket::NavSat),
        (NavTimeUtc::CLASS, NavTimeUtc::ID) => decode(payload, UbxPacket::NavTimeUtc),
        (MonVer::CLASS, MonVer::ID) => decode(payload, UbxPacket::MonVer),
        (MonHw::CLASS, MonHw::ID) => decode(payload, UbxPacket::MonHw),
        (MonRf::CLASS, MonRf::ID) => decode(payload, UbxPacket::MonRf),
        (SecUniqId::CLASS, SecUniqId::ID) => decode(payload, UbxPacket::SecUniqId),
        (Inf::CLASS, id) => Inf::parse(id, payload).map(UbxPacket::Inf),
        _ => Err(DecodeError::UnknownMessage {
            class: class_label,
            msg_id,
        }),
    }
}

/// ACK and INF are never polled, and the CFG-VAL* messages always carry a header
fn is_pollable(class: u8, msg_id: u8) -> bool {
    match UbxClass::from_u8(class) {
        Some(UbxClass::Ack | UbxClass::Inf) | None => false,
        Some(UbxClass::Cfg) => msg_id != CfgValSet::ID && msg_id != CfgValGetRequest::ID,
        Some(UbxClass::Nav | UbxClass::Mon | UbxClass::Sec) => true,
    }
}
