//! Safety Node CAN protocol.
//!
//! Every node transmits on one standard identifier, [`CAN_ID_SAFETY`].
//! The first payload byte is the device id, which distinguishes the two
//! monitored axes sharing the channel.
//!
//! | Frame     | DLC | Payload                  |
//! |-----------|-----|--------------------------|
//! | Heartbeat | 1   | `[device_id]`            |
//! | Zone      | 2   | `[device_id, status]`    |

use core::fmt;

use heapless::Vec;

/// Standard 11-bit identifier shared by all safety nodes.
pub const CAN_ID_SAFETY: u32 = 0x005;

/// Classic CAN payload limit.
pub const MAX_PAYLOAD: usize = 8;

/// Left / yaw limit node.
pub const DEVICE_ID_1: u8 = 0x01;
/// Up / pitch limit node.
pub const DEVICE_ID_2: u8 = 0x02;

pub type Payload = Vec<u8, MAX_PAYLOAD>;

/// Status byte carried by a zone frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StatusCode {
    MinLimit = 0x10,
    ApproachMin = 0x11,
    ApproachMax = 0x12,
    MaxLimit = 0x20,
}

impl StatusCode {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for StatusCode {
    type Error = FrameError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0x10 => Ok(Self::MinLimit),
            0x11 => Ok(Self::ApproachMin),
            0x12 => Ok(Self::ApproachMax),
            0x20 => Ok(Self::MaxLimit),
            other => Err(FrameError::UnknownStatus(other)),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinLimit => write!(f, "MIN_LIMIT"),
            Self::ApproachMin => write!(f, "LIMIT1_FIND"),
            Self::ApproachMax => write!(f, "LIMIT2_FIND"),
            Self::MaxLimit => write!(f, "MAX_LIMIT"),
        }
    }
}

/// A zone transition announced by one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneEvent {
    pub device_id: u8,
    pub status: StatusCode,
}

/// Any frame a safety node puts on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyFrame {
    Heartbeat { device_id: u8 },
    Zone(ZoneEvent),
}

impl SafetyFrame {
    /// Serialize into a CAN payload.
    pub fn encode(&self) -> Payload {
        let mut out = Payload::new();
        // Both layouts fit comfortably in MAX_PAYLOAD.
        match self {
            Self::Heartbeat { device_id } => {
                let _ = out.push(*device_id);
            }
            Self::Zone(ev) => {
                let _ = out.push(ev.device_id);
                let _ = out.push(ev.status.as_u8());
            }
        }
        out
    }

    /// Parse a received frame. Only [`CAN_ID_SAFETY`] is accepted.
    pub fn decode(id: u32, data: &[u8]) -> Result<Self, FrameError> {
        if id != CAN_ID_SAFETY {
            return Err(FrameError::WrongId(id));
        }
        match *data {
            [device_id] => Ok(Self::Heartbeat { device_id }),
            [device_id, status] => Ok(Self::Zone(ZoneEvent {
                device_id,
                status: StatusCode::try_from(status)?,
            })),
            _ => Err(FrameError::BadLength(data.len())),
        }
    }
}

/// Decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    WrongId(u32),
    BadLength(usize),
    UnknownStatus(u8),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongId(id) => write!(f, "unexpected CAN id 0x{id:03X}"),
            Self::BadLength(n) => write!(f, "unexpected payload length {n}"),
            Self::UnknownStatus(s) => write!(f, "unknown status 0x{s:02X}"),
        }
    }
}
