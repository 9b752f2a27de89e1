//! RCON packet codec.
//!
//! Wire layout, all integers little-endian:
//!
//! ```text
//! i32 size | i32 request_id | i32 type | body … | 0x00 | 0x00
//! ```
//!
//! `size` counts every byte after itself, so an empty body gives `size = 10`.

use bytes::{Buf, BufMut, BytesMut};

use crate::{Error, Result};

/// Bytes of `request_id`, `type` and the two trailing NULs.
const OVERHEAD: usize = 10;

/// Largest body accepted in either direction.
pub const MAX_BODY: usize = 4096;

/// The packet `type` field.
///
/// The protocol reuses `2` for both an outgoing command and the server's
/// reply to a login, so the meaning depends on direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
  Login,
  /// Outgoing command, or incoming auth response.
  CommandOrAuthResponse,
  ResponseValue,
}

impl PacketKind {
  fn code(self) -> i32 {
    match self {
      Self::Login => 3,
      Self::CommandOrAuthResponse => 2,
      Self::ResponseValue => 0,
    }
  }

  fn from_code(code: i32) -> Result<Self> {
    match code {
      3 => Ok(Self::Login),
      2 => Ok(Self::CommandOrAuthResponse),
      0 => Ok(Self::ResponseValue),
      other => Err(Error::Protocol(format!("unknown packet type {other}"))),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
  pub request_id: i32,
  pub kind:       PacketKind,
  pub body:       String,
}

impl Packet {
  pub fn new(request_id: i32, kind: PacketKind, body: impl Into<String>) -> Self {
    Self { request_id, kind, body: body.into() }
  }

  /// Append the framed packet to `dst`. Fails without writing anything if
  /// the body exceeds [`MAX_BODY`].
  pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
    let body = self.body.as_bytes();
    let size = Some(body.len())
      .filter(|len| *len <= MAX_BODY)
      .and_then(|len| i32::try_from(OVERHEAD + len).ok())
      .ok_or(Error::BodyTooLarge(body.len()))?;

    dst.reserve(4 + OVERHEAD + body.len());
    dst.put_i32_le(size);
    dst.put_i32_le(self.request_id);
    dst.put_i32_le(self.kind.code());
    dst.put_slice(body);
    dst.put_u8(0);
    dst.put_u8(0);
    Ok(())
  }

  /// Decode one packet from the front of `src`.
  ///
  /// Returns `Ok(None)` when `src` does not yet hold a whole packet; nothing
  /// is consumed in that case.
  pub fn decode(src: &mut BytesMut) -> Result<Option<Self>> {
    if src.len() < 4 {
      return Ok(None);
    }

    let size = i32::from_le_bytes([src[0], src[1], src[2], src[3]]);
    let size = usize::try_from(size)
      .ok()
      .filter(|s| (OVERHEAD..=OVERHEAD + MAX_BODY).contains(s))
      .ok_or_else(|| Error::Protocol(format!("packet size {size} out of range")))?;

    if src.len() < 4 + size {
      return Ok(None);
    }

    src.advance(4);
    let mut frame = src.split_to(size);
    let request_id = frame.get_i32_le();
    let kind = PacketKind::from_code(frame.get_i32_le())?;

    let body_len = size - OVERHEAD;
    if frame[body_len..] != [0, 0] {
      return Err(Error::Protocol("missing packet terminator".into()));
    }
    let body = String::from_utf8_lossy(&frame[..body_len]).into_owned();

    Ok(Some(Self { request_id, kind, body }))
  }
}
