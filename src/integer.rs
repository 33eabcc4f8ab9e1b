//! HPACK prefix integer codec (RFC 7541 Section 5.1).
//!
//! An integer is encoded into the low N bits of a flagged octet (the
//! "prefix"), spilling into base-128 continuation octets when it does not
//! fit. Decoding is resumable: an integer may arrive split across input
//! chunks, so the decoder is fed one octet at a time and carries its
//! accumulator between calls.

use crate::error::DecoderError;

/// Encode `value` using an N-bit prefix, OR-ing `pattern` into the unused
/// high bits of the first octet. Returns the number of octets written, or
/// `None` if `dst` is too small (nothing usable is written).
pub fn encode(value: u32, prefix_bits: u8, pattern: u8, dst: &mut [u8]) -> Option<usize> {
    debug_assert!((1..=8).contains(&prefix_bits));
    let max = (1u32 << prefix_bits) - 1;
    if dst.is_empty() {
        return None;
    }
    if value < max {
        dst[0] = pattern | value as u8;
        return Some(1);
    }
    dst[0] = pattern | max as u8;
    let mut remaining = value - max;
    let mut n = 1;
    while remaining >= 128 {
        if n == dst.len() {
            return None;
        }
        dst[n] = 0x80 | (remaining & 0x7f) as u8;
        remaining >>= 7;
        n += 1;
    }
    if n == dst.len() {
        return None;
    }
    dst[n] = remaining as u8;
    Some(n + 1)
}

/// Outcome of feeding one octet to the integer decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The integer is complete.
    Done(u32),
    /// More continuation octets follow; feed the next one to [`IntegerDecoder::resume`].
    Partial(IntegerDecoder),
}

/// Resumable prefix-integer decoder.
///
/// Values are bounded to 31 bits; longer encodings are rejected rather
/// than silently truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerDecoder {
    value: u32,
    shift: u32,
}

impl IntegerDecoder {
    /// Decode the prefix octet. Completes immediately when the value fits
    /// in the prefix.
    pub fn begin(octet: u8, prefix_bits: u8) -> Step {
        debug_assert!((1..=8).contains(&prefix_bits));
        let max = (1u32 << prefix_bits) - 1;
        let prefix = u32::from(octet) & max;
        if prefix < max {
            Step::Done(prefix)
        } else {
            Step::Partial(IntegerDecoder {
                value: max,
                shift: 0,
            })
        }
    }

    /// Feed the next continuation octet.
    ///
    /// Rejects encodings that would exceed 31 bits and non-minimal
    /// encodings: a zero octet re-encodes the prefix maximum and is only
    /// legal as the very first continuation octet.
    pub fn resume(mut self, octet: u8) -> Result<Step, DecoderError> {
        if octet == 0 && self.shift != 0 {
            return Err(DecoderError::IntegerOverlong);
        }
        // 31 value bits at most: ceil(31 / 7) continuation octets.
        if self.shift > 28 {
            return Err(DecoderError::IntegerTooLarge);
        }
        let payload = u32::from(octet & 0x7f);
        // Significant bits of this octet, shifted into place, must not
        // spill past bit 31.
        if payload != 0 && 32 - payload.leading_zeros() + self.shift > 31 {
            return Err(DecoderError::IntegerTooLarge);
        }
        self.value += payload << self.shift;
        self.shift += 7;
        if octet & 0x80 != 0 {
            return Ok(Step::Partial(self));
        }
        if self.value > i32::MAX as u32 {
            return Err(DecoderError::IntegerTooLarge);
        }
        Ok(Step::Done(self.value))
    }
}

/// Decode a complete integer from `buf`. Returns the value and the number
/// of octets consumed. Convenience for callers that have the whole
/// encoding in hand; the streaming decoder path uses [`IntegerDecoder`]
/// directly.
pub fn decode(buf: &[u8], prefix_bits: u8) -> Result<Option<(u32, usize)>, DecoderError> {
    let Some((&first, rest)) = buf.split_first() else {
        return Ok(None);
    };
    let mut decoder = match IntegerDecoder::begin(first, prefix_bits) {
        Step::Done(value) => return Ok(Some((value, 1))),
        Step::Partial(decoder) => decoder,
    };
    for (i, &octet) in rest.iter().enumerate() {
        match decoder.resume(octet)? {
            Step::Done(value) => return Ok(Some((value, i + 2))),
            Step::Partial(next) => decoder = next,
        }
    }
    Ok(None)
}
