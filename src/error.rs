//! Error types for the HPACK codec.

/// Huffman decode failures (RFC 7541 Section 5.2).
///
/// Always surfaced to callers wrapped in [`DecoderError::Huffman`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HuffmanError {
    /// A bit sequence does not match any code in the canonical table.
    #[error("invalid huffman code")]
    InvalidCode,

    /// The EOS symbol was decoded as if it were data. A Huffman string
    /// never legitimately contains EOS; this always signals corrupt input.
    #[error("EOS symbol decoded as data")]
    EosDecoded,

    /// Input ended in the middle of a symbol.
    #[error("truncated huffman symbol")]
    Truncated,

    /// Trailing bits are not a valid EOS-prefix padding (all ones, fewer
    /// than eight bits).
    #[error("invalid huffman padding")]
    InvalidPadding,
}

/// Header-block decode failures.
///
/// Any of these is unrecoverable for the connection: the dynamic table is
/// no longer synchronized with the peer, so every future decode would be
/// corrupt. Callers must tear the connection down (HTTP/2
/// COMPRESSION_ERROR), not skip the offending header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecoderError {
    /// A prefix integer exceeds 31 bits.
    #[error("integer exceeds 31 bits")]
    IntegerTooLarge,

    /// A non-minimal integer encoding: a zero continuation octet anywhere
    /// but the first continuation position.
    #[error("overlong integer encoding")]
    IntegerOverlong,

    /// A string literal longer than the configured maximum header length.
    #[error("string literal exceeds configured maximum")]
    StringTooLong,

    /// The decoded header block exceeds the configured maximum length.
    #[error("header block exceeds configured maximum")]
    BlockTooLarge,

    /// An indexed reference outside the static + dynamic index space.
    #[error("header index {0} out of range")]
    InvalidIndex(u32),

    /// A dynamic table size update above the configured ceiling.
    #[error("dynamic table size update exceeds configured maximum")]
    SizeUpdateTooLarge,

    /// A dynamic table size update after a header field was already
    /// decoded in the current block (RFC 7541 Section 4.2).
    #[error("dynamic table size update after header field")]
    SizeUpdateAfterHeader,

    /// The header block ended mid-instruction.
    #[error("header block ended mid-instruction")]
    IncompleteHeaderBlock,

    /// A Huffman-encoded string literal failed to decode.
    #[error("huffman decode failed: {0}")]
    Huffman(#[from] HuffmanError),
}

/// Encode failures.
///
/// Locally recoverable: encoder routines share no state with the decoder,
/// so the caller may retry with a larger buffer or drop the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EncoderError {
    /// The destination buffer is too small; nothing usable was written.
    #[error("destination buffer too small")]
    BufferTooSmall,
}
