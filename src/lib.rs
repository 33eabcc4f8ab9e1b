//! HPACK (RFC 7541) header compression for HTTP/2.
//!
//! This crate implements both sides of the HPACK codec: a resumable
//! streaming [`Decoder`] that maintains the connection's dynamic table,
//! and stateless [`encoder`] routines that write single header-field
//! instructions into caller buffers. It is sans-IO -- the caller feeds
//! header-block fragments in and receives decoded fields through a
//! callback.
//!
//! # Decoding
//!
//! ```
//! use protocol_hpack::{Decoder, HeaderList};
//!
//! let mut decoder = Decoder::default();
//! let mut headers = HeaderList::new();
//!
//! // :method: GET, :scheme: http, :path: /
//! decoder.decode(&[0x82, 0x86, 0x84], true, &mut headers).unwrap();
//!
//! assert_eq!(headers.fields()[0].name(), b":method");
//! assert_eq!(headers.fields()[0].value(), b"GET");
//! ```
//!
//! A block split across HEADERS and CONTINUATION frames is decoded by
//! calling [`Decoder::decode`] once per fragment, passing `end_headers`
//! on the last one. Decode errors are fatal to the connection: the
//! dynamic table may no longer match the peer's, so the caller must stop
//! decoding and tear the connection down (COMPRESSION_ERROR).
//!
//! # Encoding
//!
//! ```
//! use protocol_hpack::encoder;
//!
//! let mut buf = [0u8; 64];
//! let mut n = encoder::encode_status(200, &mut buf).unwrap();
//! n += encoder::encode_literal_without_indexing(31, b"text/html", &mut buf[n..]).unwrap();
//! assert_eq!(&buf[..2], &[0x88, 0x0f]);
//! assert_eq!(n, 13);
//! ```

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod huffman;
pub mod integer;
pub mod table;

pub use decoder::{Decoder, HeaderHandler, HeaderList};
pub use error::{DecoderError, EncoderError, HuffmanError};
pub use table::{DynamicTable, HeaderField};
