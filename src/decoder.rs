//! Streaming HPACK header-block decoder (RFC 7541 Section 3).
//!
//! The decoder is resumable: a header block may span several HEADERS and
//! CONTINUATION frames, so [`Decoder::decode`] accepts arbitrary input
//! fragments and carries its position between calls. State is a sum type
//! whose continuation variants carry exactly the data they need (a
//! partially decoded integer, a remaining-octet count), so an impossible
//! combination of "where in the instruction" and "what has been read" is
//! unrepresentable.
//!
//! Decoded fields are pushed to a [`HeaderHandler`] in wire order. Any
//! error is fatal to the connection: the dynamic table may be out of sync
//! with the peer, so the caller must not decode further blocks.

use crate::error::DecoderError;
use crate::huffman;
use crate::integer::{IntegerDecoder, Step};
use crate::table::{static_entry, DynamicTable, HeaderField, STATIC_TABLE_LEN};

/// RFC 7541 / HTTP/2 SETTINGS_HEADER_TABLE_SIZE default.
pub const DEFAULT_MAX_DYNAMIC_TABLE_SIZE: usize = 4096;

/// Default cap on the total decoded size of one header block.
pub const DEFAULT_MAX_HEADERS_LENGTH: usize = 65536;

const STRING_BUFFER_SIZE: usize = 4096;

// Instruction patterns (RFC 7541 Section 6).
const INDEXED_MASK: u8 = 0x80;
const LITERAL_WITH_INDEXING_MASK: u8 = 0xc0;
const LITERAL_WITH_INDEXING: u8 = 0x40;
const SIZE_UPDATE_MASK: u8 = 0xe0;
const SIZE_UPDATE: u8 = 0x20;
const NEVER_INDEXED_MASK: u8 = 0xf0;
const NEVER_INDEXED: u8 = 0x10;

const HUFFMAN_FLAG: u8 = 0x80;

/// Receives decoded header fields in wire order.
pub trait HeaderHandler {
    fn on_header(&mut self, name: &[u8], value: &[u8]);
}

impl<F: FnMut(&[u8], &[u8])> HeaderHandler for F {
    fn on_header(&mut self, name: &[u8], value: &[u8]) {
        self(name, value)
    }
}

/// A [`HeaderHandler`] that collects fields into a `Vec`.
#[derive(Debug, Default)]
pub struct HeaderList {
    fields: Vec<HeaderField>,
}

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[HeaderField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear()
    }
}

impl HeaderHandler for HeaderList {
    fn on_header(&mut self, name: &[u8], value: &[u8]) {
        self.fields.push(HeaderField::new(name, value));
    }
}

/// Where the decoder stands inside the current instruction.
#[derive(Debug, Clone, Copy)]
enum State {
    /// At an instruction boundary.
    Ready,
    /// Continuation octets of an indexed header field's index.
    FieldIndex(IntegerDecoder),
    /// Continuation octets of a literal's name index.
    NameIndex(IntegerDecoder),
    /// Expecting the first octet of a literal name length.
    NameLength,
    /// Continuation octets of the name length.
    NameLengthContinue { int: IntegerDecoder, huffman: bool },
    /// Collecting name octets; `len` is the literal's full length.
    Name { len: usize, huffman: bool },
    /// Expecting the first octet of the value length.
    ValueLength,
    /// Continuation octets of the value length.
    ValueLengthContinue { int: IntegerDecoder, huffman: bool },
    /// Collecting value octets; `len` is the literal's full length.
    Value { len: usize, huffman: bool },
    /// Continuation octets of a dynamic table size update.
    SizeUpdate(IntegerDecoder),
}

/// Which string literal is being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringPart {
    Name,
    Value,
}

/// Resumable header-block decoder with its connection's dynamic table.
pub struct Decoder {
    dynamic_table: DynamicTable,
    /// Ceiling for peer-requested table resizes; the negotiated
    /// SETTINGS_HEADER_TABLE_SIZE.
    max_dynamic_table_size: usize,
    max_headers_length: usize,
    state: State,
    /// Raw octets of the string literal being collected.
    string_buf: Vec<u8>,
    name: Vec<u8>,
    value: Vec<u8>,
    /// Insert the current field into the dynamic table after emitting it.
    index_entry: bool,
    /// A field has been decoded in the current block, closing the window
    /// in which size updates are legal (RFC 7541 Section 4.2).
    headers_seen: bool,
    /// Cumulative decoded name+value octets for the current block.
    block_size: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DYNAMIC_TABLE_SIZE, DEFAULT_MAX_HEADERS_LENGTH)
    }
}

impl Decoder {
    pub fn new(max_dynamic_table_size: usize, max_headers_length: usize) -> Self {
        Self {
            dynamic_table: DynamicTable::new(max_dynamic_table_size),
            max_dynamic_table_size,
            max_headers_length,
            state: State::Ready,
            string_buf: Vec::with_capacity(STRING_BUFFER_SIZE),
            name: Vec::new(),
            value: Vec::new(),
            index_entry: false,
            headers_seen: false,
            block_size: 0,
        }
    }

    pub fn dynamic_table(&self) -> &DynamicTable {
        &self.dynamic_table
    }

    /// Decode one fragment of a header block, pushing each complete field
    /// to `handler`. Set `end_headers` on the fragment that ends the block
    /// (the END_HEADERS flag); the decoder then verifies the block did not
    /// stop mid-instruction and re-arms for the next block.
    pub fn decode<H: HeaderHandler>(
        &mut self,
        data: &[u8],
        end_headers: bool,
        handler: &mut H,
    ) -> Result<(), DecoderError> {
        let mut pos = 0;
        while pos < data.len() {
            match self.state {
                State::Name { len, huffman } => {
                    pos += self.take_string(&data[pos..], len);
                    if self.string_buf.len() == len {
                        self.finish_string(StringPart::Name, huffman, handler)?;
                    }
                }
                State::Value { len, huffman } => {
                    pos += self.take_string(&data[pos..], len);
                    if self.string_buf.len() == len {
                        self.finish_string(StringPart::Value, huffman, handler)?;
                    }
                }
                _ => {
                    let octet = data[pos];
                    pos += 1;
                    self.feed(octet, handler)?;
                }
            }
        }

        if end_headers {
            if !matches!(self.state, State::Ready) {
                return Err(DecoderError::IncompleteHeaderBlock);
            }
            self.headers_seen = false;
            self.block_size = 0;
        }
        Ok(())
    }

    fn feed<H: HeaderHandler>(&mut self, octet: u8, handler: &mut H) -> Result<(), DecoderError> {
        match self.state {
            State::Ready => self.dispatch(octet, handler),
            State::FieldIndex(int) => match int.resume(octet)? {
                Step::Done(index) => self.emit_indexed(index, handler),
                Step::Partial(int) => {
                    self.state = State::FieldIndex(int);
                    Ok(())
                }
            },
            State::NameIndex(int) => match int.resume(octet)? {
                Step::Done(index) => self.on_name_index(index),
                Step::Partial(int) => {
                    self.state = State::NameIndex(int);
                    Ok(())
                }
            },
            State::NameLength => {
                let huffman = octet & HUFFMAN_FLAG != 0;
                match IntegerDecoder::begin(octet, 7) {
                    Step::Done(len) => self.on_string_length(StringPart::Name, len, huffman, handler),
                    Step::Partial(int) => {
                        self.state = State::NameLengthContinue { int, huffman };
                        Ok(())
                    }
                }
            }
            State::NameLengthContinue { int, huffman } => match int.resume(octet)? {
                Step::Done(len) => self.on_string_length(StringPart::Name, len, huffman, handler),
                Step::Partial(int) => {
                    self.state = State::NameLengthContinue { int, huffman };
                    Ok(())
                }
            },
            State::ValueLength => {
                let huffman = octet & HUFFMAN_FLAG != 0;
                match IntegerDecoder::begin(octet, 7) {
                    Step::Done(len) => self.on_string_length(StringPart::Value, len, huffman, handler),
                    Step::Partial(int) => {
                        self.state = State::ValueLengthContinue { int, huffman };
                        Ok(())
                    }
                }
            }
            State::ValueLengthContinue { int, huffman } => match int.resume(octet)? {
                Step::Done(len) => self.on_string_length(StringPart::Value, len, huffman, handler),
                Step::Partial(int) => {
                    self.state = State::ValueLengthContinue { int, huffman };
                    Ok(())
                }
            },
            State::SizeUpdate(int) => match int.resume(octet)? {
                Step::Done(size) => self.on_size_update(size),
                Step::Partial(int) => {
                    self.state = State::SizeUpdate(int);
                    Ok(())
                }
            },
            // Handled by the run-copying arms in `decode`.
            State::Name { .. } | State::Value { .. } => unreachable!(),
        }
    }

    /// Decode an instruction octet, most specific pattern first.
    fn dispatch<H: HeaderHandler>(&mut self, octet: u8, handler: &mut H) -> Result<(), DecoderError> {
        if octet & INDEXED_MASK != 0 {
            match IntegerDecoder::begin(octet, 7) {
                Step::Done(index) => self.emit_indexed(index, handler),
                Step::Partial(int) => {
                    self.state = State::FieldIndex(int);
                    Ok(())
                }
            }
        } else if octet & LITERAL_WITH_INDEXING_MASK == LITERAL_WITH_INDEXING {
            self.index_entry = true;
            self.begin_literal(octet, 6)
        } else if octet & SIZE_UPDATE_MASK == SIZE_UPDATE {
            if self.headers_seen {
                return Err(DecoderError::SizeUpdateAfterHeader);
            }
            match IntegerDecoder::begin(octet, 5) {
                Step::Done(size) => self.on_size_update(size),
                Step::Partial(int) => {
                    self.state = State::SizeUpdate(int);
                    Ok(())
                }
            }
        } else {
            // 0001xxxx never indexed, 0000xxxx without indexing; identical
            // decode path, neither inserts.
            debug_assert!(octet & NEVER_INDEXED_MASK == NEVER_INDEXED || octet & NEVER_INDEXED_MASK == 0);
            self.index_entry = false;
            self.begin_literal(octet, 4)
        }
    }

    fn begin_literal(&mut self, octet: u8, prefix_bits: u8) -> Result<(), DecoderError> {
        match IntegerDecoder::begin(octet, prefix_bits) {
            Step::Done(index) => self.on_name_index(index),
            Step::Partial(int) => {
                self.state = State::NameIndex(int);
                Ok(())
            }
        }
    }

    /// Indexed header field: emit straight from the table.
    fn emit_indexed<H: HeaderHandler>(
        &mut self,
        index: u32,
        handler: &mut H,
    ) -> Result<(), DecoderError> {
        let (name, value) = lookup(&self.dynamic_table, index)?;
        let block_size = self.block_size + name.len() + value.len();
        if block_size > self.max_headers_length {
            return Err(DecoderError::BlockTooLarge);
        }
        handler.on_header(name, value);
        self.block_size = block_size;
        self.headers_seen = true;
        self.state = State::Ready;
        Ok(())
    }

    /// Name index of a literal instruction. Zero means a literal name
    /// follows; otherwise the referenced name is copied out now, because
    /// inserting the field being decoded may evict the referenced entry.
    fn on_name_index(&mut self, index: u32) -> Result<(), DecoderError> {
        if index == 0 {
            self.state = State::NameLength;
            return Ok(());
        }
        let (name, _) = lookup(&self.dynamic_table, index)?;
        self.name.clear();
        self.name.extend_from_slice(name);
        self.state = State::ValueLength;
        Ok(())
    }

    fn on_string_length<H: HeaderHandler>(
        &mut self,
        part: StringPart,
        len: u32,
        huffman: bool,
        handler: &mut H,
    ) -> Result<(), DecoderError> {
        let len = len as usize;
        if len > self.max_headers_length {
            return Err(DecoderError::StringTooLong);
        }
        self.string_buf.clear();
        if len == 0 {
            return self.finish_string(part, huffman, handler);
        }
        self.state = match part {
            StringPart::Name => State::Name { len, huffman },
            StringPart::Value => State::Value { len, huffman },
        };
        Ok(())
    }

    /// Copy string octets out of the input run; returns octets consumed.
    fn take_string(&mut self, data: &[u8], total: usize) -> usize {
        let take = (total - self.string_buf.len()).min(data.len());
        self.string_buf.extend_from_slice(&data[..take]);
        take
    }

    fn finish_string<H: HeaderHandler>(
        &mut self,
        part: StringPart,
        huffman: bool,
        handler: &mut H,
    ) -> Result<(), DecoderError> {
        let dst = match part {
            StringPart::Name => &mut self.name,
            StringPart::Value => &mut self.value,
        };
        dst.clear();
        if huffman {
            huffman::decode(&self.string_buf, dst)?;
        } else {
            dst.extend_from_slice(&self.string_buf);
        }
        match part {
            StringPart::Name => {
                self.state = State::ValueLength;
                Ok(())
            }
            StringPart::Value => self.commit_field(handler),
        }
    }

    /// A complete field: emit it, then insert if the instruction asked for
    /// incremental indexing.
    fn commit_field<H: HeaderHandler>(&mut self, handler: &mut H) -> Result<(), DecoderError> {
        let block_size = self.block_size + self.name.len() + self.value.len();
        if block_size > self.max_headers_length {
            return Err(DecoderError::BlockTooLarge);
        }
        handler.on_header(&self.name, &self.value);
        if self.index_entry {
            self.dynamic_table.insert(&self.name, &self.value);
        }
        self.block_size = block_size;
        self.headers_seen = true;
        self.state = State::Ready;
        Ok(())
    }

    fn on_size_update(&mut self, size: u32) -> Result<(), DecoderError> {
        let size = size as usize;
        if size > self.max_dynamic_table_size {
            return Err(DecoderError::SizeUpdateTooLarge);
        }
        self.dynamic_table.set_max_size(size);
        self.state = State::Ready;
        Ok(())
    }
}

/// Resolve an index against the combined static + dynamic address space.
/// Index 0 is never a valid field reference.
fn lookup(dynamic_table: &DynamicTable, index: u32) -> Result<(&[u8], &[u8]), DecoderError> {
    if let Some(entry) = static_entry(index) {
        return Ok(entry);
    }
    if index as usize > STATIC_TABLE_LEN {
        if let Some(field) = dynamic_table.get(index as usize - STATIC_TABLE_LEN - 1) {
            return Ok((field.name(), field.value()));
        }
    }
    Err(DecoderError::InvalidIndex(index))
}
