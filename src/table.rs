//! HPACK indexing tables (RFC 7541 Section 2.3).
//!
//! The static table is a fixed list of 61 common header fields shared by
//! every connection. The dynamic table is a per-connection FIFO of fields
//! the peer asked to index, bounded by a size the peer may resize within a
//! locally configured ceiling.

use std::collections::VecDeque;

/// Per-entry overhead added to the octet lengths when accounting table
/// size (RFC 7541 Section 4.1).
pub const ENTRY_OVERHEAD: usize = 32;

/// An owned header name/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    name: Vec<u8>,
    value: Vec<u8>,
}

impl HeaderField {
    pub fn new(name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Table size contribution: octet lengths plus the fixed 32-octet
    /// overhead (RFC 7541 Section 4.1).
    pub fn len(&self) -> usize {
        self.name.len() + self.value.len() + ENTRY_OVERHEAD
    }

    /// A header field is never empty for size-accounting purposes.
    pub fn is_empty(&self) -> bool {
        false
    }
}

// -- Static table --

/// RFC 7541 Appendix A.
const STATIC_TABLE: &[(&[u8], &[u8])] = &[
    (b":authority", b""),                   // 1
    (b":method", b"GET"),                   // 2
    (b":method", b"POST"),                  // 3
    (b":path", b"/"),                       // 4
    (b":path", b"/index.html"),             // 5
    (b":scheme", b"http"),                  // 6
    (b":scheme", b"https"),                 // 7
    (b":status", b"200"),                   // 8
    (b":status", b"204"),                   // 9
    (b":status", b"206"),                   // 10
    (b":status", b"304"),                   // 11
    (b":status", b"400"),                   // 12
    (b":status", b"404"),                   // 13
    (b":status", b"500"),                   // 14
    (b"accept-charset", b""),               // 15
    (b"accept-encoding", b"gzip, deflate"), // 16
    (b"accept-language", b""),              // 17
    (b"accept-ranges", b""),                // 18
    (b"accept", b""),                       // 19
    (b"access-control-allow-origin", b""),  // 20
    (b"age", b""),                          // 21
    (b"allow", b""),                        // 22
    (b"authorization", b""),                // 23
    (b"cache-control", b""),                // 24
    (b"content-disposition", b""),          // 25
    (b"content-encoding", b""),             // 26
    (b"content-language", b""),             // 27
    (b"content-length", b""),               // 28
    (b"content-location", b""),             // 29
    (b"content-range", b""),                // 30
    (b"content-type", b""),                 // 31
    (b"cookie", b""),                       // 32
    (b"date", b""),                         // 33
    (b"etag", b""),                         // 34
    (b"expect", b""),                       // 35
    (b"expires", b""),                      // 36
    (b"from", b""),                         // 37
    (b"host", b""),                         // 38
    (b"if-match", b""),                     // 39
    (b"if-modified-since", b""),            // 40
    (b"if-none-match", b""),                // 41
    (b"if-range", b""),                     // 42
    (b"if-unmodified-since", b""),          // 43
    (b"last-modified", b""),                // 44
    (b"link", b""),                         // 45
    (b"location", b""),                     // 46
    (b"max-forwards", b""),                 // 47
    (b"proxy-authenticate", b""),           // 48
    (b"proxy-authorization", b""),          // 49
    (b"range", b""),                        // 50
    (b"referer", b""),                      // 51
    (b"refresh", b""),                      // 52
    (b"retry-after", b""),                  // 53
    (b"server", b""),                       // 54
    (b"set-cookie", b""),                   // 55
    (b"strict-transport-security", b""),    // 56
    (b"transfer-encoding", b""),            // 57
    (b"user-agent", b""),                   // 58
    (b"vary", b""),                         // 59
    (b"via", b""),                          // 60
    (b"www-authenticate", b""),             // 61
];

/// Number of static table entries.
pub const STATIC_TABLE_LEN: usize = 61;

/// Look up a static table entry by its 1-based HPACK index.
pub fn static_entry(index: u32) -> Option<(&'static [u8], &'static [u8])> {
    if index == 0 {
        return None;
    }
    STATIC_TABLE.get(index as usize - 1).copied()
}

/// Static table index for a `:status` value, for the response status
/// codes the table carries.
pub fn status_index(status: u16) -> Option<u32> {
    match status {
        200 => Some(8),
        204 => Some(9),
        206 => Some(10),
        304 => Some(11),
        400 => Some(12),
        404 => Some(13),
        500 => Some(14),
        _ => None,
    }
}

// -- Dynamic table --

/// HPACK dynamic table (RFC 7541 Section 2.3.2).
///
/// Entries are stored newest-first: index 0 is the most recently inserted
/// entry and corresponds to HPACK index `STATIC_TABLE_LEN + 1`. Insertion
/// shifts every existing entry's index up by one; eviction removes from
/// the back.
#[derive(Debug)]
pub struct DynamicTable {
    entries: VecDeque<HeaderField>,
    size: usize,
    max_size: usize,
}

impl DynamicTable {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            size: 0,
            max_size,
        }
    }

    /// Entry at 0-based dynamic index (0 = newest).
    pub fn get(&self, index: usize) -> Option<&HeaderField> {
        self.entries.get(index)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current size in octets, with per-entry overhead.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Current size limit in octets.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Insert a field, evicting the oldest entries until it fits. An
    /// entry larger than the whole table empties the table and is not
    /// inserted; per RFC 7541 Section 4.4 this is not an error.
    pub fn insert(&mut self, name: &[u8], value: &[u8]) {
        let field = HeaderField::new(name, value);
        let entry_len = field.len();

        if entry_len > self.max_size {
            self.entries.clear();
            self.size = 0;
            return;
        }

        while self.size + entry_len > self.max_size {
            if let Some(evicted) = self.entries.pop_back() {
                self.size -= evicted.len();
            } else {
                break;
            }
        }

        self.size += entry_len;
        self.entries.push_front(field);
    }

    /// Change the size limit, evicting immediately when lowered.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        while self.size > max_size {
            if let Some(evicted) = self.entries.pop_back() {
                self.size -= evicted.len();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_table_bounds() {
        assert_eq!(static_entry(0), None);
        assert_eq!(static_entry(1), Some((&b":authority"[..], &b""[..])));
        assert_eq!(static_entry(2), Some((&b":method"[..], &b"GET"[..])));
        assert_eq!(
            static_entry(61),
            Some((&b"www-authenticate"[..], &b""[..]))
        );
        assert_eq!(static_entry(62), None);
        assert_eq!(STATIC_TABLE.len(), STATIC_TABLE_LEN);
    }

    #[test]
    fn status_fast_path_matches_table() {
        for (status, index) in [
            (200u16, 8u32),
            (204, 9),
            (206, 10),
            (304, 11),
            (400, 12),
            (404, 13),
            (500, 14),
        ] {
            assert_eq!(status_index(status), Some(index));
            let (name, value) = static_entry(index).unwrap();
            assert_eq!(name, b":status");
            assert_eq!(value, status.to_string().as_bytes());
        }
        assert_eq!(status_index(302), None);
        assert_eq!(status_index(503), None);
    }

    #[test]
    fn entry_size_includes_overhead() {
        // RFC 7541 C.5.1: ":status: 302" is 42 octets, 10 + 32.
        let field = HeaderField::new(b":status".to_vec(), b"302".to_vec());
        assert_eq!(field.len(), 42);
    }

    #[test]
    fn newest_entry_is_index_zero() {
        let mut table = DynamicTable::new(4096);
        table.insert(b"a", b"1");
        table.insert(b"b", b"2");
        table.insert(b"c", b"3");
        assert_eq!(table.get(0).unwrap().name(), b"c");
        assert_eq!(table.get(1).unwrap().name(), b"b");
        assert_eq!(table.get(2).unwrap().name(), b"a");
        assert_eq!(table.get(3), None);
        assert_eq!(table.len(), 3);
        assert_eq!(table.size(), 3 * 34);
    }

    #[test]
    fn insert_evicts_oldest_first() {
        // Each entry is 2 + 32 = 34 octets; room for exactly two.
        let mut table = DynamicTable::new(68);
        table.insert(b"a", b"1");
        table.insert(b"b", b"2");
        table.insert(b"c", b"3");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().name(), b"c");
        assert_eq!(table.get(1).unwrap().name(), b"b");
        assert_eq!(table.size(), 68);
    }

    #[test]
    fn oversized_entry_empties_table() {
        let mut table = DynamicTable::new(68);
        table.insert(b"a", b"1");
        table.insert(b"b", b"2");
        let big = vec![b'x'; 100];
        table.insert(b"huge", &big);
        assert!(table.is_empty());
        assert_eq!(table.size(), 0);
        // The table keeps working afterwards.
        table.insert(b"c", b"3");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn lowering_max_size_evicts() {
        let mut table = DynamicTable::new(4096);
        table.insert(b"a", b"1");
        table.insert(b"b", b"2");
        table.insert(b"c", b"3");
        table.set_max_size(68);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().name(), b"c");
        table.set_max_size(0);
        assert!(table.is_empty());
        assert_eq!(table.size(), 0);
    }
}
