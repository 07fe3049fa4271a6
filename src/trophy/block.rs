//! Save file splitting and trophy block decoding/encoding.

use tracing::debug;

use crate::buffer;
use crate::error::{PulError, Result};
use crate::names::TrackNames;

use super::format::{
    entry_offset, flags_offset, Category, MAGIC, MAGIC_OFFSET, SIZE_OFFSET, TRACK_DATA_OFFSET,
    TRACK_ENTRY_SIZE, TRACK_ID_LEN, VERSION_OFFSET,
};
use super::track::{Flags, TrackEntry, TrackId};

/// A save file split at its trophy magic.
#[derive(Debug, Clone)]
pub struct SaveFile {
    /// Everything before the magic, carried through untouched.
    pub prefix: Vec<u8>,
    /// The trophy block, starting at the magic.
    pub block: TrophyBlock,
}

impl SaveFile {
    /// Locate the trophy magic and split the file around it.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let index = buffer::find_magic(bytes, MAGIC).ok_or(PulError::MagicNotFound)?;
        let (prefix, block) = buffer::split_at(bytes, index);
        debug!(
            magic_offset = index,
            block_len = block.len(),
            "Found trophy block"
        );
        Ok(Self {
            prefix,
            block: TrophyBlock::new(block),
        })
    }

    /// Concatenate the prefix and the (possibly patched) trophy block.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.prefix.len() + self.block.len());
        out.extend_from_slice(&self.prefix);
        out.extend_from_slice(self.block.as_bytes());
        out
    }
}

/// Decoded header fields needed to bound track iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Declared size of the trophy block, counted from the magic.
    pub total_size: u32,
}

/// Owned bytes of a trophy block, starting at the magic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrophyBlock {
    bytes: Vec<u8>,
}

impl TrophyBlock {
    /// Wrap raw block bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Raw bytes of the block.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of the block in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if the block holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read the total-size field.
    pub fn decode_header(&self) -> Result<BlockHeader> {
        Ok(BlockHeader {
            total_size: buffer::read_u32_be(&self.bytes, SIZE_OFFSET)?,
        })
    }

    /// Format version stored in the header.
    pub fn version(&self) -> Result<u32> {
        buffer::read_u32_be(&self.bytes, VERSION_OFFSET)
    }

    /// Counter currently stored in the header for `category`.
    pub fn counter(&self, category: Category) -> Result<u16> {
        buffer::read_u16_be(&self.bytes, category.counter_offset())
    }

    /// End of the track data: `min(magic + total_size, len)`.
    pub fn track_data_end(&self) -> Result<usize> {
        let header = self.decode_header()?;
        let declared = MAGIC_OFFSET.saturating_add(header.total_size as usize);
        Ok(declared.min(self.bytes.len()))
    }

    /// Decode every track entry between the header and the declared end.
    ///
    /// Names are resolved through `names`; decoding never mutates the block.
    pub fn decode_tracks(&self, names: &TrackNames) -> Result<TrackTable> {
        let end = self.track_data_end()?;
        let mut records = Vec::new();
        let mut offset = TRACK_DATA_OFFSET;

        while offset + TRACK_ENTRY_SIZE <= end {
            let chunk = &self.bytes[offset..offset + TRACK_ENTRY_SIZE];
            let mut id = [0u8; TRACK_ID_LEN];
            let mut flags: Flags = [0u8; 4];
            id.copy_from_slice(&chunk[..TRACK_ID_LEN]);
            flags.copy_from_slice(&chunk[TRACK_ID_LEN..]);

            let id = TrackId(id);
            records.push(TrackRecord {
                offset,
                entry: TrackEntry {
                    id,
                    name: names.resolve(&id).to_string(),
                    flags,
                },
            });
            offset += TRACK_ENTRY_SIZE;
        }

        debug!(count = records.len(), end = end, "Decoded track entries");
        Ok(TrackTable { records })
    }

    /// Write the flags of the entry at decode position `entry_index`.
    pub fn encode_track_flags(&mut self, entry_index: usize, flags: &Flags) -> Result<()> {
        self.write_flags_at(entry_offset(entry_index), flags)
    }

    /// Write flags for the entry that starts at `entry_offset`.
    pub fn write_flags_at(&mut self, entry_offset: usize, flags: &Flags) -> Result<()> {
        buffer::write_bytes(&mut self.bytes, flags_offset(entry_offset), flags)
    }

    /// Store `value` in the header counter for `category`.
    pub fn write_counter(&mut self, category: Category, value: u16) -> Result<()> {
        buffer::write_u16_be(&mut self.bytes, category.counter_offset(), value)
    }
}

/// A decoded entry together with the block offset it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    offset: usize,
    /// The decoded entry.
    pub entry: TrackEntry,
}

impl TrackRecord {
    /// Offset of the entry's first byte inside its trophy block.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Decoded track entries, each bound to its source offset.
///
/// Write-back goes through [`TrackRecord::offset`], so the records can be
/// reordered or filtered without touching unrelated entries. A table must
/// only be written back into the block it was decoded from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTable {
    records: Vec<TrackRecord>,
}

impl TrackTable {
    /// Records in decode order.
    pub fn records(&self) -> &[TrackRecord] {
        &self.records
    }

    /// Mutable records in decode order. Only entries can change; offsets stay
    /// bound to the bytes they were read from.
    pub fn records_mut(&mut self) -> &mut [TrackRecord] {
        &mut self.records
    }

    /// Iterate over the entries in decode order.
    pub fn entries(&self) -> impl Iterator<Item = &TrackEntry> {
        self.records.iter().map(|r| &r.entry)
    }

    /// Mutable iteration over the entries in decode order.
    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut TrackEntry> {
        self.records.iter_mut().map(|r| &mut r.entry)
    }

    /// First entry with identifier `id`.
    pub fn find(&self, id: &TrackId) -> Option<&TrackEntry> {
        self.entries().find(|e| e.id == *id)
    }

    /// Mutable access to the first entry with identifier `id`.
    pub fn find_mut(&mut self, id: &TrackId) -> Option<&mut TrackEntry> {
        self.entries_mut().find(|e| e.id == *id)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Block with version 7, the given declared size and entries, zeroed counters.
    fn block_bytes(total_size: u32, entries: &[([u8; 4], [u8; 4])]) -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(MAGIC);
        b.extend_from_slice(&7u32.to_be_bytes());
        b.extend_from_slice(&total_size.to_be_bytes());
        b.extend_from_slice(&[0u8; 8]);
        for (id, flags) in entries {
            b.extend_from_slice(id);
            b.extend_from_slice(flags);
        }
        b
    }

    fn names() -> TrackNames {
        TrackNames::load(["Luigi Circuit=01020304", "Moo Moo Meadows=05060708"])
    }

    #[test]
    fn test_parse_splits_prefix_and_block() {
        let mut file = b"SAVEDATA\x00\x01".to_vec();
        let block = block_bytes(28, &[([1, 2, 3, 4], [1, 0, 0, 0])]);
        file.extend_from_slice(&block);

        let save = SaveFile::parse(&file).unwrap();
        assert_eq!(save.prefix, b"SAVEDATA\x00\x01");
        assert_eq!(save.block.as_bytes(), &block[..]);
        assert_eq!(save.to_bytes(), file);
    }

    #[test]
    fn test_parse_without_magic_fails() {
        let err = SaveFile::parse(b"no trophy data in here").unwrap_err();
        assert!(matches!(err, PulError::MagicNotFound));
    }

    #[test]
    fn test_header_fields_on_demand() {
        let mut bytes = block_bytes(20, &[]);
        bytes[12..14].copy_from_slice(&3u16.to_be_bytes());
        bytes[18..20].copy_from_slice(&9u16.to_be_bytes());
        let block = TrophyBlock::new(bytes);

        assert_eq!(block.decode_header().unwrap().total_size, 20);
        assert_eq!(block.version().unwrap(), 7);
        assert_eq!(block.counter(Category::NormalMushroom).unwrap(), 3);
        assert_eq!(block.counter(Category::FastFeather).unwrap(), 9);
    }

    #[test]
    fn test_decode_tracks_in_order_with_names() {
        let block = TrophyBlock::new(block_bytes(
            36,
            &[([1, 2, 3, 4], [1, 0, 1, 0]), ([5, 6, 7, 8], [0, 0, 0, 1])],
        ));
        let table = block.decode_tracks(&names()).unwrap();
        let records = table.records();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].offset(), 20);
        assert_eq!(records[0].entry.id, TrackId([1, 2, 3, 4]));
        assert_eq!(records[0].entry.name, "Luigi Circuit");
        assert_eq!(records[0].entry.flags, [1, 0, 1, 0]);
        assert_eq!(records[1].offset(), 28);
        assert_eq!(records[1].entry.name, "Moo Moo Meadows");
        assert_eq!(records[1].entry.flags, [0, 0, 0, 1]);
    }

    #[test]
    fn test_decode_stops_at_declared_size() {
        // Two entries present, but the size only covers the first.
        let block = TrophyBlock::new(block_bytes(
            28,
            &[([1, 2, 3, 4], [1, 0, 0, 0]), ([5, 6, 7, 8], [1, 1, 1, 1])],
        ));
        let table = block.decode_tracks(&TrackNames::default()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].entry.name, crate::names::UNKNOWN_TRACK);
    }

    #[test]
    fn test_decode_stops_at_buffer_end() {
        // Declared size far beyond the data, plus a trailing partial entry.
        let mut bytes = block_bytes(0xFFFF_FFFF, &[([1, 2, 3, 4], [0, 1, 0, 0])]);
        bytes.extend_from_slice(&[9, 9, 9]);
        let block = TrophyBlock::new(bytes);

        let table = block.decode_tracks(&TrackNames::default()).unwrap();
        assert_eq!(table.len(), 1);
        let end = block.track_data_end().unwrap();
        for r in table.records() {
            assert!(r.offset() + TRACK_ENTRY_SIZE <= end);
        }
    }

    #[test]
    fn test_decode_header_only_block() {
        let block = TrophyBlock::new(block_bytes(20, &[]));
        assert!(block.decode_tracks(&TrackNames::default()).unwrap().is_empty());
    }

    #[test]
    fn test_decode_truncated_header_fails() {
        let block = TrophyBlock::new(b"TROP\x00\x00\x00\x01\x00".to_vec());
        let err = block.decode_tracks(&TrackNames::default()).unwrap_err();
        assert!(matches!(err, PulError::BufferUnderrun { offset: 8, .. }));
    }

    #[test]
    fn test_reencode_same_flags_is_identity() {
        let original = block_bytes(
            36,
            &[([1, 2, 3, 4], [1, 0, 1, 0]), ([5, 6, 7, 8], [0, 2, 0, 1])],
        );
        let mut block = TrophyBlock::new(original.clone());
        let table = block.decode_tracks(&TrackNames::default()).unwrap();
        for (i, entry) in table.entries().enumerate() {
            block.encode_track_flags(i, &entry.flags).unwrap();
        }
        assert_eq!(block.as_bytes(), &original[..]);
    }

    #[test]
    fn test_encode_touches_only_target_flags() {
        let original = block_bytes(
            36,
            &[([1, 2, 3, 4], [0, 0, 0, 0]), ([5, 6, 7, 8], [0, 0, 0, 0])],
        );
        let mut block = TrophyBlock::new(original.clone());
        block.encode_track_flags(1, &[1, 1, 0, 1]).unwrap();

        let bytes = block.as_bytes();
        assert_eq!(&bytes[32..36], &[1, 1, 0, 1]);
        assert_eq!(&bytes[..32], &original[..32]);
    }

    #[test]
    fn test_encode_past_end_fails() {
        let mut block = TrophyBlock::new(block_bytes(28, &[([1, 2, 3, 4], [0; 4])]));
        assert!(block.encode_track_flags(1, &[1, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_write_counter() {
        let mut block = TrophyBlock::new(block_bytes(20, &[]));
        block.write_counter(Category::FastMushroom, 0x0102).unwrap();
        assert_eq!(&block.as_bytes()[16..18], &[0x01, 0x02]);
        assert_eq!(block.counter(Category::FastMushroom).unwrap(), 0x0102);
    }

    #[test]
    fn test_find_by_id() {
        let block = TrophyBlock::new(block_bytes(
            36,
            &[([1, 2, 3, 4], [1, 0, 0, 0]), ([1, 2, 3, 4], [0, 1, 0, 0])],
        ));
        let mut table = block.decode_tracks(&TrackNames::default()).unwrap();
        assert_eq!(table.find(&TrackId([1, 2, 3, 4])).unwrap().flags, [1, 0, 0, 0]);
        assert!(table.find(&TrackId([9, 9, 9, 9])).is_none());

        table.find_mut(&TrackId([1, 2, 3, 4])).unwrap().flags = [0, 0, 0, 1];
        assert_eq!(table.records()[0].entry.flags, [0, 0, 0, 1]);
        assert_eq!(table.records()[1].entry.flags, [0, 1, 0, 0]);
    }
}
