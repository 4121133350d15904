//! Reader for classic Mac OS resource forks
//!
//! Avara levels ship as resource files, with every level stored as a `PICT` resource. The
//! layout, all integers big endian:
//!
//! ```c
//! struct Header {              // offset 0
//!     u32 data_offset;
//!     u32 map_offset;
//!     u32 data_length;
//!     u32 map_length;
//! }
//!
//! struct Map {                 // at map_offset
//!     u8  reserved[24];        // copy of the header, handle, file ref, attributes
//!     u16 type_list_offset;    // relative to the map, typically 28
//!     u16 name_list_offset;    // relative to the map
//!     // type list:
//!     u16 type_count_minus_one;
//!     TypeEntry types[type_count];
//! }
//!
//! struct TypeEntry {
//!     u8  tag[4];
//!     u16 resource_count_minus_one;
//!     u16 reference_list_offset; // relative to the type list, *not* to the entry
//! }
//!
//! struct ReferenceEntry {
//!     i16 id;
//!     i16 name_offset;         // relative to the name list, -1 if unnamed
//!     u8  attributes;
//!     u24 data_offset;         // relative to data_offset
//!     u32 reserved;
//! }
//! ```
//!
//! Names are Pascal strings (a length byte, then Mac Roman text), data entries are a `u32`
//! length followed by the bytes.

use avara_utils::{mac_roman, ok};
use byteorder::{ByteOrder, BE};
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

mod writer;
pub use writer::ResourceForkWriter;

/// Size of a type list entry
const TYPE_ENTRY_SIZE: usize = 8;
/// Size of a reference list entry
const REFERENCE_ENTRY_SIZE: usize = 12;

/// 4-byte resource type code, like `PICT` or `snd `.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceType(pub [u8; 4]);

impl ResourceType {
    pub const PICT: ResourceType = ResourceType::from_str("PICT");

    /// Converts given string into a [`ResourceType`].
    ///
    /// ## Panics
    /// Panics if the string isn't 4 bytes long.
    pub const fn from_str(s: &str) -> Self {
        let bytes = s.as_bytes();
        assert!(bytes.len() == 4, "invalid string length");
        Self([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl<'a> From<&'a [u8; 4]> for ResourceType {
    fn from(value: &'a [u8; 4]) -> Self {
        Self(*value)
    }
}

/// Prints the code as Mac Roman text, with control bytes escaped as `\xNN`.
///
/// ```
/// # use avara_lvl::rsrc::ResourceType;
/// assert_eq!(ResourceType::from_str("snd ").to_string(), "snd ");
/// assert_eq!(ResourceType(*b"ic\x8E\x01").to_string(), "icé\\x01");
/// ```
impl Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in mac_roman::decode(&self.0).chars() {
            if c.is_control() {
                write!(f, r"\x{:02X}", c as u32)?;
            } else {
                write!(f, "{c}")?;
            }
        }
        ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: i16,
    pub name: Option<String>,
    pub attributes: u8,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContainerError {
    #[error(
        "malformed container: {what} ({len} bytes at {offset:#x}) lies outside of the {bound} available bytes"
    )]
    MalformedContainer {
        what: &'static str,
        offset: u64,
        len: u64,
        bound: u64,
    },
}

/// Contents of a resource fork, keyed by type and id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFork {
    types: BTreeMap<ResourceType, BTreeMap<i16, Resource>>,
}

impl ResourceFork {
    /// Parses a whole resource fork.
    pub fn read(data: &[u8]) -> Result<Self, ContainerError> {
        let header = region(data, "header", 0, 16)?;
        let data_offset = BE::read_u32(&header[0..4]) as usize;
        let map_offset = BE::read_u32(&header[4..8]) as usize;
        let data_length = BE::read_u32(&header[8..12]) as usize;
        let map_length = BE::read_u32(&header[12..16]) as usize;

        let data_section = region(data, "data section", data_offset, data_length)?;
        let map = region(data, "resource map", map_offset, map_length)?;

        let type_list_offset = read_u16(map, "type list offset", 24)? as usize;
        let name_list_offset = read_u16(map, "name list offset", 26)? as usize;

        // The count is stored minus one, so an empty map says 0xFFFF
        let type_count = read_u16(map, "type count", type_list_offset)?.wrapping_add(1) as usize;

        let mut types = BTreeMap::new();
        for type_index in 0..type_count {
            let entry_offset = type_list_offset + 2 + type_index * TYPE_ENTRY_SIZE;
            let entry = region(map, "type entry", entry_offset, TYPE_ENTRY_SIZE)?;

            let tag = ResourceType([entry[0], entry[1], entry[2], entry[3]]);
            let resource_count = BE::read_u16(&entry[4..6]) as usize + 1;

            // Reference list offsets count from the start of the type list, which sits
            // `2 + 8 * type_index` bytes before this entry (the count word plus the entries
            // preceding it). Anchoring at the list start accounts for both.
            let reference_list = type_list_offset + BE::read_u16(&entry[6..8]) as usize;

            let resources: &mut BTreeMap<i16, Resource> = types.entry(tag).or_default();
            for index in 0..resource_count {
                let reference = region(
                    map,
                    "reference entry",
                    reference_list + index * REFERENCE_ENTRY_SIZE,
                    REFERENCE_ENTRY_SIZE,
                )?;

                let id = BE::read_i16(&reference[0..2]);
                let name_offset = BE::read_i16(&reference[2..4]);
                let attributes = reference[4];

                // 24-bit offset, zero extended into a u32
                let data_entry_offset =
                    BE::read_u32(&[0, reference[5], reference[6], reference[7]]) as usize;

                let name = match name_offset {
                    -1 => None,
                    offset => Some(read_name(
                        map,
                        name_list_offset + (offset as u16) as usize,
                    )?),
                };

                let length =
                    BE::read_u32(region(data_section, "data length", data_entry_offset, 4)?)
                        as usize;
                let payload = region(data_section, "resource data", data_entry_offset + 4, length)?;

                resources.insert(
                    id,
                    Resource {
                        id,
                        name,
                        attributes,
                        data: payload.to_vec(),
                    },
                );
            }
        }

        Ok(Self { types })
    }

    pub fn get(&self, tag: ResourceType, id: i16) -> Option<&Resource> {
        self.types.get(&tag)?.get(&id)
    }

    /// Finds a resource by name. Names aren't unique, the lowest id wins.
    pub fn find_named(&self, tag: ResourceType, name: &str) -> Option<&Resource> {
        self.resources(tag).find(|r| r.name.as_deref() == Some(name))
    }

    /// Iterates over resources of a given type, in id order.
    pub fn resources(&self, tag: ResourceType) -> impl Iterator<Item = &Resource> {
        self.types.get(&tag).into_iter().flat_map(|r| r.values())
    }

    /// Iterates over all types present in the fork.
    pub fn types(&self) -> impl Iterator<Item = ResourceType> + '_ {
        self.types.keys().copied()
    }
}

/// Bounds-checked subslice
fn region<'d>(
    data: &'d [u8],
    what: &'static str,
    offset: usize,
    len: usize,
) -> Result<&'d [u8], ContainerError> {
    match offset.checked_add(len) {
        Some(end) if end <= data.len() => Ok(&data[offset..end]),
        _ => Err(ContainerError::MalformedContainer {
            what,
            offset: offset as u64,
            len: len as u64,
            bound: data.len() as u64,
        }),
    }
}

fn read_u16(data: &[u8], what: &'static str, offset: usize) -> Result<u16, ContainerError> {
    Ok(BE::read_u16(region(data, what, offset, 2)?))
}

fn read_name(map: &[u8], offset: usize) -> Result<String, ContainerError> {
    let length = region(map, "name length", offset, 1)?[0] as usize;
    Ok(mac_roman::decode(region(map, "name", offset + 1, length)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fork() -> Vec<u8> {
        let mut writer = ResourceForkWriter::new();
        writer.add(ResourceType::PICT, 128, Some("Level One"), b"first".to_vec());
        writer.add(ResourceType::PICT, 129, None, vec![0xAB; 33]);
        writer.add(ResourceType::from_str("TEXT"), 128, Some("Caf\u{e9}"), b"hi".to_vec());
        writer.finish()
    }

    #[test]
    fn single_named_resource_roundtrip() {
        let mut writer = ResourceForkWriter::new();
        writer.add(ResourceType::PICT, 200, Some("Arena"), vec![1, 2, 3, 4, 5]);
        let fork = ResourceFork::read(&writer.finish()).unwrap();

        let resource = fork.get(ResourceType::PICT, 200).unwrap();
        assert_eq!(resource.name.as_deref(), Some("Arena"));
        assert_eq!(resource.data, vec![1, 2, 3, 4, 5]);
        assert_eq!(fork.types().count(), 1);
    }

    #[test]
    fn lookup_by_type_id_and_name() {
        let fork = ResourceFork::read(&sample_fork()).unwrap();

        let ids = fork.resources(ResourceType::PICT).map(|r| r.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![128, 129]);

        assert_eq!(fork.get(ResourceType::PICT, 129).unwrap().name, None);
        assert_eq!(fork.get(ResourceType::PICT, 129).unwrap().data.len(), 33);
        assert_eq!(fork.find_named(ResourceType::PICT, "Level One").unwrap().id, 128);
        assert_eq!(
            fork.get(ResourceType::from_str("TEXT"), 128).unwrap().name.as_deref(),
            Some("Café")
        );
        assert!(fork.get(ResourceType::from_str("snd "), 128).is_none());
    }

    #[test]
    fn type_codes_display_as_mac_roman() {
        assert_eq!(ResourceType::PICT.to_string(), "PICT");
        assert_eq!(ResourceType::from_str("snd ").to_string(), "snd ");
        assert_eq!(ResourceType(*b"\x8Etc\x00").to_string(), "étc\\x00");
    }

    #[test]
    fn empty_fork_has_no_types() {
        let fork = ResourceFork::read(&ResourceForkWriter::new().finish()).unwrap();
        assert_eq!(fork.types().count(), 0);
    }

    #[test]
    fn truncated_header_is_malformed() {
        let err = ResourceFork::read(&[0; 10]).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::MalformedContainer { what: "header", .. }
        ));
    }

    #[test]
    fn map_past_the_end_is_malformed() {
        let mut data = sample_fork();
        let len = data.len() as u32;
        // Push the map length past the end of the buffer
        data[12..16].copy_from_slice(&len.to_be_bytes());
        let err = ResourceFork::read(&data).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::MalformedContainer { what: "resource map", .. }
        ));
    }

    #[test]
    fn data_entry_past_the_end_is_malformed() {
        let mut data = sample_fork();
        let data_offset = u32::from_be_bytes(data[0..4].try_into().unwrap()) as usize;
        // The first data entry's length word
        data[data_offset..data_offset + 4].copy_from_slice(&0xFFFFu32.to_be_bytes());
        let err = ResourceFork::read(&data).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::MalformedContainer { what: "resource data", .. }
        ));
    }
}
