use super::{Resource, ResourceType, REFERENCE_ENTRY_SIZE, TYPE_ENTRY_SIZE};
use avara_utils::mac_roman;
use byteorder::{WriteBytesExt, BE};
use std::collections::BTreeMap;

/// Where the data section starts. Mac OS leaves the bytes in between the header and the data
/// for system use, so every fork written by the classic Resource Manager starts data at 256.
const DATA_OFFSET: usize = 256;

/// Offset of the type list within the map, right after the map header.
const TYPE_LIST_OFFSET: usize = 28;

/// Assembles a resource fork in memory.
///
/// ## Example
/// ```
/// # use avara_lvl::rsrc::{ResourceFork, ResourceForkWriter, ResourceType};
/// let mut writer = ResourceForkWriter::new();
/// writer.add(ResourceType::PICT, 128, Some("Level"), vec![0; 16]);
///
/// let fork = ResourceFork::read(&writer.finish()).unwrap();
/// assert_eq!(fork.get(ResourceType::PICT, 128).unwrap().data.len(), 16);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResourceForkWriter {
    types: BTreeMap<ResourceType, BTreeMap<i16, Resource>>,
}

impl ResourceForkWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource, replacing any previous one with the same type and id.
    pub fn add(&mut self, tag: ResourceType, id: i16, name: Option<&str>, data: Vec<u8>) {
        self.types.entry(tag).or_default().insert(
            id,
            Resource {
                id,
                name: name.map(str::to_string),
                attributes: 0,
                data,
            },
        );
    }

    /// Serializes the fork. Writing into a `Vec` can't fail, hence no `Result`.
    pub fn finish(self) -> Vec<u8> {
        let mut data_section = Vec::new();
        let mut names = Vec::new();
        let mut references = Vec::new();
        let mut type_entries = Vec::new();

        let type_count = self.types.len();
        let reference_lists_start = 2 + type_count * TYPE_ENTRY_SIZE;

        for (tag, resources) in &self.types {
            let list_offset = reference_lists_start + references.len();

            type_entries.extend_from_slice(&tag.0);
            put_u16(&mut type_entries, (resources.len() as u16).wrapping_sub(1));
            put_u16(&mut type_entries, list_offset as u16);

            for resource in resources.values() {
                let data_offset = data_section.len() as u32;
                put_u32(&mut data_section, resource.data.len() as u32);
                data_section.extend_from_slice(&resource.data);

                let name_offset = match &resource.name {
                    Some(name) => {
                        let offset = names.len() as i16;
                        let encoded = mac_roman::encode(name);
                        names.push(encoded.len().min(255) as u8);
                        names.extend_from_slice(&encoded[..encoded.len().min(255)]);
                        offset
                    }
                    None => -1,
                };

                put_u16(&mut references, resource.id as u16);
                put_u16(&mut references, name_offset as u16);
                references.push(resource.attributes);
                references.extend_from_slice(&data_offset.to_be_bytes()[1..4]);
                put_u32(&mut references, 0);
            }
        }
        debug_assert_eq!(references.len() % REFERENCE_ENTRY_SIZE, 0);

        let name_list_offset = TYPE_LIST_OFFSET + reference_lists_start + references.len();

        let mut map = vec![0u8; 24];
        put_u16(&mut map, TYPE_LIST_OFFSET as u16);
        put_u16(&mut map, name_list_offset as u16);
        put_u16(&mut map, (type_count as u16).wrapping_sub(1));
        map.extend_from_slice(&type_entries);
        map.extend_from_slice(&references);
        map.extend_from_slice(&names);

        let map_offset = DATA_OFFSET + data_section.len();

        let mut result = Vec::with_capacity(map_offset + map.len());
        put_u32(&mut result, DATA_OFFSET as u32);
        put_u32(&mut result, map_offset as u32);
        put_u32(&mut result, data_section.len() as u32);
        put_u32(&mut result, map.len() as u32);
        result.resize(DATA_OFFSET, 0);
        result.extend_from_slice(&data_section);
        result.extend_from_slice(&map);
        result
    }
}

fn put_u16(buffer: &mut Vec<u8>, value: u16) {
    buffer
        .write_u16::<BE>(value)
        .expect("writing into a Vec never fails");
}

fn put_u32(buffer: &mut Vec<u8>, value: u32) {
    buffer
        .write_u32::<BE>(value)
        .expect("writing into a Vec never fails");
}
