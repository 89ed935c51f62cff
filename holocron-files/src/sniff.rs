use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, SeekFrom};

use log::trace;

use crate::ParserError;
use crate::Record;
use crate::common::iff::FORM;
use crate::common::types::{Tag, tag_str};
use crate::component::reader::ComponentReader;
use crate::layout::reader::{InteriorLayoutReader, PortalLayoutReader};
use crate::lod::reader::LodReader;
use crate::mesh::reader::MeshReader;
use crate::shader::reader::ShaderReader;
use crate::skeletal_mesh::reader::SkeletalMeshReader;
use crate::skeleton::reader::SkeletonReader;
use crate::template::reader::{AppearanceReader, ObjectTemplateReader};
use crate::terrain::reader::TerrainReader;
use crate::world::reader::WorldSnapshotReader;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Compound,
    Mesh,
    SkeletalMesh,
    LevelOfDetail,
    MeshLevelOfDetail,
    Skeleton,
    Terrain,
    WorldSnapshot,
    InteriorLayout,
    PortalLayout,
    Appearance,
    StaticTemplate,
    TangibleTemplate,
    BuildingTemplate,
    Shader,
    /// Known, but deliberately not decoded
    Ignored,
}

/// The stream every decoder consumes. It is moved into the decode call and dropped with it.
pub type ByteStream = Cursor<Vec<u8>>;

pub type DecodeFn = fn(&mut ByteStream) -> Result<Record, ParserError>;

/// Peeks at the type tag of a record: the form type for IFF files, the leading four bytes
/// otherwise. The stream is rewound to where it was.
pub fn sniff_tag<R: Read + Seek>(rdr: &mut R) -> Result<Tag, ParserError> {
    let start = rdr.stream_position()?;
    let mut head = [0u8; 12];
    let mut filled = 0;
    while filled < head.len() {
        match rdr.read(&mut head[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    rdr.seek(SeekFrom::Start(start))?;

    let mut tag = [0u8; 4];
    if filled >= 12 && head[..4] == FORM {
        tag.copy_from_slice(&head[8..12]);
    } else if filled >= 4 {
        tag.copy_from_slice(&head[..4]);
    } else {
        return Err(ParserError::FormatError {
            reason: "Stream is too short to carry a type tag",
        });
    }
    Ok(tag)
}

#[derive(Clone, Copy)]
enum Registration {
    Decoder(RecordKind, DecodeFn),
    Ignored,
}

/// Maps type tags to decoders. [`DecoderRegistry::default`] knows every record type of this crate,
/// further types can be registered on top.
#[derive(Clone)]
pub struct DecoderRegistry {
    entries: HashMap<Tag, Registration>,
}

impl DecoderRegistry {
    pub fn empty() -> Self {
        DecoderRegistry {
            entries: HashMap::new(),
        }
    }

    pub fn register(&mut self, tag: Tag, kind: RecordKind, decode: DecodeFn) -> &mut Self {
        self.entries.insert(tag, Registration::Decoder(kind, decode));
        self
    }

    pub fn ignore(&mut self, tag: Tag) -> &mut Self {
        self.entries.insert(tag, Registration::Ignored);
        self
    }

    pub fn kind_of(&self, tag: &Tag) -> Option<RecordKind> {
        self.entries.get(tag).map(|registration| match registration {
            Registration::Decoder(kind, _) => *kind,
            Registration::Ignored => RecordKind::Ignored,
        })
    }

    pub fn sniff<R: Read + Seek>(&self, rdr: &mut R) -> Result<RecordKind, ParserError> {
        let tag = sniff_tag(rdr)?;
        self.kind_of(&tag)
            .ok_or_else(|| ParserError::UnrecognizedType { tag: tag_str(&tag) })
    }

    /// Sniffs and decodes. `Ok(None)` for ignored types, unknown types are an error.
    pub fn decode(&self, mut rdr: ByteStream) -> Result<Option<(RecordKind, Record)>, ParserError> {
        let tag = sniff_tag(&mut rdr)?;
        match self.entries.get(&tag) {
            Some(Registration::Decoder(kind, decode)) => {
                trace!("Decoding {} as {:?}", tag_str(&tag), kind);
                Ok(Some((*kind, decode(&mut rdr)?)))
            }
            Some(Registration::Ignored) => Ok(None),
            None => Err(ParserError::UnrecognizedType { tag: tag_str(&tag) }),
        }
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        let mut registry = DecoderRegistry::empty();
        registry
            .register(*b"APT ", RecordKind::Appearance, |rdr| {
                AppearanceReader::parse_asset(rdr).map(Record::Appearance)
            })
            .register(*b"CMPA", RecordKind::Compound, |rdr| {
                ComponentReader::parse_asset(rdr).map(Record::Compound)
            })
            .register(*b"DTLA", RecordKind::LevelOfDetail, |rdr| {
                LodReader::parse_asset(rdr).map(Record::LevelOfDetail)
            })
            .register(*b"MLOD", RecordKind::MeshLevelOfDetail, |rdr| {
                LodReader::parse_mesh_lod(rdr).map(Record::LevelOfDetail)
            })
            .register(*b"INLY", RecordKind::InteriorLayout, |rdr| {
                InteriorLayoutReader::parse_asset(rdr).map(Record::InteriorLayout)
            })
            .register(*b"MESH", RecordKind::Mesh, |rdr| {
                MeshReader::parse_asset(rdr).map(Record::Mesh)
            })
            .register(*b"SKMG", RecordKind::SkeletalMesh, |rdr| {
                SkeletalMeshReader::parse_asset(rdr).map(Record::SkeletalMesh)
            })
            .register(*b"PRTO", RecordKind::PortalLayout, |rdr| {
                PortalLayoutReader::parse_asset(rdr).map(Record::PortalLayout)
            })
            .register(*b"PTAT", RecordKind::Terrain, |rdr| {
                TerrainReader::parse_asset(rdr).map(Record::Terrain)
            })
            .register(*b"SBOT", RecordKind::BuildingTemplate, |rdr| {
                ObjectTemplateReader::parse_asset(rdr).map(Record::ObjectTemplate)
            })
            .register(*b"STAT", RecordKind::StaticTemplate, |rdr| {
                ObjectTemplateReader::parse_asset(rdr).map(Record::ObjectTemplate)
            })
            .register(*b"STOT", RecordKind::TangibleTemplate, |rdr| {
                ObjectTemplateReader::parse_asset(rdr).map(Record::ObjectTemplate)
            })
            .register(*b"WSNP", RecordKind::WorldSnapshot, |rdr| {
                WorldSnapshotReader::parse_asset(rdr).map(Record::WorldSnapshot)
            })
            .register(*b"SKTM", RecordKind::Skeleton, |rdr| {
                SkeletonReader::parse_asset(rdr).map(Record::Skeleton)
            })
            .ignore(*b"CCLT")
            .ignore(*b"PEFT");

        for tag in [*b"SSHT", *b"CSHD", *b"SWTS"] {
            registry.register(tag, RecordKind::Shader, |rdr| {
                ShaderReader::parse_asset(rdr).map(Record::Shader)
            });
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::writer::IffWriter;

    fn empty_form(form_type: &Tag) -> Result<Vec<u8>, ParserError> {
        let mut iff = IffWriter::new();
        iff.begin_form(form_type).end_form()?;
        iff.finish()
    }

    #[test]
    fn sniffing_rewinds_the_stream() -> Result<(), anyhow::Error> {
        let mut rdr = Cursor::new(empty_form(b"MESH")?);
        assert_eq!(&sniff_tag(&mut rdr)?, b"MESH");
        assert_eq!(rdr.position(), 0);

        let mut raw = Cursor::new(b"DDS |\0\0\0 raw texture".to_vec());
        assert_eq!(&sniff_tag(&mut raw)?, b"DDS ");
        assert_eq!(raw.position(), 0);
        Ok(())
    }

    #[test]
    fn short_streams_cannot_be_sniffed() {
        assert!(sniff_tag(&mut Cursor::new(b"FO".to_vec())).is_err());
    }

    #[test]
    fn builtin_table_covers_all_record_types() -> Result<(), anyhow::Error> {
        let registry = DecoderRegistry::default();
        for (tag, kind) in [
            (b"APT ", RecordKind::Appearance),
            (b"CMPA", RecordKind::Compound),
            (b"DTLA", RecordKind::LevelOfDetail),
            (b"MLOD", RecordKind::MeshLevelOfDetail),
            (b"INLY", RecordKind::InteriorLayout),
            (b"MESH", RecordKind::Mesh),
            (b"SKMG", RecordKind::SkeletalMesh),
            (b"PRTO", RecordKind::PortalLayout),
            (b"PTAT", RecordKind::Terrain),
            (b"SBOT", RecordKind::BuildingTemplate),
            (b"STAT", RecordKind::StaticTemplate),
            (b"STOT", RecordKind::TangibleTemplate),
            (b"WSNP", RecordKind::WorldSnapshot),
            (b"SKTM", RecordKind::Skeleton),
            (b"SSHT", RecordKind::Shader),
            (b"CSHD", RecordKind::Shader),
            (b"SWTS", RecordKind::Shader),
            (b"CCLT", RecordKind::Ignored),
            (b"PEFT", RecordKind::Ignored),
        ] {
            let mut rdr = Cursor::new(empty_form(tag)?);
            assert_eq!(registry.sniff(&mut rdr)?, kind);
        }
        Ok(())
    }

    #[test]
    fn ignored_and_unknown_types() -> Result<(), anyhow::Error> {
        let registry = DecoderRegistry::default();
        assert!(registry.decode(Cursor::new(empty_form(b"PEFT")?))?.is_none());
        assert!(matches!(
            registry.decode(Cursor::new(empty_form(b"ZZZZ")?)),
            Err(ParserError::UnrecognizedType { .. })
        ));
        Ok(())
    }

    #[test]
    fn registry_is_extensible() -> Result<(), anyhow::Error> {
        let mut registry = DecoderRegistry::empty();
        registry.register(*b"ZZZZ", RecordKind::Appearance, |_| {
            Ok(Record::Appearance(crate::template::types::AppearanceAsset {
                path: "custom".into(),
            }))
        });

        let decoded = registry.decode(Cursor::new(empty_form(b"ZZZZ")?))?;
        assert!(matches!(decoded, Some((RecordKind::Appearance, Record::Appearance(_)))));
        Ok(())
    }
}
