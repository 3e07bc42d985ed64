//! Relationship parts (`_rels/*.rels`) and target resolution.

use crate::error::Result;
use crate::xml;

/// Relationship type suffix for embedded images.
pub const IMAGE_RELATIONSHIP: &str = "/image";

/// One `<Relationship>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    /// `TargetMode="External"`: the target is a URL, not a container entry.
    pub external: bool,
}

impl Relationship {
    /// Whether this relationship points at an embedded image.
    pub fn is_image(&self) -> bool {
        !self.external && self.rel_type.ends_with(IMAGE_RELATIONSHIP)
    }
}

/// The relationships declared by one part, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Parse the XML of a `.rels` part.
    pub fn parse(xml_content: &str) -> Result<Self> {
        let root = xml::parse(xml_content)?;
        let entries = root
            .children("Relationship")
            .filter_map(|rel| {
                Some(Relationship {
                    id: rel.attr("Id")?.to_string(),
                    rel_type: rel.attr("Type").unwrap_or_default().to_string(),
                    target: rel.attr("Target")?.to_string(),
                    external: rel
                        .attr("TargetMode")
                        .is_some_and(|mode| mode.eq_ignore_ascii_case("External")),
                })
            })
            .collect();

        Ok(Self { entries })
    }

    /// Find a relationship by id.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|rel| rel.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Path of the relationship part belonging to `part`
/// (`xl/drawings/drawing1.xml` -> `xl/drawings/_rels/drawing1.xml.rels`).
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that declares it,
/// producing a container entry name.
///
/// Absolute targets (`/xl/media/image1.png`) are taken from the package root;
/// relative ones (`../media/image1.png`) from the declaring part's directory.
pub fn resolve_target(part: &str, target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    if let Some(absolute) = target.strip_prefix('/') {
        push_segments(&mut segments, absolute);
    } else {
        if let Some((dir, _)) = part.rsplit_once('/') {
            push_segments(&mut segments, dir);
        }
        push_segments(&mut segments, target);
    }

    segments.join("/")
}

fn push_segments<'a>(segments: &mut Vec<&'a str>, path: &'a str) {
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
}
