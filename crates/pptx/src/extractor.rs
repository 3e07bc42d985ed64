//! Presentation extraction.

use office_core::rels::{rels_path_for, resolve_target, Relationships};
use office_core::text::{is_image_entry, join_fragments, numbered_entry};
use office_core::xml::{self, Element};
use office_core::{
    Container, DocumentContent, Error, ExtractOptions, Extraction, ExtractionResult, ImageRef,
    ImageScope, ImageSink, Result, SlideContent, Warning,
};
use std::collections::HashMap;
use std::io::{Read, Seek};

/// Presentation descriptor; its absence means the container is not a deck.
const PRESENTATION_PART: &str = "ppt/presentation.xml";
const SLIDES_DIR: &str = "ppt/slides";
const MEDIA_DIR: &str = "ppt/media";

/// Extracts slide text and images from PPTX containers.
pub struct PresentationExtractor;

impl PresentationExtractor {
    /// Create a new presentation extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract a PPTX document from a reader.
    pub fn extract<R: Read + Seek>(
        &self,
        reader: R,
        file_name: &str,
        options: &ExtractOptions,
    ) -> Result<Extraction> {
        let mut container = Container::open(reader)?;
        self.extract_container(&mut container, file_name, options)
    }

    /// Extract from an already opened container.
    pub fn extract_container<R: Read + Seek>(
        &self,
        container: &mut Container<R>,
        file_name: &str,
        options: &ExtractOptions,
    ) -> Result<Extraction> {
        if !container.contains(PRESENTATION_PART) {
            return Err(Error::Format(format!(
                "'{}' not found; not a presentation",
                PRESENTATION_PART
            )));
        }

        let slide_entries = slide_entries(container);
        log::debug!("Found {} slides in {}", slide_entries.len(), file_name);

        let mut sink = ImageSink::create(&options.output_dir, options.seed)?;
        let mut warnings = Vec::new();

        let mut slides: Vec<SlideContent> = Vec::with_capacity(slide_entries.len());
        for (number, entry) in &slide_entries {
            let mut slide = SlideContent::new(*number);
            match read_slide_text(container, entry) {
                Ok(text) => slide.text = text,
                Err(warning) => warning.record(&mut warnings),
            }
            slides.push(slide);
        }

        match options.image_scope {
            ImageScope::SharedGallery => {
                attach_gallery(container, &mut sink, &mut slides, &mut warnings)
            }
            ImageScope::PerSlide => {
                attach_per_slide(container, &mut sink, &slide_entries, &mut slides, &mut warnings)
            }
        }

        log::debug!("Wrote {} images from {}", sink.count(), file_name);
        let images = sink.into_written();
        let result = ExtractionResult::new(file_name, DocumentContent::Slides(slides), images.len());

        Ok(Extraction {
            result,
            images,
            warnings,
        })
    }
}

impl Default for PresentationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Slide entries with their numbers, sorted numerically (slide10 after slide2).
fn slide_entries<R: Read + Seek>(container: &Container<R>) -> Vec<(usize, String)> {
    let mut entries: Vec<(usize, String)> = container
        .list_entries(|name| numbered_entry(name, SLIDES_DIR, "slide").is_some())
        .into_iter()
        .filter_map(|name| Some((numbered_entry(&name, SLIDES_DIR, "slide")?, name)))
        .collect();

    entries.sort_by_key(|(number, _)| *number);
    entries
}

/// Collect the run text of one slide.
fn read_slide_text<R: Read + Seek>(
    container: &mut Container<R>,
    entry: &str,
) -> std::result::Result<String, Warning> {
    let content = container
        .read_text(entry)
        .map_err(|e| Warning::new(entry, e.to_string()))?;
    let root = xml::parse(&content).map_err(|e| Warning::new(entry, e.to_string()))?;

    let Some(tree) = root.path(&["cSld", "spTree"]) else {
        log::debug!("{} has no shape tree", entry);
        return Ok(String::new());
    };

    let mut fragments = Vec::new();
    collect_shape_text(tree, &mut fragments);

    Ok(join_fragments(fragments))
}

/// Walk a shape tree in document order, collecting run text from every
/// shape that has a text body.
fn collect_shape_text(tree: &Element, fragments: &mut Vec<String>) {
    for shape in tree.elements() {
        match shape.local_name() {
            "sp" => {
                if let Some(body) = shape.child("txBody") {
                    collect_body_text(body, fragments);
                }
            }
            "grpSp" => collect_shape_text(shape, fragments),
            // Tables keep one text body per cell.
            "graphicFrame" => {
                for body in shape.descendants("txBody") {
                    collect_body_text(body, fragments);
                }
            }
            _ => {}
        }
    }
}

fn collect_body_text(body: &Element, fragments: &mut Vec<String>) {
    for paragraph in body.children("p") {
        for run in paragraph.children("r") {
            if let Some(text) = run.child("t") {
                fragments.push(text.text());
            }
        }
    }
}

/// Write every media image and list it on every slide.
fn attach_gallery<R: Read + Seek>(
    container: &mut Container<R>,
    sink: &mut ImageSink,
    slides: &mut [SlideContent],
    warnings: &mut Vec<Warning>,
) {
    for media in container.list_entries(|name| is_image_entry(name, MEDIA_DIR)) {
        match write_image(container, sink, &media) {
            Ok(image) => {
                for slide in slides.iter_mut() {
                    slide.images.push(image.clone());
                }
            }
            Err(warning) => warning.record(warnings),
        }
    }
}

/// Write the images each slide references through its relationship part and
/// list them on those slides only. Media shared by several slides is
/// written once.
fn attach_per_slide<R: Read + Seek>(
    container: &mut Container<R>,
    sink: &mut ImageSink,
    slide_entries: &[(usize, String)],
    slides: &mut [SlideContent],
    warnings: &mut Vec<Warning>,
) {
    let mut written: HashMap<String, ImageRef> = HashMap::new();

    for ((_, entry), slide) in slide_entries.iter().zip(slides.iter_mut()) {
        let rels_path = rels_path_for(entry);
        if !container.contains(&rels_path) {
            continue;
        }

        let rels = match container
            .read_text(&rels_path)
            .and_then(|content| Relationships::parse(&content))
        {
            Ok(rels) => rels,
            Err(e) => {
                Warning::new(&rels_path, e.to_string()).record(warnings);
                continue;
            }
        };

        for rel in rels.iter().filter(|rel| rel.is_image()) {
            let media = resolve_target(entry, &rel.target);
            if !is_image_entry(&media, MEDIA_DIR) {
                log::debug!("Ignoring non-raster image {} on {}", media, entry);
                continue;
            }

            let image = match written.get(&media).cloned() {
                Some(image) => image,
                None => match write_image(container, sink, &media) {
                    Ok(image) => {
                        written.insert(media, image.clone());
                        image
                    }
                    Err(warning) => {
                        warning.record(warnings);
                        continue;
                    }
                },
            };

            if !slide.images.contains(&image) {
                slide.images.push(image);
            }
        }
    }
}

fn write_image<R: Read + Seek>(
    container: &mut Container<R>,
    sink: &mut ImageSink,
    media: &str,
) -> std::result::Result<ImageRef, Warning> {
    let bytes = container
        .read_bytes(media)
        .map_err(|e| Warning::new(media, e.to_string()))?;
    sink.write(media, &bytes)
        .map_err(|e| Warning::new(media, format!("failed to write image: {}", e)))
}
