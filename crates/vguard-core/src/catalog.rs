//! Enrolled template catalog.
//!
//! Templates are loaded once at startup and never change afterwards. A
//! resource that fails to load is logged and left out; an empty catalog is
//! valid and simply never produces detections.

use image::{imageops, GrayImage};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use vguard_models::TemplateId;

use crate::error::{ControlError, ControlResult};
use crate::metrics;

/// One enrolled template.
#[derive(Debug, Clone)]
pub struct Template {
    /// Identity, derived from the resource file name
    pub id: TemplateId,
    /// Preprocessed grayscale image handed to the matcher
    pub descriptor: GrayImage,
    /// Resource the template was loaded from
    pub source: PathBuf,
}

impl Template {
    pub fn new(id: TemplateId, descriptor: GrayImage, source: PathBuf) -> Self {
        Self {
            id,
            descriptor,
            source,
        }
    }

    /// Load and preprocess a single template: decode, convert to 8-bit
    /// grayscale and apply a gaussian blur of `blur` sigma to suppress
    /// sensor noise before matching.
    pub fn load(path: &Path, blur: f32) -> ControlResult<Self> {
        let id = TemplateId::from_path(path)
            .ok_or_else(|| ControlError::template_load(path, "cannot derive a name from the path"))?;

        let image = image::open(path)
            .map_err(|e| ControlError::template_load(path, e.to_string()))?
            .to_luma8();
        if image.width() == 0 || image.height() == 0 {
            return Err(ControlError::template_load(path, "image is empty"));
        }

        let descriptor = if blur > 0.0 {
            imageops::blur(&image, blur)
        } else {
            image
        };

        Ok(Self::new(id, descriptor, path.to_path_buf()))
    }
}

/// Ordered, immutable set of enrolled templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    pub fn from_templates(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    /// Load every path in order, skipping entries that fail.
    pub fn load<P: AsRef<Path>>(paths: &[P], blur: f32) -> Self {
        let mut templates: Vec<Template> = Vec::with_capacity(paths.len());

        for path in paths {
            let path = path.as_ref();
            match Template::load(path, blur) {
                Ok(template) if templates.iter().any(|t| t.id == template.id) => {
                    warn!(path = %path.display(), id = %template.id, "Duplicate template name, skipping");
                    metrics::record_template_load_failure();
                }
                Ok(template) => {
                    info!(
                        id = %template.id,
                        width = template.descriptor.width(),
                        height = template.descriptor.height(),
                        "Template preloaded"
                    );
                    templates.push(template);
                }
                Err(e) => {
                    warn!(path = %path.display(), "{}", e);
                    metrics::record_template_load_failure();
                }
            }
        }

        if templates.is_empty() {
            warn!("No templates loaded, detection modes will report nothing");
        }

        Self { templates }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Template> {
        self.templates.get(index)
    }

    /// Catalog position of the template with this identity.
    pub fn index_of(&self, id: &TemplateId) -> Option<usize> {
        self.templates.iter().position(|t| &t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }
}
