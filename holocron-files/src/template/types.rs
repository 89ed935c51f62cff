use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct AppearanceAsset {
    pub path: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TemplateKind {
    Static,
    Tangible,
    Building,
}

pub const APPEARANCE_FILENAME: &str = "appearanceFilename";
pub const PORTAL_LAYOUT_FILENAME: &str = "portalLayoutFilename";
pub const INTERIOR_LAYOUT_FILENAME: &str = "interiorLayoutFileName";

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTemplateAsset {
    pub kind: TemplateKind,
    pub base_template: Option<String>,
    /// The last assignment of every parameter, `None` when it was explicitly left empty.
    pub parameters: HashMap<String, Option<String>>,
}

impl ObjectTemplateAsset {
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(|value| value.as_deref())
    }

    pub fn appearance(&self) -> Option<&str> {
        self.parameter(APPEARANCE_FILENAME)
    }

    pub fn portal_layout(&self) -> Option<&str> {
        self.parameter(PORTAL_LAYOUT_FILENAME)
    }

    pub fn interior_layout(&self) -> Option<&str> {
        self.parameter(INTERIOR_LAYOUT_FILENAME)
    }

    /// Appearance, portal layout and interior layout, skipping the absent ones.
    pub fn referenced_files(&self) -> Vec<&str> {
        [self.appearance(), self.portal_layout(), self.interior_layout()]
            .into_iter()
            .flatten()
            .collect()
    }
}
