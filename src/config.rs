//! Process-wide settings, built once at start-up and shared by reference.

use crate::enums::UidStrategy;

/// SOP Class UID of CT Image Storage.
pub const CT_IMAGE_STORAGE_UID: &str = "1.2.840.10008.5.1.4.1.1.2";

/// Root used for timestamp identifiers.
pub const DEFAULT_UID_ROOT: &str = "1.2.826.0.1.3680043.8.498.";

/// Root reserved for UUID-derived identifiers (PS3.5 B.2).
pub const UUID_UID_ROOT: &str = "2.25.";

pub const DEFAULT_IMPLEMENTATION_CLASS_UID: &str = "1.2.826.0.1.3680043.8.498.1";

pub const DEFAULT_IMPLEMENTATION_VERSION_NAME: &str =
    concat!("RESLICE_", env!("CARGO_PKG_VERSION"));

/// A storage class accepted by the series filter. Source files populate the
/// class either with the numeric UID or with its keyword, so both are kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SopClass {
    pub uid: String,
    pub names: Vec<String>,
}

impl SopClass {
    pub fn ct_image_storage() -> Self {
        Self {
            uid: CT_IMAGE_STORAGE_UID.to_string(),
            names: vec!["CT Image Storage".to_string(), "CTImageStorage".to_string()],
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        let value = value.trim_end_matches('\0').trim();
        value == self.uid || self.names.iter().any(|name| name.eq_ignore_ascii_case(value))
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub uid_root: String,
    pub uid_strategy: UidStrategy,
    pub implementation_class_uid: String,
    pub implementation_version_name: String,
    pub allowed_sop_classes: Vec<SopClass>,
    /// SOP class written into every output record.
    pub output_sop_class_uid: String,
    pub modality: String,
    pub image_type: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            uid_root: DEFAULT_UID_ROOT.to_string(),
            uid_strategy: UidStrategy::default(),
            implementation_class_uid: DEFAULT_IMPLEMENTATION_CLASS_UID.to_string(),
            implementation_version_name: DEFAULT_IMPLEMENTATION_VERSION_NAME.to_string(),
            allowed_sop_classes: vec![SopClass::ct_image_storage()],
            output_sop_class_uid: CT_IMAGE_STORAGE_UID.to_string(),
            modality: "CT".to_string(),
            image_type: ["DERIVED", "SECONDARY", "REFORMATTED"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Config {
    pub fn with_uid_strategy(mut self, strategy: UidStrategy) -> Self {
        self.uid_strategy = strategy;
        self
    }

    pub fn with_uid_root(mut self, root: impl Into<String>) -> Self {
        let mut root = root.into();
        if !root.ends_with('.') {
            root.push('.');
        }
        self.uid_root = root;
        self
    }

    pub fn with_allowed_sop_class(mut self, class: SopClass) -> Self {
        self.allowed_sop_classes.push(class);
        self
    }

    /// Whether a SOP class value, numeric or symbolic, is on the allow-list.
    pub fn accepts_sop_class(&self, value: &str) -> bool {
        self.allowed_sop_classes.iter().any(|class| class.matches(value))
    }
}
