use crate::label::CanonicalLabel;

/// Constants used by label normalization.
pub mod labels {
    use super::CanonicalLabel;

    /// Canonical label iteration order used when shuffling and allocating.
    pub const ALL_LABELS: [CanonicalLabel; 3] =
        [CanonicalLabel::O, CanonicalLabel::W, CanonicalLabel::N];
    /// Raw label assumed when a sample carries no usable label.
    pub const ABSENT_RAW_LABEL: &str = "N";
}

/// Constants describing the sample document shape shared by sources and writers.
pub mod documents {
    /// Field holding the raw label inside a sample record.
    pub const LABEL_FIELD: &str = "label";
    /// Field holding the sample list in keyed documents and in every written unit.
    pub const STROKES_FIELD: &str = "strokes";
    /// Extension used for source discovery and persisted units.
    pub const JSON_EXTENSION: &str = "json";
}

/// Defaults reproducing the reference experiment layout.
pub mod config {
    /// Seed used when none is configured.
    pub const DEFAULT_SEED: u64 = 2025;
    /// Output root used when none is configured.
    pub const DEFAULT_OUTPUT_ROOT: &str = "final_dataset_800";
    /// Source files read when none are configured, in read order.
    pub const DEFAULT_SOURCES: [&str; 2] =
        ["wanddata_O3_original.json", "wanddata_W_original.json"];
}
