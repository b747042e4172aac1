//! Canonical category vocabulary for community issue classification.
//!
//! Single source of truth for main categories; used to validate stored
//! records, to populate analyzer prompts, and to serve the public category
//! endpoints. The table is static reference data, read-only for the life of
//! the process.

/// One canonical main category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

pub const MAIN_CATEGORIES: &[Category] = &[
    Category {
        key: "roads_transport",
        label: "Roads & Transport",
        description: "Roads, pavements, traffic and transport.",
    },
    Category {
        key: "water_sanitation",
        label: "Water & Sanitation",
        description: "Water supply, drainage, sewage, and sanitation.",
    },
    Category {
        key: "waste_environment",
        label: "Waste & Environment",
        description: "Waste disposal, litter, pollution, environment.",
    },
    Category {
        key: "public_facilities",
        label: "Public Facilities",
        description: "Parks, public buildings, and shared facilities.",
    },
    Category {
        key: "safety_hazards",
        label: "Safety & Hazards",
        description: "Safety risks, hazards, and dangerous conditions.",
    },
    Category {
        key: "housing_neighborhood",
        label: "Housing & Neighborhood",
        description: "Housing conditions and neighborhood issues.",
    },
    Category {
        key: "accessibility_inclusion",
        label: "Accessibility & Inclusion",
        description: "Accessibility, inclusion, and equal access.",
    },
    Category {
        key: "other",
        label: "Other",
        description: "Issues that do not fit the above; AI or human review.",
    },
];

/// Human-readable category labels, for prompts and UI
pub fn labels() -> Vec<&'static str> {
    MAIN_CATEGORIES.iter().map(|c| c.label).collect()
}

/// Look up a category by its key
pub fn by_key(key: &str) -> Option<&'static Category> {
    MAIN_CATEGORIES.iter().find(|c| c.key == key)
}

/// Look up a category by its human-readable label
pub fn by_label(label: &str) -> Option<&'static Category> {
    MAIN_CATEGORIES.iter().find(|c| c.label == label)
}

/// Whether a label belongs to the canonical vocabulary
pub fn is_canonical_label(label: &str) -> bool {
    by_label(label).is_some()
}
