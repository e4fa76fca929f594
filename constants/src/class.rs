/// ASPRS classification codes that carry a meaningful name in our datasets.
pub struct LasClass {
    pub id: u8,
    pub name: &'static str,
}

pub const LAS_CLASSES: &[LasClass] = &[
    LasClass {
        id: 0,
        name: "unclassified",
    },
    LasClass {
        id: 2,
        name: "ground, sidewalk",
    },
    LasClass {
        id: 3,
        name: "vegetation - low",
    },
    LasClass {
        id: 4,
        name: "vegetation - medium",
    },
    LasClass {
        id: 5,
        name: "vegetation - high",
    },
    LasClass {
        id: 6,
        name: "buildings",
    },
    LasClass {
        id: 8,
        name: "street furniture",
    },
    LasClass {
        id: 11,
        name: "street pavement",
    },
    LasClass {
        id: 15,
        name: "cars, trucks",
    },
];

/// Human readable name for a classification code, `"unknown"` if unmapped.
pub fn class_name(id: u8) -> &'static str {
    LAS_CLASSES
        .iter()
        .find(|c| c.id == id)
        .map_or("unknown", |c| c.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_names() {
        assert_eq!(class_name(6), "buildings");
        assert_eq!(class_name(200), "unknown");
    }
}
