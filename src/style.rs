//! The preset style catalog.

use serde::Serialize;

/// Identifier of one of the five preset styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleId {
    /// Pixar-like 3D render.
    #[serde(rename = "3d")]
    ThreeD,
    /// Classic 2D cartoon.
    Cartoon,
    /// Classic Disney animation character.
    Disney,
    /// Diorama with a shallow depth of field.
    OutFocusing,
    /// Playful caricature.
    Caricature,
}

/// Gradient accent used when presenting a style (Tailwind color tokens).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Accent {
    /// Gradient start color.
    pub from: &'static str,
    /// Gradient end color.
    pub to: &'static str,
}

/// Accent shown while no style is selected.
pub const DEFAULT_ACCENT: Accent = Accent {
    from: "sky-500",
    to: "indigo-500",
};

/// A named preset pairing a display label with the instruction sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleDescriptor {
    /// Style identifier.
    pub id: StyleId,
    /// Display name.
    pub name: &'static str,
    /// Instruction sent with the photo.
    pub instruction: &'static str,
    /// Presentation accent.
    pub accent: Accent,
}

static CATALOG: [StyleDescriptor; 5] = [
    StyleDescriptor {
        id: StyleId::ThreeD,
        name: "3D",
        instruction: "Turn this image into a 3D Pixar-style render. Keep the subject's \
                      features while giving it a polished three-dimensional look.",
        accent: Accent {
            from: "sky-500",
            to: "indigo-500",
        },
    },
    StyleDescriptor {
        id: StyleId::Cartoon,
        name: "Cartoon",
        instruction: "Redraw this image in a vivid, classic 2D cartoon style. Use bold \
                      outlines and flat colors.",
        accent: Accent {
            from: "yellow-400",
            to: "orange-500",
        },
    },
    StyleDescriptor {
        id: StyleId::Disney,
        name: "Disney",
        instruction: "Transform this photo into the style of a classic Disney animated \
                      film character. Emphasize large, expressive eyes and soft features.",
        accent: Accent {
            from: "purple-500",
            to: "pink-500",
        },
    },
    StyleDescriptor {
        id: StyleId::OutFocusing,
        name: "Out-focusing",
        instruction: "Make this image look like a diorama. Keep most of the scene softly \
                      out of focus while rendering one area razor sharp. Make the colors \
                      brighter and more vibrant than in reality.",
        accent: Accent {
            from: "green-400",
            to: "teal-500",
        },
    },
    StyleDescriptor {
        id: StyleId::Caricature,
        name: "Caricature",
        instruction: "Create a fun caricature from this photo. Exaggerate the subject's \
                      most distinctive features in a playful, artistic way.",
        accent: Accent {
            from: "red-500",
            to: "rose-500",
        },
    },
];

/// Returns every style in display order.
pub fn catalog() -> &'static [StyleDescriptor] {
    &CATALOG
}

impl StyleId {
    /// All style identifiers in display order.
    pub const ALL: [StyleId; 5] = [
        Self::ThreeD,
        Self::Cartoon,
        Self::Disney,
        Self::OutFocusing,
        Self::Caricature,
    ];

    /// Returns the command-line slug.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThreeD => "3d",
            Self::Cartoon => "cartoon",
            Self::Disney => "disney",
            Self::OutFocusing => "out-focusing",
            Self::Caricature => "caricature",
        }
    }

    /// Returns the descriptor for this style.
    pub fn descriptor(&self) -> &'static StyleDescriptor {
        // Variant order matches CATALOG.
        &CATALOG[*self as usize]
    }

    /// Shorthand for `descriptor().instruction`.
    pub fn instruction(&self) -> &'static str {
        self.descriptor().instruction
    }
}

impl std::fmt::Display for StyleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StyleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted || id.descriptor().name.to_lowercase() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|id| id.as_str()).collect();
                format!("unknown style '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_five_styles_in_order() {
        let ids: Vec<_> = catalog().iter().map(|s| s.id).collect();
        assert_eq!(ids, StyleId::ALL.to_vec());
    }

    #[test]
    fn test_descriptor_matches_id() {
        for id in StyleId::ALL {
            assert_eq!(id.descriptor().id, id);
        }
    }

    #[test]
    fn test_instructions_are_never_empty() {
        for style in catalog() {
            assert!(!style.instruction.trim().is_empty(), "{}", style.name);
            assert!(!style.name.is_empty());
        }
    }

    #[test]
    fn test_slug_roundtrip() {
        for id in StyleId::ALL {
            assert_eq!(id.to_string().parse::<StyleId>(), Ok(id));
        }
        assert_eq!("Out-Focusing".parse::<StyleId>(), Ok(StyleId::OutFocusing));
        assert!("watercolor".parse::<StyleId>().is_err());
    }

    #[test]
    fn test_serializes_with_slug() {
        let json = serde_json::to_value(StyleId::ThreeD.descriptor()).unwrap();
        assert_eq!(json["id"], "3d");
        assert_eq!(json["accent"]["from"], "sky-500");
        assert_eq!(
            serde_json::to_value(StyleId::OutFocusing).unwrap(),
            "out-focusing"
        );
    }
}
