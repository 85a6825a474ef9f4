use crate::model::Variant;
use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use uuid::Uuid;
use winnow::ascii::digit1;
use winnow::prelude::*;
use winnow::token::take_while;

/// Global string interner for element ids; fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Opaque element identity. Interned, so it is 4 bytes, `Copy`, and
/// compares in O(1).
///
/// Two shapes are produced and accepted: the structured
/// `{slideId}_{type}_{8 hex}` form used for new elements and the legacy
/// `slide-{index}-{slot}` form. The registry never looks inside an id; the
/// shape only matters to callers that want to inspect one.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Spur);

impl ElementId {
    /// Intern a string as an ElementId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        ElementId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Fresh structured id: `{slide_id}_{variant}_{8 lowercase hex}`.
    pub fn generate(slide_id: &str, variant: Variant) -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self::intern(&format!("{slide_id}_{variant}_{}", &hex[..8]))
    }

    /// Legacy positional id: `slide-{slide_index}-{slot}`.
    pub fn legacy(slide_index: usize, slot: &str) -> Self {
        Self::intern(&format!("slide-{slide_index}-{slot}"))
    }

    /// Classify the id without changing how it is treated.
    pub fn shape(&self) -> IdShape {
        let s = self.as_str();
        if let Ok((slide_index, slot)) = legacy_id.parse(s) {
            return IdShape::Legacy {
                slide_index,
                slot: slot.to_string(),
            };
        }
        let mut parts = s.rsplitn(3, '_');
        if let (Some(suffix), Some(kind), Some(slide_id)) = (parts.next(), parts.next(), parts.next())
            && suffix.len() == 8
            && suffix.bytes().all(|b| b.is_ascii_hexdigit())
            && !slide_id.is_empty()
            && let Ok(variant) = kind.parse::<Variant>()
        {
            return IdShape::Structured {
                slide_id: slide_id.to_string(),
                variant,
                suffix: suffix.to_string(),
            };
        }
        IdShape::Opaque
    }
}

/// What an id looks like from the outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdShape {
    Structured {
        slide_id: String,
        variant: Variant,
        suffix: String,
    },
    Legacy {
        slide_index: usize,
        slot: String,
    },
    Opaque,
}

fn legacy_id<'a>(input: &mut &'a str) -> ModalResult<(usize, &'a str)> {
    let _ = "slide-".parse_next(input)?;
    let index = digit1.try_map(str::parse::<usize>).parse_next(input)?;
    let _ = '-'.parse_next(input)?;
    let slot = take_while(1.., |_: char| true).parse_next(input)?;
    Ok((index, slot))
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ElementId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn interning_is_stable() {
        let a = ElementId::intern("slide-0-title");
        let b = ElementId::intern("slide-0-title");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "slide-0-title");
    }

    #[test]
    fn generated_ids_are_structured_and_unique() {
        let a = ElementId::generate("slide_abc", Variant::TextBox);
        let b = ElementId::generate("slide_abc", Variant::TextBox);
        assert_ne!(a, b);
        match a.shape() {
            IdShape::Structured {
                slide_id,
                variant,
                suffix,
            } => {
                assert_eq!(slide_id, "slide_abc");
                assert_eq!(variant, Variant::TextBox);
                assert_eq!(suffix.len(), 8);
            }
            other => panic!("expected structured id, got {other:?}"),
        }
    }

    #[test]
    fn legacy_shape() {
        let id = ElementId::legacy(3, "body");
        assert_eq!(id.as_str(), "slide-3-body");
        assert_eq!(
            id.shape(),
            IdShape::Legacy {
                slide_index: 3,
                slot: "body".to_string()
            }
        );
    }

    #[test]
    fn restored_structured_id() {
        let id = ElementId::intern("slide_abc_textbox_12345678");
        assert!(matches!(id.shape(), IdShape::Structured { .. }));
    }

    #[test]
    fn opaque_shapes() {
        assert_eq!(ElementId::intern("hello").shape(), IdShape::Opaque);
        assert_eq!(ElementId::intern("slide-x-title").shape(), IdShape::Opaque);
        assert_eq!(ElementId::intern("s_widget_12345678").shape(), IdShape::Opaque);
        assert_eq!(ElementId::intern("s_chart_1234").shape(), IdShape::Opaque);
    }
}
