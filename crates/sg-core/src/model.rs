//! Element data model for slides.
//!
//! A slide holds a flat set of typed elements. Each element carries its grid
//! position, its layer, three interaction flags, and a variant-specific
//! payload. The payload is the single source of truth for content and style;
//! rendering layers project from it and never write back.

use crate::error::EngineError;
use crate::grid::{GridSpan, MinSize};
use crate::id::ElementId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

// ─── Variants ────────────────────────────────────────────────────────────

/// The kinds of element a slide can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Shape,
    Table,
    Chart,
    Image,
    TextBox,
    Infographic,
    Diagram,
    Content,
}

/// Which z-index counter an element draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZPool {
    General,
    Text,
}

impl Variant {
    pub const ALL: [Variant; 8] = [
        Variant::Shape,
        Variant::Table,
        Variant::Chart,
        Variant::Image,
        Variant::TextBox,
        Variant::Infographic,
        Variant::Diagram,
        Variant::Content,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Shape => "shape",
            Self::Table => "table",
            Self::Chart => "chart",
            Self::Image => "image",
            Self::TextBox => "textbox",
            Self::Infographic => "infographic",
            Self::Diagram => "diagram",
            Self::Content => "content",
        }
    }

    /// Smallest size the element may be resized to.
    pub fn min_size(self) -> MinSize {
        match self {
            Self::TextBox | Self::Image => MinSize::new(2, 2),
            Self::Chart | Self::Diagram => MinSize::new(3, 4),
            Self::Infographic => MinSize::new(3, 3),
            Self::Shape | Self::Table | Self::Content => MinSize::new(1, 1),
        }
    }

    /// Where a new element lands when no position is given.
    pub fn default_span(self) -> GridSpan {
        match self {
            Self::TextBox => GridSpan::new(4, 8, 5, 29),
            Self::Image => GridSpan::new(5, 14, 9, 25),
            Self::Shape => GridSpan::new(7, 12, 13, 21),
            Self::Table => GridSpan::new(5, 14, 5, 29),
            Self::Chart | Self::Diagram | Self::Infographic | Self::Content => {
                GridSpan::new(4, 16, 5, 29)
            }
        }
    }

    pub fn z_pool(self) -> ZPool {
        match self {
            Self::TextBox => ZPool::Text,
            _ => ZPool::General,
        }
    }

    pub fn is_text(self) -> bool {
        self == Self::TextBox
    }

    /// Only text boxes can be captured by the clipboard.
    pub fn supports_copy(self) -> bool {
        self == Self::TextBox
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| EngineError::UnknownVariant(s.to_string()))
    }
}

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RRGGBB`, or `#RRGGBBAA`. The `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let (r, g, b, a) = match hex.len() {
            3 => {
                let short = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
                (short(0)?, short(1)?, short(2)?, 255)
            }
            6 => (channel(0)?, channel(2)?, channel(4)?, 255),
            8 => (channel(0)?, channel(2)?, channel(4)?, channel(6)?),
            _ => return None,
        };
        Some(Self::rgba(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        ))
    }

    /// Shortest hex form: `#RRGGBB` when opaque, `#RRGGBBAA` otherwise.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_bytes();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// CSS color value.
    pub fn to_css(&self) -> String {
        let [r, g, b, a] = self.to_bytes();
        if a == 255 {
            format!("rgb({r}, {g}, {b})")
        } else {
            format!("rgba({r}, {g}, {b}, {:.3})", self.a)
        }
    }

    fn to_bytes(self) -> [u8; 4] {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [c(self.r), c(self.g), c(self.b), c(self.a)]
    }
}

// ─── Text formatting ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextVAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Inner spacing in pixels, CSS order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Padding {
    pub const fn uniform(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn to_css(&self) -> String {
        format!(
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub width: f32,
    pub style: BorderStyle,
    pub color: Color,
}

impl Border {
    pub fn to_css(&self) -> String {
        let style = match self.style {
            BorderStyle::Solid => "solid",
            BorderStyle::Dashed => "dashed",
            BorderStyle::Dotted => "dotted",
        };
        format!("{}px {style} {}", self.width, self.color.to_css())
    }
}

/// Formatting of a text box. This is what a toolbar reflects on selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: u16,
    pub italic: bool,
    pub underline: bool,
    pub line_height: f32,
    pub color: Color,
    pub background: Option<Color>,
    pub align: TextAlign,
    pub valign: TextVAlign,
    pub padding: Padding,
    pub border: Option<Border>,
    pub classes: SmallVec<[String; 2]>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Inter".into(),
            font_size: 24.0,
            font_weight: 400,
            italic: false,
            underline: false,
            line_height: 1.3,
            color: Color::BLACK,
            background: None,
            align: TextAlign::Left,
            valign: TextVAlign::Top,
            padding: Padding::uniform(8.0),
            border: None,
            classes: SmallVec::new(),
        }
    }
}

// ─── Payloads ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    RoundedRectangle,
    Ellipse,
    Triangle,
    Line,
    Arrow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeContent {
    pub kind: ShapeKind,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShapeData {
    pub content: Option<ShapeContent>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableContent {
    pub cells: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableData {
    pub rows: u16,
    pub cols: u16,
    pub header_row: bool,
    pub content: Option<TableContent>,
}

impl Default for TableData {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 3,
            header_row: true,
            content: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartData {
    pub chart_type: String,
    /// Chart payload, opaque to the engine.
    pub content: Option<serde_json::Value>,
}

impl Default for ChartData {
    fn default() -> Self {
        Self {
            chart_type: "bar".into(),
            content: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    #[default]
    Cover,
    Contain,
    Fill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageData {
    pub fit: ImageFit,
    pub content: Option<ImageContent>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBoxData {
    pub style: TextStyle,
    /// Rich-text markup.
    pub content: Option<String>,
}

/// Payload for variants whose content the engine never interprets
/// (infographics, diagrams, generic content blocks).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobData {
    pub template: Option<String>,
    pub content: Option<serde_json::Value>,
}

/// Variant-specific element data. `content: None` means placeholder mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload {
    Shape(ShapeData),
    Table(TableData),
    Chart(ChartData),
    Image(ImageData),
    TextBox(TextBoxData),
    Infographic(BlobData),
    Diagram(BlobData),
    Content(BlobData),
}

/// New content for an element. Applying one is the one-way
/// placeholder → content transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentUpdate {
    Shape(ShapeContent),
    Table(TableContent),
    Chart(serde_json::Value),
    Image(ImageContent),
    TextBox(String),
    Infographic(serde_json::Value),
    Diagram(serde_json::Value),
    Content(serde_json::Value),
}

impl ContentUpdate {
    pub fn variant(&self) -> Variant {
        match self {
            Self::Shape(_) => Variant::Shape,
            Self::Table(_) => Variant::Table,
            Self::Chart(_) => Variant::Chart,
            Self::Image(_) => Variant::Image,
            Self::TextBox(_) => Variant::TextBox,
            Self::Infographic(_) => Variant::Infographic,
            Self::Diagram(_) => Variant::Diagram,
            Self::Content(_) => Variant::Content,
        }
    }
}

impl Payload {
    /// Placeholder payload for a variant.
    pub fn placeholder(variant: Variant) -> Self {
        match variant {
            Variant::Shape => Self::Shape(ShapeData::default()),
            Variant::Table => Self::Table(TableData::default()),
            Variant::Chart => Self::Chart(ChartData::default()),
            Variant::Image => Self::Image(ImageData::default()),
            Variant::TextBox => Self::TextBox(TextBoxData::default()),
            Variant::Infographic => Self::Infographic(BlobData::default()),
            Variant::Diagram => Self::Diagram(BlobData::default()),
            Variant::Content => Self::Content(BlobData::default()),
        }
    }

    pub fn variant(&self) -> Variant {
        match self {
            Self::Shape(_) => Variant::Shape,
            Self::Table(_) => Variant::Table,
            Self::Chart(_) => Variant::Chart,
            Self::Image(_) => Variant::Image,
            Self::TextBox(_) => Variant::TextBox,
            Self::Infographic(_) => Variant::Infographic,
            Self::Diagram(_) => Variant::Diagram,
            Self::Content(_) => Variant::Content,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        match self {
            Self::Shape(d) => d.content.is_none(),
            Self::Table(d) => d.content.is_none(),
            Self::Chart(d) => d.content.is_none(),
            Self::Image(d) => d.content.is_none(),
            Self::TextBox(d) => d.content.is_none(),
            Self::Infographic(d) | Self::Diagram(d) | Self::Content(d) => d.content.is_none(),
        }
    }

    pub fn text_style(&self) -> Option<&TextStyle> {
        match self {
            Self::TextBox(d) => Some(&d.style),
            _ => None,
        }
    }

    /// Fill in content. The variant of `update` must match.
    pub fn apply_content(&mut self, update: ContentUpdate) -> Result<(), EngineError> {
        let expected = self.variant();
        match (self, update) {
            (Self::Shape(d), ContentUpdate::Shape(c)) => d.content = Some(c),
            (Self::Table(d), ContentUpdate::Table(c)) => {
                let extent = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
                d.rows = extent(c.cells.len());
                d.cols = extent(c.cells.iter().map(Vec::len).max().unwrap_or(0));
                d.content = Some(c);
            }
            (Self::Chart(d), ContentUpdate::Chart(c)) => d.content = Some(c),
            (Self::Image(d), ContentUpdate::Image(c)) => d.content = Some(c),
            (Self::TextBox(d), ContentUpdate::TextBox(c)) => d.content = Some(c),
            (Self::Infographic(d), ContentUpdate::Infographic(c))
            | (Self::Diagram(d), ContentUpdate::Diagram(c))
            | (Self::Content(d), ContentUpdate::Content(c)) => d.content = Some(c),
            (_, update) => {
                return Err(EngineError::PayloadMismatch {
                    variant: expected,
                    payload: update.variant(),
                });
            }
        }
        Ok(())
    }
}

// ─── Element record ──────────────────────────────────────────────────────

/// One element on one slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub variant: Variant,
    pub slide_index: usize,
    pub position: GridSpan,
    pub z_index: i32,
    pub selected: bool,
    pub locked: bool,
    pub visible: bool,
    pub data: Payload,
}

impl ElementRecord {
    pub fn min_size(&self) -> MinSize {
        self.variant.min_size()
    }

    pub fn is_placeholder(&self) -> bool {
        self.data.is_placeholder()
    }

    /// Visible and therefore hit-testable.
    pub fn is_interactive(&self) -> bool {
        self.visible
    }
}

// ─── Insert input ────────────────────────────────────────────────────────

/// Position as supplied by a caller. Every form funnels through
/// [`PositionInput::resolve`] before it reaches a record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PositionInput {
    Span(GridSpan),
    #[serde(rename_all = "camelCase")]
    Lines {
        grid_row: Option<String>,
        grid_column: Option<String>,
    },
    #[default]
    Unspecified,
}

impl PositionInput {
    pub fn resolve(&self, variant: Variant) -> GridSpan {
        let min = variant.min_size();
        match self {
            Self::Span(span) => span.normalized(min),
            Self::Lines {
                grid_row,
                grid_column,
            } => GridSpan::from_lines(
                grid_row.as_deref(),
                grid_column.as_deref(),
                variant.default_span(),
                min,
            ),
            Self::Unspecified => variant.default_span().normalized(min),
        }
    }
}

impl From<GridSpan> for PositionInput {
    fn from(span: GridSpan) -> Self {
        Self::Span(span)
    }
}

/// Options for inserting an element.
///
/// `id` is the restoration signal: when present the insert restores a saved
/// element, silently and idempotently; when absent a new id is allocated and
/// the insert is announced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InsertConfig {
    pub id: Option<String>,
    pub position: PositionInput,
    pub z_index: Option<i32>,
    pub payload: Option<Payload>,
    pub locked: bool,
    pub visible: Option<bool>,
}

impl InsertConfig {
    pub fn at(span: GridSpan) -> Self {
        Self {
            position: PositionInput::Span(span),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn variant_names_round_trip() {
        for v in Variant::ALL {
            assert_eq!(v.name().parse::<Variant>().unwrap(), v);
        }
        assert!("widget".parse::<Variant>().is_err());
    }

    #[test]
    fn variant_serde_matches_name() {
        let json = serde_json::to_string(&Variant::TextBox).unwrap();
        assert_eq!(json, "\"textbox\"");
    }

    #[test]
    fn default_spans_satisfy_minimums() {
        for v in Variant::ALL {
            assert!(v.default_span().is_valid(v.min_size()), "{v}");
        }
    }

    #[test]
    fn only_text_boxes_use_text_pool() {
        for v in Variant::ALL {
            assert_eq!(v.z_pool() == ZPool::Text, v == Variant::TextBox);
        }
    }

    #[test]
    fn color_hex_round_trip() {
        let c = Color::from_hex("#3366FF").unwrap();
        assert_eq!(c.to_hex(), "#3366FF");
        let c = Color::from_hex("fff").unwrap();
        assert_eq!(c, Color::WHITE);
        let c = Color::from_hex("#00000080").unwrap();
        assert_eq!(c.to_hex(), "#00000080");
        assert!(Color::from_hex("#12").is_none());
        assert!(Color::from_hex("#GGGGGG").is_none());
    }

    #[test]
    fn placeholder_then_content() {
        let mut payload = Payload::placeholder(Variant::Image);
        assert!(payload.is_placeholder());
        payload
            .apply_content(ContentUpdate::Image(ImageContent {
                url: "https://example.com/a.png".into(),
                alt: String::new(),
            }))
            .unwrap();
        assert!(!payload.is_placeholder());
    }

    #[test]
    fn table_content_updates_dimensions() {
        let mut payload = Payload::placeholder(Variant::Table);
        payload
            .apply_content(ContentUpdate::Table(TableContent {
                cells: vec![vec!["a".into(), "b".into()]; 4],
            }))
            .unwrap();
        match payload {
            Payload::Table(t) => {
                assert_eq!((t.rows, t.cols), (4, 2));
            }
            _ => panic!("expected table"),
        }
    }

    #[test]
    fn oversized_table_dimensions_saturate() {
        let mut payload = Payload::placeholder(Variant::Table);
        payload
            .apply_content(ContentUpdate::Table(TableContent {
                cells: vec![Vec::new(); 70_000],
            }))
            .unwrap();
        match payload {
            Payload::Table(t) => assert_eq!((t.rows, t.cols), (u16::MAX, 0)),
            _ => panic!("expected table"),
        }
    }

    #[test]
    fn mismatched_content_is_rejected() {
        let mut payload = Payload::placeholder(Variant::Chart);
        let err = payload
            .apply_content(ContentUpdate::TextBox("hi".into()))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::PayloadMismatch {
                variant: Variant::Chart,
                payload: Variant::TextBox
            }
        ));
        assert!(payload.is_placeholder());
    }

    #[test]
    fn position_input_forms() {
        let lines = PositionInput::Lines {
            grid_row: Some("6/12".into()),
            grid_column: Some("oops".into()),
        };
        let span = lines.resolve(Variant::TextBox);
        assert_eq!((span.row_start, span.row_end), (6, 12));
        assert_eq!(
            (span.col_start, span.col_end),
            (Variant::TextBox.default_span().col_start, Variant::TextBox.default_span().col_end)
        );

        let tiny = PositionInput::Span(GridSpan::new(4, 5, 2, 3)).resolve(Variant::Chart);
        assert!(tiny.is_valid(Variant::Chart.min_size()));
    }

    #[test]
    fn insert_config_from_json() {
        let config: InsertConfig = serde_json::from_str(
            r#"{"id":"slide-0-title","position":{"gridRow":"2/4","gridColumn":"3/30"}}"#,
        )
        .unwrap();
        assert_eq!(config.id.as_deref(), Some("slide-0-title"));
        let span = config.position.resolve(Variant::TextBox);
        assert_eq!(span, GridSpan::new(2, 4, 3, 30));
    }
}
