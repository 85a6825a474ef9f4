//! Element record → presentation node projection.
//!
//! A pure function from the record to the class list, data attributes, and
//! inline style declarations a surface applies. Surfaces never read style
//! back; re-projecting after each mutation keeps them in step.

use sg_core::grid::GridSpan;
use sg_core::model::{
    ElementRecord, ImageData, ImageFit, Payload, TableData, TextAlign, TextBoxData, TextStyle,
    TextVAlign,
};

/// What goes inside an element's node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    /// Authoring affordance shown until content arrives.
    Placeholder(&'static str),
    /// Rich-text markup of a text box.
    Markup(String),
    Image { src: String, alt: String },
    Table {
        cells: Vec<Vec<String>>,
        header_row: bool,
    },
    /// Drawn entirely by declarations, or by a host-side renderer.
    Empty,
}

/// Everything a surface needs to draw one element.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeProjection {
    pub classes: Vec<String>,
    pub attributes: Vec<(&'static str, String)>,
    pub declarations: Vec<(&'static str, String)>,
    pub body: NodeBody,
}

impl NodeProjection {
    pub fn class_attr(&self) -> String {
        self.classes.join(" ")
    }

    pub fn declaration(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// `grid-row` / `grid-column` declarations for a span.
pub fn span_declarations(span: &GridSpan) -> [(&'static str, String); 2] {
    [
        ("grid-row", span.row_lines()),
        ("grid-column", span.column_lines()),
    ]
}

pub fn project(record: &ElementRecord) -> NodeProjection {
    let mut classes = vec![
        "slide-element".to_string(),
        format!("slide-element--{}", record.variant),
    ];
    if record.selected {
        classes.push("is-selected".into());
    }
    if record.locked {
        classes.push("is-locked".into());
    }
    if record.is_placeholder() {
        classes.push("is-placeholder".into());
    }

    let attributes = vec![
        ("data-element-id", record.id.as_str().to_string()),
        ("data-element-type", record.variant.name().to_string()),
        ("data-slide-index", record.slide_index.to_string()),
    ];

    let mut declarations: Vec<(&'static str, String)> = span_declarations(&record.position).into();
    declarations.push(("z-index", record.z_index.to_string()));
    if !record.visible {
        declarations.push(("display", "none".into()));
        declarations.push(("pointer-events", "none".into()));
    }

    match &record.data {
        Payload::TextBox(text) => {
            classes.extend(text.style.classes.iter().cloned());
            text_declarations(&text.style, &mut declarations);
        }
        Payload::Image(image) => {
            let fit = match image.fit {
                ImageFit::Cover => "cover",
                ImageFit::Contain => "contain",
                ImageFit::Fill => "fill",
            };
            declarations.push(("object-fit", fit.into()));
        }
        Payload::Shape(shape) => {
            if let Some(content) = &shape.content {
                if let Some(fill) = content.fill {
                    declarations.push(("background-color", fill.to_css()));
                }
                if let Some(stroke) = content.stroke {
                    declarations.push((
                        "border",
                        format!("{}px solid {}", content.stroke_width, stroke.to_css()),
                    ));
                }
            }
        }
        Payload::Table(_)
        | Payload::Chart(_)
        | Payload::Infographic(_)
        | Payload::Diagram(_)
        | Payload::Content(_) => {}
    }

    NodeProjection {
        classes,
        attributes,
        declarations,
        body: body(&record.data),
    }
}

fn body(data: &Payload) -> NodeBody {
    if data.is_placeholder() {
        let label = match data {
            Payload::TextBox(_) => "Click to add text",
            Payload::Image(_) => "Add an image",
            Payload::Table(_) => "Add table data",
            Payload::Chart(_) => "Add a chart",
            Payload::Shape(_) => "Choose a shape",
            Payload::Infographic(_) => "Add an infographic",
            Payload::Diagram(_) => "Add a diagram",
            Payload::Content(_) => "Add content",
        };
        return NodeBody::Placeholder(label);
    }
    match data {
        Payload::TextBox(TextBoxData {
            content: Some(markup),
            ..
        }) => NodeBody::Markup(markup.clone()),
        Payload::Image(ImageData {
            content: Some(image),
            ..
        }) => NodeBody::Image {
            src: image.url.clone(),
            alt: image.alt.clone(),
        },
        Payload::Table(TableData {
            content: Some(table),
            header_row,
            ..
        }) => NodeBody::Table {
            cells: table.cells.clone(),
            header_row: *header_row,
        },
        _ => NodeBody::Empty,
    }
}

fn text_declarations(style: &TextStyle, out: &mut Vec<(&'static str, String)>) {
    out.push(("font-family", style.font_family.clone()));
    out.push(("font-size", format!("{}px", style.font_size)));
    out.push(("font-weight", style.font_weight.to_string()));
    out.push((
        "font-style",
        if style.italic { "italic" } else { "normal" }.into(),
    ));
    out.push((
        "text-decoration",
        if style.underline { "underline" } else { "none" }.into(),
    ));
    out.push(("line-height", style.line_height.to_string()));
    out.push(("color", style.color.to_css()));
    if let Some(bg) = style.background {
        out.push(("background-color", bg.to_css()));
    }
    let align = match style.align {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
        TextAlign::Right => "right",
        TextAlign::Justify => "justify",
    };
    out.push(("text-align", align.into()));
    let valign = match style.valign {
        TextVAlign::Top => "flex-start",
        TextVAlign::Middle => "center",
        TextVAlign::Bottom => "flex-end",
    };
    out.push(("justify-content", valign.into()));
    out.push(("padding", style.padding.to_css()));
    if let Some(border) = &style.border {
        out.push(("border", border.to_css()));
    }
}
