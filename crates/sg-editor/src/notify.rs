//! Notification bridge: registry mutations → host events.
//!
//! Events are typed (`BridgeEvent`) and serialize to the JSON a hosting frame
//! expects. Delivery goes through an `EventSink`, so the engine does not know
//! whether events end up in a channel, a `postMessage`, or nowhere. Delivery
//! is fire-and-forget: nothing is awaited, retried, or acknowledged.

use serde::Serialize;
use sg_core::id::ElementId;
use sg_core::model::{ElementRecord, Payload, TextStyle, Variant};
use std::sync::mpsc::Sender;

// ─── Event types ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Add,
    Modify,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentChange {
    pub slide_index: usize,
    pub change_type: ChangeType,
    pub element_type: Variant,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// `{action: "slide_content_changed", data: {...}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentMessage {
    pub action: &'static str,
    pub data: ContentChange,
}

pub const SLIDE_CONTENT_CHANGED: &str = "slide_content_changed";

/// Formatting of a selected text box, for a toolbar to mirror.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFormatting {
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: u16,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub line_height: f32,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    pub text_align: sg_core::model::TextAlign,
    pub vertical_align: sg_core::model::TextVAlign,
    pub padding: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    pub classes: Vec<String>,
}

impl From<&TextStyle> for TextFormatting {
    fn from(style: &TextStyle) -> Self {
        Self {
            font_family: style.font_family.clone(),
            font_size: style.font_size,
            font_weight: style.font_weight,
            bold: style.font_weight >= 600,
            italic: style.italic,
            underline: style.underline,
            line_height: style.line_height,
            color: style.color.to_hex(),
            background_color: style.background.map(|c| c.to_hex()),
            text_align: style.align,
            vertical_align: style.valign,
            padding: style.padding.to_css(),
            border: style.border.as_ref().map(|b| b.to_css()),
            classes: style.classes.iter().cloned().collect(),
        }
    }
}

/// Geometry and type properties of a selected non-text element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementProperties {
    pub element_type: Variant,
    pub grid_row: String,
    pub grid_column: String,
    pub rows: u16,
    pub cols: u16,
    pub z_index: i32,
    pub locked: bool,
    pub visible: bool,
    pub placeholder: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_rows: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_cols: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape_kind: Option<sg_core::model::ShapeKind>,
}

impl From<&ElementRecord> for ElementProperties {
    fn from(record: &ElementRecord) -> Self {
        let mut props = Self {
            element_type: record.variant,
            grid_row: record.position.row_lines(),
            grid_column: record.position.column_lines(),
            rows: record.position.rows(),
            cols: record.position.cols(),
            z_index: record.z_index,
            locked: record.locked,
            visible: record.visible,
            placeholder: record.is_placeholder(),
            image_url: None,
            table_rows: None,
            table_cols: None,
            chart_type: None,
            shape_kind: None,
        };
        match &record.data {
            Payload::Image(image) => {
                props.image_url = image.content.as_ref().map(|c| c.url.clone());
            }
            Payload::Table(table) => {
                props.table_rows = Some(table.rows);
                props.table_cols = Some(table.cols);
            }
            Payload::Chart(chart) => props.chart_type = Some(chart.chart_type.clone()),
            Payload::Shape(shape) => props.shape_kind = shape.content.as_ref().map(|c| c.kind),
            _ => {}
        }
        props
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SelectionEvent {
    ElementSelected {
        #[serde(rename = "elementId")]
        element_id: ElementId,
        properties: ElementProperties,
    },
    TextBoxSelected {
        #[serde(rename = "elementId")]
        element_id: ElementId,
        formatting: TextFormatting,
    },
    ElementDeselected {
        #[serde(rename = "elementId", skip_serializing_if = "Option::is_none")]
        element_id: Option<ElementId>,
    },
    TextBoxDeselected {
        #[serde(rename = "elementId", skip_serializing_if = "Option::is_none")]
        element_id: Option<ElementId>,
    },
}

/// Everything the bridge can emit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BridgeEvent {
    Content(ContentMessage),
    Selection(SelectionEvent),
}

impl BridgeEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

// ─── Sinks ───────────────────────────────────────────────────────────────

/// Destination for bridge events.
pub trait EventSink {
    fn deliver(&mut self, event: &BridgeEvent);
}

/// Channel sink: the receiving half sees events in emission order.
impl EventSink for Sender<BridgeEvent> {
    fn deliver(&mut self, event: &BridgeEvent) {
        if self.send(event.clone()).is_err() {
            log::warn!("notification receiver dropped; event discarded");
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn deliver(&mut self, _event: &BridgeEvent) {}
}

/// Milliseconds since the Unix epoch from the system clock.
pub fn system_clock() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ─── Bridge ──────────────────────────────────────────────────────────────

pub struct NotificationBridge {
    sink: Box<dyn EventSink>,
    clock: fn() -> u64,
}

impl Default for NotificationBridge {
    fn default() -> Self {
        Self::new(NullSink)
    }
}

impl NotificationBridge {
    pub fn new(sink: impl EventSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            clock: system_clock,
        }
    }

    /// Replace the timestamp source (targets without a system clock).
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    pub fn content_changed(&mut self, slide_index: usize, change_type: ChangeType, element_type: Variant) {
        let event = BridgeEvent::Content(ContentMessage {
            action: SLIDE_CONTENT_CHANGED,
            data: ContentChange {
                slide_index,
                change_type,
                element_type,
                timestamp: (self.clock)(),
            },
        });
        self.sink.deliver(&event);
    }

    pub fn selected(&mut self, record: &ElementRecord) {
        let event = match &record.data {
            Payload::TextBox(text) => SelectionEvent::TextBoxSelected {
                element_id: record.id,
                formatting: TextFormatting::from(&text.style),
            },
            _ => SelectionEvent::ElementSelected {
                element_id: record.id,
                properties: ElementProperties::from(record),
            },
        };
        self.sink.deliver(&BridgeEvent::Selection(event));
    }

    pub fn deselected(&mut self, record: &ElementRecord) {
        let element_id = Some(record.id);
        let event = if record.variant.is_text() {
            SelectionEvent::TextBoxDeselected { element_id }
        } else {
            SelectionEvent::ElementDeselected { element_id }
        };
        self.sink.deliver(&BridgeEvent::Selection(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sg_core::grid::GridSpan;
    use std::sync::mpsc;

    fn fixed_clock() -> u64 {
        1_700_000_000_000
    }

    fn record(variant: Variant) -> ElementRecord {
        ElementRecord {
            id: ElementId::intern("slide_n_el_0000abcd"),
            variant,
            slide_index: 2,
            position: GridSpan::new(6, 12, 5, 28),
            z_index: 100,
            selected: true,
            locked: false,
            visible: true,
            data: Payload::placeholder(variant),
        }
    }

    #[test]
    fn content_change_schema() {
        let (tx, rx) = mpsc::channel();
        let mut bridge = NotificationBridge::new(tx).with_clock(fixed_clock);
        bridge.content_changed(2, ChangeType::Modify, Variant::Chart);

        let event = rx.try_recv().unwrap();
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "action": "slide_content_changed",
                "data": {
                    "slideIndex": 2,
                    "changeType": "modify",
                    "elementType": "chart",
                    "timestamp": 1_700_000_000_000u64
                }
            })
        );
    }

    #[test]
    fn text_selection_carries_formatting() {
        let (tx, rx) = mpsc::channel();
        let mut bridge = NotificationBridge::new(tx);
        bridge.selected(&record(Variant::TextBox));

        let value = serde_json::to_value(rx.try_recv().unwrap()).unwrap();
        assert_eq!(value["type"], "textBoxSelected");
        assert_eq!(value["elementId"], "slide_n_el_0000abcd");
        assert_eq!(value["formatting"]["fontFamily"], "Inter");
        assert_eq!(value["formatting"]["textAlign"], "left");
        assert_eq!(value["formatting"]["color"], "#000000");
    }

    #[test]
    fn element_selection_carries_geometry() {
        let (tx, rx) = mpsc::channel();
        let mut bridge = NotificationBridge::new(tx);
        bridge.selected(&record(Variant::Table));

        let value = serde_json::to_value(rx.try_recv().unwrap()).unwrap();
        assert_eq!(value["type"], "elementSelected");
        assert_eq!(value["properties"]["gridRow"], "6/12");
        assert_eq!(value["properties"]["cols"], 23);
        assert_eq!(value["properties"]["tableRows"], 3);
        assert!(value["properties"].get("imageUrl").is_none());
    }

    #[test]
    fn deselection_type_follows_variant() {
        let (tx, rx) = mpsc::channel();
        let mut bridge = NotificationBridge::new(tx);
        bridge.deselected(&record(Variant::TextBox));
        bridge.deselected(&record(Variant::Image));

        let first = serde_json::to_value(rx.try_recv().unwrap()).unwrap();
        let second = serde_json::to_value(rx.try_recv().unwrap()).unwrap();
        assert_eq!(first["type"], "textBoxDeselected");
        assert_eq!(second["type"], "elementDeselected");
    }

    #[test]
    fn dropped_receiver_is_not_an_error() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut bridge = NotificationBridge::new(tx);
        bridge.content_changed(0, ChangeType::Add, Variant::Shape);
    }
}
