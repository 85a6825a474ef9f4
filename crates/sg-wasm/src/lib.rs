//! WASM bridge for SG: exposes the slide editor engine to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Every mutating call returns
//! a JSON string `{"success":true,...}` or
//! `{"success":false,"error":"...","code":"NotFound|Unsupported|Invalid"}`.

mod dom;

pub use dom::{DomSurface, PostMessageSink};

use serde_json::{Value, json};
use sg_core::error::{EngineError, Result};
use sg_core::grid::GridSpan;
use sg_core::id::ElementId;
use sg_core::model::{ImageContent, InsertConfig, ShapeContent, TableContent, TextStyle, Variant};
use sg_core::EditorConfig;
use sg_editor::clipboard::ClipboardSnapshot;
use sg_editor::editor::{Editor, Response};
use sg_editor::input::{InputEvent, Modifiers, PointerKind};
use sg_editor::notify::NotificationBridge;
use sg_editor::persist::PersistedElement;
use sg_editor::registry::PositionChange;
use sg_editor::session::SessionEnd;
use sg_editor::shortcuts::ShortcutAction;
use sg_render::hit::HitTarget;
use sg_render::surface::MemorySurface;
use wasm_bindgen::prelude::*;

/// The WASM-facing slide canvas.
///
/// Holds the editor (registry, interaction controller, clipboard). All
/// interaction from the page goes through this struct.
#[wasm_bindgen]
pub struct SlideCanvas {
    editor: Editor,
}

#[wasm_bindgen]
impl SlideCanvas {
    /// Attach to the element `root_id`. `config_json` may be empty.
    #[wasm_bindgen(constructor)]
    pub fn new(root_id: &str, config_json: &str) -> std::result::Result<SlideCanvas, JsValue> {
        console_error_panic_hook_setup();

        let config = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            EditorConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        let editor = match DomSurface::attach(root_id) {
            Some(surface) => Editor::new(config, surface, bridge()),
            None => {
                log::warn!("#{root_id} not found; running headless");
                Editor::new(config, MemorySurface::new(), bridge())
            }
        }
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { editor })
    }

    // ─── Slides & mode ───────────────────────────────────────────────────

    pub fn add_slide(&mut self, slide_id: &str) -> usize {
        self.editor.registry_mut().add_slide(slide_id)
    }

    pub fn slide_count(&self) -> usize {
        self.editor.registry().slide_count()
    }

    pub fn set_active_slide(&mut self, slide_index: usize) -> String {
        respond(
            self.editor
                .registry_mut()
                .set_active_slide(slide_index)
                .map(|()| json!({ "activeSlide": slide_index })),
        )
    }

    pub fn resize(&mut self, width: f32, height: f32) -> String {
        respond(
            self.editor
                .resize_viewport(width, height)
                .map(|()| json!({ "width": width, "height": height })),
        )
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editor.set_editable(editable);
    }

    pub fn is_editable(&self) -> bool {
        self.editor.editable()
    }

    // ─── Pointer & keyboard ──────────────────────────────────────────────

    /// `pointer_type` is `PointerEvent.pointerType`.
    pub fn handle_pointer_down(
        &mut self,
        x: f32,
        y: f32,
        pointer_type: &str,
        on_interactive_child: bool,
    ) -> String {
        let event = InputEvent::PointerDown {
            x,
            y,
            pointer: PointerKind::from_dom(pointer_type),
            on_interactive_child,
        };
        respond(self.editor.handle(&event).map(response_json))
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32, pointer_type: &str) -> String {
        let event = InputEvent::PointerMove {
            x,
            y,
            pointer: PointerKind::from_dom(pointer_type),
        };
        respond(self.editor.handle(&event).map(response_json))
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32, pointer_type: &str) -> String {
        let event = InputEvent::PointerUp {
            x,
            y,
            pointer: PointerKind::from_dom(pointer_type),
        };
        respond(self.editor.handle(&event).map(response_json))
    }

    /// Pointer capture lost or window blurred.
    pub fn handle_pointer_cancel(&mut self) -> String {
        respond(self.editor.handle(&InputEvent::PointerCancel).map(response_json))
    }

    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        respond(
            self.editor
                .handle(&InputEvent::key(key, modifiers))
                .map(response_json),
        )
    }

    /// CSS cursor for a hover position.
    pub fn cursor_at(&self, x: f32, y: f32) -> String {
        match self.editor.hit(x, y) {
            HitTarget::Handle(_, handle) => handle.cursor().to_string(),
            HitTarget::Element(id) => match self.editor.registry().get(id) {
                Some(r) if !r.locked && self.editor.editable() => "move".to_string(),
                _ => "default".to_string(),
            },
            HitTarget::Background => "default".to_string(),
        }
    }

    // ─── Registry ────────────────────────────────────────────────────────

    /// `config_json` is an `InsertConfig`; pass an `id` to restore.
    pub fn insert_element(&mut self, element_type: &str, slide_index: usize, config_json: &str) -> String {
        respond((|| -> Result<Value> {
            let variant: Variant = element_type.parse()?;
            let config: InsertConfig = if config_json.trim().is_empty() {
                InsertConfig::default()
            } else {
                serde_json::from_str(config_json)?
            };
            let outcome = self.editor.registry_mut().insert(variant, slide_index, config)?;
            Ok(serde_json::to_value(outcome)?)
        })())
    }

    pub fn delete_element(&mut self, element_id: &str) -> String {
        respond(
            self.editor
                .registry_mut()
                .delete(ElementId::intern(element_id))
                .map(|r| json!({ "elementId": r.id })),
        )
    }

    pub fn select_element(&mut self, element_id: &str) -> String {
        respond(
            self.editor
                .registry_mut()
                .select(ElementId::intern(element_id))
                .map(|()| json!({})),
        )
    }

    pub fn deselect_all(&mut self) {
        self.editor.registry_mut().deselect_all();
    }

    pub fn update_position(&mut self, element_id: &str, grid_row: &str, grid_column: &str) -> String {
        let id = ElementId::intern(element_id);
        respond((|| -> Result<Value> {
            let record = self
                .editor
                .registry()
                .get(id)
                .ok_or_else(|| EngineError::ElementNotFound(element_id.to_string()))?;
            let span = GridSpan::from_lines(
                Some(grid_row),
                Some(grid_column),
                record.position,
                record.min_size(),
            );
            Ok(match self.editor.registry_mut().update_position(id, span)? {
                PositionChange::Moved(span) => json!({
                    "change": "moved",
                    "gridRow": span.row_lines(),
                    "gridColumn": span.column_lines(),
                }),
                PositionChange::Unchanged => json!({ "change": "unchanged" }),
                PositionChange::Locked => json!({ "change": "locked" }),
            })
        })())
    }

    pub fn bring_to_front(&mut self, element_id: &str) -> String {
        respond(
            self.editor
                .registry_mut()
                .bring_to_front(ElementId::intern(element_id))
                .map(|z| json!({ "zIndex": z })),
        )
    }

    pub fn send_to_back(&mut self, element_id: &str) -> String {
        respond(
            self.editor
                .registry_mut()
                .send_to_back(ElementId::intern(element_id))
                .map(|z| json!({ "zIndex": z })),
        )
    }

    pub fn set_locked(&mut self, element_id: &str, locked: bool) -> String {
        respond(
            self.editor
                .registry_mut()
                .set_locked(ElementId::intern(element_id), locked)
                .map(|()| json!({ "locked": locked })),
        )
    }

    pub fn set_visible(&mut self, element_id: &str, visible: bool) -> String {
        respond(
            self.editor
                .registry_mut()
                .set_visible(ElementId::intern(element_id), visible)
                .map(|()| json!({ "visible": visible })),
        )
    }

    pub fn update_text_style(&mut self, element_id: &str, style_json: &str) -> String {
        respond((|| -> Result<Value> {
            let style: TextStyle = serde_json::from_str(style_json)?;
            self.editor
                .registry_mut()
                .update_text_style(ElementId::intern(element_id), style)?;
            Ok(json!({}))
        })())
    }

    /// Fill in content. The JSON shape follows the element's type: a string
    /// of markup for text boxes, `{url, alt}` for images, `{cells}` for
    /// tables, a shape description for shapes, anything for the rest.
    pub fn update_content(&mut self, element_id: &str, content_json: &str) -> String {
        let id = ElementId::intern(element_id);
        respond((|| -> Result<Value> {
            let variant = self
                .editor
                .registry()
                .get(id)
                .map(|r| r.variant)
                .ok_or_else(|| EngineError::ElementNotFound(element_id.to_string()))?;
            let registry = self.editor.registry_mut();
            match variant {
                Variant::TextBox => {
                    let html: String = serde_json::from_str(content_json)?;
                    registry.update_text_box_content(id, html)?;
                }
                Variant::Image => {
                    let image: ImageContent = serde_json::from_str(content_json)?;
                    registry.update_image_content(id, image)?;
                }
                Variant::Table => {
                    let table: TableContent = serde_json::from_str(content_json)?;
                    registry.update_table_content(id, table)?;
                }
                Variant::Shape => {
                    let shape: ShapeContent = serde_json::from_str(content_json)?;
                    registry.update_shape_content(id, shape)?;
                }
                Variant::Chart => registry.update_chart_content(id, serde_json::from_str(content_json)?)?,
                Variant::Diagram => registry.update_diagram_content(id, serde_json::from_str(content_json)?)?,
                Variant::Infographic => {
                    registry.update_infographic_content(id, serde_json::from_str(content_json)?)?
                }
                Variant::Content => registry.update_content_block(id, serde_json::from_str(content_json)?)?,
            }
            Ok(json!({ "elementType": variant }))
        })())
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Element record as JSON, or `null`.
    pub fn get_element(&self, element_id: &str) -> String {
        self.editor
            .registry()
            .get(ElementId::intern(element_id))
            .and_then(|r| serde_json::to_string(r).ok())
            .unwrap_or_else(|| "null".to_string())
    }

    pub fn get_selected_id(&self) -> String {
        self.editor
            .registry()
            .selected()
            .map(|r| r.id.to_string())
            .unwrap_or_default()
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    pub fn copy(&mut self) -> String {
        respond(self.run_shortcut(ShortcutAction::Copy))
    }

    pub fn cut(&mut self) -> String {
        respond(self.run_shortcut(ShortcutAction::Cut))
    }

    pub fn paste(&mut self) -> String {
        respond(self.run_shortcut(ShortcutAction::Paste))
    }

    /// Held snapshot as MessagePack bytes, empty when nothing is held.
    pub fn clipboard_bytes(&self) -> Vec<u8> {
        self.editor
            .clipboard()
            .snapshot()
            .and_then(|s| s.to_bytes().ok())
            .unwrap_or_default()
    }

    pub fn load_clipboard(&mut self, bytes: &[u8]) -> String {
        respond(ClipboardSnapshot::from_bytes(bytes).map(|snapshot| {
            let variant = snapshot.variant;
            self.editor.clipboard_mut().load(snapshot);
            json!({ "elementType": variant })
        }))
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn snapshot_slide(&self, slide_index: usize) -> String {
        if slide_index >= self.editor.registry().slide_count() {
            return respond(Err(EngineError::SlideNotFound(slide_index)));
        }
        respond(Ok(json!({ "elements": self.editor.registry().snapshot_slide(slide_index) })))
    }

    pub fn restore_slide(&mut self, slide_index: usize, elements_json: &str) -> String {
        respond((|| -> Result<Value> {
            let records: Vec<PersistedElement> = serde_json::from_str(elements_json)?;
            let outcomes = self.editor.registry_mut().restore_slide(slide_index, records)?;
            Ok(json!({ "elements": outcomes }))
        })())
    }
}

impl SlideCanvas {
    fn run_shortcut(&mut self, action: ShortcutAction) -> Result<Value> {
        let ran = self.editor.dispatch(action)?;
        Ok(json!({ "changed": ran, "action": action.name() }))
    }
}

fn bridge() -> NotificationBridge {
    let bridge = NotificationBridge::new(PostMessageSink);
    #[cfg(target_arch = "wasm32")]
    let bridge = bridge.with_clock(|| js_sys::Date::now() as u64);
    bridge
}

// ─── JSON responses ──────────────────────────────────────────────────────

fn respond(result: Result<Value>) -> String {
    let body = match result {
        Ok(Value::Object(mut map)) => {
            map.insert("success".into(), Value::Bool(true));
            Value::Object(map)
        }
        Ok(other) => json!({ "success": true, "value": other }),
        Err(e) => json!({
            "success": false,
            "error": e.to_string(),
            "code": e.kind().code(),
        }),
    };
    body.to_string()
}

fn response_json(response: Response) -> Value {
    match response {
        Response::Ignored => json!({ "changed": false }),
        Response::Pressed { target, session } => {
            let mut body = match target {
                HitTarget::Handle(id, handle) => {
                    json!({ "target": "handle", "elementId": id, "handle": handle })
                }
                HitTarget::Element(id) => json!({ "target": "element", "elementId": id }),
                HitTarget::Background => json!({ "target": "background" }),
            };
            body["session"] = Value::Bool(session);
            body
        }
        Response::Previewed(span) => json!({
            "changed": true,
            "gridRow": span.row_lines(),
            "gridColumn": span.column_lines(),
        }),
        Response::Released(end) => match end {
            SessionEnd::Committed(span) => json!({
                "changed": true,
                "result": "committed",
                "gridRow": span.row_lines(),
                "gridColumn": span.column_lines(),
            }),
            SessionEnd::NoSession => json!({ "changed": false, "result": "none" }),
            SessionEnd::Unchanged => json!({ "changed": false, "result": "unchanged" }),
            SessionEnd::Locked => json!({ "changed": false, "result": "locked" }),
            SessionEnd::Aborted => json!({ "changed": true, "result": "aborted" }),
        },
        Response::Shortcut(action) => json!({ "changed": true, "action": action.name() }),
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("SG WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
