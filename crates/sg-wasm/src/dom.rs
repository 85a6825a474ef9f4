//! Browser bindings: a DOM `Surface` and a `postMessage` event sink.

use sg_core::grid::{GRID_COLUMNS, GRID_ROWS, GridSpan};
use sg_core::id::ElementId;
use sg_core::model::ElementRecord;
use sg_editor::notify::{BridgeEvent, EventSink};
use sg_render::project::{NodeBody, NodeProjection, project, span_declarations};
use sg_render::surface::Surface;
use std::collections::HashMap;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

fn report(context: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::warn!("{context}: {e:?}");
    }
}

/// One `<div>` per slide under a root element, one `<div>` per element
/// inside its slide, positioned with CSS grid lines.
pub struct DomSurface {
    document: Document,
    root: Element,
    slides: Vec<Option<Element>>,
    nodes: HashMap<(usize, ElementId), DomNode>,
}

struct DomNode {
    element: HtmlElement,
    /// Last body written, so re-projection only rebuilds children on change.
    body: Option<NodeBody>,
}

impl DomSurface {
    /// Attach to the element with `root_id`. `None` outside a browser or
    /// when the element is missing.
    pub fn attach(root_id: &str) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let root = document.get_element_by_id(root_id)?;
        Some(Self {
            document,
            root,
            slides: Vec::new(),
            nodes: HashMap::new(),
        })
    }

    fn create(&self, tag: &str) -> Option<Element> {
        match self.document.create_element(tag) {
            Ok(el) => Some(el),
            Err(e) => {
                log::warn!("create_element({tag}) failed: {e:?}");
                None
            }
        }
    }

    fn create_div(&self) -> Option<HtmlElement> {
        self.create("div")?.dyn_into::<HtmlElement>().ok()
    }

    fn apply(&self, node: &mut DomNode, projection: NodeProjection) {
        let element = &node.element;
        element.set_class_name(&projection.class_attr());
        for (name, value) in &projection.attributes {
            report("set_attribute", element.set_attribute(name, value));
        }
        // Start from a clean inline style so dropped declarations disappear.
        report("reset style", element.set_attribute("style", ""));
        let style = element.style();
        for (property, value) in &projection.declarations {
            report("set_property", style.set_property(property, value));
        }
        if node.body.as_ref() != Some(&projection.body) {
            self.render_body(element, &projection.body);
            node.body = Some(projection.body);
        }
    }

    fn render_body(&self, element: &HtmlElement, body: &NodeBody) {
        element.set_inner_html("");
        match body {
            NodeBody::Empty => {}
            NodeBody::Placeholder(label) => {
                if let Some(hint) = self.create("div") {
                    hint.set_class_name("slide-element__placeholder");
                    hint.set_text_content(Some(*label));
                    report("append placeholder", element.append_child(&hint).map(drop));
                }
            }
            NodeBody::Markup(markup) => element.set_inner_html(markup),
            NodeBody::Image { src, alt } => {
                if let Some(img) = self.create("img") {
                    report("set_attribute", img.set_attribute("src", src));
                    report("set_attribute", img.set_attribute("alt", alt));
                    report("set_attribute", img.set_attribute("draggable", "false"));
                    report("append image", element.append_child(&img).map(drop));
                }
            }
            NodeBody::Table { cells, header_row } => {
                let Some(table) = self.create("table") else {
                    return;
                };
                for (r, row) in cells.iter().enumerate() {
                    let Some(tr) = self.create("tr") else {
                        return;
                    };
                    let tag = if *header_row && r == 0 { "th" } else { "td" };
                    for text in row {
                        if let Some(cell) = self.create(tag) {
                            cell.set_text_content(Some(text.as_str()));
                            report("append cell", tr.append_child(&cell).map(drop));
                        }
                    }
                    report("append row", table.append_child(&tr).map(drop));
                }
                report("append table", element.append_child(&table).map(drop));
            }
        }
    }
}

impl Surface for DomSurface {
    fn mount_slide(&mut self, slide_index: usize, slide_id: &str) {
        let Some(container) = self.create_div() else {
            return;
        };
        container.set_class_name("slide");
        report("set_attribute", container.set_attribute("data-slide-id", slide_id));
        report(
            "set_attribute",
            container.set_attribute("data-slide-index", &slide_index.to_string()),
        );
        let style = container.style();
        report("set_property", style.set_property("display", "grid"));
        report(
            "set_property",
            style.set_property(
                "grid-template-columns",
                &format!("repeat({GRID_COLUMNS}, 1fr)"),
            ),
        );
        report(
            "set_property",
            style.set_property("grid-template-rows", &format!("repeat({GRID_ROWS}, 1fr)")),
        );
        if let Err(e) = self.root.append_child(&container) {
            log::warn!("append slide {slide_index}: {e:?}");
            return;
        }
        if slide_index >= self.slides.len() {
            self.slides.resize(slide_index + 1, None);
        }
        self.slides[slide_index] = Some(container.into());
    }

    fn mount(&mut self, record: &ElementRecord) {
        let Some(Some(slide)) = self.slides.get(record.slide_index) else {
            log::warn!("no slide container for {:?}", record.id);
            return;
        };
        let Some(element) = self.create_div() else {
            return;
        };
        if let Err(e) = slide.append_child(&element) {
            log::warn!("append {:?}: {e:?}", record.id);
            return;
        }
        let mut node = DomNode {
            element,
            body: None,
        };
        self.apply(&mut node, project(record));
        if let Some(old) = self.nodes.insert((record.slide_index, record.id), node) {
            old.element.remove();
        }
    }

    fn update(&mut self, record: &ElementRecord) {
        let key = (record.slide_index, record.id);
        let Some(mut node) = self.nodes.remove(&key) else {
            return;
        };
        self.apply(&mut node, project(record));
        self.nodes.insert(key, node);
    }

    fn preview(&mut self, slide_index: usize, id: ElementId, span: GridSpan) {
        if let Some(node) = self.nodes.get(&(slide_index, id)) {
            let style = node.element.style();
            for (property, value) in span_declarations(&span) {
                report("set_property", style.set_property(property, &value));
            }
        }
    }

    fn unmount(&mut self, slide_index: usize, id: ElementId) {
        if let Some(node) = self.nodes.remove(&(slide_index, id)) {
            node.element.remove();
        }
    }
}

/// Posts every event to the hosting frame (`window.parent`).
#[derive(Debug, Default, Clone, Copy)]
pub struct PostMessageSink;

impl EventSink for PostMessageSink {
    fn deliver(&mut self, event: &BridgeEvent) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let target = match window.parent() {
            Ok(Some(parent)) => parent,
            _ => window,
        };
        let message = match js_sys::JSON::parse(&event.to_json()) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("event encode failed: {e:?}");
                return;
            }
        };
        report("post_message", target.post_message(&message, "*"));
    }
}
