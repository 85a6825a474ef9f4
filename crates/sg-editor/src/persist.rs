//! Slide snapshots for an external save collaborator.
//!
//! A snapshot is the position/identity contract only: each record keeps its
//! id, its `"start/end"` grid lines, its layer, and its flags. Restoring goes
//! through the registry's idempotent restore path, so loading the same
//! snapshot twice changes nothing and announces nothing.

use crate::registry::{InsertOutcome, Registry};
use serde::{Deserialize, Serialize};
use sg_core::error::{EngineError, Result};
use sg_core::model::{ElementRecord, InsertConfig, Payload, PositionInput, Variant};

fn visible_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedElement {
    pub id: String,
    #[serde(rename = "type")]
    pub variant: Variant,
    pub grid_row: String,
    pub grid_column: String,
    pub z_index: i32,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "visible_default")]
    pub visible: bool,
    pub data: Payload,
}

impl From<&ElementRecord> for PersistedElement {
    fn from(record: &ElementRecord) -> Self {
        Self {
            id: record.id.to_string(),
            variant: record.variant,
            grid_row: record.position.row_lines(),
            grid_column: record.position.column_lines(),
            z_index: record.z_index,
            locked: record.locked,
            visible: record.visible,
            data: record.data.clone(),
        }
    }
}

impl PersistedElement {
    fn into_insert(self) -> (Variant, InsertConfig) {
        let config = InsertConfig {
            id: Some(self.id),
            position: PositionInput::Lines {
                grid_row: Some(self.grid_row),
                grid_column: Some(self.grid_column),
            },
            z_index: Some(self.z_index),
            payload: Some(self.data),
            locked: self.locked,
            visible: Some(self.visible),
        };
        (self.variant, config)
    }
}

impl Registry {
    /// Export a slide back to front.
    pub fn snapshot_slide(&self, slide_index: usize) -> Vec<PersistedElement> {
        self.elements_on(slide_index)
            .into_iter()
            .map(PersistedElement::from)
            .collect()
    }

    /// Re-insert saved records with their ids. Records already present are
    /// reported with `already_exists` and left as they are. The whole batch
    /// is checked first: one bad record rejects it without inserting any.
    pub fn restore_slide(
        &mut self,
        slide_index: usize,
        records: Vec<PersistedElement>,
    ) -> Result<Vec<InsertOutcome>> {
        if slide_index >= self.slide_count() {
            return Err(EngineError::SlideNotFound(slide_index));
        }
        if let Some(bad) = records.iter().find(|r| r.data.variant() != r.variant) {
            log::warn!("rejecting restore of slide {slide_index}: {} has mismatched data", bad.id);
            return Err(EngineError::PayloadMismatch {
                variant: bad.variant,
                payload: bad.data.variant(),
            });
        }
        records
            .into_iter()
            .map(|saved| {
                let (variant, config) = saved.into_insert();
                self.insert(variant, slide_index, config)
            })
            .collect()
    }

    pub fn snapshot_json(&self, slide_index: usize) -> Result<String> {
        Ok(serde_json::to_string(&self.snapshot_slide(slide_index))?)
    }

    pub fn restore_json(&mut self, slide_index: usize, json: &str) -> Result<Vec<InsertOutcome>> {
        let records: Vec<PersistedElement> = serde_json::from_str(json)?;
        self.restore_slide(slide_index, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationBridge;
    use pretty_assertions::assert_eq;
    use sg_core::config::EditorConfig;
    use sg_core::grid::GridSpan;
    use sg_render::surface::MemorySurface;
    use std::sync::mpsc;

    #[test]
    fn snapshot_uses_line_strings() {
        let mut registry = Registry::new(
            &EditorConfig::default(),
            MemorySurface::new(),
            NotificationBridge::default(),
        );
        registry.add_slide("s");
        registry
            .insert(Variant::Table, 0, InsertConfig::at(GridSpan::new(6, 12, 5, 28)))
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&registry.snapshot_json(0).unwrap()).unwrap();
        assert_eq!(json[0]["type"], "table");
        assert_eq!(json[0]["gridRow"], "6/12");
        assert_eq!(json[0]["gridColumn"], "5/28");
        assert_eq!(json[0]["zIndex"], 100);
        assert_eq!(json[0]["visible"], true);
    }

    #[test]
    fn restore_into_fresh_registry_is_silent_and_exact() {
        let mut source = Registry::new(
            &EditorConfig::default(),
            MemorySurface::new(),
            NotificationBridge::default(),
        );
        source.add_slide("s");
        let text = source.insert(Variant::TextBox, 0, InsertConfig::default()).unwrap().element_id;
        source.insert(Variant::Image, 0, InsertConfig::default()).unwrap();
        source.set_locked(text, true).unwrap();
        let saved = source.snapshot_slide(0);

        let (tx, rx) = mpsc::channel();
        let mut target = Registry::new(
            &EditorConfig::default(),
            MemorySurface::new(),
            NotificationBridge::new(tx),
        );
        target.add_slide("s");
        let outcomes = target.restore_slide(0, saved.clone()).unwrap();
        assert!(outcomes.iter().all(|o| !o.already_exists));
        assert_eq!(target.snapshot_slide(0), saved);
        assert_eq!(rx.try_iter().count(), 0);

        let again = target.restore_slide(0, saved).unwrap();
        assert!(again.iter().all(|o| o.already_exists));
        assert_eq!(target.element_count(0), 2);
    }

    #[test]
    fn mismatched_record_rejects_the_whole_batch() {
        let (tx, rx) = mpsc::channel();
        let mut registry = Registry::new(
            &EditorConfig::default(),
            MemorySurface::new(),
            NotificationBridge::new(tx),
        );
        registry.add_slide("s");
        let json = r#"[
            {"id":"slide-0-a","type":"shape","gridRow":"1/3","gridColumn":"1/3","zIndex":100,"data":{"shape":{}}},
            {"id":"slide-0-b","type":"image","gridRow":"2/4","gridColumn":"2/4","zIndex":101,"data":{"chart":{}}},
            {"id":"slide-0-c","type":"shape","gridRow":"3/5","gridColumn":"3/5","zIndex":102,"data":{"shape":{}}}
        ]"#;
        let err = registry.restore_json(0, json).unwrap_err();
        assert!(matches!(
            err,
            EngineError::PayloadMismatch {
                variant: Variant::Image,
                payload: Variant::Chart
            }
        ));
        assert_eq!(registry.element_count(0), 0);
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn restore_onto_missing_slide_is_not_found() {
        let mut registry = Registry::new(
            &EditorConfig::default(),
            MemorySurface::new(),
            NotificationBridge::default(),
        );
        let err = registry.restore_slide(2, Vec::new()).unwrap_err();
        assert!(matches!(err, EngineError::SlideNotFound(2)));
    }

    #[test]
    fn malformed_lines_fall_back_to_default_span() {
        let mut registry = Registry::new(
            &EditorConfig::default(),
            MemorySurface::new(),
            NotificationBridge::default(),
        );
        registry.add_slide("s");
        let json = r#"[{"id":"slide-0-chart","type":"chart","gridRow":"nope","gridColumn":"3/9","zIndex":120,"data":{"chart":{"chartType":"line"}}}]"#;
        registry.restore_json(0, json).unwrap();

        let record = registry.get(sg_core::id::ElementId::intern("slide-0-chart")).unwrap();
        let fallback = Variant::Chart.default_span();
        assert_eq!(
            record.position,
            GridSpan::new(fallback.row_start, fallback.row_end, 3, 9)
        );
        assert_eq!(record.z_index, 120);
        assert!(record.visible);
    }
}
