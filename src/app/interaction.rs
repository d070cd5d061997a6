use crate::model;
use eframe::egui;
use serde::{Deserialize, Serialize};

use super::geometry::{aspect_ratio, resize_to_pointer};
use super::render::{draw_drag_ghost, draw_field, draw_page, draw_resize_handle};
use super::{ActiveResize, FormBuilderApp, View};

/// What travels with a dragged field: its id and where inside the field the
/// pointer grabbed it, in screen pixels at drag start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(super) struct DragPayload {
    pub id: model::FieldId,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Serialized [`DragPayload`] as handed to egui's drag-and-drop slot.
#[derive(Clone, Debug)]
pub(super) struct FieldDragPayload(pub String);

const RESIZE_HANDLE_SIZE: f32 = 10.0;

/// Moves the dragged field so the grabbed point lands under the drop point.
/// Missing or unreadable payloads are logged and leave the store untouched.
pub(super) fn apply_drop(
    store: &mut model::FieldStore,
    raw: Option<&str>,
    drop_doc: egui::Pos2,
    scale: f32,
) -> bool {
    let Some(raw) = raw else {
        return false;
    };
    let payload = match serde_json::from_str::<DragPayload>(raw) {
        Ok(p) => p,
        Err(e) => {
            log::error!("Error handling drop: {e}");
            return false;
        }
    };
    let Some(field) = store.get(payload.id) else {
        log::warn!("dropped field #{} no longer exists", payload.id);
        return false;
    };
    let mut moved = field.clone();
    moved.pos = model::Point {
        x: drop_doc.x - payload.offset_x / scale,
        y: drop_doc.y - payload.offset_y / scale,
    };
    store.update(moved)
}

/// The pointer position if it lies on the part of the page that is actually
/// visible, i.e. inside both the page rect and the scroll area's clip rect.
fn drop_point(
    clip: egui::Rect,
    page: egui::Rect,
    pointer: Option<egui::Pos2>,
) -> Option<egui::Pos2> {
    pointer.filter(|p| clip.intersect(page).contains(*p))
}

fn parse_payload(raw: &str) -> Option<DragPayload> {
    serde_json::from_str(raw).ok()
}

impl FormBuilderApp {
    /// The page surface with its field layer. Must run inside a scroll area:
    /// the allocated rect already reflects scrolling, so its top-left corner
    /// is the origin for all coordinate conversion.
    pub(super) fn canvas_ui(&mut self, ui: &mut egui::Ui) {
        let page_size = self
            .pages
            .document_size(self.settings.container_width);
        let (rect, response) =
            ui.allocate_exact_size(page_size * self.view.scale, egui::Sense::click());
        let origin = rect.min;
        let painter = ui.painter_at(rect);
        let texture = self
            .pages
            .texture
            .as_ref()
            .filter(|t| t.page == self.pages.current_page)
            .map(|t| &t.handle);
        draw_page(&painter, rect, texture);

        if response.clicked() {
            self.deselect();
        }

        // egui turns ⌘/Ctrl + scroll and pinch gestures into a zoom factor.
        let zoom_delta = ui.input(|i| i.zoom_delta());
        if zoom_delta != 1.0 && response.contains_pointer() {
            let step = self.settings.zoom_step;
            self.zoom_by(if zoom_delta > 1.0 { step } else { -step });
        }

        let view = self.view;
        let page = self.pages.current_page;
        let visible: Vec<model::FieldId> = self.store.on_page(page).map(|f| f.id).collect();
        for id in visible {
            self.field_ui(ui, &painter, origin, &view, id);
        }
        self.resize_handle_ui(ui, &painter, origin, &view);
        self.drop_ui(ui, &painter, rect, origin, &view);
    }

    fn field_ui(
        &mut self,
        ui: &egui::Ui,
        painter: &egui::Painter,
        origin: egui::Pos2,
        view: &View,
        id: model::FieldId,
    ) {
        let Some(field) = self.store.get(id) else {
            return;
        };
        let screen_rect = view.field_rect_screen(origin, field);
        let primary = self.store.selected_id() == Some(id);
        let extended = self.store.is_extended(id);
        draw_field(painter, screen_rect, field, view.scale, primary, extended);

        let resp = ui.interact(
            screen_rect,
            ui.id().with(("field", id)),
            egui::Sense::click_and_drag(),
        );
        let shift = ui.input(|i| i.modifiers.shift);
        if resp.clicked() {
            self.click_field(id, shift);
        }
        if resp.drag_started() {
            if !self.store.is_extended(id) || !shift {
                self.store.select(id);
            }
            if let Some(pointer) = resp.interact_pointer_pos() {
                let offset = pointer - screen_rect.min;
                let payload = DragPayload {
                    id,
                    offset_x: offset.x,
                    offset_y: offset.y,
                };
                match serde_json::to_string(&payload) {
                    Ok(json) => egui::DragAndDrop::set_payload(ui.ctx(), FieldDragPayload(json)),
                    Err(e) => log::error!("could not encode drag payload: {e}"),
                }
            }
        }
        if resp.hovered() && !resp.dragged() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Move);
        }
    }

    fn resize_handle_ui(
        &mut self,
        ui: &egui::Ui,
        painter: &egui::Painter,
        origin: egui::Pos2,
        view: &View,
    ) {
        let Some(field) = self.store.selected() else {
            self.active_resize = None;
            return;
        };
        if field.page != self.pages.current_page {
            return;
        }
        let screen_rect = view.field_rect_screen(origin, field);
        let handle_rect = egui::Rect::from_center_size(
            screen_rect.max,
            egui::vec2(RESIZE_HANDLE_SIZE, RESIZE_HANDLE_SIZE),
        );
        draw_resize_handle(painter, handle_rect);

        let resp = ui.interact(
            handle_rect,
            ui.id().with(("resize", field.id)),
            egui::Sense::drag(),
        );
        if resp.hovered() || resp.dragged() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeNwSe);
        }
        if resp.drag_started() {
            self.active_resize = Some(ActiveResize {
                field_id: field.id,
                start_ratio: aspect_ratio(field.size),
            });
        }

        let mut replacement = None;
        if let Some(active) = self.active_resize {
            if active.field_id != field.id {
                self.active_resize = None;
            } else if resp.dragged() {
                if let Some(pointer) = resp.interact_pointer_pos() {
                    let size = resize_to_pointer(
                        field,
                        screen_rect.min,
                        pointer,
                        view.scale,
                        active.start_ratio,
                    );
                    if size != field.size {
                        let mut resized = field.clone();
                        resized.size = size;
                        replacement = Some(resized);
                    }
                }
            }
        }
        if let Some(resized) = replacement {
            self.update_field(resized);
        }
        if resp.drag_stopped() {
            self.active_resize = None;
        }
    }

    fn drop_ui(
        &mut self,
        ui: &egui::Ui,
        painter: &egui::Painter,
        rect: egui::Rect,
        origin: egui::Pos2,
        view: &View,
    ) {
        let ctx = ui.ctx();
        let Some(payload) = egui::DragAndDrop::payload::<FieldDragPayload>(ctx) else {
            return;
        };
        let pointer = ctx.input(|i| i.pointer.interact_pos());

        if let (Some(p), Some(parsed)) = (pointer, parse_payload(&payload.0)) {
            if let Some(field) = self.store.get(parsed.id) {
                let ghost_min = p - egui::vec2(parsed.offset_x, parsed.offset_y);
                let ghost = egui::Rect::from_min_size(ghost_min, field.size.to_vec2() * view.scale);
                draw_drag_ghost(painter, ghost);
            }
        }

        if !ctx.input(|i| i.pointer.any_released()) {
            return;
        }
        let Some(payload) = egui::DragAndDrop::take_payload::<FieldDragPayload>(ctx) else {
            return;
        };
        match drop_point(ui.clip_rect(), rect, pointer) {
            Some(p) => {
                let drop_doc = view.screen_to_document(origin, p);
                apply_drop(&mut self.store, Some(&payload.0), drop_doc, view.scale);
            }
            None => log::debug!("field dropped outside the visible page"),
        }
    }
}
