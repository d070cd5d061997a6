use crate::intake::{self, PdfSource};
use crate::model;
use crate::pages::PageEvent;
use eframe::egui;

use super::layout::{AlignEdge, DistributeAxis, align_field, distribute_fields};
use super::{FormBuilderApp, PageTexture, settings};

impl FormBuilderApp {
    pub(super) fn grid(&self) -> Option<f32> {
        self.settings
            .snap_to_grid
            .then_some(self.settings.grid_size)
    }

    /// Width that alignment measures against: the displayed page when there is
    /// one, the configured width otherwise.
    pub(super) fn container_width(&self) -> f32 {
        match &self.pages.texture {
            Some(t) => t.document_size.x,
            None => self.settings.container_width,
        }
    }

    pub(super) fn add_field(&mut self, field_type: model::FieldType) {
        let page = self.pages.current_page.max(1);
        self.store.add(field_type, page);
        self.status = None;
    }

    pub(super) fn update_field(&mut self, replacement: model::Field) {
        if !self.store.update(replacement) {
            log::debug!("update for a field that no longer exists");
        }
    }

    pub(super) fn delete_selected(&mut self) {
        let Some(id) = self.store.selected_id() else {
            return;
        };
        self.delete_field(id);
    }

    pub(super) fn delete_field(&mut self, id: model::FieldId) {
        if self.store.delete(id) {
            if self.active_resize.is_some_and(|r| r.field_id == id) {
                self.active_resize = None;
            }
            self.status = Some(format!("Deleted field #{id}"));
        }
    }

    pub(super) fn deselect(&mut self) {
        self.store.deselect();
        self.active_resize = None;
    }

    pub(super) fn click_field(&mut self, id: model::FieldId, extend: bool) {
        if extend {
            self.store.toggle_extended(id);
        } else {
            self.store.select(id);
        }
    }

    pub(super) fn align_selected(&mut self, edge: AlignEdge) {
        let Some(field) = self.store.selected() else {
            return;
        };
        let aligned = align_field(field, edge, self.container_width(), self.grid());
        self.update_field(aligned);
    }

    pub(super) fn distribute_selected(&mut self, axis: DistributeAxis) {
        let moved = distribute_fields(&self.store.extended_fields(), axis, self.grid());
        if moved.is_empty() {
            return;
        }
        let n = self.store.update_all(moved);
        self.status = Some(format!("Distributed {n} fields"));
    }

    pub(super) fn nudge_selected(&mut self, delta: egui::Vec2) {
        let Some(field) = self.store.selected() else {
            return;
        };
        let mut moved = field.clone();
        moved.pos.x += delta.x;
        moved.pos.y += delta.y;
        self.update_field(moved);
    }

    pub(super) fn zoom_by(&mut self, delta: f32) {
        let (min, max) = (self.settings.min_scale, self.settings.max_scale);
        if self.view.zoom_by(delta, min, max) {
            self.request_render();
        }
    }

    pub(super) fn reset_zoom(&mut self) {
        let (min, max) = (self.settings.min_scale, self.settings.max_scale);
        if self.view.set_scale(1.0, min, max) {
            self.request_render();
        }
    }

    pub(super) fn go_to_page(&mut self, page: u32) {
        let Some(count) = self.pages.page_count else {
            return;
        };
        let page = page.clamp(1, count.max(1));
        if page == self.pages.current_page {
            return;
        }
        self.pages.current_page = page;
        self.active_resize = None;
        self.request_render();
    }

    pub(super) fn open_pdf_dialog(&mut self) {
        if let Some(path) = intake::pick_pdf() {
            self.accept_source(intake::from_path(&path));
        }
    }

    pub(super) fn accept_dropped_files(&mut self, files: &[egui::DroppedFile]) {
        // One document at a time; the first PDF wins.
        for file in files {
            match intake::from_dropped(file) {
                Ok(None) => continue,
                other => {
                    self.accept_source(other);
                    return;
                }
            }
        }
    }

    fn accept_source(&mut self, source: Result<Option<PdfSource>, String>) {
        match source {
            Ok(Some(source)) => self.load_document(source),
            Ok(None) => {}
            Err(e) => {
                log::error!("{e}");
                self.pages.error = Some(e);
            }
        }
    }

    fn load_document(&mut self, source: PdfSource) {
        log::info!("Loading PDF file: {}", source.name);
        let generation = self.pages.tracker.next_generation();
        self.pages.loading = true;
        self.pages.pending_name = Some(source.name);
        if let Err(e) = self.page_service.load(generation, source.bytes) {
            self.pages.loading = false;
            self.pages.pending_name = None;
            self.pages.error = Some(e.to_string());
        }
    }

    pub(super) fn request_render(&mut self) {
        if !self.pages.has_document() {
            return;
        }
        let ticket = self
            .pages
            .tracker
            .issue(self.pages.current_page, self.view.scale);
        log::debug!("render requested: {ticket:?}");
        if let Err(e) = self.page_service.render(ticket) {
            self.pages.error = Some(e.to_string());
        }
    }

    pub(super) fn poll_pages(&mut self, ctx: &egui::Context) {
        for event in self.page_service.poll() {
            self.apply_page_event(ctx, event);
        }
    }

    fn apply_page_event(&mut self, ctx: &egui::Context, event: PageEvent) {
        match event {
            PageEvent::Loaded { generation, result } => {
                if generation != self.pages.tracker.generation() {
                    log::debug!("dropping load result of superseded document");
                    return;
                }
                self.pages.loading = false;
                let name = self.pages.pending_name.take();
                match result {
                    Ok(count) => {
                        log::info!("PDF loaded successfully, pages: {count}");
                        self.pages.document_name = name;
                        self.pages.page_count = Some(count);
                        self.pages.current_page = 1;
                        self.pages.texture = None;
                        self.pages.error = None;
                        self.request_render();
                    }
                    Err(e) => {
                        log::error!("{e}");
                        self.pages.error = Some(e.to_string());
                    }
                }
            }
            PageEvent::Rendered { ticket, result } => {
                if !self.pages.tracker.settle(&ticket) {
                    log::debug!("dropping stale render {ticket:?}");
                    return;
                }
                match result {
                    Ok(page) => {
                        let (w, h) = page.document_size();
                        let image = egui::ColorImage::from_rgba_unmultiplied(
                            page.pixel_size(),
                            page.image.as_raw(),
                        );
                        let handle =
                            ctx.load_texture("pdf-page", image, egui::TextureOptions::LINEAR);
                        self.pages.texture = Some(PageTexture {
                            handle,
                            page: ticket.page,
                            document_size: egui::vec2(w, h),
                        });
                        self.pages.error = None;
                        log::debug!("page {} rendered at {}", ticket.page, ticket.scale);
                    }
                    Err(e) => {
                        log::error!("{e}");
                        self.pages.error = Some(e.to_string());
                    }
                }
            }
        }
    }

    pub(super) fn persist_settings(&mut self) {
        if let Err(e) = settings::save_settings(&self.settings_path, &self.settings) {
            log::warn!("could not save settings to {}: {e}", self.settings_path);
            self.status = Some(format!("Settings save failed: {e}"));
        }
    }

    pub(super) fn reload_settings(&mut self) {
        match settings::load_settings(&self.settings_path) {
            Ok(s) => {
                self.settings = s;
                let (min, max) = (self.settings.min_scale, self.settings.max_scale);
                if self.view.set_scale(self.view.scale, min, max) {
                    self.request_render();
                }
                self.status = Some("Settings reloaded".to_string());
            }
            Err(e) => self.status = Some(format!("Settings not reloaded: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::{RenderError, RenderedPage};

    fn rendered(ticket: crate::pages::RenderTicket, w: u32, h: u32) -> PageEvent {
        PageEvent::Rendered {
            ticket,
            result: Ok(RenderedPage {
                image: image::RgbaImage::new(w, h),
                scale: ticket.scale,
            }),
        }
    }

    #[test]
    fn stale_render_leaves_texture_alone() {
        let ctx = egui::Context::default();
        let mut app = FormBuilderApp::detached();
        app.pages.page_count = Some(3);
        app.pages.tracker.next_generation();

        let old = app.pages.tracker.issue(1, 1.0);
        let shown = app.pages.tracker.issue(2, 1.0);
        app.apply_page_event(&ctx, rendered(old, 10, 10));
        assert!(app.pages.texture.is_none());

        app.apply_page_event(&ctx, rendered(shown, 612, 792));
        let texture = app.pages.texture.as_ref().map(|t| (t.page, t.document_size));
        assert_eq!(texture, Some((2, egui::vec2(612.0, 792.0))));

        let newer = app.pages.tracker.issue(3, 1.5);
        app.apply_page_event(&ctx, rendered(old, 10, 10));
        app.apply_page_event(&ctx, rendered(shown, 10, 10));
        let texture = app.pages.texture.as_ref().map(|t| (t.page, t.document_size));
        assert_eq!(texture, Some((2, egui::vec2(612.0, 792.0))));
        assert!(app.pages.tracker.is_current(&newer));
    }

    #[test]
    fn render_from_previous_document_is_dropped() {
        let ctx = egui::Context::default();
        let mut app = FormBuilderApp::detached();
        app.pages.page_count = Some(1);
        app.pages.tracker.next_generation();
        let before = app.pages.tracker.issue(1, 1.0);
        app.pages.tracker.next_generation();
        app.apply_page_event(&ctx, rendered(before, 10, 10));
        assert!(app.pages.texture.is_none());
    }

    #[test]
    fn failed_load_keeps_previous_document_name() {
        let ctx = egui::Context::default();
        let mut app = FormBuilderApp::detached();
        app.load_document(PdfSource {
            name: "lease.pdf".to_string(),
            bytes: b"%PDF-1.7".to_vec(),
        });
        let generation = app.pages.tracker.generation();
        app.apply_page_event(&ctx, PageEvent::Loaded { generation, result: Ok(2) });
        assert_eq!(app.pages.document_name.as_deref(), Some("lease.pdf"));

        app.load_document(PdfSource {
            name: "broken.pdf".to_string(),
            bytes: b"garbage".to_vec(),
        });
        assert_eq!(app.pages.document_name.as_deref(), Some("lease.pdf"));
        let generation = app.pages.tracker.generation();
        app.apply_page_event(
            &ctx,
            PageEvent::Loaded {
                generation,
                result: Err(RenderError::Load("Invalid PDF structure".to_string())),
            },
        );
        assert_eq!(app.pages.document_name.as_deref(), Some("lease.pdf"));
        assert_eq!(app.pages.page_count, Some(2));
        assert_eq!(
            app.pages.error.as_deref(),
            Some("Error loading PDF: Invalid PDF structure")
        );
        assert!(!app.pages.loading);
    }

    #[test]
    fn superseded_load_is_ignored() {
        let ctx = egui::Context::default();
        let mut app = FormBuilderApp::detached();
        app.load_document(PdfSource {
            name: "first.pdf".to_string(),
            bytes: b"%PDF".to_vec(),
        });
        let first = app.pages.tracker.generation();
        app.load_document(PdfSource {
            name: "second.pdf".to_string(),
            bytes: b"%PDF".to_vec(),
        });
        app.apply_page_event(&ctx, PageEvent::Loaded { generation: first, result: Ok(5) });
        assert_eq!(app.pages.page_count, None);
        assert!(app.pages.loading);
    }
}
