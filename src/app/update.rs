use crate::model;
use eframe::egui;

use super::command_palette::{CommandContext, CommandPalette};
use super::layout::{AlignEdge, DistributeAxis, field_label};
use super::properties::{PropertyAction, properties_ui};
use super::render::{draw_error_banner, toolbox_button};
use super::FormBuilderApp;

impl eframe::App for FormBuilderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_pages(ctx);

        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() {
            self.accept_dropped_files(&dropped);
        }

        self.handle_shortcuts(ctx);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                self.menus_ui(ui);
                ui.separator();
                self.page_nav_ui(ui);
                ui.separator();
                self.zoom_ui(ui);
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.pages.loading {
                    ui.spinner();
                    ui.label("Loading PDF...");
                } else if self.pages.tracker.is_pending() {
                    ui.spinner();
                    ui.label("Rendering page...");
                } else if let Some(status) = &self.status {
                    ui.label(status);
                } else {
                    ui.label("Ready");
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Zoom: {}%", self.view.percent()));
                    ui.separator();
                    ui.label(format!("Fields: {}", self.store.len()));
                    ui.separator();
                    ui.label(format!("Distribute set: {}", self.store.extended_len()));
                    if let Some(name) = &self.pages.document_name {
                        ui.separator();
                        ui.label(name);
                    }
                });
            });
        });

        egui::SidePanel::left("toolbox")
            .resizable(false)
            .exact_width(150.0)
            .show(ctx, |ui| {
                ui.heading("Fields");
                ui.separator();
                for field_type in model::FieldType::ALL {
                    if toolbox_button(ui, field_type) {
                        self.add_field(field_type);
                    }
                }
                ui.separator();
                ui.label(format!("Page {}", self.pages.current_page));
                if self.store.is_empty() {
                    ui.small("No fields yet.");
                }
                let on_page: Vec<(model::FieldId, String)> = self
                    .store
                    .on_page(self.pages.current_page)
                    .map(|f| (f.id, field_label(f)))
                    .collect();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for (id, label) in on_page {
                        let selected = self.store.selected_id() == Some(id);
                        if ui.selectable_label(selected, label).clicked() {
                            let shift = ui.input(|i| i.modifiers.shift);
                            self.click_field(id, shift);
                        }
                    }
                });
            });

        egui::SidePanel::right("right_panel")
            .resizable(true)
            .min_width(240.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.heading("Properties");
                    ui.separator();
                    self.properties_panel_ui(ui);

                    ui.add_space(12.0);
                    ui.heading("Arrange");
                    ui.separator();
                    self.arrange_ui(ui);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let panel_rect = ui.max_rect();
            egui::ScrollArea::both()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.canvas_ui(ui);
                });
            if let Some(err) = &self.pages.error {
                draw_error_banner(ui, panel_rect, err);
            }
        });

        let cx = CommandContext {
            has_selection: self.store.selected_id().is_some(),
            extended_len: self.store.extended_len(),
            can_zoom_in: self.view.scale < self.settings.max_scale,
            can_zoom_out: self.view.scale > self.settings.min_scale,
            can_go_back: self.pages.can_go_back(),
            can_go_forward: self.pages.can_go_forward(),
        };
        if let Some(cmd) = self.command_palette.ui(ctx, cx) {
            CommandPalette::execute(self, ctx, cmd);
        }

        super::help::draw_help_window(ctx, &mut self.show_help);
    }
}

impl FormBuilderApp {
    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let wants_keyboard = ctx.wants_keyboard_input();
        let mut open_dialog = false;
        ctx.input_mut(|i| {
            if !self.command_palette.open
                && i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::P)
            {
                self.command_palette.open("");
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::O) {
                open_dialog = true;
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::F1) {
                self.show_help = true;
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::Equals)
                || i.consume_key(egui::Modifiers::COMMAND, egui::Key::Plus)
            {
                self.zoom_by(self.settings.zoom_step);
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::Minus) {
                self.zoom_by(-self.settings.zoom_step);
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::Num0) {
                self.reset_zoom();
            }

            if wants_keyboard || self.command_palette.open {
                return;
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::Escape) {
                self.deselect();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::Delete)
                || i.consume_key(egui::Modifiers::NONE, egui::Key::Backspace)
            {
                self.delete_selected();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::PageUp) {
                self.go_to_page(self.pages.current_page.saturating_sub(1));
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::PageDown) {
                self.go_to_page(self.pages.current_page + 1);
            }

            let step = if i.modifiers.shift {
                self.settings.nudge_step_fast
            } else {
                self.settings.nudge_step
            };
            let arrows = [
                (egui::Key::ArrowLeft, egui::vec2(-step, 0.0)),
                (egui::Key::ArrowRight, egui::vec2(step, 0.0)),
                (egui::Key::ArrowUp, egui::vec2(0.0, -step)),
                (egui::Key::ArrowDown, egui::vec2(0.0, step)),
            ];
            for (key, delta) in arrows {
                if i.consume_key(egui::Modifiers::NONE, key)
                    || i.consume_key(egui::Modifiers::SHIFT, key)
                {
                    self.nudge_selected(delta);
                }
            }
        });
        // The native dialog blocks, so it runs outside the input lock.
        if open_dialog {
            self.open_pdf_dialog();
        }
    }

    fn menus_ui(&mut self, ui: &mut egui::Ui) {
        ui.menu_button("File", |ui| {
            if ui.button("Open PDF... (⌘O)").clicked() {
                self.open_pdf_dialog();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Reload settings").clicked() {
                self.reload_settings();
                ui.close_menu();
            }
            ui.small(format!("Settings: {}", self.settings_path));
        });
        ui.menu_button("Edit", |ui| {
            let has_selection = self.store.selected_id().is_some();
            if ui
                .add_enabled(has_selection, egui::Button::new("Delete field (⌫)"))
                .clicked()
            {
                self.delete_selected();
                ui.close_menu();
            }
            if ui
                .add_enabled(has_selection, egui::Button::new("Deselect (Esc)"))
                .clicked()
            {
                self.deselect();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Command palette (⌘⇧P)").clicked() {
                self.command_palette.open("");
                ui.close_menu();
            }
        });
        ui.menu_button("View", |ui| {
            if ui.button("Zoom in (⌘=)").clicked() {
                self.zoom_by(self.settings.zoom_step);
                ui.close_menu();
            }
            if ui.button("Zoom out (⌘-)").clicked() {
                self.zoom_by(-self.settings.zoom_step);
                ui.close_menu();
            }
            if ui.button("Actual size (⌘0)").clicked() {
                self.reset_zoom();
                ui.close_menu();
            }
            ui.separator();
            if ui
                .checkbox(&mut self.settings.snap_to_grid, "Snap to grid")
                .changed()
            {
                self.persist_settings();
            }
            ui.horizontal(|ui| {
                ui.label("Grid:");
                if ui
                    .add(
                        egui::DragValue::new(&mut self.settings.grid_size)
                            .range(1.0..=100.0)
                            .speed(1.0),
                    )
                    .changed()
                {
                    self.persist_settings();
                }
            });
            ui.separator();
            if ui.button("Help (F1)").clicked() {
                self.show_help = true;
                ui.close_menu();
            }
        });
    }

    fn page_nav_ui(&mut self, ui: &mut egui::Ui) {
        if ui
            .add_enabled(self.pages.can_go_back(), egui::Button::new("◀"))
            .on_hover_text("Previous page")
            .clicked()
        {
            self.go_to_page(self.pages.current_page.saturating_sub(1));
        }
        match self.pages.page_count {
            Some(count) => ui.label(format!("Page {} of {}", self.pages.current_page, count)),
            None => ui.label("No document"),
        };
        if ui
            .add_enabled(self.pages.can_go_forward(), egui::Button::new("▶"))
            .on_hover_text("Next page")
            .clicked()
        {
            self.go_to_page(self.pages.current_page + 1);
        }
    }

    fn zoom_ui(&mut self, ui: &mut egui::Ui) {
        let step = self.settings.zoom_step;
        if ui
            .add_enabled(self.view.scale > self.settings.min_scale, egui::Button::new("−"))
            .on_hover_text("Zoom out")
            .clicked()
        {
            self.zoom_by(-step);
        }
        if ui
            .button(format!("{}%", self.view.percent()))
            .on_hover_text("Reset to 100%")
            .clicked()
        {
            self.reset_zoom();
        }
        if ui
            .add_enabled(self.view.scale < self.settings.max_scale, egui::Button::new("+"))
            .on_hover_text("Zoom in")
            .clicked()
        {
            self.zoom_by(step);
        }
    }

    fn properties_panel_ui(&mut self, ui: &mut egui::Ui) {
        let Some(field) = self.store.selected() else {
            ui.label("Select a field to edit its properties.");
            return;
        };
        let outcome = properties_ui(ui, field);
        if let Some(replacement) = outcome.replacement {
            self.update_field(replacement);
        }
        match outcome.action {
            Some(PropertyAction::Delete) => self.delete_selected(),
            Some(PropertyAction::Deselect) => self.deselect(),
            Some(PropertyAction::Align(edge)) => self.align_selected(edge),
            None => {}
        }
    }

    fn arrange_ui(&mut self, ui: &mut egui::Ui) {
        let has_selection = self.store.selected_id().is_some();
        ui.horizontal(|ui| {
            for (label, edge) in [
                ("Left", AlignEdge::Left),
                ("Center", AlignEdge::Center),
                ("Right", AlignEdge::Right),
            ] {
                if ui.add_enabled(has_selection, egui::Button::new(label)).clicked() {
                    self.align_selected(edge);
                }
            }
        });
        let can_distribute = self.store.extended_len() >= 2;
        ui.horizontal(|ui| {
            if ui
                .add_enabled(can_distribute, egui::Button::new("Distribute ↔"))
                .clicked()
            {
                self.distribute_selected(DistributeAxis::Horizontal);
            }
            if ui
                .add_enabled(can_distribute, egui::Button::new("Distribute ↕"))
                .clicked()
            {
                self.distribute_selected(DistributeAxis::Vertical);
            }
        });
        ui.small("Shift-click fields to build the distribution set.");
    }
}
