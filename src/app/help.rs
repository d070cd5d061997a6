use eframe::egui;

pub(super) fn draw_help_window(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("Help & Commands")
        .open(open)
        .resizable(true)
        .default_width(520.0)
        .default_height(460.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Keyboard Shortcuts");
                ui.separator();

                ui.label("General");
                help_row(ui, "⌘⇧P", "Open command palette");
                help_row(ui, "⌘O", "Open a PDF");
                help_row(ui, "F1", "Show this window");
                help_row(ui, "Escape", "Deselect");

                ui.add_space(10.0);
                ui.label("Fields");
                help_row(ui, "Delete / Backspace", "Delete selected field");
                help_row(ui, "Arrow keys", "Nudge selected field");
                help_row(ui, "Shift + Arrow keys", "Nudge faster");
                help_row(ui, "Shift + click", "Add to or remove from the distribution set");
                help_row(ui, "Drag", "Move a field");
                help_row(ui, "Corner handle", "Resize within the field's limits");

                ui.add_space(10.0);
                ui.label("View");
                help_row(ui, "⌘= / ⌘-", "Zoom in / out");
                help_row(ui, "⌘ + scroll", "Zoom over the page");
                help_row(ui, "PageUp / PageDown", "Previous / next page");

                ui.add_space(20.0);
                ui.heading("Command Palette");
                ui.separator();
                ui.label("Press ⌘⇧P to open the command palette.");
                ui.label("Type to search, use arrow keys to navigate, Enter to execute.");

                ui.add_space(20.0);
                ui.heading("Settings");
                ui.separator();
                ui.label("Settings are read from ~/.config/formplate.toml or ./settings.toml:");
                ui.add_space(5.0);
                ui.code(
                    r##"snap_to_grid = true
grid_size = 10.0
container_width = 612.0
min_scale = 0.5
max_scale = 2.0
zoom_step = 0.1
pdfium_dir = "/opt/pdfium/lib""##,
                );
                ui.add_space(5.0);
                ui.label("pdfium_dir points at the folder holding the pdfium shared library.");

                ui.add_space(20.0);
                ui.heading("Tips");
                ui.separator();
                ui.label("• Drop a PDF onto the window to open it");
                ui.label("• Fields are placed on the page currently shown");
                ui.label("• Alignment measures against the rendered page width");
                ui.label("• Distribution spreads the shift-selected fields in list order");
            });
        });
}

fn help_row(ui: &mut egui::Ui, shortcut: &str, description: &str) {
    ui.horizontal(|ui| {
        ui.add_sized(
            [130.0, 16.0],
            egui::Label::new(egui::RichText::new(shortcut).monospace().strong()),
        );
        ui.label(description);
    });
}
