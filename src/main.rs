mod app;
mod intake;
mod model;
mod pages;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "PDF Form Builder",
        native_options,
        Box::new(|cc| Ok(Box::new(app::FormBuilderApp::new(cc)))),
    )
}
