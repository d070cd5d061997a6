use crate::model;
use crate::pages::{PageRasterizer, PageService, PdfiumRasterizer, RenderError, RenderTracker};
use eframe::egui;

mod actions;
mod command_palette;
mod geometry;
mod help;
mod interaction;
mod layout;
mod properties;
mod render;
mod settings;
mod update;

use geometry::View;

#[derive(Clone, Copy, Debug)]
struct ActiveResize {
    field_id: model::FieldId,
    /// Width/height ratio captured when the gesture started.
    start_ratio: Option<f32>,
}

struct PageTexture {
    handle: egui::TextureHandle,
    page: u32,
    /// Page size in document units.
    document_size: egui::Vec2,
}

/// Everything about the document being displayed, as opposed to the fields.
#[derive(Default)]
struct PageView {
    tracker: RenderTracker,
    document_name: Option<String>,
    /// Name of the document being loaded; becomes `document_name` on success.
    pending_name: Option<String>,
    page_count: Option<u32>,
    current_page: u32,
    texture: Option<PageTexture>,
    error: Option<String>,
    loading: bool,
}

impl PageView {
    fn has_document(&self) -> bool {
        self.page_count.is_some()
    }

    fn can_go_back(&self) -> bool {
        self.has_document() && self.current_page > 1
    }

    fn can_go_forward(&self) -> bool {
        self.page_count.is_some_and(|n| self.current_page < n)
    }

    /// Size of the displayed page in document units. Until the first render of
    /// a document lands, a US Letter sheet at `fallback_width` stands in.
    fn document_size(&self, fallback_width: f32) -> egui::Vec2 {
        match &self.texture {
            Some(t) => t.document_size,
            None => egui::vec2(fallback_width, fallback_width * 11.0 / 8.5),
        }
    }
}

pub struct FormBuilderApp {
    store: model::FieldStore,
    view: View,
    pages: PageView,
    page_service: PageService,
    active_resize: Option<ActiveResize>,
    settings: settings::AppSettings,
    settings_path: String,
    status: Option<String>,
    command_palette: command_palette::CommandPalette,
    show_help: bool,
}

impl FormBuilderApp {
    fn config_path() -> Option<String> {
        if let Some(home) = std::env::var_os("HOME") {
            let path = std::path::PathBuf::from(home)
                .join(".config")
                .join("formplate.toml");
            if path.exists() {
                return Some(path.display().to_string());
            }
        }
        if std::path::Path::new("settings.toml").exists() {
            return Some("settings.toml".to_string());
        }
        None
    }

    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings_path = Self::config_path().unwrap_or_else(|| "settings.toml".to_string());
        let settings = settings::load_settings(&settings_path)
            .or_else(|_| settings::load_settings("settings.json"))
            .unwrap_or_default();
        log::info!("settings: {settings_path}");

        // ⌘= and ⌘- zoom the page, not the whole UI.
        cc.egui_ctx.options_mut(|o| o.zoom_with_keyboard = false);

        let pdfium_dir = settings.pdfium_dir.clone();
        let repaint_ctx = cc.egui_ctx.clone();
        let page_service = PageService::spawn(
            Box::new(move || -> Result<Box<dyn PageRasterizer>, RenderError> {
                let rasterizer = PdfiumRasterizer::bind(pdfium_dir.as_deref())?;
                Ok(Box::new(rasterizer))
            }),
            Box::new(move || repaint_ctx.request_repaint()),
        );

        Self::from_parts(settings, settings_path, page_service)
    }

    fn from_parts(
        settings: settings::AppSettings,
        settings_path: String,
        page_service: PageService,
    ) -> Self {
        let mut view = View::default();
        view.set_scale(1.0, settings.min_scale, settings.max_scale);

        Self {
            store: model::FieldStore::default(),
            view,
            pages: PageView {
                current_page: 1,
                ..PageView::default()
            },
            page_service,
            active_resize: None,
            settings,
            settings_path,
            status: None,
            command_palette: command_palette::CommandPalette::default(),
            show_help: false,
        }
    }

    /// App state with default settings and a page service that has no engine.
    #[cfg(test)]
    fn detached() -> Self {
        let page_service = PageService::spawn(
            Box::new(|| -> Result<Box<dyn PageRasterizer>, RenderError> {
                Err(RenderError::Engine("not available in tests".to_string()))
            }),
            Box::new(|| {}),
        );
        Self::from_parts(
            settings::AppSettings::default(),
            "settings.toml".to_string(),
            page_service,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_navigation_bounds() {
        let mut pages = PageView {
            current_page: 1,
            ..PageView::default()
        };
        assert!(!pages.can_go_back());
        assert!(!pages.can_go_forward());

        pages.page_count = Some(3);
        assert!(!pages.can_go_back());
        assert!(pages.can_go_forward());

        pages.current_page = 3;
        assert!(pages.can_go_back());
        assert!(!pages.can_go_forward());
    }

    #[test]
    fn document_size_falls_back_to_letter() {
        let pages = PageView::default();
        let size = pages.document_size(612.0);
        assert_eq!(size.x, 612.0);
        assert!((size.y - 792.0).abs() < 1e-3);
    }
}
