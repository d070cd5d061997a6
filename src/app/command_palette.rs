use crate::model::FieldType;
use eframe::egui;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::FormBuilderApp;
use super::layout::{AlignEdge, DistributeAxis};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum CommandId {
    AddText,
    AddTextarea,
    AddNumber,
    AddDate,
    AddCheckbox,
    AddRadio,
    Delete,
    Deselect,
    AlignLeft,
    AlignCenter,
    AlignRight,
    DistributeH,
    DistributeV,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    PrevPage,
    NextPage,
    OpenPdf,
    ToggleSnap,
    ReloadSettings,
    ShowHelp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum CommandGroup {
    Add,
    Edit,
    Arrange,
    View,
    Page,
    File,
}

impl CommandGroup {
    fn title(self) -> &'static str {
        match self {
            Self::Add => "Add field",
            Self::Edit => "Edit",
            Self::Arrange => "Arrange",
            Self::View => "View",
            Self::Page => "Page",
            Self::File => "File",
        }
    }
}

pub(super) struct CommandSpec {
    pub id: CommandId,
    pub group: CommandGroup,
    pub label: &'static str,
    pub shortcut: Option<&'static str>,
    /// Extra words matched besides the group title and label.
    pub keywords: &'static str,
}

impl CommandSpec {
    const fn new(id: CommandId, group: CommandGroup, label: &'static str, keywords: &'static str) -> Self {
        Self {
            id,
            group,
            label,
            shortcut: None,
            keywords,
        }
    }

    const fn key(mut self, shortcut: &'static str) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    fn haystack(&self) -> String {
        format!("{} {} {}", self.group.title(), self.label, self.keywords)
    }
}

use CommandGroup as G;
use CommandId as C;

/// Listed in display order; groups are contiguous.
const COMMANDS: &[CommandSpec] = &[
    CommandSpec::new(C::AddText, G::Add, "Text field", "input"),
    CommandSpec::new(C::AddTextarea, G::Add, "Text area", "textarea multiline"),
    CommandSpec::new(C::AddNumber, G::Add, "Number", "numeric"),
    CommandSpec::new(C::AddDate, G::Add, "Date picker", "calendar"),
    CommandSpec::new(C::AddCheckbox, G::Add, "Checkbox", "check tick"),
    CommandSpec::new(C::AddRadio, G::Add, "Radio group", "options"),
    CommandSpec::new(C::Delete, G::Edit, "Delete field", "remove").key("⌫"),
    CommandSpec::new(C::Deselect, G::Edit, "Deselect", "clear selection").key("Esc"),
    CommandSpec::new(C::AlignLeft, G::Arrange, "Align left", ""),
    CommandSpec::new(C::AlignCenter, G::Arrange, "Align center", "middle"),
    CommandSpec::new(C::AlignRight, G::Arrange, "Align right", ""),
    CommandSpec::new(C::DistributeH, G::Arrange, "Distribute horizontally", "spacing"),
    CommandSpec::new(C::DistributeV, G::Arrange, "Distribute vertically", "spacing"),
    CommandSpec::new(C::ZoomIn, G::View, "Zoom in", "larger").key("⌘="),
    CommandSpec::new(C::ZoomOut, G::View, "Zoom out", "smaller").key("⌘-"),
    CommandSpec::new(C::ZoomReset, G::View, "Actual size", "zoom reset 100").key("⌘0"),
    CommandSpec::new(C::ToggleSnap, G::View, "Toggle snap to grid", "grid"),
    CommandSpec::new(C::ShowHelp, G::View, "Keyboard shortcuts", "help keys").key("F1"),
    CommandSpec::new(C::PrevPage, G::Page, "Previous page", "back").key("PgUp"),
    CommandSpec::new(C::NextPage, G::Page, "Next page", "forward").key("PgDn"),
    CommandSpec::new(C::OpenPdf, G::File, "Open PDF", "load document").key("⌘O"),
    CommandSpec::new(C::ReloadSettings, G::File, "Reload settings", "config"),
];

/// What a key press did to the open palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KeyOutcome {
    Stay,
    Close,
    Run,
}

#[derive(Default)]
pub(super) struct CommandPalette {
    pub open: bool,
    pub query: String,
    pub selected: usize,
    request_focus: bool,
}

#[derive(Clone, Copy)]
pub(super) struct CommandContext {
    pub has_selection: bool,
    pub extended_len: usize,
    pub can_zoom_in: bool,
    pub can_zoom_out: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

impl CommandPalette {
    pub fn open(&mut self, query: impl Into<String>) {
        self.open = true;
        self.query = query.into();
        self.selected = 0;
        self.request_focus = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.query.clear();
        self.selected = 0;
        self.request_focus = false;
    }

    fn is_enabled(cx: CommandContext, id: CommandId) -> bool {
        match id {
            CommandId::Delete
            | CommandId::Deselect
            | CommandId::AlignLeft
            | CommandId::AlignCenter
            | CommandId::AlignRight => cx.has_selection,
            CommandId::DistributeH | CommandId::DistributeV => cx.extended_len >= 2,
            CommandId::ZoomIn => cx.can_zoom_in,
            CommandId::ZoomOut => cx.can_zoom_out,
            CommandId::PrevPage => cx.can_go_back,
            CommandId::NextPage => cx.can_go_forward,
            _ => true,
        }
    }

    pub(super) fn execute(app: &mut FormBuilderApp, ctx: &egui::Context, id: CommandId) {
        let zoom_step = app.settings.zoom_step;
        match id {
            CommandId::AddText => app.add_field(FieldType::Text),
            CommandId::AddTextarea => app.add_field(FieldType::Textarea),
            CommandId::AddNumber => app.add_field(FieldType::Number),
            CommandId::AddDate => app.add_field(FieldType::Date),
            CommandId::AddCheckbox => app.add_field(FieldType::Checkbox),
            CommandId::AddRadio => app.add_field(FieldType::Radio),
            CommandId::Delete => app.delete_selected(),
            CommandId::Deselect => app.deselect(),
            CommandId::AlignLeft => app.align_selected(AlignEdge::Left),
            CommandId::AlignCenter => app.align_selected(AlignEdge::Center),
            CommandId::AlignRight => app.align_selected(AlignEdge::Right),
            CommandId::DistributeH => app.distribute_selected(DistributeAxis::Horizontal),
            CommandId::DistributeV => app.distribute_selected(DistributeAxis::Vertical),
            CommandId::ZoomIn => app.zoom_by(zoom_step),
            CommandId::ZoomOut => app.zoom_by(-zoom_step),
            CommandId::ZoomReset => app.reset_zoom(),
            CommandId::PrevPage => {
                let page = app.pages.current_page.saturating_sub(1);
                app.go_to_page(page);
            }
            CommandId::NextPage => {
                let page = app.pages.current_page + 1;
                app.go_to_page(page);
            }
            CommandId::OpenPdf => app.open_pdf_dialog(),
            CommandId::ToggleSnap => {
                app.settings.snap_to_grid = !app.settings.snap_to_grid;
                app.persist_settings();
            }
            CommandId::ReloadSettings => app.reload_settings(),
            CommandId::ShowHelp => app.show_help = true,
        }
        ctx.request_repaint();
    }

    /// Commands matching the query. An empty query lists everything in
    /// display order; otherwise best match first, ties kept in display order.
    fn matches(&self) -> Vec<&'static CommandSpec> {
        let query = self.query.trim();
        if query.is_empty() {
            return COMMANDS.iter().collect();
        }
        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &'static CommandSpec)> = COMMANDS
            .iter()
            .filter_map(|c| matcher.fuzzy_match(&c.haystack(), query).map(|s| (s, c)))
            .collect();
        scored.sort_by_key(|(score, _)| std::cmp::Reverse(*score));
        scored.into_iter().map(|(_, c)| c).collect()
    }

    /// Arrow keys wrap around the list.
    fn handle_key(&mut self, key: egui::Key, len: usize) -> KeyOutcome {
        match key {
            egui::Key::Escape => KeyOutcome::Close,
            egui::Key::Enter => KeyOutcome::Run,
            egui::Key::ArrowDown if len > 0 => {
                self.selected = (self.selected + 1) % len;
                KeyOutcome::Stay
            }
            egui::Key::ArrowUp if len > 0 => {
                self.selected = (self.selected + len - 1) % len;
                KeyOutcome::Stay
            }
            _ => KeyOutcome::Stay,
        }
    }

    pub fn ui(&mut self, ctx: &egui::Context, cx: CommandContext) -> Option<CommandId> {
        if !self.open {
            return None;
        }
        let matches = self.matches();
        self.selected = self.selected.min(matches.len().saturating_sub(1));

        let mut outcome = KeyOutcome::Stay;
        for key in [egui::Key::Escape, egui::Key::Enter, egui::Key::ArrowDown, egui::Key::ArrowUp] {
            if ctx.input(|i| i.key_pressed(key)) {
                outcome = self.handle_key(key, matches.len());
                if outcome != KeyOutcome::Stay {
                    break;
                }
            }
        }
        if outcome == KeyOutcome::Close {
            self.close();
            return None;
        }

        let grouped = self.query.trim().is_empty();
        let width = 480.0;
        let height = 320.0;
        let screen = ctx.content_rect();
        egui::Area::new(egui::Id::new("command_palette"))
            .fixed_pos(egui::pos2(screen.center().x - width * 0.5, screen.top() + 48.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(width);
                    let edit = ui.add(
                        egui::TextEdit::singleline(&mut self.query)
                            .desired_width(f32::INFINITY)
                            .hint_text("Type a command"),
                    );
                    if std::mem::take(&mut self.request_focus) {
                        edit.request_focus();
                    }
                    ui.separator();
                    egui::ScrollArea::vertical().max_height(height).show(ui, |ui| {
                        let mut last_group = None;
                        for (idx, spec) in matches.iter().enumerate() {
                            if grouped && last_group != Some(spec.group) {
                                last_group = Some(spec.group);
                                ui.label(egui::RichText::new(spec.group.title()).small().weak());
                            }
                            if command_row(ui, spec, grouped, idx == self.selected, cx) {
                                self.selected = idx;
                                outcome = KeyOutcome::Run;
                            }
                        }
                        if matches.is_empty() {
                            ui.weak("No matching command");
                        }
                    });
                });
            });

        let spec = matches.get(self.selected)?;
        if outcome == KeyOutcome::Run && CommandPalette::is_enabled(cx, spec.id) {
            let id = spec.id;
            self.close();
            return Some(id);
        }
        None
    }
}

/// One palette entry; returns true when clicked. Ungrouped results carry
/// their group title so "Align" and "Add" entries stay distinguishable.
fn command_row(
    ui: &mut egui::Ui,
    spec: &CommandSpec,
    grouped: bool,
    selected: bool,
    cx: CommandContext,
) -> bool {
    let text = if grouped {
        spec.label.to_string()
    } else {
        format!("{}: {}", spec.group.title(), spec.label)
    };
    let mut button = egui::Button::new(text)
        .selected(selected)
        .min_size(egui::vec2(ui.available_width(), 0.0));
    if let Some(shortcut) = spec.shortcut {
        button = button.shortcut_text(shortcut);
    }
    ui.add_enabled(CommandPalette::is_enabled(cx, spec.id), button)
        .clicked()
}
