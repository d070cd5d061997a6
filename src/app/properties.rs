use crate::model;
use eframe::egui;

use super::geometry::aspect_ratio;
use super::layout::{AlignEdge, field_label};

/// Requests from the properties panel that go beyond replacing the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum PropertyAction {
    Delete,
    Deselect,
    Align(AlignEdge),
}

#[derive(Default)]
pub(super) struct PropertiesOutcome {
    pub replacement: Option<model::Field>,
    pub action: Option<PropertyAction>,
}

pub(super) fn with_option_added(mut field: model::Field) -> model::Field {
    if let model::FieldKind::Radio { options, .. } = &mut field.kind {
        options.push(format!("Option {}", options.len() + 1));
    }
    field
}

pub(super) fn with_option_removed(mut field: model::Field, index: usize) -> model::Field {
    if let model::FieldKind::Radio {
        options,
        selected_option,
    } = &mut field.kind
    {
        if index >= options.len() {
            return field;
        }
        options.remove(index);
        *selected_option = match *selected_option {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
    }
    field
}

/// Applies a width/height edit from the panel. With the aspect lock on, the
/// edited dimension drives the other one through the current ratio.
pub(super) fn edited_size(field: &model::Field, width: f32, height: f32) -> model::SizeF {
    let limits = field.limits();
    let width = limits.clamp_width(width);
    let height = limits.clamp_height(height);
    let ratio = if field.maintain_aspect_ratio {
        aspect_ratio(field.size)
    } else {
        None
    };
    match ratio {
        Some(r) if width != field.size.width => {
            model::SizeF::new(width, limits.clamp_height(width / r))
        }
        Some(r) if height != field.size.height => {
            model::SizeF::new(limits.clamp_width(height * r), height)
        }
        _ => model::SizeF::new(width, height),
    }
}

/// Editor for the selected field. Edits go to a copy; the copy is handed back
/// whenever it differs from `field`.
pub(super) fn properties_ui(ui: &mut egui::Ui, field: &model::Field) -> PropertiesOutcome {
    let mut edited = field.clone();
    let mut outcome = PropertiesOutcome::default();

    ui.label(egui::RichText::new(field_label(field)).strong());
    ui.small(field.field_type().title());
    ui.separator();

    ui.label("Label");
    ui.text_edit_singleline(&mut edited.label);
    if field.field_type().has_placeholder() {
        ui.label("Placeholder");
        ui.text_edit_singleline(&mut edited.placeholder);
    }

    ui.separator();
    kind_editor(ui, &mut edited);

    ui.separator();
    ui.label("Position");
    ui.horizontal(|ui| {
        ui.label("X:");
        ui.add(egui::DragValue::new(&mut edited.pos.x).range(0.0..=10000.0).speed(1.0));
        ui.label("Y:");
        ui.add(egui::DragValue::new(&mut edited.pos.y).range(0.0..=10000.0).speed(1.0));
    });

    ui.label("Size");
    let limits = edited.limits();
    let mut width = edited.size.width;
    let mut height = edited.size.height;
    ui.horizontal(|ui| {
        ui.label("W:");
        ui.add(
            egui::DragValue::new(&mut width)
                .range(limits.min_width..=limits.max_width)
                .speed(1.0),
        );
        ui.label("H:");
        ui.add(
            egui::DragValue::new(&mut height)
                .range(limits.min_height..=limits.max_height)
                .speed(1.0),
        );
    });
    if width != edited.size.width || height != edited.size.height {
        edited.size = edited_size(&edited, width, height);
    }
    ui.checkbox(&mut edited.maintain_aspect_ratio, "Lock aspect ratio");
    limits_editor(ui, &mut edited);

    ui.separator();
    ui.label("Align on page");
    ui.horizontal(|ui| {
        if ui.button("Left").clicked() {
            outcome.action = Some(PropertyAction::Align(AlignEdge::Left));
        }
        if ui.button("Center").clicked() {
            outcome.action = Some(PropertyAction::Align(AlignEdge::Center));
        }
        if ui.button("Right").clicked() {
            outcome.action = Some(PropertyAction::Align(AlignEdge::Right));
        }
    });

    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Delete field").clicked() {
            outcome.action = Some(PropertyAction::Delete);
        }
        if ui.button("Deselect").clicked() {
            outcome.action = Some(PropertyAction::Deselect);
        }
    });

    if edited != *field {
        outcome.replacement = Some(edited);
    }
    outcome
}

fn kind_editor(ui: &mut egui::Ui, field: &mut model::Field) {
    let mut add_option = false;
    let mut remove_option = None;
    match &mut field.kind {
        model::FieldKind::Text => {
            ui.label("Default value");
            ui.text_edit_singleline(&mut field.value);
        }
        model::FieldKind::Textarea => {
            ui.label("Default value");
            ui.add(egui::TextEdit::multiline(&mut field.value).desired_rows(3));
        }
        model::FieldKind::Number { min, max, step } => {
            ui.label("Default value");
            ui.text_edit_singleline(&mut field.value);
            egui::Grid::new("number_props").num_columns(2).show(ui, |ui| {
                ui.label("Min");
                ui.add(egui::DragValue::new(min).speed(1.0));
                ui.end_row();
                ui.label("Max");
                ui.add(egui::DragValue::new(max).speed(1.0));
                ui.end_row();
                ui.label("Step");
                ui.add(egui::DragValue::new(step).range(0.0..=f64::MAX).speed(0.1));
                ui.end_row();
            });
        }
        model::FieldKind::Date {
            format,
            min_date,
            max_date,
        } => {
            ui.label("Default value");
            ui.text_edit_singleline(&mut field.value);
            egui::Grid::new("date_props").num_columns(2).show(ui, |ui| {
                ui.label("Format");
                ui.text_edit_singleline(format);
                ui.end_row();
                ui.label("Earliest");
                ui.text_edit_singleline(min_date);
                ui.end_row();
                ui.label("Latest");
                ui.text_edit_singleline(max_date);
                ui.end_row();
            });
        }
        model::FieldKind::Checkbox { checked } => {
            ui.checkbox(checked, "Checked by default");
        }
        model::FieldKind::Radio {
            options,
            selected_option,
        } => {
            ui.label("Options");
            for (i, option) in options.iter_mut().enumerate() {
                ui.horizontal(|ui| {
                    ui.radio_value(selected_option, Some(i), "");
                    ui.add(egui::TextEdit::singleline(option).desired_width(120.0));
                    if ui.small_button("✕").on_hover_text("Remove option").clicked() {
                        remove_option = Some(i);
                    }
                });
            }
            ui.horizontal(|ui| {
                if ui.button("Add option").clicked() {
                    add_option = true;
                }
                if ui
                    .add_enabled(selected_option.is_some(), egui::Button::new("Clear choice"))
                    .clicked()
                {
                    *selected_option = None;
                }
            });
        }
    }
    if let Some(i) = remove_option {
        *field = with_option_removed(field.clone(), i);
    } else if add_option {
        *field = with_option_added(field.clone());
    }
}

fn limits_editor(ui: &mut egui::Ui, field: &mut model::Field) {
    let mut custom = field.limits.is_some();
    if ui.checkbox(&mut custom, "Custom size limits").changed() {
        field.limits = custom.then(|| field.field_type().default_limits());
    }
    let Some(limits) = &mut field.limits else {
        return;
    };
    egui::Grid::new("limit_props").num_columns(3).show(ui, |ui| {
        ui.label("");
        ui.label("Min");
        ui.label("Max");
        ui.end_row();
        ui.label("Width");
        ui.add(egui::DragValue::new(&mut limits.min_width).range(1.0..=limits.max_width).speed(1.0));
        ui.add(egui::DragValue::new(&mut limits.max_width).range(limits.min_width..=5000.0).speed(1.0));
        ui.end_row();
        ui.label("Height");
        ui.add(egui::DragValue::new(&mut limits.min_height).range(1.0..=limits.max_height).speed(1.0));
        ui.add(egui::DragValue::new(&mut limits.max_height).range(limits.min_height..=5000.0).speed(1.0));
        ui.end_row();
    });
    let limits = *limits;
    field.size = model::SizeF::new(
        limits.clamp_width(field.size.width),
        limits.clamp_height(field.size.height),
    );
}
