use crate::model;
use eframe::egui;

const SELECTED_COLOR: egui::Color32 = egui::Color32::from_rgb(90, 160, 255);
const EXTENDED_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 170, 60);
const FIELD_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(188, 194, 204, 200);
const FIELD_STROKE: egui::Color32 = egui::Color32::from_rgb(120, 130, 150);
const HINT_COLOR: egui::Color32 = egui::Color32::from_gray(140);
const INK_COLOR: egui::Color32 = egui::Color32::from_gray(30);

/// Toolbox entry for adding a field of `field_type`.
pub(super) fn toolbox_button(ui: &mut egui::Ui, field_type: model::FieldType) -> bool {
    ui.add_sized(
        [ui.available_width(), 24.0],
        egui::Button::new(field_type.title()),
    )
    .on_hover_text(format!("Add a {} field to the current page", field_type.name()))
    .clicked()
}

/// The page raster, or a blank sheet while nothing is rendered.
pub(super) fn draw_page(
    painter: &egui::Painter,
    rect: egui::Rect,
    texture: Option<&egui::TextureHandle>,
) {
    painter.rect_filled(rect, 0.0, egui::Color32::WHITE);
    if let Some(texture) = texture {
        painter.image(
            texture.id(),
            rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    } else {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "Open or drop a PDF to start",
            egui::FontId::proportional(16.0),
            HINT_COLOR,
        );
    }
    painter.rect_stroke(
        rect,
        0.0,
        egui::Stroke::new(1.0, egui::Color32::from_gray(90)),
        egui::StrokeKind::Outside,
    );
}

pub(super) fn draw_field(
    painter: &egui::Painter,
    rect: egui::Rect,
    field: &model::Field,
    scale: f32,
    is_primary: bool,
    is_extended: bool,
) {
    let font = egui::FontId::proportional((12.0 * scale).max(6.0));
    let pad = 4.0 * scale;
    let stroke = egui::Stroke::new(1.0, FIELD_STROKE);

    match &field.kind {
        model::FieldKind::Text | model::FieldKind::Number { .. } => {
            painter.rect(rect, 2.0, FIELD_FILL, stroke, egui::StrokeKind::Inside);
            draw_value_or_hint(painter, rect, pad, field, font.clone(), egui::Align2::LEFT_CENTER);
            if let model::FieldKind::Number { .. } = field.kind {
                draw_spinner(painter, rect, scale);
            }
        }
        model::FieldKind::Textarea => {
            painter.rect(rect, 2.0, FIELD_FILL, stroke, egui::StrokeKind::Inside);
            draw_value_or_hint(painter, rect, pad, field, font.clone(), egui::Align2::LEFT_TOP);
        }
        model::FieldKind::Date { format, .. } => {
            painter.rect(rect, 2.0, FIELD_FILL, stroke, egui::StrokeKind::Inside);
            let shown = if field.value.is_empty() {
                (format.as_str(), HINT_COLOR)
            } else {
                (field.value.as_str(), INK_COLOR)
            };
            painter.with_clip_rect(rect).text(
                egui::pos2(rect.left() + pad, rect.center().y),
                egui::Align2::LEFT_CENTER,
                shown.0,
                font.clone(),
                shown.1,
            );
            draw_calendar_glyph(painter, rect, scale);
        }
        model::FieldKind::Checkbox { checked } => {
            let side = rect.width().min(rect.height());
            let bx = egui::Rect::from_min_size(rect.min, egui::vec2(side, side));
            painter.rect(bx, 2.0, egui::Color32::WHITE, stroke, egui::StrokeKind::Inside);
            if *checked {
                let s = bx.shrink(side * 0.2);
                painter.add(egui::Shape::line(
                    vec![
                        egui::pos2(s.left(), s.center().y),
                        egui::pos2(s.left() + s.width() * 0.4, s.bottom()),
                        egui::pos2(s.right(), s.top()),
                    ],
                    egui::Stroke::new((2.0 * scale).max(1.0), INK_COLOR),
                ));
            }
        }
        model::FieldKind::Radio {
            options,
            selected_option,
        } => {
            painter.rect_stroke(
                rect,
                2.0,
                egui::Stroke::new(1.0, FIELD_STROKE.gamma_multiply(0.5)),
                egui::StrokeKind::Inside,
            );
            let row = (16.0 * scale).max(8.0);
            let radius = (row * 0.35).max(3.0);
            let clipped = painter.with_clip_rect(rect);
            for (i, option) in options.iter().enumerate() {
                let cy = rect.top() + row * (i as f32 + 0.5);
                if cy - radius > rect.bottom() {
                    break;
                }
                let center = egui::pos2(rect.left() + radius + 2.0, cy);
                clipped.circle(center, radius, egui::Color32::WHITE, stroke);
                if *selected_option == Some(i) {
                    clipped.circle_filled(center, radius * 0.5, INK_COLOR);
                }
                clipped.text(
                    egui::pos2(center.x + radius + pad, cy),
                    egui::Align2::LEFT_CENTER,
                    option,
                    font.clone(),
                    INK_COLOR,
                );
            }
        }
    }

    if !field.label.is_empty() {
        painter.text(
            rect.left_top() - egui::vec2(0.0, 2.0),
            egui::Align2::LEFT_BOTTOM,
            &field.label,
            egui::FontId::proportional((10.0 * scale).max(6.0)),
            egui::Color32::from_gray(70),
        );
    }

    if is_primary {
        draw_selection_bounds(painter, rect.expand(2.0), SELECTED_COLOR);
    } else if is_extended {
        draw_selection_bounds(painter, rect.expand(2.0), EXTENDED_COLOR);
    }
}

fn draw_value_or_hint(
    painter: &egui::Painter,
    rect: egui::Rect,
    pad: f32,
    field: &model::Field,
    font: egui::FontId,
    align: egui::Align2,
) {
    let (text, color) = if field.value.is_empty() {
        (field.placeholder.as_str(), HINT_COLOR)
    } else {
        (field.value.as_str(), INK_COLOR)
    };
    if text.is_empty() {
        return;
    }
    let anchor = if align == egui::Align2::LEFT_TOP {
        rect.left_top() + egui::vec2(pad, pad)
    } else {
        egui::pos2(rect.left() + pad, rect.center().y)
    };
    painter
        .with_clip_rect(rect.shrink(1.0))
        .text(anchor, align, text, font, color);
}

fn draw_spinner(painter: &egui::Painter, rect: egui::Rect, scale: f32) {
    let w = (10.0 * scale).min(rect.width() * 0.3);
    let x = rect.right() - w * 0.5 - 2.0;
    let h = rect.height() * 0.2;
    let color = FIELD_STROKE;
    let top = rect.center().y - 1.0;
    let bottom = rect.center().y + 1.0;
    painter.add(egui::Shape::convex_polygon(
        vec![
            egui::pos2(x, top - h),
            egui::pos2(x + w * 0.35, top),
            egui::pos2(x - w * 0.35, top),
        ],
        color,
        egui::Stroke::NONE,
    ));
    painter.add(egui::Shape::convex_polygon(
        vec![
            egui::pos2(x - w * 0.35, bottom),
            egui::pos2(x + w * 0.35, bottom),
            egui::pos2(x, bottom + h),
        ],
        color,
        egui::Stroke::NONE,
    ));
}

fn draw_calendar_glyph(painter: &egui::Painter, rect: egui::Rect, scale: f32) {
    let side = (rect.height() * 0.6).min(12.0 * scale);
    let glyph = egui::Rect::from_center_size(
        egui::pos2(rect.right() - side * 0.5 - 4.0 * scale, rect.center().y),
        egui::vec2(side, side),
    );
    let stroke = egui::Stroke::new(1.0, FIELD_STROKE);
    painter.rect_stroke(glyph, 1.0, stroke, egui::StrokeKind::Inside);
    let bar = glyph.top() + side * 0.3;
    painter.line_segment([egui::pos2(glyph.left(), bar), egui::pos2(glyph.right(), bar)], stroke);
}

fn draw_selection_bounds(painter: &egui::Painter, rect: egui::Rect, color: egui::Color32) {
    painter.rect_stroke(
        rect,
        2.0,
        egui::Stroke::new(1.5, color),
        egui::StrokeKind::Middle,
    );
}

pub(super) fn draw_resize_handle(painter: &egui::Painter, rect: egui::Rect) {
    painter.rect(
        rect,
        1.0,
        egui::Color32::WHITE,
        egui::Stroke::new(1.0, SELECTED_COLOR),
        egui::StrokeKind::Middle,
    );
}

pub(super) fn draw_drag_ghost(painter: &egui::Painter, rect: egui::Rect) {
    painter.rect(
        rect,
        2.0,
        SELECTED_COLOR.gamma_multiply(0.25),
        egui::Stroke::new(1.0, SELECTED_COLOR.gamma_multiply(0.8)),
        egui::StrokeKind::Middle,
    );
}

/// Error slot shown over the top of the canvas.
pub(super) fn draw_error_banner(ui: &egui::Ui, rect: egui::Rect, message: &str) {
    let banner = egui::Rect::from_min_size(
        rect.left_top() + egui::vec2(12.0, 12.0),
        egui::vec2((rect.width() - 24.0).max(120.0), 28.0),
    );
    let painter = ui.painter_at(rect);
    painter.rect_filled(banner, 6.0, egui::Color32::from_rgba_unmultiplied(120, 20, 20, 230));
    painter.text(
        egui::pos2(banner.left() + 10.0, banner.center().y),
        egui::Align2::LEFT_CENTER,
        message,
        egui::FontId::proportional(14.0),
        egui::Color32::WHITE,
    );
}
