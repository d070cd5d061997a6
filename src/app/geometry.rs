use crate::model;
use eframe::egui;

/// Zoom state of the page viewer. Field geometry is stored unscaled; only
/// the on-screen projection depends on `scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct View {
    pub scale: f32,
}

impl Default for View {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl View {
    pub fn document_to_screen(&self, origin: egui::Pos2, doc: egui::Pos2) -> egui::Pos2 {
        origin + doc.to_vec2() * self.scale
    }

    pub fn screen_to_document(&self, origin: egui::Pos2, screen: egui::Pos2) -> egui::Pos2 {
        ((screen - origin) / self.scale).to_pos2()
    }

    pub fn field_rect_screen(&self, origin: egui::Pos2, field: &model::Field) -> egui::Rect {
        egui::Rect::from_min_size(
            self.document_to_screen(origin, field.pos.to_pos2()),
            field.size.to_vec2() * self.scale,
        )
    }

    /// Sets the scale, clamped to `[min, max]`. Returns true if it changed.
    pub fn set_scale(&mut self, scale: f32, min: f32, max: f32) -> bool {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let next = if scale.is_finite() {
            scale.clamp(lo, hi)
        } else {
            self.scale
        };
        // Steps of 0.1 drift in f32; keep the displayed percentage honest.
        let next = (next * 100.0).round() / 100.0;
        if (next - self.scale).abs() <= f32::EPSILON {
            return false;
        }
        self.scale = next;
        true
    }

    pub fn zoom_by(&mut self, delta: f32, min: f32, max: f32) -> bool {
        self.set_scale(self.scale + delta, min, max)
    }

    pub fn percent(&self) -> i32 {
        (self.scale * 100.0).round() as i32
    }
}

pub(super) fn snap_value(v: f32, grid_size: f32) -> f32 {
    if grid_size <= f32::EPSILON {
        return v;
    }
    (v / grid_size).round() * grid_size
}

/// Width/height ratio used by the aspect lock, if the size allows one.
pub(super) fn aspect_ratio(size: model::SizeF) -> Option<f32> {
    if size.width > f32::EPSILON && size.height > f32::EPSILON {
        Some(size.width / size.height)
    } else {
        None
    }
}

/// New size for a field whose bottom-right corner follows the pointer.
///
/// `anchor_screen` is the field's top-left corner on screen. Each dimension is
/// clamped to the field's limits. A locked aspect ratio derives the height from
/// the clamped width before the height is clamped.
pub(super) fn resize_to_pointer(
    field: &model::Field,
    anchor_screen: egui::Pos2,
    pointer_screen: egui::Pos2,
    scale: f32,
    locked_ratio: Option<f32>,
) -> model::SizeF {
    let limits = field.limits();
    let delta = (pointer_screen - anchor_screen) / scale;
    let width = limits.clamp_width(delta.x);
    let height = match locked_ratio {
        Some(ratio) if field.maintain_aspect_ratio && ratio > f32::EPSILON => {
            limits.clamp_height(width / ratio)
        }
        _ => limits.clamp_height(delta.y),
    };
    model::SizeF { width, height }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, FieldType};
    use proptest::prelude::*;

    #[test]
    fn transforms_account_for_origin_and_scale() {
        let view = View { scale: 2.0 };
        let origin = egui::pos2(40.0, 10.0);
        let screen = view.document_to_screen(origin, egui::pos2(100.0, 50.0));
        assert_eq!(screen, egui::pos2(240.0, 110.0));
        assert_eq!(
            view.screen_to_document(origin, screen),
            egui::pos2(100.0, 50.0)
        );
    }

    #[test]
    fn field_rect_scales_position_and_size() {
        let view = View { scale: 1.5 };
        let field = Field::new(1, FieldType::Number, 1);
        let r = view.field_rect_screen(egui::Pos2::ZERO, &field);
        assert_eq!(r.min, egui::pos2(150.0, 150.0));
        assert_eq!(r.size(), egui::vec2(225.0, 30.0));
    }

    #[test]
    fn scale_is_clamped_and_rounded() {
        let mut view = View::default();
        for _ in 0..30 {
            view.zoom_by(0.1, 0.5, 2.0);
        }
        assert_eq!(view.scale, 2.0);
        for _ in 0..30 {
            view.zoom_by(-0.1, 0.5, 2.0);
        }
        assert_eq!(view.scale, 0.5);
        assert!(!view.set_scale(f32::NAN, 0.5, 2.0));
        assert!(view.set_scale(1.3, 0.5, 2.0));
        assert_eq!(view.percent(), 130);
    }

    #[test]
    fn snapping_rounds_to_grid() {
        assert_eq!(snap_value(13.0, 10.0), 10.0);
        assert_eq!(snap_value(15.0, 10.0), 20.0);
        assert_eq!(snap_value(7.3, 0.0), 7.3);
    }

    #[test]
    fn resize_follows_pointer_in_document_units() {
        let field = Field::new(1, FieldType::Textarea, 1);
        let size = resize_to_pointer(
            &field,
            egui::pos2(200.0, 200.0),
            egui::pos2(800.0, 500.0),
            2.0,
            None,
        );
        assert_eq!(size, model::SizeF::new(300.0, 150.0));
    }

    #[test]
    fn resize_with_locked_ratio_derives_height() {
        let mut field = Field::new(1, FieldType::Textarea, 1);
        field.maintain_aspect_ratio = true;
        let ratio = aspect_ratio(field.size);
        assert_eq!(ratio, Some(2.5));
        let size = resize_to_pointer(
            &field,
            egui::Pos2::ZERO,
            egui::pos2(500.0, 10.0),
            1.0,
            ratio,
        );
        assert_eq!(size, model::SizeF::new(500.0, 200.0));
    }

    #[test]
    fn locked_height_is_clamped_to_limits() {
        let mut text = Field::new(1, FieldType::Text, 1);
        text.maintain_aspect_ratio = true;
        // 200 x 20 with height limits 16..120
        let size = resize_to_pointer(
            &text,
            egui::Pos2::ZERO,
            egui::pos2(-1.0e6, 50.0),
            1.0,
            aspect_ratio(text.size),
        );
        assert_eq!(size, model::SizeF::new(40.0, 16.0));

        let mut tall = Field::new(2, FieldType::Textarea, 1);
        tall.size = model::SizeF::new(100.0, 400.0);
        tall.maintain_aspect_ratio = true;
        let size = resize_to_pointer(
            &tall,
            egui::Pos2::ZERO,
            egui::pos2(1.0e6, 1.0e6),
            1.0,
            aspect_ratio(tall.size),
        );
        assert_eq!(size, model::SizeF::new(1000.0, 800.0));
    }

    #[test]
    fn ratio_is_ignored_when_lock_is_off() {
        let field = Field::new(1, FieldType::Textarea, 1);
        let size = resize_to_pointer(
            &field,
            egui::Pos2::ZERO,
            egui::pos2(500.0, 90.0),
            1.0,
            Some(2.5),
        );
        assert_eq!(size, model::SizeF::new(500.0, 90.0));
    }

    proptest! {
        #[test]
        fn document_screen_round_trip(
            scale in 0.5f32..=2.0,
            x in 0.0f32..5000.0,
            y in 0.0f32..5000.0,
            ox in -500.0f32..500.0,
            oy in -500.0f32..500.0,
        ) {
            let view = View { scale };
            let origin = egui::pos2(ox, oy);
            let back = view.screen_to_document(origin, view.document_to_screen(origin, egui::pos2(x, y)));
            prop_assert!((back.x - x).abs() <= 1e-2, "x {} -> {}", x, back.x);
            prop_assert!((back.y - y).abs() <= 1e-2, "y {} -> {}", y, back.y);
        }

        #[test]
        fn resize_stays_within_limits(
            ty in prop::sample::select(FieldType::ALL.to_vec()),
            px in -1.0e6f32..1.0e6,
            py in -1.0e6f32..1.0e6,
            scale in 0.5f32..=2.0,
            locked in any::<bool>(),
            w in 1.0f32..2000.0,
            h in 1.0f32..2000.0,
        ) {
            let mut field = Field::new(1, ty, 1);
            field.size = model::SizeF::new(w, h);
            field.maintain_aspect_ratio = locked;
            let limits = field.limits();
            let size = resize_to_pointer(&field, egui::pos2(10.0, 10.0), egui::pos2(px, py), scale, aspect_ratio(field.size));
            prop_assert!(limits.contains(size), "{:?} outside {:?}", size, limits);
        }
    }
}
