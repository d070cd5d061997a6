use crate::model;

use super::geometry::snap_value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum AlignEdge {
    Left,
    Center,
    Right,
}

/// Moves a field so its left/center/right edge lines up with the container's.
/// With a grid, both coordinates are snapped afterwards.
pub(super) fn align_field(
    field: &model::Field,
    edge: AlignEdge,
    container_width: f32,
    grid: Option<f32>,
) -> model::Field {
    let mut out = field.clone();
    let mut x = match edge {
        AlignEdge::Left => 0.0,
        AlignEdge::Center => (container_width - field.size.width) / 2.0,
        AlignEdge::Right => container_width - field.size.width,
    };
    let mut y = field.pos.y;
    if let Some(grid_size) = grid {
        x = snap_value(x, grid_size);
        y = snap_value(y, grid_size);
    }
    out.pos = model::Point { x, y };
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum DistributeAxis {
    Horizontal,
    Vertical,
}

/// Spreads field centres evenly between the smallest start and the largest end
/// along `axis`. Slots are handed out in the order given, not by position.
pub(super) fn distribute_fields(
    fields: &[&model::Field],
    axis: DistributeAxis,
    grid: Option<f32>,
) -> Vec<model::Field> {
    if fields.len() <= 1 {
        return Vec::new();
    }
    let extent = |f: &model::Field| match axis {
        DistributeAxis::Horizontal => (f.pos.x, f.size.width),
        DistributeAxis::Vertical => (f.pos.y, f.size.height),
    };
    let min = fields
        .iter()
        .copied()
        .map(|f| extent(f).0)
        .fold(f32::INFINITY, f32::min);
    let max = fields
        .iter()
        .copied()
        .map(|f| {
            let (start, len) = extent(f);
            start + len
        })
        .fold(f32::NEG_INFINITY, f32::max);
    let spacing = (max - min) / (fields.len() - 1) as f32;

    fields
        .iter()
        .copied()
        .enumerate()
        .map(|(i, f)| {
            let (_, len) = extent(f);
            let mut v = min + i as f32 * spacing - len / 2.0;
            if let Some(grid_size) = grid {
                v = snap_value(v, grid_size);
            }
            let mut out = f.clone();
            match axis {
                DistributeAxis::Horizontal => out.pos.x = v,
                DistributeAxis::Vertical => out.pos.y = v,
            }
            out
        })
        .collect()
}

pub(super) fn field_label(field: &model::Field) -> String {
    let label = if field.label.trim().is_empty() {
        field.field_type().title().to_string()
    } else {
        field.label.clone()
    };
    format!("{} #{} (p{})", label, field.id, field.page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, FieldStore, FieldType, Point};

    fn field_at(id: u64, x: f32, y: f32, width: f32) -> Field {
        let mut f = Field::new(id, FieldType::Text, 1);
        f.pos = Point { x, y };
        f.size.width = width;
        f
    }

    #[test]
    fn align_edges_against_container() {
        let f = field_at(1, 37.0, 55.0, 200.0);
        assert_eq!(align_field(&f, AlignEdge::Left, 600.0, None).pos.x, 0.0);
        assert_eq!(align_field(&f, AlignEdge::Center, 600.0, None).pos.x, 200.0);
        let right = align_field(&f, AlignEdge::Right, 600.0, None);
        assert_eq!(right.pos, Point { x: 400.0, y: 55.0 });
        assert_eq!(right.size, f.size);
    }

    #[test]
    fn align_with_grid_snaps_both_axes() {
        let f = field_at(1, 37.0, 55.0, 150.0);
        let out = align_field(&f, AlignEdge::Center, 612.0, Some(20.0));
        // (612 - 150) / 2 = 231
        assert_eq!(out.pos, Point { x: 240.0, y: 60.0 });
    }

    #[test]
    fn distribute_two_fields_uses_full_span() {
        let a = field_at(1, 0.0, 10.0, 100.0);
        let b = field_at(2, 300.0, 80.0, 100.0);
        let out = distribute_fields(&[&a, &b], DistributeAxis::Horizontal, None);
        // min 0, max 400, spacing 400 / 1
        assert_eq!(out[0].pos, Point { x: -50.0, y: 10.0 });
        assert_eq!(out[1].pos, Point { x: 350.0, y: 80.0 });
    }

    #[test]
    fn distribute_through_store_keeps_positions_non_negative() {
        let mut store = FieldStore::default();
        let a = store.add(FieldType::Text, 1);
        let b = store.add(FieldType::Text, 1);
        let mut fa = store.get(a).unwrap().clone();
        fa.pos = Point { x: 0.0, y: 0.0 };
        fa.size.width = 100.0;
        let mut fb = store.get(b).unwrap().clone();
        fb.pos = Point { x: 300.0, y: 0.0 };
        fb.size.width = 100.0;
        store.update_all(vec![fa, fb]);
        store.select(a);
        store.toggle_extended(b);

        let moved = distribute_fields(
            &store.extended_fields(),
            DistributeAxis::Horizontal,
            None,
        );
        assert_eq!(store.update_all(moved), 2);
        assert_eq!(store.get(a).unwrap().pos.x, 0.0);
        assert_eq!(store.get(b).unwrap().pos.x, 350.0);
        assert_eq!(store.selected_id(), Some(b));
    }

    #[test]
    fn distribute_vertical_follows_given_order() {
        let mut a = field_at(1, 5.0, 200.0, 100.0);
        a.size.height = 20.0;
        let mut b = field_at(2, 6.0, 0.0, 100.0);
        b.size.height = 20.0;
        let mut c = field_at(3, 7.0, 100.0, 100.0);
        c.size.height = 20.0;
        let out = distribute_fields(&[&a, &b, &c], DistributeAxis::Vertical, None);
        // min 0, max 220, spacing 110
        let ys: Vec<f32> = out.iter().map(|f| f.pos.y).collect();
        assert_eq!(ys, vec![-10.0, 100.0, 210.0]);
        let xs: Vec<f32> = out.iter().map(|f| f.pos.x).collect();
        assert_eq!(xs, vec![5.0, 6.0, 7.0]);
    }

    #[test]
    fn distribute_snaps_to_grid() {
        let a = field_at(1, 0.0, 0.0, 100.0);
        let b = field_at(2, 300.0, 0.0, 100.0);
        let out = distribute_fields(&[&a, &b], DistributeAxis::Horizontal, Some(64.0));
        assert_eq!(out[0].pos.x, -64.0);
        assert_eq!(out[1].pos.x, 320.0);
    }

    #[test]
    fn distribute_empty_or_single_is_noop() {
        assert!(distribute_fields(&[], DistributeAxis::Horizontal, None).is_empty());
        let a = field_at(1, 12.0, 34.0, 100.0);
        assert!(distribute_fields(&[&a], DistributeAxis::Vertical, None).is_empty());
    }

    #[test]
    fn label_falls_back_to_type_title() {
        let mut f = Field::new(7, FieldType::Radio, 3);
        assert_eq!(field_label(&f), "New radio field #7 (p3)");
        f.label.clear();
        assert_eq!(field_label(&f), "Radio Group #7 (p3)");
    }
}
