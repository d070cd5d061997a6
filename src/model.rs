use eframe::egui;

pub type FieldId = u64;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn to_pos2(self) -> egui::Pos2 {
        egui::pos2(self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SizeF {
    pub width: f32,
    pub height: f32,
}

impl SizeF {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn to_vec2(self) -> egui::Vec2 {
        egui::vec2(self.width, self.height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeLimits {
    pub min_width: f32,
    pub max_width: f32,
    pub min_height: f32,
    pub max_height: f32,
}

impl SizeLimits {
    pub fn clamp_width(&self, width: f32) -> f32 {
        clamp_or_min(width, self.min_width, self.max_width)
    }

    pub fn clamp_height(&self, height: f32) -> f32 {
        clamp_or_min(height, self.min_height, self.max_height)
    }

    pub fn contains(&self, size: SizeF) -> bool {
        (self.min_width..=self.max_width).contains(&size.width)
            && (self.min_height..=self.max_height).contains(&size.height)
    }
}

// Same as `f32::clamp` but tolerates NaN input and inverted bounds from hand-edited limits.
fn clamp_or_min(v: f32, min: f32, max: f32) -> f32 {
    if v.is_nan() {
        return min;
    }
    v.min(max).max(min)
}

/// The closed set of field types offered by the toolbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Date,
    Checkbox,
    Radio,
}

impl FieldType {
    pub const ALL: [FieldType; 6] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Number,
        FieldType::Date,
        FieldType::Checkbox,
        FieldType::Radio,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FieldType::Text => "Text Field",
            FieldType::Textarea => "Text Area",
            FieldType::Number => "Number",
            FieldType::Date => "Date Picker",
            FieldType::Checkbox => "Checkbox",
            FieldType::Radio => "Radio Group",
        }
    }

    pub fn default_size(self) -> SizeF {
        match self {
            FieldType::Text | FieldType::Date => SizeF::new(200.0, 20.0),
            FieldType::Textarea => SizeF::new(250.0, 100.0),
            FieldType::Number => SizeF::new(150.0, 20.0),
            FieldType::Checkbox | FieldType::Radio => SizeF::new(20.0, 20.0),
        }
    }

    pub fn default_limits(self) -> SizeLimits {
        match self {
            FieldType::Text | FieldType::Number | FieldType::Date => SizeLimits {
                min_width: 40.0,
                max_width: 800.0,
                min_height: 16.0,
                max_height: 120.0,
            },
            FieldType::Textarea => SizeLimits {
                min_width: 60.0,
                max_width: 1000.0,
                min_height: 40.0,
                max_height: 800.0,
            },
            FieldType::Checkbox | FieldType::Radio => SizeLimits {
                min_width: 10.0,
                max_width: 100.0,
                min_height: 10.0,
                max_height: 100.0,
            },
        }
    }

    pub fn default_kind(self) -> FieldKind {
        match self {
            FieldType::Text => FieldKind::Text,
            FieldType::Textarea => FieldKind::Textarea,
            FieldType::Number => FieldKind::Number {
                min: 0.0,
                max: 100.0,
                step: 1.0,
            },
            FieldType::Date => FieldKind::Date {
                format: "YYYY-MM-DD".to_string(),
                min_date: String::new(),
                max_date: String::new(),
            },
            FieldType::Checkbox => FieldKind::Checkbox { checked: false },
            FieldType::Radio => FieldKind::Radio {
                options: vec![
                    "Option 1".to_string(),
                    "Option 2".to_string(),
                    "Option 3".to_string(),
                ],
                selected_option: None,
            },
        }
    }

    pub fn default_placeholder(self) -> &'static str {
        match self {
            FieldType::Number => "Enter number",
            FieldType::Date => "Select date",
            FieldType::Text | FieldType::Textarea | FieldType::Checkbox | FieldType::Radio => "",
        }
    }

    pub fn has_placeholder(self) -> bool {
        matches!(
            self,
            FieldType::Text | FieldType::Textarea | FieldType::Number
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    Text,
    Textarea,
    Number {
        min: f64,
        max: f64,
        step: f64,
    },
    Date {
        format: String,
        min_date: String,
        max_date: String,
    },
    Checkbox {
        checked: bool,
    },
    Radio {
        options: Vec<String>,
        selected_option: Option<usize>,
    },
}

impl FieldKind {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Text => FieldType::Text,
            FieldKind::Textarea => FieldType::Textarea,
            FieldKind::Number { .. } => FieldType::Number,
            FieldKind::Date { .. } => FieldType::Date,
            FieldKind::Checkbox { .. } => FieldType::Checkbox,
            FieldKind::Radio { .. } => FieldType::Radio,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub id: FieldId,
    pub kind: FieldKind,
    pub pos: Point,
    pub size: SizeF,
    /// 1-based page the field is placed on.
    pub page: u32,
    pub label: String,
    pub placeholder: String,
    pub value: String,
    pub limits: Option<SizeLimits>,
    pub maintain_aspect_ratio: bool,
}

impl Field {
    pub fn new(id: FieldId, field_type: FieldType, page: u32) -> Self {
        Self {
            id,
            kind: field_type.default_kind(),
            pos: Point { x: 100.0, y: 100.0 },
            size: field_type.default_size(),
            page,
            label: format!("New {} field", field_type.name()),
            placeholder: field_type.default_placeholder().to_string(),
            value: String::new(),
            limits: None,
            maintain_aspect_ratio: false,
        }
    }

    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    pub fn limits(&self) -> SizeLimits {
        self.limits
            .unwrap_or_else(|| self.field_type().default_limits())
    }

    /// Forces position and size to be finite and non-negative.
    pub fn normalized(mut self) -> Self {
        self.pos.x = self.pos.x.max(0.0);
        self.pos.y = self.pos.y.max(0.0);
        self.size.width = self.size.width.max(0.0);
        self.size.height = self.size.height.max(0.0);
        if !self.pos.x.is_finite() {
            self.pos.x = 0.0;
        }
        if !self.pos.y.is_finite() {
            self.pos.y = 0.0;
        }
        if !self.size.width.is_finite() {
            self.size.width = self.limits().max_width;
        }
        if !self.size.height.is_finite() {
            self.size.height = self.limits().max_height;
        }
        self
    }
}

/// Owns every field record plus the selection state.
///
/// The primary selection drives the properties panel. The extended selection is
/// what distribution acts on and always contains the primary selection when
/// there is one.
#[derive(Clone, Debug)]
pub struct FieldStore {
    fields: Vec<Field>,
    selected: Option<FieldId>,
    extended: Vec<FieldId>,
    next_id: FieldId,
}

impl Default for FieldStore {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            selected: None,
            extended: Vec::new(),
            next_id: 1,
        }
    }
}

impl FieldStore {
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn on_page(&self, page: u32) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| f.page == page)
    }

    pub fn selected_id(&self) -> Option<FieldId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Field> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn is_extended(&self, id: FieldId) -> bool {
        self.extended.contains(&id)
    }

    pub fn extended_len(&self) -> usize {
        self.extended.len()
    }

    /// Extended selection in store order, not click order.
    pub fn extended_fields(&self) -> Vec<&Field> {
        self.fields
            .iter()
            .filter(|f| self.extended.contains(&f.id))
            .collect()
    }

    fn allocate_id(&mut self) -> FieldId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add(&mut self, field_type: FieldType, page: u32) -> FieldId {
        let id = self.allocate_id();
        self.fields.push(Field::new(id, field_type, page));
        self.select(id);
        log::debug!("added {} field {id} on page {page}", field_type.name());
        id
    }

    /// Replaces the field with the same id and makes it the selection.
    /// Returns false when no field has that id.
    pub fn update(&mut self, replacement: Field) -> bool {
        let id = replacement.id;
        if !self.replace(replacement) {
            return false;
        }
        if self.selected != Some(id) {
            if !self.extended.contains(&id) {
                self.extended = vec![id];
            }
            self.selected = Some(id);
        }
        true
    }

    /// Applies a batch of replacements without moving the selection.
    pub fn update_all(&mut self, replacements: Vec<Field>) -> usize {
        replacements
            .into_iter()
            .map(|f| self.replace(f))
            .filter(|replaced| *replaced)
            .count()
    }

    fn replace(&mut self, replacement: Field) -> bool {
        let Some(slot) = self.fields.iter_mut().find(|f| f.id == replacement.id) else {
            return false;
        };
        *slot = replacement.normalized();
        true
    }

    /// Removes a field. The selection is only cleared when it pointed at the
    /// removed field.
    pub fn delete(&mut self, id: FieldId) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.id != id);
        if self.fields.len() == before {
            return false;
        }
        if self.selected == Some(id) {
            self.deselect();
        } else {
            self.extended.retain(|e| *e != id);
        }
        true
    }

    pub fn select(&mut self, id: FieldId) {
        if self.get(id).is_none() {
            return;
        }
        self.selected = Some(id);
        self.extended = vec![id];
    }

    /// Shift-click behaviour: adds or removes `id` from the extended selection.
    pub fn toggle_extended(&mut self, id: FieldId) {
        if self.get(id).is_none() {
            return;
        }
        if let Some(pos) = self.extended.iter().position(|e| *e == id) {
            self.extended.remove(pos);
            if self.selected == Some(id) {
                self.selected = self.extended.last().copied();
            }
        } else {
            self.extended.push(id);
            self.selected = Some(id);
        }
    }

    pub fn deselect(&mut self) {
        self.selected = None;
        self.extended.clear();
    }
}
