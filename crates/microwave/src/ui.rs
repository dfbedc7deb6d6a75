//! The control form of the oven as plain data.
//!
//! [`Form`] holds what the user has typed and selected,
//! [`Layout`] where everything goes in the window.
//! Drawing and hit testing both go through the same layout,
//! so they always agree.

use microwave_core::Food;
use microwave_visuals::{Input, KeyCode, Rect};

/// Maximum number of characters in the cook time field.
pub const COOK_TIME_MAX_LEN: usize = 6;

/// The form widget that receives keyboard input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    /// The cook time text field.
    #[default]
    CookTime,
    /// The food selection dropdown.
    Food,
    /// The start button.
    Start,
}

impl Focus {
    /// The widget after this one in tab order.
    pub fn next(self) -> Self {
        match self {
            Focus::CookTime => Focus::Food,
            Focus::Food => Focus::Start,
            Focus::Start => Focus::CookTime,
        }
    }
}

/// What the application should do after the form handled an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormAction {
    /// Nothing beyond redrawing the form.
    None,
    /// Start cooking with the current contents of the form.
    Start,
}

/// Contents of the control form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Form {
    /// Raw text of the cook time field, validated only on start.
    pub cook_time: String,
    /// Selected food, `None` until the user picks one.
    pub food: Option<Food>,
    /// The widget keyboard input goes to.
    pub focus: Focus,
}

impl Form {
    /// Label of the selected food, empty if nothing is selected.
    pub fn food_label(&self) -> &'static str {
        self.food.map_or("", Food::name)
    }

    /// Step the food selection forward or backward,
    /// passing through the empty selection between the last and first food.
    pub fn cycle_food(&mut self, forward: bool) {
        let options: Vec<Option<Food>> = std::iter::once(None)
            .chain(Food::ALL.into_iter().map(Some))
            .collect();
        let current = options
            .iter()
            .position(|opt| *opt == self.food)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % options.len()
        } else {
            (current + options.len() - 1) % options.len()
        };
        self.food = options[next];
    }

    /// Update the form with a key press or mouse click.
    ///
    /// Resizes leave the form as it is;
    /// the caller rebuilds the [`Layout`] for them.
    pub fn handle_input(&mut self, input: &Input, layout: &Layout) -> FormAction {
        match input {
            Input::Click { x, y } => self.click(*x, *y, layout),
            Input::Key { code, text } => self.key(*code, text.as_deref()),
            Input::Resized { .. } => FormAction::None,
        }
    }

    fn click(&mut self, x: f32, y: f32, layout: &Layout) -> FormAction {
        let Some(widget) = layout.widget_at(x, y) else {
            return FormAction::None;
        };
        self.focus = widget;
        match widget {
            Focus::CookTime => FormAction::None,
            Focus::Food => {
                self.cycle_food(true);
                FormAction::None
            }
            Focus::Start => FormAction::Start,
        }
    }

    fn key(&mut self, code: KeyCode, text: Option<&str>) -> FormAction {
        match code {
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::ArrowDown => self.cycle_food(true),
            KeyCode::ArrowUp => self.cycle_food(false),
            KeyCode::Enter | KeyCode::NumpadEnter => return FormAction::Start,
            KeyCode::Space if self.focus == Focus::Start => return FormAction::Start,
            KeyCode::Backspace => {
                if self.focus == Focus::CookTime {
                    self.cook_time.pop();
                }
            }
            _ => {
                if let (Focus::CookTime, Some(text)) = (self.focus, text) {
                    for c in text.chars().filter(|c| !c.is_control()) {
                        if self.cook_time.chars().count() >= COOK_TIME_MAX_LEN {
                            break;
                        }
                        self.cook_time.push(c);
                    }
                }
            }
        }
        FormAction::None
    }
}

/// Pixel rectangles of everything drawn in the window.
///
/// The door with the countdown and the control panel share the top row,
/// the plot fills the rest of the window below them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    /// Dark panel showing the countdown.
    pub door: Rect,
    /// Background of the form.
    pub controls: Rect,
    /// Label of the cook time field.
    pub cook_time_label: Rect,
    /// The cook time text field.
    pub cook_time_field: Rect,
    /// Label of the food dropdown.
    pub food_label: Rect,
    /// The food dropdown.
    pub food_field: Rect,
    /// The start button.
    pub start_button: Rect,
    /// The status line below the button.
    pub status_line: Rect,
    /// Region of the 3D plot.
    pub plot: Rect,
}

const MARGIN: f32 = 10.;
const PADDING: f32 = 10.;
const TOP_ROW_HEIGHT: f32 = 200.;
const DOOR_WIDTH: f32 = 300.;
const ROW_HEIGHT: f32 = 34.;
const LABEL_WIDTH: f32 = 180.;
const BUTTON_WIDTH: f32 = 160.;

impl Layout {
    /// Lay out a window of the given size in physical pixels.
    pub fn new(window_width: u32, window_height: u32) -> Self {
        let (w, h) = (window_width as f32, window_height as f32);

        // the door shrinks first if the window gets narrow
        let door_width = DOOR_WIDTH.min(((w - 3. * MARGIN) / 2.).max(0.));
        let door = Rect::new(MARGIN, MARGIN, door_width, TOP_ROW_HEIGHT);
        let controls = Rect::new(
            door.right() + MARGIN,
            MARGIN,
            (w - door.right() - 2. * MARGIN).max(0.),
            TOP_ROW_HEIGHT,
        );

        let inner = controls.inset(PADDING);
        let row_y = |row: usize| inner.y + row as f32 * (ROW_HEIGHT + PADDING);
        let field_x = inner.x + LABEL_WIDTH + PADDING;
        let field_width = (inner.right() - field_x).max(0.);

        let cook_time_label = Rect::new(inner.x, row_y(0), LABEL_WIDTH, ROW_HEIGHT);
        let cook_time_field = Rect::new(field_x, row_y(0), field_width, ROW_HEIGHT);
        let food_label = Rect::new(inner.x, row_y(1), LABEL_WIDTH, ROW_HEIGHT);
        let food_field = Rect::new(field_x, row_y(1), field_width, ROW_HEIGHT);
        let button_width = BUTTON_WIDTH.min(inner.width);
        let start_button = Rect::new(
            inner.x + (inner.width - button_width) / 2.,
            row_y(2),
            button_width,
            ROW_HEIGHT,
        );
        let status_line = Rect::new(inner.x, row_y(3), inner.width, ROW_HEIGHT);

        let plot_y = MARGIN + TOP_ROW_HEIGHT + MARGIN;
        let plot = Rect::new(
            MARGIN,
            plot_y,
            (w - 2. * MARGIN).max(0.),
            (h - plot_y - MARGIN).max(0.),
        );

        Self {
            door,
            controls,
            cook_time_label,
            cook_time_field,
            food_label,
            food_field,
            start_button,
            status_line,
            plot,
        }
    }

    /// The interactive widget under a window position, if any.
    pub fn widget_at(&self, x: f32, y: f32) -> Option<Focus> {
        [
            (self.cook_time_field, Focus::CookTime),
            (self.food_field, Focus::Food),
            (self.start_button, Focus::Start),
        ]
        .into_iter()
        .find(|(rect, _)| rect.contains(x, y))
        .map(|(_, widget)| widget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, text: Option<&str>) -> Input {
        Input::Key {
            code,
            text: text.map(String::from),
        }
    }

    fn type_text(form: &mut Form, layout: &Layout, text: &str) {
        for c in text.chars() {
            let s = c.to_string();
            form.handle_input(&key(KeyCode::KeyA, Some(&s)), layout);
        }
    }

    fn click_center(form: &mut Form, layout: &Layout, rect: Rect) -> FormAction {
        let (x, y) = rect.center();
        form.handle_input(&Input::Click { x, y }, layout)
    }

    #[test]
    fn typing_edits_the_cook_time() {
        let layout = Layout::new(900, 840);
        let mut form = Form::default();
        type_text(&mut form, &layout, "12a");
        assert_eq!(form.cook_time, "12a");

        form.handle_input(&key(KeyCode::Backspace, None), &layout);
        assert_eq!(form.cook_time, "12");

        type_text(&mut form, &layout, "3456789");
        assert_eq!(form.cook_time, "123456");
        assert_eq!(form.cook_time.len(), COOK_TIME_MAX_LEN);
    }

    #[test]
    fn control_characters_are_ignored() {
        let layout = Layout::new(900, 840);
        let mut form = Form::default();
        type_text(&mut form, &layout, "5\u{8}\u{1b}");
        assert_eq!(form.cook_time, "5");
    }

    #[test]
    fn typing_only_goes_to_the_focused_field() {
        let layout = Layout::new(900, 840);
        let mut form = Form::default();
        form.handle_input(&key(KeyCode::Tab, Some("\t")), &layout);
        assert_eq!(form.focus, Focus::Food);
        type_text(&mut form, &layout, "42");
        assert_eq!(form.cook_time, "");
        form.handle_input(&key(KeyCode::Backspace, None), &layout);
        assert_eq!(form.cook_time, "");
    }

    #[test]
    fn tab_cycles_focus() {
        let layout = Layout::new(900, 840);
        let mut form = Form::default();
        let mut seen = Vec::new();
        for _ in 0..3 {
            form.handle_input(&key(KeyCode::Tab, None), &layout);
            seen.push(form.focus);
        }
        assert_eq!(seen, vec![Focus::Food, Focus::Start, Focus::CookTime]);
    }

    #[test]
    fn food_selection_passes_through_empty() {
        let layout = Layout::new(900, 840);
        let mut form = Form::default();
        assert_eq!(form.food_label(), "");

        let mut labels = Vec::new();
        for _ in 0..4 {
            form.handle_input(&key(KeyCode::ArrowDown, None), &layout);
            labels.push(form.food_label());
        }
        assert_eq!(labels, vec!["Popcorn", "Pizza", "Chicken", ""]);

        form.handle_input(&key(KeyCode::ArrowUp, None), &layout);
        assert_eq!(form.food, Some(Food::Chicken));
    }

    #[test]
    fn enter_and_the_button_request_a_start() {
        let layout = Layout::new(900, 840);
        let mut form = Form::default();
        assert_eq!(
            form.handle_input(&key(KeyCode::Enter, Some("\r")), &layout),
            FormAction::Start
        );
        // space only presses the button when it has focus
        assert_eq!(
            form.handle_input(&key(KeyCode::Space, Some(" ")), &layout),
            FormAction::None
        );
        form.focus = Focus::Start;
        assert_eq!(
            form.handle_input(&key(KeyCode::Space, Some(" ")), &layout),
            FormAction::Start
        );
        assert_eq!(
            click_center(&mut form, &layout, layout.start_button),
            FormAction::Start
        );
    }

    #[test]
    fn clicks_focus_widgets() {
        let layout = Layout::new(900, 840);
        let mut form = Form {
            focus: Focus::Start,
            ..Default::default()
        };

        click_center(&mut form, &layout, layout.cook_time_field);
        assert_eq!(form.focus, Focus::CookTime);

        let action = click_center(&mut form, &layout, layout.food_field);
        assert_eq!(action, FormAction::None);
        assert_eq!(form.focus, Focus::Food);
        assert_eq!(form.food, Some(Food::Popcorn));

        // clicking empty space changes nothing
        let before = form.clone();
        click_center(&mut form, &layout, layout.door);
        assert_eq!(form, before);
    }

    #[test]
    fn resizing_leaves_the_form_alone() {
        let layout = Layout::new(900, 840);
        let mut form = Form::default();
        type_text(&mut form, &layout, "30");
        form.handle_input(&key(KeyCode::ArrowDown, None), &layout);
        let before = form.clone();

        let action = form.handle_input(
            &Input::Resized {
                width: 400,
                height: 300,
            },
            &layout,
        );
        assert_eq!(action, FormAction::None);
        assert_eq!(form, before);
    }

    #[test]
    fn layout_fits_the_window_without_overlaps() {
        let layout = Layout::new(900, 840);
        let window = Rect::new(0., 0., 900., 840.);
        let all = [
            layout.door,
            layout.controls,
            layout.plot,
            layout.cook_time_field,
            layout.food_field,
            layout.start_button,
            layout.status_line,
        ];
        for rect in all {
            assert!(rect.width > 0. && rect.height > 0., "{rect:?}");
            assert!(rect.x >= window.x && rect.right() <= window.right(), "{rect:?}");
            assert!(rect.y >= window.y && rect.bottom() <= window.bottom(), "{rect:?}");
        }
        assert!(layout.door.right() < layout.controls.x);
        assert!(layout.controls.bottom() < layout.plot.y);
        assert!(layout.status_line.bottom() <= layout.controls.bottom());
        assert!(layout.cook_time_field.bottom() < layout.food_field.y);
    }

    #[test]
    fn tiny_windows_give_empty_rects_not_negative_ones() {
        let layout = Layout::new(10, 10);
        for rect in [layout.door, layout.controls, layout.plot, layout.status_line] {
            assert!(rect.width >= 0. && rect.height >= 0., "{rect:?}");
        }
    }
}
