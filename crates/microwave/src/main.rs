//! Microwave oven simulator.
//!
//! Type a cook time in seconds, pick a food with the dropdown
//! (click it or use the arrow keys) and press Start or Enter.
//! `Tab` moves between the form fields, `F2` changes the plot's color map
//! and `Escape` closes the window.
//!
//! Log output is controlled with `RUST_LOG` and defaults to `info`.

use std::time::Duration;

use microwave as mw;
use mw::{
    ui::{self, Focus, FormAction},
    visuals as mv,
};

const BLACK: mv::TextColor = mv::TextColor::rgb(0, 0, 0);
const DISPLAY_GREEN: mv::TextColor = mv::TextColor::rgb(0, 255, 0);
const HINT_GRAY: mv::TextColor = mv::TextColor::rgb(130, 130, 130);

/// The field stays within this range,
/// so the plot's height axis and colors are fixed to it.
const FIELD_RANGE: std::ops::Range<f64> = -1.0..1.0;

fn lin(r: f32, g: f32, b: f32) -> mv::palette::LinSrgb {
    mv::palette::Srgb::new(r, g, b).into_linear()
}

/// Everything the window shows, advanced by the window's event loop.
struct App {
    controller: mw::Controller,
    scheduler: mw::Scheduler<mw::SessionEvent>,
    form: ui::Form,
    layout: ui::Layout,
    // input arrives without a timestamp,
    // so a start is carried out on the next step
    start_requested: bool,
}

impl App {
    fn new(controller: mw::Controller, window: mv::WindowParams) -> Self {
        Self {
            controller,
            scheduler: mw::Scheduler::new(),
            form: ui::Form::default(),
            layout: ui::Layout::new(window.width as u32, window.height as u32),
            start_requested: false,
        }
    }

    fn step(&mut self, now: Duration) {
        if std::mem::take(&mut self.start_requested) {
            let started = self.controller.start(
                &self.form.cook_time,
                self.form.food_label(),
                now,
                &mut self.scheduler,
            );
            // send the user to the field that needs fixing
            match started {
                Ok(()) => {}
                Err(mw::InvalidInput::CookTime) => self.form.focus = Focus::CookTime,
                Err(mw::InvalidInput::Food) => self.form.focus = Focus::Food,
            }
        }

        for event in self.scheduler.poll(now) {
            self.controller
                .handle_event(event, now, &mut self.scheduler);
        }
    }

    fn on_input(&mut self, input: mv::Input) {
        if let mv::Input::Resized { width, height } = input {
            self.layout = ui::Layout::new(width, height);
            return;
        }
        if self.form.handle_input(&input, &self.layout) == FormAction::Start {
            self.start_requested = true;
        }
    }

    fn draw(&self, draw: &mut mv::Painter) {
        let layout = &self.layout;
        self.draw_door(draw, layout);
        self.draw_form(draw, layout);

        draw.set_plot_area(layout.plot);
        draw.set_color_map_range(FIELD_RANGE.start as f32..FIELD_RANGE.end as f32);
        if let Some(frame) = self.controller.surface() {
            draw.field_surface(frame);
        }
        draw.axes_3d(mv::AxesParams {
            extent: self.controller.animator().grid().extent(),
            z_range: FIELD_RANGE,
            title: "Microwave Electric Field Distribution",
            x_label: "X Position (m)",
            y_label: "Y Position (m)",
            z_label: "Electric Field",
            ..Default::default()
        });
    }

    /// The dark display panel with the countdown in large green digits.
    fn draw_door(&self, draw: &mut mv::Painter, layout: &ui::Layout) {
        draw.panel(layout.door, lin(0.55, 0.55, 0.55));
        let screen = layout.door.inset(6.);
        draw.panel(screen, lin(0., 0., 0.));

        let countdown = &self.controller.display().countdown;
        if !countdown.is_empty() {
            let (x, y) = screen.center();
            draw.text(mv::TextParams {
                text: countdown,
                position: mv::TextPosition::Screen(x, y),
                anchor: mv::TextAnchor::Center,
                font_size: 64.,
                line_height: 72.,
                color: DISPLAY_GREEN,
                attrs: mv::glyphon::Attrs::new().family(mv::glyphon::Family::Monospace),
                ..Default::default()
            });
        }
    }

    fn draw_form(&self, draw: &mut mv::Painter, layout: &ui::Layout) {
        draw.panel(layout.controls, lin(0.92, 0.92, 0.92));

        let label = |draw: &mut mv::Painter, rect: mv::Rect, text: &str, color| {
            draw.text(mv::TextParams {
                text,
                position: mv::TextPosition::Screen(rect.x + 8., rect.center().1),
                anchor: mv::TextAnchor::MidLeft,
                font_size: 16.,
                line_height: 22.,
                color,
                ..Default::default()
            });
        };

        label(draw, layout.cook_time_label, "Cook time (seconds):", BLACK);
        label(draw, layout.food_label, "Food type:", BLACK);

        // input fields, outlined in blue when focused
        for (rect, widget) in [
            (layout.cook_time_field, Focus::CookTime),
            (layout.food_field, Focus::Food),
        ] {
            let outline = if self.form.focus == widget {
                lin(0.2, 0.45, 0.85)
            } else {
                lin(0.6, 0.6, 0.6)
            };
            draw.panel(rect, outline);
            draw.panel(rect.inset(2.), lin(1., 1., 1.));
        }

        let cook_time = if self.form.focus == Focus::CookTime {
            format!("{}|", self.form.cook_time)
        } else {
            self.form.cook_time.clone()
        };
        label(draw, layout.cook_time_field, &cook_time, BLACK);

        match self.form.food {
            Some(food) => label(draw, layout.food_field, food.name(), BLACK),
            None => label(draw, layout.food_field, "Select...", HINT_GRAY),
        }
        draw.text(mv::TextParams {
            text: "▾",
            position: mv::TextPosition::Screen(
                layout.food_field.right() - 10.,
                layout.food_field.center().1,
            ),
            anchor: mv::TextAnchor::MidRight,
            font_size: 16.,
            line_height: 22.,
            ..Default::default()
        });

        let button = layout.start_button;
        let button_color = if self.form.focus == Focus::Start {
            lin(0.75, 0.85, 1.)
        } else {
            lin(0.82, 0.82, 0.82)
        };
        draw.panel(button, lin(0.5, 0.5, 0.5));
        draw.panel(button.inset(1.), button_color);
        let (x, y) = button.center();
        draw.text(mv::TextParams {
            text: "Start Cooking",
            position: mv::TextPosition::Screen(x, y),
            anchor: mv::TextAnchor::Center,
            font_size: 16.,
            line_height: 22.,
            ..Default::default()
        });

        // sunken status line
        draw.panel(layout.status_line, lin(0.6, 0.6, 0.6));
        draw.panel(layout.status_line.inset(1.), lin(0.97, 0.97, 0.97));
        label(
            draw,
            layout.status_line,
            &self.controller.display().status,
            BLACK,
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let controller = mw::Controller::new(mw::ControllerParams::default())?;

    let window_params = mv::WindowParams {
        title: "Microwave Simulator",
        width: 900,
        height: 840,
        ..Default::default()
    };
    let mut window = mv::RenderWindow::new(window_params)?;
    log::info!("Opening the oven window");

    window.run_animation(mv::Animation {
        params: mv::AnimationParams::default(),
        state: App::new(controller, window_params),
        step: |app, now| app.step(now),
        draw: |app, draw| app.draw(draw),
        on_input: |input, app| app.on_input(input),
    })?;

    Ok(())
}
