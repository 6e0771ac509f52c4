/// Terminal host for the plotview engine
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use log::{debug, info};
use nalgebra::{Point2, Point3, Vector2};
use plotview_core::{FitMode, RotationState, Scene, ViewController};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod config;
pub mod error;
pub mod renderer;
pub mod stl;

pub use config::TerminalConfig;
pub use error::AppError;
pub use renderer::AsciiRenderer;

/// Direction the first fit looks along, from above and in front.
const INITIAL_EYE: Point3<f64> = Point3::new(2.0, -3.0, 2.0);

/// Tilt off the eye to target axis, in radians. The trackball radius is the
/// on-screen eye to target distance, so a view looking straight down that
/// axis cannot be dragged around.
const INITIAL_TILT: f64 = 0.25;

/// A pointer drag in progress
#[derive(Debug, Clone, Copy)]
struct Drag {
    button: MouseButton,
    start: Point2<i32>,
    last: Point2<i32>,
}

/// Interactive terminal viewer: owns the scene, the view controller and
/// the ASCII backend, and maps keyboard and mouse input onto gestures.
pub struct TerminalApp {
    scene: Scene,
    view: ViewController,
    renderer: AsciiRenderer,
    config: TerminalConfig,
    drag: Option<Drag>,
    zoom_box: bool,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(scene: Scene, config: TerminalConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(scene, config, width, height))
    }

    /// App for a terminal of `width` x `height` cells, without touching
    /// the terminal itself.
    pub fn with_size(scene: Scene, config: TerminalConfig, width: u16, height: u16) -> Self {
        let mut view = ViewController::from_config(
            Point2::origin(),
            Vector2::new(i32::from(width), i32::from(height)),
            &config.viewer(),
        );
        view.set_eye_point(&INITIAL_EYE);
        view.set_target_point(&Point3::origin());
        view.rotate_on_display(&Point3::origin(), &RotationState::new(INITIAL_TILT, 0.0, 0.0));
        view.request_fit(FitMode::Generic);

        Self {
            scene,
            view,
            renderer: AsciiRenderer::new(usize::from(width), usize::from(height)),
            config,
            drag: None,
            zoom_box: false,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let fps = u64::from(self.config.controls.fps.max(1));
        let target_frame_time = Duration::from_millis(1000 / fps);
        info!("viewer started at {fps} fps");

        while self.running {
            let frame_start = Instant::now();

            // Drain pending input so rapid gestures land in one frame
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                self.renderer.resize(usize::from(width), usize::from(height));
                self.view.resize(i32::from(width), i32::from(height));
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        let controls = &self.config.controls;
        let (zoom, pan, turn) = (controls.zoom_factor, controls.pan_step, controls.rotate_step);
        let centre = self.view.viewport().center();

        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Up => self.pan(0, -pan),
            KeyCode::Down => self.pan(0, pan),
            KeyCode::Left => self.pan(-pan, 0),
            KeyCode::Right => self.pan(pan, 0),
            KeyCode::Char('w') => self.turn(RotationState::new(turn, 0.0, 0.0)),
            KeyCode::Char('s') => self.turn(RotationState::new(-turn, 0.0, 0.0)),
            KeyCode::Char('a') => self.turn(RotationState::new(0.0, -turn, 0.0)),
            KeyCode::Char('d') => self.turn(RotationState::new(0.0, turn, 0.0)),
            KeyCode::Char('e') => self.turn(RotationState::new(0.0, 0.0, turn)),
            KeyCode::Char('r') => self.turn(RotationState::new(0.0, 0.0, -turn)),
            KeyCode::Char('+') | KeyCode::Char('=') => self.view.zoom_about(&centre, zoom),
            KeyCode::Char('-') => self.view.zoom_about(&centre, 1.0 / zoom),
            KeyCode::Char('z') => self.zoom_box = !self.zoom_box,
            KeyCode::Char('f') => self.view.request_fit(FitMode::Generic),
            KeyCode::Char('1') => self.view.request_fit(FitMode::XyPlane),
            KeyCode::Char('2') => self.view.request_fit(FitMode::XzPlane),
            KeyCode::Char('3') => self.view.request_fit(FitMode::YzPlane),
            _ => {}
        }
    }

    fn pan(&mut self, dx: i32, dy: i32) {
        let centre = self.view.viewport().center();
        let from = Point2::new(centre.x.round() as i32, centre.y.round() as i32);
        self.view.shift(&from, &(from + Vector2::new(dx, dy)));
    }

    fn turn(&mut self, rotation: RotationState) {
        let target = self.view.target_point();
        self.view.rotate_on_display(&target, &rotation);
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let at = Point2::new(i32::from(mouse.column), i32::from(mouse.row));
        let zoom = self.config.controls.zoom_factor;

        match mouse.kind {
            MouseEventKind::Down(button) => {
                self.drag = Some(Drag {
                    button,
                    start: at,
                    last: at,
                });
            }
            MouseEventKind::Drag(_) => {
                if let Some(drag) = self.drag.as_mut() {
                    match drag.button {
                        MouseButton::Left if !self.zoom_box => self.view.arc_rotate(&drag.last, &at),
                        MouseButton::Right | MouseButton::Middle => self.view.shift(&drag.last, &at),
                        _ => {}
                    }
                    drag.last = at;
                }
            }
            MouseEventKind::Up(_) => {
                if let Some(drag) = self.drag.take() {
                    if self.zoom_box && drag.button == MouseButton::Left {
                        debug!("zoom box {:?} to {:?}", drag.start, at);
                        self.view.zoom_rect(&drag.start, &at);
                        self.zoom_box = false;
                    }
                }
            }
            MouseEventKind::ScrollUp => self.view.zoom_about(&at.cast(), zoom),
            MouseEventKind::ScrollDown => self.view.zoom_about(&at.cast(), 1.0 / zoom),
            _ => {}
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.view.paint(&self.scene, &mut self.renderer);

        // Output to terminal
        let mut stdout = stdout();
        self.renderer.present(&mut stdout)?;

        // Draw UI overlay
        let status = format!(
            "plotview | FPS: {:.1} | drag=rotate right-drag=pan wheel/+/-=zoom z=box{} f/1/2/3=fit q=quit",
            self.fps,
            if self.zoom_box { "[armed]" } else { "" }
        );
        let status: String = status.chars().take(self.renderer.width()).collect();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(status),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use plotview_core::{Mesh, SceneObject};

    fn app() -> TerminalApp {
        let scene: Scene = [SceneObject::new(Mesh::cube(2.0))].into_iter().collect();
        TerminalApp::with_size(scene, TerminalConfig::default(), 80, 24)
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_quit_key() {
        let mut app = app();
        assert!(app.is_running());
        app.handle_event(key('q'));
        assert!(!app.is_running());
    }

    #[test]
    fn test_fit_keys_request_fit() {
        let mut app = app();
        app.handle_event(key('1'));
        assert_eq!(app.view().pending_fit(), Some(FitMode::XyPlane));
        app.handle_event(key('3'));
        assert_eq!(app.view().pending_fit(), Some(FitMode::YzPlane));
    }

    #[test]
    fn test_left_drag_rotates() {
        let mut app = app();
        app.view.paint(&app.scene, &mut app.renderer);
        let before = *app.view().stack().top();

        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 40, 20));
        app.handle_event(mouse(MouseEventKind::Drag(MouseButton::Left), 50, 14));
        app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 50, 14));

        assert_ne!(*app.view().stack().top(), before);
    }

    #[test]
    fn test_zoom_box_is_one_shot() {
        let mut app = app();
        app.handle_event(key('z'));
        let before = *app.view().stack().top();

        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 10, 5));
        app.handle_event(mouse(MouseEventKind::Drag(MouseButton::Left), 30, 11));
        // the drag itself leaves the view alone
        assert_eq!(*app.view().stack().top(), before);
        app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 30, 11));

        assert_ne!(*app.view().stack().top(), before);
        assert!(!app.zoom_box);
    }

    #[test]
    fn test_first_fit_keeps_trackball_radius() {
        let mut app = app();
        app.view.paint(&app.scene, &mut app.renderer);

        let view = app.view();
        let eye = view.model_to_display(&view.eye_point());
        let target = view.model_to_display(&view.target_point());
        assert_ne!(eye, target);
    }

    #[test]
    fn test_resize_resizes_view_and_renderer() {
        let mut app = app();
        app.handle_event(Event::Resize(120, 40));

        assert_eq!(app.view().viewport().width(), 120);
        assert_eq!(app.renderer().height(), 40);
        assert!(app.view().needs_rebuild());
    }

    #[test]
    fn test_paint_draws_scene() {
        let mut app = app();
        app.view.paint(&app.scene, &mut app.renderer);

        let drawn = (0..24)
            .flat_map(|y| (0..80).map(move |x| (x, y)))
            .filter(|&(x, y)| app.renderer().cell(x, y) != Some(' '))
            .count();
        assert!(drawn > 0);
    }
}
