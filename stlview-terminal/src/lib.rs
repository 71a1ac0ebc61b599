/// Terminal preview of STL viewer files
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use stlview_core::{
    Camera, ConnectionFlag, FrameDecision, LoadedScene, Lighting, OrbitControls, RenderLoop,
    ViewerVariant,
};
use tracing::info;

pub mod config;
pub mod renderer;
pub mod source;

pub use renderer::AsciiRenderer;
pub use source::FsSource;

/// Terminal cells are about twice as tall as they are wide
const CELL_ASPECT: u32 = 2;
/// Pixels of simulated drag per arrow key press
const KEY_DRAG_PX: f32 = 8.0;

/// Interactive preview of a loaded scene
pub struct TerminalApp {
    scene: LoadedScene,
    variant: ViewerVariant,
    camera: Camera,
    controls: OrbitControls,
    lighting: Lighting,
    renderer: AsciiRenderer,
    flag: ConnectionFlag,
    render_loop: RenderLoop,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(scene: LoadedScene, variant: ViewerVariant) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(scene, variant, width, height))
    }

    /// Build the preview for a `width` x `height` character grid
    pub fn with_size(scene: LoadedScene, variant: ViewerVariant, width: u16, height: u16) -> Self {
        let (camera, controls) =
            variant.frame(&scene.bounds, width as u32, height as u32 * CELL_ASPECT);
        let flag = ConnectionFlag::new();

        Self {
            scene,
            variant,
            camera,
            controls,
            lighting: Lighting::default(),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            render_loop: RenderLoop::new(flag.clone()),
            flag,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    /// Flag that stops the preview when cleared
    pub fn connection(&self) -> ConnectionFlag {
        self.flag.clone()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        info!(frames = self.render_loop.frames(), "Preview stopped");
        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.render_loop.is_running() {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            self.update();
            self.render()?;

            if self.render_loop.end_frame() == FrameDecision::Stop {
                break;
            }

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    /// Apply one input event
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        let height = self.renderer.height() as u32 * CELL_ASPECT;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.flag.disconnect(),
            KeyCode::Char('w') | KeyCode::Up => self.controls.rotate_by_pixels(0.0, -KEY_DRAG_PX, height),
            KeyCode::Char('s') | KeyCode::Down => self.controls.rotate_by_pixels(0.0, KEY_DRAG_PX, height),
            KeyCode::Char('a') | KeyCode::Left => self.controls.rotate_by_pixels(-KEY_DRAG_PX, 0.0, height),
            KeyCode::Char('d') | KeyCode::Right => self.controls.rotate_by_pixels(KEY_DRAG_PX, 0.0, height),
            KeyCode::Char('+') | KeyCode::Char('=') => self.controls.zoom_by_wheel(-1.0),
            KeyCode::Char('-') => self.controls.zoom_by_wheel(1.0),
            _ => {}
        }
    }

    /// Terminal resized: keep the camera's framing, change its aspect
    pub fn resize(&mut self, width: u16, height: u16) {
        self.camera.resize(width as u32, height as u32 * CELL_ASPECT);
        self.renderer.resize(width as usize, height as usize);
    }

    fn update(&mut self) {
        self.controls.update(&mut self.camera);
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();
        self.renderer.render_scene(&self.scene, &self.camera, &self.lighting);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "STL Viewer [{}] | {} models, {} triangles | FPS: {:.1} | WASD/Arrows=Rotate +/-=Zoom Q=Quit",
                self.variant.kind(),
                self.scene.objects.len(),
                self.scene.triangle_count(),
                self.fps
            )),
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
    use nalgebra::Point3;
    use stlview_core::{BoundingBox, Projection};

    fn app(variant: ViewerVariant) -> TerminalApp {
        let scene = LoadedScene {
            objects: Vec::new(),
            bounds: BoundingBox::from_corners(Point3::new(-5.0, 0.0, 0.0), Point3::new(10.0, 10.0, 10.0)),
        };
        TerminalApp::with_size(scene, variant, 80, 24)
    }

    fn press(app: &mut TerminalApp, code: KeyCode) {
        app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    #[test]
    fn test_quit_key_stops_after_current_frame() {
        let mut app = app(ViewerVariant::Turntable);
        assert_eq!(app.render_loop.end_frame(), FrameDecision::Reschedule);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.connection().is_connected());
        assert_eq!(app.render_loop.end_frame(), FrameDecision::Stop);
        assert!(!app.render_loop.is_running());
    }

    #[test]
    fn test_top_down_ignores_rotation_keys() {
        let mut app = app(ViewerVariant::TopDown { alpha_deg: 0.0 });
        let start = app.camera().position;
        press(&mut app, KeyCode::Left);
        app.update();
        assert_eq!(app.camera().position, start);
    }

    #[test]
    fn test_resize_keeps_top_down_frustum_height() {
        let mut app = app(ViewerVariant::TopDown { alpha_deg: 0.0 });
        app.resize(120, 30);
        match app.camera().projection {
            Projection::Orthographic { frustum_size, top, left, .. } => {
                assert!((frustum_size - 15.0 * 0.35).abs() < 1e-5);
                assert!((top - frustum_size / 2.0).abs() < 1e-5);
                assert!((left + frustum_size * 2.0 / 2.0).abs() < 1e-5);
            }
            _ => unreachable!(),
        }
        assert_eq!(app.renderer.width(), 120);
    }
}
