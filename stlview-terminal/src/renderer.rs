/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point3, Vector3};
use std::io::Write;
use stlview_core::projection::project_point;
use stlview_core::{material, Camera, LoadedScene, Lighting, MaterialPreset, SceneObject, Triangle};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Lines sit slightly in front of the surfaces they outline
const LINE_DEPTH_BIAS: f32 = 2e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    character: char,
    color: material::Color,
}

const BLANK: Cell = Cell {
    character: ' ',
    color: material::Color::new(0.0, 0.0, 0.0),
};

/// ASCII renderer that converts a loaded scene to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![BLANK; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(BLANK);
    }

    /// Draw opaque surfaces, then translucent ones, then outlines
    pub fn render_scene(&mut self, scene: &LoadedScene, camera: &Camera, lighting: &Lighting) {
        let view_projection = camera.view_projection();

        for object in scene.objects.iter().filter(|o| !o.material.transparent) {
            self.render_object(object, &view_projection, lighting);
        }
        for object in scene.objects.iter().filter(|o| o.material.transparent) {
            self.render_object(object, &view_projection, lighting);
        }

        let edge_material = MaterialPreset::edge_lines();
        for object in &scene.objects {
            let mvp = view_projection * object.model_matrix();
            for [a, b] in &object.edges.segments {
                self.draw_line(a, b, &mvp, &edge_material);
            }
        }
    }

    fn render_object(&mut self, object: &SceneObject, view_projection: &Matrix4<f32>, lighting: &Lighting) {
        let model = object.model_matrix();
        let mvp = view_projection * model;
        let material = &object.material;

        for triangle in &object.mesh.triangles {
            if material.wireframe {
                for i in 0..3 {
                    let a = triangle.vertices[i].position;
                    let b = triangle.vertices[(i + 1) % 3].position;
                    self.draw_line(&a, &b, &mvp, material);
                }
            } else {
                self.render_triangle(triangle, &model, &mvp, material, lighting);
            }
        }
    }

    fn project(&self, point: &Point3<f32>, mvp: &Matrix4<f32>) -> Option<(f32, f32, f32)> {
        project_point(mvp, point, self.width as u32, self.height as u32)
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        model: &Matrix4<f32>,
        mvp: &Matrix4<f32>,
        material: &MaterialPreset,
        lighting: &Lighting,
    ) {
        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match self.project(&vertex.position, mvp) {
                Some(coords) => *slot = coords,
                None => return, // Triangle is clipped
            }
        }

        // Shade with the world-space face normal
        let normal = model.transform_vector(&triangle.calculate_normal());
        let normal = normal.try_normalize(1e-12).unwrap_or_else(Vector3::zeros);
        let shaded = lighting.shade(material, &normal);

        let brightness = shaded.luminance() * material.opacity;
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
        // Faces lit too dimly for the ramp still occlude what is behind them.
        let char_index = char_index.clamp(1, LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];

        self.rasterize_triangle(&screen_coords, character, shaded, material);
    }

    fn rasterize_triangle(
        &mut self,
        coords: &[(f32, f32, f32); 3],
        character: char,
        color: material::Color,
        material: &MaterialPreset,
    ) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box clipped to the screen
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                self.plot(x as usize, y as usize, depth, character, color, material);
            }
        }
    }

    /// Draw a 3D segment as a run of slope characters
    fn draw_line(&mut self, a: &Point3<f32>, b: &Point3<f32>, mvp: &Matrix4<f32>, material: &MaterialPreset) {
        let (Some(start), Some(end)) = (self.project(a, mvp), self.project(b, mvp)) else {
            return;
        };

        let (dx, dy) = (end.0 - start.0, end.1 - start.1);
        let character = line_char(dx, dy);
        let max_steps = 4 * (self.width + self.height);
        let steps = (dx.abs().max(dy.abs()).ceil().max(1.0) as usize).min(max_steps);

        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = start.0 + dx * t;
            let y = start.1 + dy * t;
            if x < 0.0 || y < 0.0 {
                continue;
            }
            let (x, y) = (x as usize, y as usize);
            if x >= self.width || y >= self.height {
                continue;
            }
            let depth = start.2 + (end.2 - start.2) * t - LINE_DEPTH_BIAS;
            self.plot(x, y, depth, character, material.color, material);
        }
    }

    /// Depth-tested write. Translucent fragments blend into the cell and
    /// leave the depth buffer untouched.
    fn plot(
        &mut self,
        x: usize,
        y: usize,
        depth: f32,
        character: char,
        color: material::Color,
        material: &MaterialPreset,
    ) {
        let idx = y * self.width + x;
        if depth >= self.depth_buffer[idx] {
            return;
        }

        let cell = &mut self.cells[idx];
        if material.transparent {
            let alpha = material.opacity;
            cell.color = material::Color::new(
                color.r * alpha + cell.color.r * (1.0 - alpha),
                color.g * alpha + cell.color.g * (1.0 - alpha),
                color.b * alpha + cell.color.b * (1.0 - alpha),
            );
            if cell.character == ' ' {
                cell.character = character;
            }
        } else {
            self.depth_buffer[idx] = depth;
            *cell = Cell { character, color };
        }
    }

    /// Character at a cell, for inspection
    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.cells[y * self.width + x].character
    }

    /// Number of cells holding anything but background
    pub fn covered_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.character != ' ').count()
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for row in self.cells.chunks(self.width.max(1)) {
            for cell in row {
                writer.queue(SetForegroundColor(terminal_color(cell.color)))?;
                writer.queue(Print(cell.character))?;
            }
            writer.queue(Print("\r\n"))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn terminal_color(color: material::Color) -> Color {
    let [r, g, b] = color.to_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    Color::Rgb { r, g, b }
}

/// Slope character for a screen-space direction
fn line_char(dx: f32, dy: f32) -> char {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ay <= ax * 0.4 {
        '-'
    } else if ax <= ay * 0.4 {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stlview_core::edges::{EdgeOverlay, DEFAULT_THRESHOLD_DEG};
    use stlview_core::{BoundingBox, Mesh, RenderStyle, RotationState, ViewerVariant};

    fn scene_with(style: RenderStyle) -> LoadedScene {
        let mesh = Mesh::cube(2.0);
        LoadedScene {
            bounds: mesh.bounding_box(),
            objects: vec![SceneObject {
                label: "cube".to_string(),
                edges: EdgeOverlay::from_mesh(&mesh, DEFAULT_THRESHOLD_DEG),
                mesh,
                material: MaterialPreset::select(material::Color::from_hex(0xA4D3EE), style).unwrap(),
                rotation: RotationState::zero(),
            }],
        }
    }

    fn render(scene: &LoadedScene) -> AsciiRenderer {
        // Frame a larger box so the whole cube is in view.
        let framing = BoundingBox::from_corners(Point3::new(-3.0, -3.0, -3.0), Point3::new(3.0, 3.0, 3.0));
        let (camera, _) = ViewerVariant::Turntable.frame(&framing, 80, 80);
        let mut renderer = AsciiRenderer::new(80, 40);
        renderer.render_scene(scene, &camera, &Lighting::default());
        renderer
    }

    #[test]
    fn test_barycentric_inside_and_degenerate() {
        let w = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!(w.0 > 0.0 && w.1 > 0.0 && w.2 > 0.0);
        assert!((w.0 + w.1 + w.2 - 1.0).abs() < 1e-6);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 1.0)).is_none());
    }

    #[test]
    fn test_shaded_cube_covers_center() {
        let renderer = render(&scene_with(RenderStyle::Shaded));
        assert_ne!(renderer.char_at(40, 20), ' ');
        assert_eq!(renderer.char_at(0, 0), ' ');
    }

    #[test]
    fn test_wireframe_draws_less_than_solid() {
        let solid = render(&scene_with(RenderStyle::Shaded)).covered_cells();
        let wire = render(&scene_with(RenderStyle::Wireframe)).covered_cells();
        assert!(wire > 0);
        assert!(wire < solid);
    }

    #[test]
    fn test_transparent_keeps_depth_free() {
        let mut scene = scene_with(RenderStyle::Transparent);
        scene.objects[0].edges = EdgeOverlay::default();
        let renderer = render(&scene);
        assert!(renderer.covered_cells() > 0);
        assert!(renderer.depth_buffer.iter().all(|d| *d == f32::INFINITY));
    }

    #[test]
    fn test_clear_and_resize() {
        let mut renderer = render(&scene_with(RenderStyle::Shaded));
        renderer.clear();
        assert_eq!(renderer.covered_cells(), 0);
        renderer.resize(10, 5);
        assert_eq!((renderer.width(), renderer.height()), (10, 5));
    }

    #[test]
    fn test_line_chars() {
        assert_eq!(line_char(5.0, 0.0), '-');
        assert_eq!(line_char(0.0, -5.0), '|');
        assert_eq!(line_char(3.0, 3.0), '\\');
        assert_eq!(line_char(3.0, -3.0), '/');
    }
}
