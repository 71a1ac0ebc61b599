/// WebGL2 scene renderer
use nalgebra::Matrix4;
use stlview_core::{Camera, LoadedScene, Lighting, MaterialPreset, Shading, ViewerError};
use tracing::debug;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::fetch::js_reason;

const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;

uniform mat4 u_mvp;
uniform mat4 u_model;

out vec3 v_normal;

void main() {
    v_normal = mat3(u_model) * a_normal;
    gl_Position = u_mvp * vec4(a_position, 1.0);
}
"#;

// Hemisphere plus ambient, matching `Lighting::shade`.
const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;

in vec3 v_normal;

uniform vec3 u_color;
uniform float u_opacity;
uniform bool u_lit;
uniform vec3 u_sky;
uniform vec3 u_ground;
uniform vec3 u_ambient;

out vec4 frag_color;

void main() {
    vec3 color = u_color;
    if (u_lit) {
        vec3 n = length(v_normal) > 0.0 ? normalize(v_normal) : vec3(0.0);
        vec3 light = mix(u_ground, u_sky, 0.5 * n.y + 0.5) + u_ambient;
        color = min(u_color * light, vec3(1.0));
    }
    frag_color = vec4(color, u_opacity);
}
"#;

const POSITION_LOCATION: u32 = 0;
const NORMAL_LOCATION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Opaque,
    Transparent,
    Edges,
}

struct DrawItem {
    vao: WebGlVertexArrayObject,
    buffer: WebGlBuffer,
    mode: u32,
    count: i32,
    material: MaterialPreset,
    model: Matrix4<f32>,
    pass: Pass,
}

struct Uniforms {
    mvp: Option<WebGlUniformLocation>,
    model: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    opacity: Option<WebGlUniformLocation>,
    lit: Option<WebGlUniformLocation>,
    sky: Option<WebGlUniformLocation>,
    ground: Option<WebGlUniformLocation>,
    ambient: Option<WebGlUniformLocation>,
}

/// Owns every GPU object of one viewer. After [`GlRenderer::dispose`] it
/// draws nothing.
pub struct GlRenderer {
    gl: GL,
    program: Option<WebGlProgram>,
    uniforms: Uniforms,
    items: Vec<DrawItem>,
    lighting: Lighting,
}

fn surface_error(what: &str, detail: impl std::fmt::Display) -> ViewerError {
    ViewerError::Surface(format!("{what}: {detail}"))
}

impl GlRenderer {
    pub fn new(canvas: &HtmlCanvasElement, lighting: Lighting) -> Result<Self, ViewerError> {
        let gl = canvas
            .get_context("webgl2")
            .map_err(|err| surface_error("WebGL2 context", js_reason(&err)))?
            .ok_or_else(|| surface_error("WebGL2 context", "unavailable"))?
            .dyn_into::<GL>()
            .map_err(|_| surface_error("WebGL2 context", "unexpected context type"))?;

        let vertex = compile_shader(&gl, GL::VERTEX_SHADER, VERTEX_SHADER)?;
        let fragment = compile_shader(&gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = link_program(&gl, &vertex, &fragment);
        gl.delete_shader(Some(&vertex));
        gl.delete_shader(Some(&fragment));
        let program = program?;

        let location = |name: &str| gl.get_uniform_location(&program, name);
        let uniforms = Uniforms {
            mvp: location("u_mvp"),
            model: location("u_model"),
            color: location("u_color"),
            opacity: location("u_opacity"),
            lit: location("u_lit"),
            sky: location("u_sky"),
            ground: location("u_ground"),
            ambient: location("u_ambient"),
        };

        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.enable(GL::DEPTH_TEST);

        Ok(Self {
            gl,
            program: Some(program),
            uniforms,
            items: Vec::new(),
            lighting,
        })
    }

    /// Upload every object of `scene`: its surface or wireframe, then its
    /// edge overlay.
    pub fn upload(&mut self, scene: &LoadedScene) -> Result<(), ViewerError> {
        for object in &scene.objects {
            let model = object.model_matrix();
            let material = object.material;

            let item = if material.wireframe {
                self.create_item(&object.wireframe_vertices(), false, GL::LINES)?
            } else {
                self.create_item(&object.surface_vertices(), true, GL::TRIANGLES)?
            };
            let pass = if material.transparent {
                Pass::Transparent
            } else {
                Pass::Opaque
            };
            self.items.push(DrawItem {
                material,
                model,
                pass,
                ..item
            });

            if !object.edges.is_empty() {
                let item = self.create_item(&object.edge_vertices(), false, GL::LINES)?;
                self.items.push(DrawItem {
                    material: MaterialPreset::edge_lines(),
                    model,
                    pass: Pass::Edges,
                    ..item
                });
            }
        }

        debug!(draw_items = self.items.len(), "Uploaded scene to GPU");
        Ok(())
    }

    fn create_item(&self, data: &[f32], with_normals: bool, mode: u32) -> Result<DrawItem, ViewerError> {
        let gl = &self.gl;
        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| surface_error("vertex array", "allocation failed"))?;
        let buffer = gl
            .create_buffer()
            .ok_or_else(|| surface_error("buffer", "allocation failed"))?;

        gl.bind_vertex_array(Some(&vao));
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        gl.buffer_data_with_array_buffer_view(
            GL::ARRAY_BUFFER,
            &js_sys::Float32Array::from(data),
            GL::STATIC_DRAW,
        );

        let floats_per_vertex = if with_normals { 6 } else { 3 };
        let stride = floats_per_vertex * 4;
        gl.enable_vertex_attrib_array(POSITION_LOCATION);
        gl.vertex_attrib_pointer_with_i32(POSITION_LOCATION, 3, GL::FLOAT, false, stride, 0);
        if with_normals {
            gl.enable_vertex_attrib_array(NORMAL_LOCATION);
            gl.vertex_attrib_pointer_with_i32(NORMAL_LOCATION, 3, GL::FLOAT, false, stride, 12);
        }
        gl.bind_vertex_array(None);

        Ok(DrawItem {
            vao,
            buffer,
            mode,
            count: (data.len() / floats_per_vertex as usize) as i32,
            material: MaterialPreset::edge_lines(),
            model: Matrix4::identity(),
            pass: Pass::Edges,
        })
    }

    /// Resize the drawing buffer to `width` x `height` CSS pixels
    pub fn resize(&self, canvas: &HtmlCanvasElement, width: u32, height: u32) {
        canvas.set_width(width);
        canvas.set_height(height);
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    /// Opaque surfaces, then translucent surfaces without depth writes,
    /// then outlines
    pub fn render(&self, camera: &Camera) {
        let Some(program) = &self.program else {
            return;
        };
        let gl = &self.gl;

        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
        gl.use_program(Some(program));

        let hemisphere = &self.lighting.hemisphere;
        let ambient = &self.lighting.ambient;
        gl.uniform3fv_with_f32_array(
            self.uniforms.sky.as_ref(),
            &hemisphere.sky.scaled(hemisphere.intensity).to_array(),
        );
        gl.uniform3fv_with_f32_array(
            self.uniforms.ground.as_ref(),
            &hemisphere.ground.scaled(hemisphere.intensity).to_array(),
        );
        gl.uniform3fv_with_f32_array(
            self.uniforms.ambient.as_ref(),
            &ambient.color.scaled(ambient.intensity).to_array(),
        );

        let view_projection = camera.view_projection();

        for pass in [Pass::Opaque, Pass::Transparent, Pass::Edges] {
            if pass == Pass::Transparent {
                gl.enable(GL::BLEND);
                gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);
                gl.depth_mask(false);
            }
            for item in self.items.iter().filter(|item| item.pass == pass) {
                self.draw_item(item, &view_projection);
            }
            if pass == Pass::Transparent {
                gl.disable(GL::BLEND);
                gl.depth_mask(true);
            }
        }
        gl.bind_vertex_array(None);
    }

    fn draw_item(&self, item: &DrawItem, view_projection: &Matrix4<f32>) {
        let gl = &self.gl;
        let mvp = view_projection * item.model;
        let material = &item.material;

        gl.uniform_matrix4fv_with_f32_array(self.uniforms.mvp.as_ref(), false, mvp.as_slice());
        gl.uniform_matrix4fv_with_f32_array(self.uniforms.model.as_ref(), false, item.model.as_slice());
        gl.uniform3fv_with_f32_array(self.uniforms.color.as_ref(), &material.color.to_array());
        gl.uniform1f(self.uniforms.opacity.as_ref(), material.opacity);
        gl.uniform1i(
            self.uniforms.lit.as_ref(),
            i32::from(material.shading == Shading::Phong),
        );
        if item.mode == GL::LINES {
            gl.line_width(material.line_width);
        }

        gl.bind_vertex_array(Some(&item.vao));
        gl.draw_arrays(item.mode, 0, item.count);
    }

    /// Release every buffer, vertex array, and the program
    pub fn dispose(&mut self) {
        for item in self.items.drain(..) {
            self.gl.delete_buffer(Some(&item.buffer));
            self.gl.delete_vertex_array(Some(&item.vao));
        }
        if let Some(program) = self.program.take() {
            self.gl.delete_program(Some(&program));
            debug!("Released GPU resources");
        }
    }
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader, ViewerError> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| surface_error("shader", "allocation failed"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(surface_error("shader compilation", log))
    }
}

fn link_program(gl: &GL, vertex: &WebGlShader, fragment: &WebGlShader) -> Result<WebGlProgram, ViewerError> {
    let program = gl
        .create_program()
        .ok_or_else(|| surface_error("program", "allocation failed"))?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.link_program(&program);

    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(surface_error("program link", log))
    }
}
