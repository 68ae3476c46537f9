//! Shader program compilation, linking, and interface lookup.
//!
//! A [`ShaderProgram`] is a vertex/fragment WGSL pair linked into one render
//! pipeline. Unlike a bare `create_shader_module` call, every step is checked:
//!
//! 1. Each declared attribute and uniform name must occur in the source.
//! 2. Each stage compiles inside a validation error scope; failures carry the
//!    compiler log as [`ShaderError::Compile`].
//! 3. The pipeline is built inside another scope; interface mismatches between
//!    the stages or against the vertex layout surface as [`ShaderError::Link`].
//!
//! After linking, [`ShaderProgram::attribute_location`] and
//! [`ShaderProgram::uniform_binding`] resolve names and fail with
//! [`ShaderError::Binding`] instead of returning a sentinel.
//!
//! All resources bind in group 0. Vertex attributes each read from their own
//! buffer, in declaration order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, info};

use crate::mesh::VertexStream;
use crate::surface::DEPTH_FORMAT;

/// Vertex stage entry point every program uses.
pub const VERTEX_ENTRY: &str = "vs_main";
/// Fragment stage entry point every program uses.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// A programmable pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Which half of a program's interface a lookup targeted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Attribute,
    Uniform,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingKind::Attribute => f.write_str("attribute"),
            BindingKind::Uniform => f.write_str("uniform"),
        }
    }
}

/// Errors raised while building or querying a program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShaderError {
    /// A stage failed to compile.
    #[error("program '{program}': {stage} shader failed to compile:\n{log}")]
    Compile {
        program: String,
        stage: ShaderStage,
        log: String,
    },

    /// The stages compiled but could not be linked into a pipeline.
    #[error("program '{program}' failed to link:\n{log}")]
    Link { program: String, log: String },

    /// A name is not part of the program's interface.
    #[error("program '{program}' has no {kind} named '{name}'")]
    Binding {
        program: String,
        name: String,
        kind: BindingKind,
    },
}

/// A vertex input of a program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeDecl {
    /// Identifier used in the vertex source.
    pub name: &'static str,
    /// `@location` of the input.
    pub location: u32,
    /// Mesh stream feeding it.
    pub stream: VertexStream,
}

/// The resource type behind a uniform binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformKind {
    Buffer,
    Texture,
    Sampler,
}

/// A group-0 resource binding of a program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformDecl {
    /// Identifier used in the source.
    pub name: &'static str,
    /// `@binding` index in group 0.
    pub binding: u32,
    /// Resource type.
    pub kind: UniformKind,
}

/// Fixed-function state baked into a program's pipeline.
#[derive(Clone, Copy, Debug)]
pub struct PipelineState {
    pub topology: wgpu::PrimitiveTopology,
    pub blend: Option<wgpu::BlendState>,
    pub depth_write: bool,
    pub cull_mode: Option<wgpu::Face>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            topology: wgpu::PrimitiveTopology::TriangleList,
            blend: Some(wgpu::BlendState::REPLACE),
            depth_write: true,
            cull_mode: None,
        }
    }
}

/// Everything needed to build a [`ShaderProgram`].
#[derive(Clone, Copy, Debug)]
pub struct ProgramDescriptor<'a> {
    pub label: &'a str,
    pub vertex_source: &'a str,
    pub fragment_source: &'a str,
    pub attributes: &'a [AttributeDecl],
    pub uniforms: &'a [UniformDecl],
    pub state: PipelineState,
}

/// A compiled and linked vertex/fragment pair.
#[derive(Debug)]
pub struct ShaderProgram {
    label: String,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    attributes: Vec<AttributeDecl>,
    uniforms: Vec<UniformDecl>,
}

impl ShaderProgram {
    /// Compiles both stages and links them into a pipeline targeting `color_format`.
    pub fn compile(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        desc: &ProgramDescriptor,
    ) -> Result<Self, ShaderError> {
        check_interface(desc)?;

        let vertex = compile_stage(device, desc.label, ShaderStage::Vertex, desc.vertex_source)?;
        let fragment = compile_stage(
            device,
            desc.label,
            ShaderStage::Fragment,
            desc.fragment_source,
        )?;

        let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = desc
            .uniforms
            .iter()
            .map(|uniform| wgpu::BindGroupLayoutEntry {
                binding: uniform.binding,
                visibility: match uniform.kind {
                    UniformKind::Buffer => wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    UniformKind::Texture | UniformKind::Sampler => wgpu::ShaderStages::FRAGMENT,
                },
                ty: match uniform.kind {
                    UniformKind::Buffer => wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    UniformKind::Texture => wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    UniformKind::Sampler => {
                        wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
                    }
                },
                count: None,
            })
            .collect();

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{} Bind Group Layout", desc.label)),
            entries: &layout_entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} Pipeline Layout", desc.label)),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_attributes: Vec<[wgpu::VertexAttribute; 1]> = desc
            .attributes
            .iter()
            .map(|attribute| {
                [wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: attribute.location,
                    format: attribute.stream.format(),
                }]
            })
            .collect();

        let vertex_buffers: Vec<wgpu::VertexBufferLayout> = desc
            .attributes
            .iter()
            .zip(&vertex_attributes)
            .map(|(attribute, attributes)| wgpu::VertexBufferLayout {
                array_stride: attribute.stream.format().size(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes,
            })
            .collect();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} Pipeline", desc.label)),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &vertex_buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: desc.state.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: desc.state.topology,
                cull_mode: desc.state.cull_mode,
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: desc.state.depth_write,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::Link {
                program: desc.label.to_string(),
                log: error.to_string(),
            });
        }

        info!("Linked program '{}'", desc.label);

        Ok(Self {
            label: desc.label.to_string(),
            pipeline,
            bind_group_layout,
            attributes: desc.attributes.to_vec(),
            uniforms: desc.uniforms.to_vec(),
        })
    }

    /// Resolves a vertex input name to its `@location`.
    pub fn attribute_location(&self, name: &str) -> Result<u32, ShaderError> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.location)
            .ok_or_else(|| self.binding_error(name, BindingKind::Attribute))
    }

    /// Resolves a uniform, texture, or sampler name to its group-0 `@binding`.
    pub fn uniform_binding(&self, name: &str) -> Result<u32, ShaderError> {
        self.uniforms
            .iter()
            .find(|uniform| uniform.name == name)
            .map(|uniform| uniform.binding)
            .ok_or_else(|| self.binding_error(name, BindingKind::Uniform))
    }

    /// Mesh streams in vertex-buffer slot order.
    pub fn streams(&self) -> Vec<VertexStream> {
        self.attributes.iter().map(|attribute| attribute.stream).collect()
    }

    /// The linked pipeline.
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Layout of the program's group-0 bind group.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    fn binding_error(&self, name: &str, kind: BindingKind) -> ShaderError {
        ShaderError::Binding {
            program: self.label.clone(),
            name: name.to_string(),
            kind,
        }
    }
}

/// Checks that every declared name occurs as an identifier in the sources.
///
/// Attributes must appear in the vertex stage; uniforms in either stage.
pub fn check_interface(desc: &ProgramDescriptor) -> Result<(), ShaderError> {
    let missing = |name: &str, kind| ShaderError::Binding {
        program: desc.label.to_string(),
        name: name.to_string(),
        kind,
    };

    for attribute in desc.attributes {
        if !declares_identifier(desc.vertex_source, attribute.name) {
            return Err(missing(attribute.name, BindingKind::Attribute));
        }
    }

    for uniform in desc.uniforms {
        if !declares_identifier(desc.vertex_source, uniform.name)
            && !declares_identifier(desc.fragment_source, uniform.name)
        {
            return Err(missing(uniform.name, BindingKind::Uniform));
        }
    }

    Ok(())
}

/// Returns true when `name` occurs in `source` delimited by non-identifier characters.
pub fn declares_identifier(source: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }

    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';

    source.match_indices(name).any(|(start, _)| {
        let before = source[..start].chars().next_back();
        let after = source[start + name.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

fn compile_stage(
    device: &wgpu::Device,
    program: &str,
    stage: ShaderStage,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    debug!("Compiling {} stage of '{}'", stage, program);

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{program} {stage} Shader")),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let compilation = pollster::block_on(module.get_compilation_info());
    let scope_error = pollster::block_on(device.pop_error_scope());

    let diagnostics: Vec<String> = compilation
        .messages
        .iter()
        .filter(|message| message.message_type == wgpu::CompilationMessageType::Error)
        .map(|message| match &message.location {
            Some(location) => format!(
                "{}:{}: {}",
                location.line_number, location.line_position, message.message
            ),
            None => message.message.clone(),
        })
        .collect();

    if scope_error.is_some() || !diagnostics.is_empty() {
        let log = if diagnostics.is_empty() {
            scope_error.map(|e| e.to_string()).unwrap_or_default()
        } else {
            diagnostics.join("\n")
        };
        return Err(ShaderError::Compile {
            program: program.to_string(),
            stage,
            log,
        });
    }

    Ok(module)
}

/// Cache of linked programs shared by every drawable on one surface.
///
/// Drawables of the same variant reuse one pipeline; the cache is dropped
/// with the surface.
pub struct ProgramLibrary {
    color_format: wgpu::TextureFormat,
    programs: HashMap<String, Arc<ShaderProgram>>,
}

impl ProgramLibrary {
    /// Creates an empty library for pipelines targeting `color_format`.
    pub fn new(color_format: wgpu::TextureFormat) -> Self {
        Self {
            color_format,
            programs: HashMap::new(),
        }
    }

    /// Returns the cached program for `desc.label`, compiling it on first use.
    pub fn get_or_compile(
        &mut self,
        device: &wgpu::Device,
        desc: &ProgramDescriptor,
    ) -> Result<Arc<ShaderProgram>, ShaderError> {
        if let Some(program) = self.programs.get(desc.label) {
            return Ok(Arc::clone(program));
        }

        let program = Arc::new(ShaderProgram::compile(device, self.color_format, desc)?);
        self.programs
            .insert(desc.label.to_string(), Arc::clone(&program));
        Ok(program)
    }

    /// Number of linked programs.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Returns true if nothing has been compiled yet.
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::test_device;

    const VERTEX: &str = r#"
        struct Transform { mvp: mat4x4<f32> }
        @group(0) @binding(0) var<uniform> u_transform: Transform;

        struct VertexOut {
            @builtin(position) clip: vec4<f32>,
            @location(0) color: vec4<f32>,
        }

        @vertex
        fn vs_main(@location(0) a_position: vec3<f32>, @location(1) a_color: vec4<f32>) -> VertexOut {
            var out: VertexOut;
            out.clip = u_transform.mvp * vec4<f32>(a_position, 1.0);
            out.color = a_color;
            return out;
        }
    "#;

    const FRAGMENT: &str = r#"
        @fragment
        fn fs_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
            return color;
        }
    "#;

    const ATTRIBUTES: &[AttributeDecl] = &[
        AttributeDecl {
            name: "a_position",
            location: 0,
            stream: VertexStream::Position,
        },
        AttributeDecl {
            name: "a_color",
            location: 1,
            stream: VertexStream::Color,
        },
    ];

    const UNIFORMS: &[UniformDecl] = &[UniformDecl {
        name: "u_transform",
        binding: 0,
        kind: UniformKind::Buffer,
    }];

    fn descriptor<'a>(vertex: &'a str, fragment: &'a str) -> ProgramDescriptor<'a> {
        ProgramDescriptor {
            label: "Test",
            vertex_source: vertex,
            fragment_source: fragment,
            attributes: ATTRIBUTES,
            uniforms: UNIFORMS,
            state: PipelineState::default(),
        }
    }

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    #[test]
    fn identifier_match_respects_boundaries() {
        assert!(declares_identifier("var<uniform> u_mvp: Mat;", "u_mvp"));
        assert!(!declares_identifier("var<uniform> u_mvp2: Mat;", "u_mvp"));
        assert!(!declares_identifier("a_u_mvp", "u_mvp"));
        assert!(declares_identifier("(u_mvp)", "u_mvp"));
        assert!(!declares_identifier("anything", ""));
    }

    #[test]
    fn interface_check_accepts_declared_names() {
        assert_eq!(check_interface(&descriptor(VERTEX, FRAGMENT)), Ok(()));
    }

    #[test]
    fn interface_check_rejects_unknown_attribute() {
        let vertex = VERTEX.replace("a_color", "a_tint");
        let err = check_interface(&descriptor(&vertex, FRAGMENT)).unwrap_err();
        assert_eq!(
            err,
            ShaderError::Binding {
                program: "Test".into(),
                name: "a_color".into(),
                kind: BindingKind::Attribute,
            }
        );
    }

    #[test]
    fn interface_check_rejects_unknown_uniform() {
        let vertex = VERTEX.replace("u_transform", "u_matrix");
        let err = check_interface(&descriptor(&vertex, FRAGMENT)).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Binding {
                kind: BindingKind::Uniform,
                ..
            }
        ));
    }

    #[test]
    fn valid_program_links_and_resolves_names() {
        let Some((device, _queue)) = test_device() else {
            return;
        };
        let program = ShaderProgram::compile(&device, FORMAT, &descriptor(VERTEX, FRAGMENT))
            .expect("program should link");

        assert_eq!(program.attribute_location("a_position"), Ok(0));
        assert_eq!(program.attribute_location("a_color"), Ok(1));
        assert_eq!(program.uniform_binding("u_transform"), Ok(0));
        assert_eq!(
            program.streams(),
            vec![VertexStream::Position, VertexStream::Color]
        );
    }

    #[test]
    fn lookup_of_absent_names_fails() {
        let Some((device, _queue)) = test_device() else {
            return;
        };
        let program =
            ShaderProgram::compile(&device, FORMAT, &descriptor(VERTEX, FRAGMENT)).unwrap();

        assert!(matches!(
            program.attribute_location("a_normal"),
            Err(ShaderError::Binding {
                kind: BindingKind::Attribute,
                ..
            })
        ));
        assert!(matches!(
            program.uniform_binding("u_texture"),
            Err(ShaderError::Binding {
                kind: BindingKind::Uniform,
                ..
            })
        ));
    }

    #[test]
    fn syntax_error_is_reported_as_compile_failure() {
        let Some((device, _queue)) = test_device() else {
            return;
        };
        let broken = VERTEX.replace("return out;", "return undeclared_value;");
        let err = ShaderProgram::compile(&device, FORMAT, &descriptor(&broken, FRAGMENT))
            .unwrap_err();

        match err {
            ShaderError::Compile { stage, log, .. } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!log.is_empty());
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn broken_fragment_stage_is_named() {
        let Some((device, _queue)) = test_device() else {
            return;
        };
        let broken = FRAGMENT.replace("return color;", "return colour;");
        let err = ShaderProgram::compile(&device, FORMAT, &descriptor(VERTEX, &broken))
            .unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Compile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
    }

    #[test]
    fn stage_interface_mismatch_is_a_link_failure() {
        let Some((device, _queue)) = test_device() else {
            return;
        };
        // The fragment stage reads a location the vertex stage never writes.
        let fragment = r#"
            @fragment
            fn fs_main(@location(3) color: vec4<f32>) -> @location(0) vec4<f32> {
                return color;
            }
        "#;
        let err = ShaderProgram::compile(&device, FORMAT, &descriptor(VERTEX, fragment))
            .unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
    }

    #[test]
    fn library_reuses_programs_by_label() {
        let Some((device, _queue)) = test_device() else {
            return;
        };
        let mut library = ProgramLibrary::new(FORMAT);
        assert!(library.is_empty());

        let a = library
            .get_or_compile(&device, &descriptor(VERTEX, FRAGMENT))
            .unwrap();
        let b = library
            .get_or_compile(&device, &descriptor(VERTEX, FRAGMENT))
            .unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(library.len(), 1);
    }
}
