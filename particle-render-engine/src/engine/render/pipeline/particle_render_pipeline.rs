use bevy::core_pipeline::core_3d::graph::{Core3d, Node3d};
use bevy::image::BevyDefault;
use bevy::ecs::{
    query::QueryItem,
    system::{SystemParamItem, lifetimeless::SRes},
};
use bevy::math::FloatOrd;
use bevy::pbr::{
    DrawMesh, MeshPipeline, MeshPipelineKey, MeshPipelineViewLayoutKey, RenderMeshInstances,
    SetMeshBindGroup, SetMeshViewBindGroup,
};
use bevy::prelude::*;
use bevy::render::extract_component::ExtractComponentPlugin;
use bevy::render::mesh::{MeshVertexBufferLayoutRef, RenderMesh};
use bevy::render::render_graph::{
    NodeRunError, RenderGraphApp, RenderGraphContext, RenderLabel, ViewNode, ViewNodeRunner,
};
use bevy::render::render_phase::{
    AddRenderCommand, CachedRenderPipelinePhaseItem, DrawFunctionId, DrawFunctions, PhaseItem,
    PhaseItemExtraIndex, RenderCommand, RenderCommandResult, SetItemPipeline, SortedPhaseItem,
    SortedRenderPhasePlugin, TrackedRenderPass, ViewSortedRenderPhases, sort_phase_system,
};
use bevy::render::render_resource::{
    BindGroup, BindGroupEntry, BindGroupLayout, BindGroupLayoutEntry, BindingResource,
    BindingType, BlendState, Buffer, BufferBindingType, BufferInitDescriptor, BufferUsages,
    CachedRenderPipelineId, ColorTargetState, ColorWrites, CompareFunction, DepthBiasState,
    DepthStencilState, FragmentState, FrontFace, MultisampleState, PipelineCache, PolygonMode,
    PrimitiveState, RenderPassDescriptor, RenderPipelineDescriptor, SamplerBindingType,
    ShaderStages, SpecializedMeshPipeline, SpecializedMeshPipelineError,
    SpecializedMeshPipelines, StencilState, StoreOp, TextureFormat, TextureSampleType,
    TextureViewDimension, VertexState,
};
use bevy::render::{
    ExtractSchedule, Render, RenderApp, RenderDebugFlags, RenderSet,
    render_asset::RenderAssets,
    renderer::{RenderContext, RenderDevice},
    sync_world::MainEntity,
    texture::GpuImage,
    view::{ExtractedView, RenderVisibleEntities, ViewDepthTexture, ViewTarget},
};
use std::ops::Range;

use crate::engine::particles::particle_system::ParticleCloud;
use crate::engine::render::extraction::{
    camera_phases::extract_camera_phases,
    render_state::{ParticleRenderState, extract_particle_render_state, particles_active},
};
use crate::engine::render::shader_failure::{
    ParticlePipelineIds, RENDER_SHADER, ShaderFailureChannel, ShaderFailureSender,
    handle_shader_failures, load_particle_shaders, report_failed_shader_loads,
    report_pipeline_failures,
};

pub struct ParticleRenderPlugin;

impl Plugin for ParticleRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ShaderFailureChannel>().add_plugins((
            ExtractComponentPlugin::<ParticleCloud>::default(),
            SortedRenderPhasePlugin::<ParticlePhase, MeshPipeline>::new(
                RenderDebugFlags::default(),
            ),
        ));
        app.add_systems(Startup, load_particle_shaders).add_systems(
            Update,
            report_failed_shader_loads.before(handle_shader_failures),
        );
        let sender = app.world().resource::<ShaderFailureChannel>().sender.clone();

        let Some(render_app) = app.get_sub_app_mut(RenderApp) else {
            return;
        };

        render_app
            .insert_resource(ShaderFailureSender::new(sender))
            .init_resource::<ParticleRenderState>()
            .init_resource::<ParticlePipelineIds>()
            .init_resource::<SpecializedMeshPipelines<ParticlePipeline>>()
            .init_resource::<DrawFunctions<ParticlePhase>>()
            .add_render_command::<ParticlePhase, DrawParticles>()
            .init_resource::<ViewSortedRenderPhases<ParticlePhase>>()
            .init_resource::<PreparedParticleBindGroups>()
            .add_systems(
                ExtractSchedule,
                (extract_particle_render_state, extract_camera_phases),
            )
            .add_systems(
                Render,
                (
                    prepare_particle_bind_groups.in_set(RenderSet::PrepareBindGroups),
                    queue_particle_meshes.in_set(RenderSet::QueueMeshes),
                    sort_phase_system::<ParticlePhase>.in_set(RenderSet::PhaseSort),
                )
                    .run_if(particles_active),
            )
            .add_systems(Render, report_pipeline_failures.in_set(RenderSet::Cleanup))
            .add_render_graph_node::<ViewNodeRunner<ParticleRenderNode>>(
                Core3d,
                ParticleRenderLabel,
            )
            .add_render_graph_edges(
                Core3d,
                (
                    Node3d::MainTransparentPass,
                    ParticleRenderLabel,
                    Node3d::EndMainPass,
                ),
            );
    }

    fn finish(&self, app: &mut App) {
        let Some(render_app) = app.get_sub_app_mut(RenderApp) else {
            return;
        };

        render_app.init_resource::<ParticlePipeline>();
    }
}

#[derive(Debug, Hash, PartialEq, Eq, Clone, RenderLabel)]
pub struct ParticleRenderLabel;

/// Specialised mesh pipeline drawing one screen-aligned quad per particle.
#[derive(Resource)]
pub struct ParticlePipeline {
    mesh_pipeline: MeshPipeline,
    shader_handle: Handle<Shader>,
    material_bind_group_layout: BindGroupLayout,
}

impl FromWorld for ParticlePipeline {
    fn from_world(world: &mut World) -> Self {
        Self {
            mesh_pipeline: MeshPipeline::from_world(world),
            shader_handle: world.resource::<AssetServer>().load(RENDER_SHADER),
            material_bind_group_layout: create_particle_material_bind_group_layout(
                world.resource::<RenderDevice>(),
            ),
        }
    }
}

impl SpecializedMeshPipeline for ParticlePipeline {
    type Key = MeshPipelineKey;

    fn specialize(
        &self,
        key: Self::Key,
        layout: &MeshVertexBufferLayoutRef,
    ) -> Result<RenderPipelineDescriptor, SpecializedMeshPipelineError> {
        // The only attribute is the (column, row, corner) index stored in position.
        let vertex_buffer_layout = layout
            .0
            .get_layout(&[Mesh::ATTRIBUTE_POSITION.at_shader_location(0)])?;

        let format = if key.contains(MeshPipelineKey::HDR) {
            ViewTarget::TEXTURE_FORMAT_HDR
        } else {
            TextureFormat::bevy_default()
        };

        Ok(RenderPipelineDescriptor {
            label: Some("particle_render_pipeline".into()),
            layout: vec![
                self.mesh_pipeline
                    .get_view_layout(MeshPipelineViewLayoutKey::from(key))
                    .clone(),
                self.mesh_pipeline.mesh_layouts.model_only.clone(),
                self.material_bind_group_layout.clone(),
            ],
            push_constant_ranges: vec![],
            vertex: VertexState {
                shader: self.shader_handle.clone(),
                entry_point: "vertex".into(),
                shader_defs: vec![],
                buffers: vec![vertex_buffer_layout],
            },
            fragment: Some(FragmentState {
                shader: self.shader_handle.clone(),
                entry_point: "fragment".into(),
                shader_defs: vec![],
                targets: vec![Some(ColorTargetState {
                    format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState {
                topology: key.primitive_topology(),
                front_face: FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: PolygonMode::Fill,
                ..default()
            },
            // Transparent sprites test against opaque depth without writing it.
            depth_stencil: Some(DepthStencilState {
                format: bevy::core_pipeline::core_3d::CORE_3D_DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: CompareFunction::Greater,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState {
                count: key.msaa_samples(),
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            zero_initialize_workgroup_memory: false,
        })
    }
}

#[derive(Resource, Default)]
pub struct PreparedParticleBindGroups {
    pub material_bind_group: Option<BindGroup>,
}

type DrawParticles = (
    SetItemPipeline,
    SetMeshViewBindGroup<0>,
    SetMeshBindGroup<1>,
    SetParticleMaterialGroup<2>,
    DrawMesh,
);

pub struct SetParticleMaterialGroup<const I: usize>;

impl<P: PhaseItem, const I: usize> RenderCommand<P> for SetParticleMaterialGroup<I> {
    type Param = SRes<PreparedParticleBindGroups>;
    type ViewQuery = ();
    type ItemQuery = ();

    #[inline]
    fn render<'w>(
        _item: &P,
        _view: (),
        _entity: Option<()>,
        bind_groups: SystemParamItem<'w, '_, Self::Param>,
        pass: &mut TrackedRenderPass<'w>,
    ) -> RenderCommandResult {
        let bind_groups = bind_groups.into_inner();
        let Some(material_bind_group) = &bind_groups.material_bind_group else {
            return RenderCommandResult::Skip;
        };
        pass.set_bind_group(I, material_bind_group, &[]);
        RenderCommandResult::Success
    }
}

/// Sorted phase item for particle clouds, drawn after the transparent pass.
pub struct ParticlePhase {
    pub sort_key: FloatOrd,
    pub entity: (Entity, MainEntity),
    pub pipeline: CachedRenderPipelineId,
    pub draw_function: DrawFunctionId,
    pub batch_range: Range<u32>,
    pub extra_index: PhaseItemExtraIndex,
    pub indexed: bool,
}

impl PhaseItem for ParticlePhase {
    fn entity(&self) -> Entity {
        self.entity.0
    }

    fn main_entity(&self) -> MainEntity {
        self.entity.1
    }

    fn draw_function(&self) -> DrawFunctionId {
        self.draw_function
    }

    fn batch_range(&self) -> &Range<u32> {
        &self.batch_range
    }

    fn batch_range_mut(&mut self) -> &mut Range<u32> {
        &mut self.batch_range
    }

    fn extra_index(&self) -> PhaseItemExtraIndex {
        self.extra_index.clone()
    }

    fn batch_range_and_extra_index_mut(&mut self) -> (&mut Range<u32>, &mut PhaseItemExtraIndex) {
        (&mut self.batch_range, &mut self.extra_index)
    }
}

impl SortedPhaseItem for ParticlePhase {
    type SortKey = FloatOrd;

    fn sort_key(&self) -> Self::SortKey {
        self.sort_key
    }

    fn sort(items: &mut [Self]) {
        items.sort_by_key(SortedPhaseItem::sort_key);
    }

    fn indexed(&self) -> bool {
        self.indexed
    }
}

impl CachedRenderPipelinePhaseItem for ParticlePhase {
    fn cached_pipeline(&self) -> CachedRenderPipelineId {
        self.pipeline
    }
}

/// Bind the texture the simulation wrote this frame as the render `positions` input.
fn prepare_particle_bind_groups(
    mut bind_groups: ResMut<PreparedParticleBindGroups>,
    render_device: Res<RenderDevice>,
    gpu_images: Res<RenderAssets<GpuImage>>,
    render_state: Res<ParticleRenderState>,
    pipeline: Res<ParticlePipeline>,
) {
    let Some(positions_gpu) = gpu_images.get(&render_state.write_texture) else {
        bind_groups.material_bind_group = None;
        return;
    };

    let material_uniform = create_particle_material_uniform(&render_device, &render_state);

    bind_groups.material_bind_group = Some(render_device.create_bind_group(
        "particle_material_bind_group",
        &pipeline.material_bind_group_layout,
        &[
            BindGroupEntry {
                binding: 0,
                resource: BindingResource::TextureView(&positions_gpu.texture_view),
            },
            BindGroupEntry {
                binding: 1,
                resource: BindingResource::Sampler(&positions_gpu.sampler),
            },
            BindGroupEntry {
                binding: 2,
                resource: material_uniform.as_entire_binding(),
            },
        ],
    ));
}

pub fn queue_particle_meshes(
    draw_functions: Res<DrawFunctions<ParticlePhase>>,
    mut pipelines: ResMut<SpecializedMeshPipelines<ParticlePipeline>>,
    pipeline_cache: Res<PipelineCache>,
    particle_pipeline: Res<ParticlePipeline>,
    render_meshes: Res<RenderAssets<RenderMesh>>,
    render_mesh_instances: Res<RenderMeshInstances>,
    mut particle_phases: ResMut<ViewSortedRenderPhases<ParticlePhase>>,
    mut pipeline_ids: ResMut<ParticlePipelineIds>,
    views: Query<(&ExtractedView, &RenderVisibleEntities, &Msaa)>,
    particle_entities: Query<(), With<ParticleCloud>>,
) {
    let draw_function = draw_functions.read().id::<DrawParticles>();

    for (view, visible_entities, msaa) in &views {
        let Some(particle_phase) = particle_phases.get_mut(&view.retained_view_entity) else {
            continue;
        };

        let view_key = MeshPipelineKey::from_msaa_samples(msaa.samples())
            | MeshPipelineKey::from_hdr(view.hdr);
        let rangefinder = view.rangefinder3d();

        for (render_entity, visible_entity) in visible_entities.iter::<Mesh3d>() {
            if particle_entities.get(*render_entity).is_err() {
                continue;
            }
            let Some(mesh_instance) = render_mesh_instances.render_mesh_queue_data(*visible_entity)
            else {
                continue;
            };
            let Some(mesh) = render_meshes.get(mesh_instance.mesh_asset_id) else {
                continue;
            };

            let mesh_key =
                view_key | MeshPipelineKey::from_primitive_topology(mesh.primitive_topology());

            let pipeline_id = match pipelines.specialize(
                &pipeline_cache,
                &particle_pipeline,
                mesh_key,
                &mesh.layout,
            ) {
                Ok(id) => id,
                Err(err) => {
                    error!("Particle pipeline specialisation failed: {}", err);
                    continue;
                }
            };
            pipeline_ids.render = Some(pipeline_id);

            particle_phase.add(ParticlePhase {
                sort_key: FloatOrd(rangefinder.distance_translation(&mesh_instance.translation)),
                entity: (*render_entity, *visible_entity),
                pipeline: pipeline_id,
                draw_function,
                batch_range: 0..1,
                extra_index: PhaseItemExtraIndex::None,
                indexed: mesh.indexed(),
            });
        }
    }
}

#[derive(Default)]
struct ParticleRenderNode;

impl ViewNode for ParticleRenderNode {
    type ViewQuery = (
        &'static ExtractedView,
        &'static ViewTarget,
        Option<&'static ViewDepthTexture>,
    );

    fn run(
        &self,
        graph: &mut RenderGraphContext,
        render_context: &mut RenderContext,
        (view, target, depth): QueryItem<Self::ViewQuery>,
        world: &World,
    ) -> Result<(), NodeRunError> {
        let Some(particle_phases) = world.get_resource::<ViewSortedRenderPhases<ParticlePhase>>()
        else {
            return Ok(());
        };
        let Some(particle_phase) = particle_phases.get(&view.retained_view_entity) else {
            return Ok(());
        };
        if particle_phase.items.is_empty() {
            return Ok(());
        }

        let view_entity = graph.view_entity();

        let mut render_pass = render_context.begin_tracked_render_pass(RenderPassDescriptor {
            label: Some("particle_render_pass"),
            color_attachments: &[Some(target.get_color_attachment())],
            depth_stencil_attachment: depth.map(|depth| depth.get_attachment(StoreOp::Store)),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        particle_phase
            .render(&mut render_pass, world, view_entity)
            .map_err(|draw_err| {
                error!("Particle phase render failed: {:?}", draw_err);
                NodeRunError::DrawError(draw_err)
            })
    }
}

/// Layout of `@group(2)` in `particle_render.wgsl`.
fn create_particle_material_bind_group_layout(render_device: &RenderDevice) -> BindGroupLayout {
    render_device.create_bind_group_layout(
        "particle_material_layout",
        &[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX_FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: false },
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStages::VERTEX_FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::NonFiltering),
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 2,
                visibility: ShaderStages::VERTEX_FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    )
}

/// Matches `ParticleMaterial` in `particle_render.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleMaterial {
    pub colour: [f32; 4],
    /// `pointSize` in the shader.
    pub point_size: f32,
    pub texture_width: u32,
    pub texture_height: u32,
    pub point_count: u32,
}

impl ParticleMaterial {
    pub fn from_render_state(render_state: &ParticleRenderState) -> Self {
        Self {
            colour: render_state.colour,
            point_size: render_state.point_size,
            texture_width: render_state.width,
            texture_height: render_state.height,
            point_count: render_state.point_count(),
        }
    }
}

fn create_particle_material_uniform(
    render_device: &RenderDevice,
    render_state: &ParticleRenderState,
) -> Buffer {
    let material = ParticleMaterial::from_render_state(render_state);
    render_device.create_buffer_with_data(&BufferInitDescriptor {
        label: Some("particle_material_uniforms"),
        contents: bytemuck::bytes_of(&material),
        usage: BufferUsages::UNIFORM,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_layout_is_two_vec4s() {
        assert_eq!(std::mem::size_of::<ParticleMaterial>(), 32);
    }

    #[test]
    fn material_carries_point_size_and_dimensions() {
        let state = ParticleRenderState {
            active: true,
            width: 4,
            height: 8,
            point_size: 2.0,
            colour: [1.0, 0.5, 0.25, 0.85],
            ..default()
        };
        let material = ParticleMaterial::from_render_state(&state);
        assert_eq!(material.point_size, 2.0);
        assert_eq!(material.point_count, 32);
        assert_eq!((material.texture_width, material.texture_height), (4, 8));
    }

    #[test]
    fn shader_declares_positions_and_point_size() {
        let source = include_str!("../../../../assets/shaders/particle_render.wgsl");
        assert!(source.contains("var positions: texture_2d<f32>"));
        assert!(source.contains("pointSize: f32"));
    }
}
