use bevy::prelude::*;
use bevy::render::{
    Render, RenderApp, RenderSet,
    render_asset::RenderAssets,
    render_resource::{
        BindGroupEntry, BindGroupLayout, BindGroupLayoutEntry, BindingResource, BindingType,
        Buffer, BufferBindingType, BufferInitDescriptor, BufferUsages, CachedComputePipelineId,
        ComputePassDescriptor, ComputePipeline, ComputePipelineDescriptor, PipelineCache,
        ShaderStages, StorageTextureAccess, TextureFormat, TextureSampleType,
        TextureViewDimension,
    },
    renderer::{RenderDevice, RenderQueue},
    texture::GpuImage,
};
use constants::simulation::WORKGROUP_SIZE;

use crate::engine::render::extraction::render_state::{ParticleRenderState, particles_active};
use crate::engine::render::shader_failure::{ParticlePipelineIds, SIMULATION_SHADER};

pub struct ParticleSimulationPlugin;

/// Lazily created simulation pipeline and its bind group layout.
#[derive(Resource, Default)]
pub struct SimulationState {
    pub pipeline: Option<CachedComputePipelineId>,
    pub bind_group_layout: Option<BindGroupLayout>,
}

impl Plugin for ParticleSimulationPlugin {
    fn build(&self, app: &mut App) {
        let Some(render_app) = app.get_sub_app_mut(RenderApp) else {
            return;
        };

        render_app
            .init_resource::<SimulationState>()
            .init_resource::<ParticlePipelineIds>()
            .add_systems(
                Render,
                run_particle_simulation
                    .in_set(RenderSet::Queue)
                    .run_if(particles_active),
            );
    }
}

/// Workgroups needed to cover `extent` texels with `WORKGROUP_SIZE` wide groups.
pub fn workgroup_count(extent: u32) -> u32 {
    extent.div_ceil(WORKGROUP_SIZE)
}

/// Advance every particle by one frame on the GPU.
///
/// Reads last frame's positions and writes this frame's into the other
/// ping-pong texture, which the render pass then draws.
///
/// ```wgsl
/// @group(0) @binding(0) var positions: texture_2d<f32>;
/// @group(0) @binding(1) var next_positions: texture_storage_2d<rgba32float, write>;
/// @group(0) @binding(2) var<uniform> params: SimulationParams;
/// ```
pub fn run_particle_simulation(
    mut state: ResMut<SimulationState>,
    mut pipeline_ids: ResMut<ParticlePipelineIds>,
    render_state: Res<ParticleRenderState>,
    render_device: Res<RenderDevice>,
    render_queue: Res<RenderQueue>,
    pipeline_cache: Res<PipelineCache>,
    gpu_images: Res<RenderAssets<GpuImage>>,
    asset_server: Res<AssetServer>,
) {
    if state.bind_group_layout.is_none() {
        initialise_simulation_pipeline(&mut state, &render_device, &pipeline_cache, &asset_server);
    }
    pipeline_ids.simulation = state.pipeline;

    let Some(bind_group_layout) = &state.bind_group_layout else {
        return;
    };
    let Some(pipeline_id) = state.pipeline else {
        return;
    };
    let Some(pipeline) = pipeline_cache.get_compute_pipeline(pipeline_id) else {
        return;
    };

    let Some(read_gpu) = gpu_images.get(&render_state.read_texture) else {
        return;
    };
    let Some(write_gpu) = gpu_images.get(&render_state.write_texture) else {
        return;
    };

    execute_simulation(
        &render_device,
        &render_queue,
        pipeline,
        bind_group_layout,
        read_gpu,
        write_gpu,
        &render_state,
    );
}

fn initialise_simulation_pipeline(
    state: &mut SimulationState,
    render_device: &RenderDevice,
    pipeline_cache: &PipelineCache,
    asset_server: &AssetServer,
) {
    let bind_group_layout = render_device.create_bind_group_layout(
        "particle_simulation_layout",
        &[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::COMPUTE,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: false },
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStages::COMPUTE,
                ty: BindingType::StorageTexture {
                    access: StorageTextureAccess::WriteOnly,
                    format: TextureFormat::Rgba32Float,
                    view_dimension: TextureViewDimension::D2,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 2,
                visibility: ShaderStages::COMPUTE,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    );

    let shader = asset_server.load(SIMULATION_SHADER);
    let pipeline = pipeline_cache.queue_compute_pipeline(ComputePipelineDescriptor {
        label: Some("particle_simulation".into()),
        layout: vec![bind_group_layout.clone()],
        push_constant_ranges: Vec::new(),
        shader,
        shader_defs: vec![],
        entry_point: "main".into(),
        zero_initialize_workgroup_memory: false,
    });

    state.bind_group_layout = Some(bind_group_layout);
    state.pipeline = Some(pipeline);
}

fn execute_simulation(
    render_device: &RenderDevice,
    render_queue: &RenderQueue,
    pipeline: &ComputePipeline,
    bind_group_layout: &BindGroupLayout,
    read_gpu: &GpuImage,
    write_gpu: &GpuImage,
    render_state: &ParticleRenderState,
) {
    let params = create_simulation_params_buffer(render_device, render_state);

    let bind_group = render_device.create_bind_group(
        "particle_simulation_bind_group",
        bind_group_layout,
        &[
            BindGroupEntry {
                binding: 0,
                resource: BindingResource::TextureView(&read_gpu.texture_view),
            },
            BindGroupEntry {
                binding: 1,
                resource: BindingResource::TextureView(&write_gpu.texture_view),
            },
            BindGroupEntry {
                binding: 2,
                resource: params.as_entire_binding(),
            },
        ],
    );

    let mut encoder = render_device.create_command_encoder(&Default::default());
    {
        let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
            label: Some("particle_simulation"),
            timestamp_writes: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(
            workgroup_count(render_state.width),
            workgroup_count(render_state.height),
            1,
        );
    }
    render_queue.submit([encoder.finish()]);
}

/// Matches `SimulationParams` in `particle_simulation.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SimulationParams {
    pub delta_time: f32,
    pub angular_speed: f32,
    pub width: u32,
    pub height: u32,
}

impl SimulationParams {
    pub fn from_render_state(render_state: &ParticleRenderState) -> Self {
        Self {
            delta_time: render_state.delta_time,
            angular_speed: render_state.angular_speed,
            width: render_state.width,
            height: render_state.height,
        }
    }
}

fn create_simulation_params_buffer(
    render_device: &RenderDevice,
    render_state: &ParticleRenderState,
) -> Buffer {
    let params = SimulationParams::from_render_state(render_state);
    render_device.create_buffer_with_data(&BufferInitDescriptor {
        label: Some("particle_simulation_params"),
        contents: bytemuck::bytes_of(&params),
        usage: BufferUsages::UNIFORM,
    })
}
