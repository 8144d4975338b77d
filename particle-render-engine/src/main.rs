use particle_render_engine::create_app;
use particle_render_engine::engine::config::ParticleConfig;

/// Configuration file, relative to the asset root.
const CONFIG_ASSET: &str = "particles.config.json";

fn main() {
    let mut app = create_app(load_config(), Some(CONFIG_ASSET));

    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(async move {
            app.run();
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.run();
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config() -> ParticleConfig {
    // Same root the asset server resolves against.
    let root = std::env::var_os("BEVY_ASSET_ROOT")
        .or_else(|| std::env::var_os("CARGO_MANIFEST_DIR"))
        .map(std::path::PathBuf::from)
        .unwrap_or_default();
    ParticleConfig::load_or_default(root.join("assets").join(CONFIG_ASSET))
}

// No filesystem on the web; the config asset watcher picks the file up once loaded.
#[cfg(target_arch = "wasm32")]
fn load_config() -> ParticleConfig {
    ParticleConfig::default()
}
