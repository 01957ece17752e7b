use anyhow::{anyhow, Result};
use raylib::prelude::*;
use tracing_subscriber::EnvFilter;

use raycaster::audio_manager::AudioManager;
use raycaster::config::{Config, CONFIG_PATH};
use raycaster::core::camera::Camera;
use raycaster::core::grid::{Grid, Tile};
use raycaster::core::light::{LightSet, Sweep};
use raycaster::core::process_events::process_events;
use raycaster::render::casters::{hit_scan, HitOutcome, Trail};
use raycaster::render::frame::{FrameInput, Renderer};
use raycaster::render::textures::TextureStore;

/// Averages frame rate over one-second windows.
#[derive(Default)]
struct FpsLog {
    elapsed: f32,
    frames: u32,
}

impl FpsLog {
    /// Returns the average once a full second has passed, then starts over.
    fn tick(&mut self, dt: f32) -> Option<f32> {
        self.elapsed += dt;
        self.frames += 1;
        if self.elapsed < 1.0 {
            return None;
        }
        let fps = self.frames as f32 / self.elapsed;
        *self = Self::default();
        Some(fps)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::load(CONFIG_PATH)?;
    let mut grid = Grid::load(&cfg.assets.map)?;
    tracing::info!(
        "map {}: {}x{} cells, {} destructible",
        cfg.assets.map.display(),
        grid.dimension(),
        grid.dimension(),
        grid.count(Tile::Destructible)
    );

    let (mut window, raylib_thread) = raylib::init()
        .size(cfg.window.width, cfg.window.height)
        .title(&cfg.window.title)
        .build();
    window.disable_cursor();
    window.set_target_fps(cfg.window.target_fps);

    let textures = TextureStore::load(
        &cfg.assets.textures_dir,
        &cfg.assets.texture_files(),
        cfg.assets.procedural_fallback,
    )?;

    let audio = if cfg.assets.audio {
        let mut a = AudioManager::new();
        if a.is_none() {
            tracing::warn!("no audio output device, continuing without sound");
        }
        if let Some(a) = a.as_mut() {
            a.load_sfx_auto(&cfg.assets.sounds_dir);
        }
        a
    } else {
        None
    };

    let mut renderer = Renderer::from_config(&cfg.render);
    let (fb_w, fb_h) = (renderer.framebuffer.width, renderer.framebuffer.height);
    tracing::info!("rendering at {fb_w}x{fb_h}, {} lights", cfg.lights.0.len());
    let blank = Image::gen_image_color(fb_w as i32, fb_h as i32, Color::BLACK);
    let mut screen = window
        .load_texture_from_image(&raylib_thread, &blank)
        .map_err(|e| anyhow!("creating screen texture: {e:?}"))?;

    let mut camera = Camera::at_spawn(&grid, cfg.player.plane);
    let mut lights = LightSet::new();
    let mut sweeps: Vec<(usize, Sweep)> = Vec::new();
    for light_cfg in &cfg.lights.0 {
        let id = lights.add(light_cfg.to_light());
        if let Some(sweep) = light_cfg.sweep {
            sweeps.push((id, sweep));
        }
    }
    let mut trail = Trail::default();
    let mut fps_log = FpsLog::default();

    while !window.window_should_close() {
        let dt = window.get_frame_time();
        if let Some(fps) = fps_log.tick(dt) {
            tracing::debug!("{fps:.1} fps");
        }
        let cmd = process_events(&mut window, &mut camera, &grid, &cfg.player, dt);

        if cmd.toggle_glitch {
            renderer.post.glitch = !renderer.post.glitch;
            tracing::info!("glitch {}", if renderer.post.glitch { "on" } else { "off" });
        }
        if cmd.toggle_dither {
            renderer.post.dither = !renderer.post.dither;
            tracing::info!("dither {}", if renderer.post.dither { "on" } else { "off" });
        }
        if cmd.fire {
            let outcome = hit_scan(&mut grid, &camera, &mut trail);
            if let Some(a) = &audio {
                a.play_shot();
                match outcome {
                    HitOutcome::Wall { .. } => a.play_impact(),
                    HitOutcome::Destroyed { .. } => a.play_break(),
                    HitOutcome::Escaped => {}
                }
            }
        }

        for (id, sweep) in sweeps.iter_mut() {
            if let Some(light) = lights.get_mut(*id) {
                sweep.advance(&mut light.x, dt);
            }
        }

        let input = FrameInput { grid: &grid, camera: &camera, textures: &textures, trail: &trail };
        renderer.render_frame(&input, &mut lights, dt);
        renderer.framebuffer.upload_to_texture(&mut screen);

        let fps = window.get_fps();
        let (win_w, win_h) = (window.get_screen_width() as f32, window.get_screen_height() as f32);
        let mut d = window.begin_drawing(&raylib_thread);
        d.clear_background(Color::BLACK);
        d.draw_texture_pro(
            &screen,
            Rectangle::new(0.0, 0.0, fb_w as f32, fb_h as f32),
            Rectangle::new(0.0, 0.0, win_w, win_h),
            Vector2::zero(),
            0.0,
            Color::WHITE,
        );
        d.draw_text(&format!("FPS: {}", fps), 10, 10, 20, Color::WHITE);
    }
    Ok(())
}
