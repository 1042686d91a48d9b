//! Entry point for Veles3D: logging + CLI flags, then the platform loop.

use anyhow::Result;
use renderer::Scene;

fn parse_backend_arg() -> wgpu::Backends {
    // Accept: --gpu-backend=auto|vulkan|dx12|metal|gl
    let mut backends = wgpu::Backends::all(); // default = auto
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix("--gpu-backend=") {
            backends = match val.to_ascii_lowercase().as_str() {
                "auto" => wgpu::Backends::all(),
                "vulkan" | "vk" => wgpu::Backends::VULKAN,
                "dx12" | "d3d12" => wgpu::Backends::DX12,
                "metal" | "mtl" => wgpu::Backends::METAL,
                "gl" | "opengl" | "gles" => wgpu::Backends::GL,
                other => {
                    eprintln!("[warn] Unknown backend '{}', falling back to auto.", other);
                    wgpu::Backends::all()
                }
            };
        }
    }
    backends
}

fn parse_scene_arg() -> String {
    // Accept: --scene=rect|cube|bus (default bus)
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix("--scene=") {
            return val.to_ascii_lowercase();
        }
    }
    "bus".to_string()
}

fn parse_show_fps_arg() -> bool {
    // --show-fps[=on|off], default off
    for arg in std::env::args() {
        if arg == "--show-fps" {
            return true;
        }
        if let Some(val) = arg.strip_prefix("--show-fps=") {
            return matches!(
                val.to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            );
        }
    }
    false
}

fn parse_size_args() -> (u32, u32) {
    let mut w: Option<u32> = None;
    let mut h: Option<u32> = None;

    for arg in std::env::args() {
        if let Some(v) = arg.strip_prefix("--size=") {
            if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                    w = Some(pw);
                    h = Some(ph);
                }
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            if let Ok(pw) = v.parse::<u32>() {
                w = Some(pw);
            }
        } else if let Some(v) = arg.strip_prefix("--height=") {
            if let Ok(ph) = v.parse::<u32>() {
                h = Some(ph);
            }
        }
    }

    let ww = w.unwrap_or(1280).max(1);
    let hh = h.unwrap_or(720).max(1);
    (ww, hh)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let backends = parse_backend_arg();
    let scene_name = parse_scene_arg();
    let show_fps = parse_show_fps_arg();
    let (width, height) = parse_size_args();

    let Some(scene) = Scene::preset(&scene_name) else {
        anyhow::bail!("unknown scene '{scene_name}'; expected rect, cube or bus");
    };

    log::info!(
        "Starting Veles3D. Scene: {}, backend: {:?}, show_fps={}, window_size={}x{}",
        scene_name,
        backends,
        show_fps,
        width,
        height
    );

    platform::run(
        scene,
        platform::RunConfig {
            backends,
            width,
            height,
            show_fps,
        },
    )?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
