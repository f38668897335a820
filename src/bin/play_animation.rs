//! Animation playback utility.
//!
//! Loads an animation-set document, binds one animation to an animated
//! sprite and prints the state of every timeline sprite frame by frame.
//!
//! Usage: cargo run --bin play_animation -- [OPTIONS] <SET.json>

use std::path::PathBuf;

use animated_sprite2d::animation::{AnimatedSpriteConfig, ResourceRef};
use animated_sprite2d::scene::{BlendMode, SceneHost, SceneManager};

const DEFAULT_FPS: f32 = 10.0;
const DEFAULT_FRAMES: u32 = 10;

#[derive(Debug)]
struct Args {
    path: PathBuf,
    animation: Option<String>,
    fps: f32,
    frames: u32,
    speed: f32,
    order_in_layer: i32,
    blend_mode: BlendMode,
    list: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);

    let mut path: Option<PathBuf> = None;
    let mut animation: Option<String> = None;
    let mut fps = DEFAULT_FPS;
    let mut frames = DEFAULT_FRAMES;
    let mut speed = 1.0f32;
    let mut order_in_layer = 0i32;
    let mut blend_mode = BlendMode::Alpha;
    let mut list = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-a" | "--animation" => {
                animation = Some(args.next().ok_or("--animation requires a name")?);
            }
            "-f" | "--fps" => {
                let v = args.next().ok_or("--fps requires a value")?;
                fps = v.parse().map_err(|_| format!("Invalid fps: {}", v))?;
                if fps <= 0.0 {
                    return Err(format!("fps must be positive, got {}", fps));
                }
            }
            "-n" | "--frames" => {
                let v = args.next().ok_or("--frames requires a value")?;
                frames = v.parse().map_err(|_| format!("Invalid frame count: {}", v))?;
            }
            "-s" | "--speed" => {
                let v = args.next().ok_or("--speed requires a value")?;
                speed = v.parse().map_err(|_| format!("Invalid speed: {}", v))?;
            }
            "--order" => {
                let v = args.next().ok_or("--order requires a value")?;
                order_in_layer = v.parse().map_err(|_| format!("Invalid order: {}", v))?;
            }
            "--blend" => {
                let v = args.next().ok_or("--blend requires a mode")?;
                blend_mode = BlendMode::from_name(&v).ok_or_else(|| format!("Unknown blend mode: {}", v))?;
            }
            "-l" | "--list" => {
                list = true;
            }
            "-h" | "--help" | "help" => {
                return Err("show_help".to_string());
            }
            other if other.starts_with('-') => {
                return Err(format!("Unknown option: {}", other));
            }
            other => {
                path = Some(PathBuf::from(other));
            }
        }
    }

    let path = path.ok_or("Missing animation set path")?;

    Ok(Args {
        path,
        animation,
        fps,
        frames,
        speed,
        order_in_layer,
        blend_mode,
        list,
    })
}

fn print_help() {
    println!("Animation Playback Utility");
    println!("==========================");
    println!();
    println!("Usage: play_animation [OPTIONS] <SET.json>");
    println!();
    println!("Options:");
    println!("  -a, --animation <NAME>   Animation to play (default: first in set)");
    println!("  -f, --fps <N>            Frames per second (default: 10)");
    println!("  -n, --frames <N>         Number of frames to step (default: 10)");
    println!("  -s, --speed <N>          Playback speed multiplier (default: 1.0)");
    println!("  --order <N>              Order in layer (default: 0)");
    println!("  --blend <MODE>           Blend mode (default: alpha)");
    println!("  -l, --list               List animations and exit");
    println!("  -h, --help               Show this help message");
}

fn main() {
    animated_sprite2d::core::logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            if e == "show_help" {
                print_help();
                return;
            }
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };

    let mut manager = SceneManager::new();
    let set = match manager.load_animation_set(&args.path) {
        Ok(set) => set,
        Err(e) => {
            eprintln!("Error: failed to load {}: {}", args.path.display(), e);
            std::process::exit(1);
        }
    };

    if args.list {
        for name in set.animation_names() {
            println!("{}", name);
        }
        return;
    }

    let animation = match args.animation.or_else(|| set.animation_names().next().map(String::from)) {
        Some(name) => name,
        None => {
            eprintln!("Error: {} contains no animations", args.path.display());
            std::process::exit(1);
        }
    };

    let root = manager.scene_graph().root();
    let node = manager.add_animated_sprite(root, "animated");
    manager.apply_config(
        node,
        &AnimatedSpriteConfig {
            order_in_layer: args.order_in_layer,
            blend_mode: args.blend_mode,
            speed: args.speed,
            animation_set: ResourceRef::new(args.path.to_string_lossy()),
            animation: animation.clone(),
            ..Default::default()
        },
    );

    let Some(bound) = manager.animated_sprite(node).and_then(|s| s.animation().cloned()) else {
        eprintln!("Error: animation '{}' not found", animation);
        std::process::exit(1);
    };

    println!("Animation Playback Utility");
    println!("==========================");
    println!("Set:       {}", args.path.display());
    println!("Animation: {} ({:.3}s, {})", bound.name, bound.length, if bound.looped { "looped" } else { "once" });
    println!("Timelines: {}", bound.timeline_count());
    println!("Step:      {} frames at {} fps, speed {}", args.frames, args.fps, args.speed);
    println!();

    let time_step = 1.0 / args.fps;
    for frame in 0..=args.frames {
        if frame > 0 {
            manager.post_update(time_step);
        }

        let Some(sprite) = manager.animated_sprite(node) else {
            break;
        };
        println!("frame {:>4}  t={:.3}", frame, sprite.current_time());

        let graph = manager.scene_graph();
        for (index, timeline) in bound.timelines.iter().enumerate() {
            let Some(timeline_node) = sprite.timeline_node(index) else {
                continue;
            };

            if !graph.is_enabled(timeline_node) {
                println!("  {:<16} hidden", timeline.name);
                continue;
            }

            let world = graph.world_transform(timeline_node);
            let state = graph.sprite(timeline_node);
            let image = state
                .as_ref()
                .and_then(|s| s.sprite.as_ref())
                .map(|s| s.name.clone())
                .unwrap_or_else(|| "-".to_string());
            let (alpha, order) = state
                .as_ref()
                .map(|s| (s.alpha(), s.order_in_layer))
                .unwrap_or((1.0, 0));

            println!(
                "  {:<16} pos=({:>8.3}, {:>8.3}) angle={:>8.2} scale=({:.2}, {:.2}) alpha={:.2} order={:>3} sprite={}",
                timeline.name,
                world.position.x,
                world.position.y,
                world.angle,
                world.scale.x,
                world.scale.y,
                alpha,
                order,
                image
            );
        }
    }

    if let Some((sprite, graph)) = manager.animated_sprite_mut(node) {
        let bounds = sprite.world_bounding_box(&*graph);
        if !bounds.is_empty() {
            println!();
            println!(
                "Bounds: ({:.3}, {:.3}) - ({:.3}, {:.3})",
                bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y
            );
        }
    }
}
