use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use geom::Xz;
use render::{rgb, Style, ViewLimits};
use scene::Scene;
use sim::{Config, Editor, Input, Simulator};

/// Tram driving simulator tools: scene checking, formatting and minimap
/// rendering, plus a headless drive.
#[derive(argh::FromArgs)]
struct Args {
    #[argh(subcommand)]
    cmd: Cmd,
}

#[derive(argh::FromArgs)]
#[argh(subcommand)]
enum Cmd {
    Check(CheckArgs),
    Fmt(FmtArgs),
    Bake(BakeArgs),
    Preview(PreviewArgs),
    Drive(DriveArgs),
}

/// Parses a scene file and reports every skipped line.
#[derive(argh::FromArgs)]
#[argh(subcommand, name = "check")]
struct CheckArgs {
    /// scene file
    #[argh(positional)]
    scene: PathBuf,

    /// fail when any line was skipped
    #[argh(switch)]
    strict: bool,
}

/// Prints the scene in canonical form, keeping line numbers.
#[derive(argh::FromArgs)]
#[argh(subcommand, name = "fmt")]
struct FmtArgs {
    /// scene file
    #[argh(positional)]
    scene: PathBuf,
}

/// Bakes the minimap texture and writes it in ppm format.
#[derive(argh::FromArgs)]
#[argh(subcommand, name = "bake")]
struct BakeArgs {
    /// scene file
    #[argh(positional)]
    scene: PathBuf,

    /// output file, defaults to stdout
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// fill colour where there is no background, as `#rrggbb`
    #[argh(option)]
    background: Option<rgb::Color>,
}

/// Renders the editor's minimap preview in ppm format.
#[derive(argh::FromArgs)]
#[argh(subcommand, name = "preview")]
struct PreviewArgs {
    /// scene file
    #[argh(positional)]
    scene: PathBuf,

    /// output file, defaults to stdout
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// world point in the middle, as `x,z`
    #[argh(option)]
    center: Option<Xz>,

    /// world units across the shorter side
    #[argh(option, default = "200.0")]
    range: f64,

    /// scene file line to highlight, may be repeated
    #[argh(option)]
    highlight: Vec<u32>,

    /// width of the image, in pixels
    #[argh(option, default = "800")]
    width: u32,

    /// height of the image, in pixels
    #[argh(option, default = "600")]
    height: u32,
}

/// Drives the tram at full throttle without a window.
#[derive(argh::FromArgs)]
#[argh(subcommand, name = "drive")]
struct DriveArgs {
    /// scene file
    #[argh(positional)]
    scene: PathBuf,

    /// simulated time, in seconds
    #[argh(option, default = "30.0")]
    seconds: f64,

    /// frames per second
    #[argh(option, default = "60")]
    fps: u32,

    /// stop at the end of the track instead of looping
    #[argh(switch)]
    no_loop: bool,

    /// write the final minimap overlay, in ppm format, to this file
    #[argh(option)]
    minimap: Option<PathBuf>,

    /// width of the minimap frame, in pixels
    #[argh(option, default = "800")]
    width: u32,

    /// height of the minimap frame, in pixels
    #[argh(option, default = "600")]
    height: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();
    match args.cmd {
        Cmd::Check(args) => check(args),
        Cmd::Fmt(args) => fmt(args),
        Cmd::Bake(args) => bake(args),
        Cmd::Preview(args) => preview(args),
        Cmd::Drive(args) => drive(args),
    }
}

fn check(args: CheckArgs) -> anyhow::Result<()> {
    let parsed = Scene::load(&args.scene)?;
    let scene = &parsed.scene;
    println!(
        "{}: {} segments, {:.1} world units of track, {} objects",
        args.scene.display(),
        scene.track.segments().len(),
        scene.track.total_length(),
        scene.object_count()
    );
    for warning in &parsed.warnings {
        println!("{}:{warning}", args.scene.display());
    }
    if args.strict && !parsed.warnings.is_empty() {
        anyhow::bail!("{} lines skipped", parsed.warnings.len());
    }
    Ok(())
}

fn fmt(args: FmtArgs) -> anyhow::Result<()> {
    let parsed = Scene::load(&args.scene)?;
    io::stdout().lock().write_all(parsed.scene.unparse().as_bytes()).context("writing output")?;
    Ok(())
}

fn bake(args: BakeArgs) -> anyhow::Result<()> {
    let mut config = Config::new(&args.scene);
    if let Some(background) = args.background {
        config.style.background = background;
    }
    let parsed = Scene::load(&args.scene)?;
    let baked = sim::bake_minimap(&parsed.scene, &config)
        .context("nothing baked, the scene needs a valid `map` line")?;
    write_output(&baked.image, args.output.as_deref())
}

fn preview(args: PreviewArgs) -> anyhow::Result<()> {
    let mut editor = Editor::open(&args.scene, ViewLimits::default())?;
    if let Some(center) = args.center {
        editor.view.center = center;
    }
    editor.view.set_range(args.range);
    editor.set_highlight(args.highlight);
    editor.sync_background();

    let style = Style::default();
    let mut image = rgb::Image::new([args.width, args.height], style.background);
    editor.render(&mut image, &style);
    write_output(&image, args.output.as_deref())
}

fn drive(args: DriveArgs) -> anyhow::Result<()> {
    let mut config = Config::new(&args.scene);
    config.loop_track = !args.no_loop;
    let mut sim = Simulator::load(config)?;
    let dt = 1.0 / args.fps.max(1) as f64;
    let input = Input { accelerate: true, ..Input::default() };
    let frames = (args.seconds / dt).round() as u64;
    log::debug!("driving {frames} frames of {dt:.4}s");
    for frame in 1..=frames {
        let pose = sim.frame(&input, dt);
        if frame % args.fps.max(1) as u64 == 0 {
            let tram = sim.tram();
            println!(
                "{:7.2}s  d={:9.2}  {:6.1} km/h  pos={:.2},{:.2},{:.2}  yaw={:.1}",
                frame as f64 * dt,
                tram.distance_on_track(),
                tram.speed_kmh(),
                pose.position.x,
                pose.position.y,
                pose.position.z,
                pose.yaw_deg
            );
        }
    }
    if let Some(path) = &args.minimap {
        let mut image = rgb::Image::new([args.width, args.height], rgb::Color::new_black());
        sim.draw_minimap(&mut image);
        write_output(&image, Some(path.as_path()))?;
    }
    Ok(())
}

fn write_output(image: &rgb::Image, path: Option<&Path>) -> anyhow::Result<()> {
    let res = match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            let mut w = BufWriter::new(file);
            write_ppm(image, &mut w).and_then(|()| w.flush())
        }
        None => write_ppm(image, &mut io::stdout().lock()),
    };
    res.context("writing output")
}

fn write_ppm(image: &rgb::Image, w: &mut dyn io::Write) -> io::Result<()> {
    let magic_number = "P3";
    let max_color = 255;
    write!(w, "{}\n{} {}\n{}\n", magic_number, image.width(), image.height(), max_color)?;

    for idx in image.by_row() {
        if idx[0] == 0 {
            writeln!(w)?;
        }
        let rgb::Color { r, g, b } = image[idx];
        write!(w, "{r:3} {g:3} {b:3}  ")?;
    }
    Ok(())
}

#[test]
fn ppm_has_one_line_per_row() {
    let mut image = rgb::Image::new([2, 2], rgb::Color::new_black());
    image[[1, 1]] = rgb::Color::new(255, 0, 7);
    let mut out = Vec::new();
    write_ppm(&image, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text, "P3\n2 2\n255\n\n  0   0   0    0   0   0  \n  0   0   0  255   0   7  ");
}
