use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    time::{Duration, Instant, SystemTime},
};

use approx::assert_abs_diff_eq;
use geom::{dot, xz};
use render::{rgb::Image, DrawCmd, DrawList, Style, ViewLimits};
use scene::Scene;
use sim::{Config, Editor, Input, Key, Simulator};

fn workspace(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tramsim_scenario_{name}"));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn simulator(name: &str, text: &str) -> Simulator {
    let path = workspace(name).join("scene.txt");
    fs::write(&path, text).unwrap();
    Simulator::load(Config::new(path)).unwrap()
}

#[test]
fn minimal_straight() {
    let sim = simulator("minimal", "start 0 0 0 0\nstraight 10\n");
    let track = &sim.scene().track;
    assert_abs_diff_eq!(track.total_length(), 10.0, epsilon = 1e-9);
    let s = track.sample(5.0);
    assert_abs_diff_eq!(s.position.x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(s.position.z, 5.0, epsilon = 1e-9);
    assert_abs_diff_eq!(s.tangent.z, 1.0, epsilon = 1e-9);
}

#[test]
fn quarter_left_turn() {
    let sim = simulator("quarter", "start 0 0 0 0\ncurve 50 90\n");
    let track = &sim.scene().track;
    assert_abs_diff_eq!(track.total_length(), 78.54, epsilon = 0.05);
    let end = *track.points().last().unwrap();
    assert_abs_diff_eq!(end.norm(), 50.0 * 2f64.sqrt(), epsilon = 1e-9);
    let first = track.tangents()[0];
    let last = *track.tangents().last().unwrap();
    assert_abs_diff_eq!(dot(first, last), 0.0, epsilon = 1e-9);
}

#[test]
fn gradient_rise() {
    let sim = simulator("gradient", "start 0 0 0 0\nstraight 100 50\n");
    let track = &sim.scene().track;
    assert_abs_diff_eq!(track.sample(100.0).position.y, 5.0, epsilon = 0.01);
    let ys: Vec<f64> = (0..=100).map(|d| track.sample(d as f64).position.y).collect();
    assert!(ys.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn two_segment_join() {
    let sim = simulator("join", "straight 10\ncurve 20 -45\n");
    let [straight, curve] = sim.scene().track.segments() else { panic!("two segments") };
    assert_eq!(curve.points[0], *straight.points.last().unwrap());
    let a = *straight.tangents.last().unwrap();
    let b = curve.tangents[0];
    assert_abs_diff_eq!((a - b).norm(), 0.0, epsilon = 1e-9);
}

#[test]
fn baked_minimap_alignment() {
    let dir = workspace("bake");
    let background = image::RgbImage::from_pixel(100, 100, image::Rgb([40, 90, 40]));
    background.save(dir.join("foo.png")).unwrap();
    let path = dir.join("scene.txt");
    fs::write(&path, "map foo.png 0 0 2.0\nbuilding 50 0 50 0 90 0 4 4 3\n").unwrap();
    let sim = Simulator::load(Config::new(path)).unwrap();

    let baked = sim.baked().unwrap();
    assert_eq!(baked.image.dim(), [200, 200]);
    assert_eq!(baked.world_bounds(), (xz(-100.0, -100.0), xz(100.0, 100.0)));
    let [tx, ty] = baked.world_to_texel(xz(50.0, 50.0));
    assert!((tx - 150.0).abs() <= 1.0 && (ty - 150.0).abs() <= 1.0);
    assert_eq!(baked.image[[150, 150]], sim.config().style.building);
    assert_eq!(baked.image[[70, 30]], render::rgb::Color::new(40, 90, 40));
}

#[test]
fn missing_map_image_bakes_at_fallback_size() {
    let sim = simulator("fallback", "map gone.png 0 0 0.5\n");
    let baked = sim.baked().unwrap();
    let [w, h] = sim.config().fallback_map_size;
    assert_eq!(baked.image.dim(), [w / 2, h / 2]);
}

#[test]
fn editor_highlight() {
    let text = "map m.png 0 0 1\nstart 0 0 0 0\nstraight 30\nbuilding 8 0 5 0 90 0 4 4 4\n\
                cylinder -6 0 12 0 0 0 1 5\nsphere 0 0 20 3\ntree 5 0 -5 6\n";
    let mut editor = Editor::with_text(Path::new("scene.txt"), text, ViewLimits::default());
    assert_eq!(editor.scene().trees[0].line, 7);

    let style = Style::default();
    let mut draw = |highlight: &[u32]| {
        editor.set_highlight(highlight.iter().copied());
        let mut list = DrawList::new([320, 240]);
        editor.render(&mut list, &style);
        list.cmds
    };
    let plain = draw(&[]);
    let lit = draw(&[7]);
    assert_eq!(plain.len(), lit.len());
    let changed: Vec<_> = plain.iter().zip(&lit).filter(|(a, b)| a != b).collect();
    assert_eq!(changed.len(), 1);
    assert!(matches!(changed[0], (
        DrawCmd::Disc { color: a, .. },
        DrawCmd::Disc { color: b, .. },
    ) if *a == style.tree && *b == style.highlight));

    // The same highlight on a raster: the tree's pixel takes the colour.
    let mut image = Image::new([320, 240], style.background);
    let tree = editor.view.projection([320, 240]).world_to_map(xz(5.0, -5.0));
    editor.render(&mut image, &style);
    assert_eq!(image[[tree[0] as u32, tree[1] as u32]], style.highlight);
}

#[test]
fn failed_reload_keeps_the_scene() {
    let dir = workspace("reload");
    let path = dir.join("scene.txt");
    fs::write(&path, "straight 10\ntree 1 0 1 3\n").unwrap();
    let mut sim = Simulator::load(Config::new(&path)).unwrap();
    let before = sim.scene().clone();

    fs::remove_file(&path).unwrap();
    assert!(sim.reload().is_err());
    assert_eq!(sim.scene(), &before);

    // The R key does the same and only logs.
    sim.handle_key(Key::Reload);
    assert_eq!(sim.scene(), &before);

    fs::write(&path, "straight 20\n").unwrap();
    sim.reload().unwrap();
    assert_abs_diff_eq!(sim.scene().track.total_length(), 20.0, epsilon = 1e-9);
    assert!(sim.scene().trees.is_empty());
}

#[test]
fn edits_are_picked_up_by_polling() {
    let dir = workspace("poll");
    let path = dir.join("scene.txt");
    fs::write(&path, "straight 10\n").unwrap();
    let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(2_000_000);
    File::options().write(true).open(&path).unwrap().set_modified(t0).unwrap();
    let mut sim = Simulator::load(Config::new(&path)).unwrap();

    let now = Instant::now();
    assert!(sim.poll_reload(now).is_none());
    fs::write(&path, "straight 40\n").unwrap();
    let file = File::options().write(true).open(&path).unwrap();
    file.set_modified(t0 + Duration::from_secs(5)).unwrap();
    assert!(sim.poll_reload(now + Duration::from_millis(100)).is_none());
    assert!(matches!(sim.poll_reload(now + Duration::from_secs(1)), Some(Ok(()))));
    assert_abs_diff_eq!(sim.scene().track.total_length(), 40.0, epsilon = 1e-9);
}

#[test]
fn unparse_then_parse_is_identity() {
    let text = "\
# yard
map yard.png 10 -5 0.25
start 3 1 -2 30
straight 12.5 4
curve 40 -30
building 4 0 2 0 45 0 6 8 10 brick.png 0.25 0.5 15 0 2 4
cylinder -3 0 1 10 0 5 0.75 6 pole.png
sphere 0 4 0 1.5 - 0 0 0 1
tree 2 0 -3 8
curve 15 180 -20
";
    let scene = Scene::parse(text).scene;
    let again = Scene::parse(&scene.unparse());
    assert!(again.warnings.is_empty());
    assert_eq!(again.scene, scene);
}

#[test]
fn driving_loops_and_toggles() {
    let mut sim = simulator("drive", "straight 10\n");
    let go = Input { accelerate: true, ..Input::default() };
    for _ in 0..10 {
        sim.frame(&go, 0.5);
    }
    assert!(sim.tram().speed() > 0.0);
    assert!(sim.tram().distance_on_track() < 10.0);

    let keys = Input { keys: vec![Key::Loop, Key::Minimap, Key::Ground], ..Input::default() };
    sim.frame(&keys, 0.0);
    assert!(!sim.tram().looping());
    assert!(!sim.show_minimap() && !sim.show_ground());
    for _ in 0..100 {
        sim.frame(&go, 0.5);
    }
    assert_abs_diff_eq!(sim.tram().distance_on_track(), 10.0, epsilon = 1e-9);
    assert_eq!(sim.tram().speed(), 0.0);

    // Hidden minimap draws nothing.
    let mut list = DrawList::new([640, 480]);
    sim.draw_minimap(&mut list);
    assert!(list.cmds.is_empty());
    sim.handle_key(Key::Minimap);
    sim.draw_minimap(&mut list);
    assert!(!list.cmds.is_empty());

    sim.handle_key(Key::Quit);
    assert!(sim.should_quit());
}
