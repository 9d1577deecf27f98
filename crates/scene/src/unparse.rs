use std::fmt::Write;

use track::SegmentKind;

use crate::{Relative, Scene, Texturing, UvMode};

pub(crate) fn unparse(scene: &Scene) -> String {
    let mut commands: Vec<(u32, String)> = Vec::new();

    if let Some(map) = &scene.map {
        let c = map.world_center;
        let text = format!("map {} {} {} {}", map.filename, c.x, c.z, map.world_scale);
        commands.push((map.line, text));
    }
    if let Some(start) = &scene.start {
        let p = start.position;
        commands.push((start.line, format!("start {} {} {} {}", p.x, p.y, p.z, start.angle_deg)));
    }
    for segment in scene.track.segments() {
        let text = match segment.kind {
            SegmentKind::Straight { length, gradient_permille } => {
                format!("straight {length}{}", gradient(gradient_permille))
            }
            SegmentKind::Curve { radius, angle_deg, gradient_permille } => {
                format!("curve {radius} {angle_deg}{}", gradient(gradient_permille))
            }
        };
        commands.push((segment.line, text));
    }
    for b in &scene.buildings {
        let text = format!(
            "building {} {} {} {}{}",
            relative(&b.relative),
            b.width,
            b.depth,
            b.height,
            texturing(&b.texturing)
        );
        commands.push((b.line, text));
    }
    for c in &scene.cylinders {
        let text = format!(
            "cylinder {} {} {}{}",
            relative(&c.relative),
            c.radius,
            c.height,
            texturing(&c.texturing)
        );
        commands.push((c.line, text));
    }
    for s in &scene.spheres {
        let o = s.relative.offset;
        let text =
            format!("sphere {} {} {} {}{}", o.x, o.y, o.z, s.radius, texturing(&s.texturing));
        commands.push((s.line, text));
    }
    for t in &scene.trees {
        let o = t.offset;
        commands.push((t.line, format!("tree {} {} {} {}", o.x, o.y, o.z, t.height)));
    }

    commands.sort_by_key(|it| it.0);
    let mut res = String::new();
    let mut line = 1;
    for (at, text) in commands {
        while line < at {
            res.push('\n');
            line += 1;
        }
        res.push_str(&text);
        res.push('\n');
        line += 1;
    }
    res
}

fn gradient(permille: f64) -> String {
    if permille == 0.0 {
        String::new()
    } else {
        format!(" {permille}")
    }
}

fn relative(r: &Relative) -> String {
    let o = r.offset;
    format!("{} {} {} {} {} {}", o.x, o.y, o.z, r.rx_deg, r.ry_deg, r.rz_deg)
}

fn texturing(t: &Texturing) -> String {
    let default = Texturing::default();
    let uv_mode = |mode: UvMode| match mode {
        UvMode::Tile => "0",
        UvMode::Stretch => "1",
    };
    let args = [
        (t.texture.as_deref().unwrap_or("-").to_string(), t.texture.is_none()),
        (t.u_offset.to_string(), t.u_offset == default.u_offset),
        (t.v_offset.to_string(), t.v_offset == default.v_offset),
        (t.angle_deg.to_string(), t.angle_deg == default.angle_deg),
        (uv_mode(t.uv_mode).to_string(), t.uv_mode == default.uv_mode),
        (t.u_scale.to_string(), t.u_scale == default.u_scale),
        (t.v_scale.to_string(), t.v_scale == default.v_scale),
    ];
    // Trailing defaults are left out.
    let n = args.iter().rposition(|(_, is_default)| !is_default).map_or(0, |i| i + 1);
    let mut res = String::new();
    for (arg, _) in &args[..n] {
        let _ = write!(res, " {arg}");
    }
    res
}
