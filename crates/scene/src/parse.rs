use std::{num::ParseFloatError, str::SplitAsciiWhitespace};

use geom::{v64, Pose};
use track::{BuildErrorKind, SegmentKind, TrackBuilder};

use crate::{
    Building, Cylinder, Map, Parsed, Relative, Scene, Sphere, Start, Texturing, Tree, UvMode,
};

/// line {line}: {kind}
#[derive(Debug, Clone, PartialEq, displaydoc::Display)]
pub struct ParseError {
    pub line: u32,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, displaydoc::Display)]
pub enum ParseErrorKind {
    /// unknown command `{0}`
    UnknownCommand(String),
    /// missing argument `{0}`
    MissingArgument(&'static str),
    /// invalid `{0}`: {1}
    InvalidNumber(&'static str, ParseFloatError),
    /// `{0}` must be finite
    NotFinite(&'static str),
    /// `{0}` must not be negative
    Negative(&'static str),
    /// `{0}` must be positive
    NotPositive(&'static str),
    /// unexpected argument `{0}`
    UnexpectedArgument(String),
    /// uvMode must be 0 or 1, got `{0}`
    InvalidUvMode(String),
    /// map scale must be positive, using 1.0
    NonPositiveScale,
    /// `start` must come before the first track segment
    StartAfterTrack,
    /// {0}
    Build(BuildErrorKind),
}

pub(crate) fn parse(input: &str, track: TrackBuilder) -> Parsed {
    let mut ctx = Ctx {
        scene: Scene::default(),
        track,
        warnings: Vec::new(),
        line: 0,
    };
    for (i, text) in input.lines().enumerate() {
        ctx.line = i as u32 + 1;
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let mut p = Parser { words: text.split_ascii_whitespace() };
        let Some(command) = p.words.next() else { continue };
        if let Err(kind) = command_line(&mut p, &mut ctx, command) {
            ctx.warn(kind);
        }
    }
    let Ctx { mut scene, track, warnings, .. } = ctx;
    scene.track = track.finish();
    Parsed { scene, warnings }
}

struct Ctx {
    scene: Scene,
    track: TrackBuilder,
    warnings: Vec<ParseError>,
    line: u32,
}

impl Ctx {
    fn warn(&mut self, kind: ParseErrorKind) {
        let err = ParseError { line: self.line, kind };
        log::warn!("{err}");
        self.warnings.push(err);
    }
}

struct Parser<'i> {
    words: SplitAsciiWhitespace<'i>,
}

impl<'i> Parser<'i> {
    fn next(&mut self, name: &'static str) -> Result<&'i str, ParseErrorKind> {
        self.words.next().ok_or(ParseErrorKind::MissingArgument(name))
    }
    fn scalar(&mut self, name: &'static str) -> Result<f64, ParseErrorKind> {
        let t = self.next(name)?;
        number(name, t)
    }
    fn opt_scalar(&mut self, name: &'static str, default: f64) -> Result<f64, ParseErrorKind> {
        match self.words.next() {
            Some(t) => number(name, t),
            None => Ok(default),
        }
    }
    fn non_negative(&mut self, name: &'static str) -> Result<f64, ParseErrorKind> {
        let f = self.scalar(name)?;
        if f < 0.0 {
            Err(ParseErrorKind::Negative(name))?
        }
        Ok(f)
    }
    fn vector(&mut self, names: [&'static str; 3]) -> Result<v64, ParseErrorKind> {
        let [x, y, z] = names;
        Ok(v64(self.scalar(x)?, self.scalar(y)?, self.scalar(z)?))
    }
    fn finish(&mut self) -> Result<(), ParseErrorKind> {
        match self.words.next() {
            Some(extra) => Err(ParseErrorKind::UnexpectedArgument(extra.to_string())),
            None => Ok(()),
        }
    }
}

fn number(name: &'static str, t: &str) -> Result<f64, ParseErrorKind> {
    let f = t.parse::<f64>().map_err(|err| ParseErrorKind::InvalidNumber(name, err))?;
    if !f.is_finite() {
        Err(ParseErrorKind::NotFinite(name))?
    }
    Ok(f)
}

fn command_line(p: &mut Parser<'_>, ctx: &mut Ctx, command: &str) -> Result<(), ParseErrorKind> {
    let line = ctx.line;
    match command.to_ascii_lowercase().as_str() {
        "map" => map(p, ctx)?,
        "start" => start(p, ctx)?,
        "straight" => {
            let length = p.non_negative("length")?;
            let gradient_permille = p.opt_scalar("gradient", 0.0)?;
            p.finish()?;
            segment(ctx, SegmentKind::Straight { length, gradient_permille })?
        }
        "curve" => {
            let radius = p.non_negative("radius")?;
            let angle_deg = p.scalar("angle")?;
            let gradient_permille = p.opt_scalar("gradient", 0.0)?;
            p.finish()?;
            segment(ctx, SegmentKind::Curve { radius, angle_deg, gradient_permille })?
        }
        "building" => {
            let relative = relative(p)?;
            let width = p.non_negative("w")?;
            let depth = p.non_negative("d")?;
            let height = p.non_negative("h")?;
            let texturing = texturing(p)?;
            p.finish()?;
            let placement = relative.place(ctx.track.head());
            ctx.scene.buildings.push(Building {
                line,
                relative,
                placement,
                width,
                depth,
                height,
                texturing,
            })
        }
        "cylinder" => {
            let relative = relative(p)?;
            let radius = p.non_negative("radius")?;
            let height = p.non_negative("height")?;
            let texturing = texturing(p)?;
            p.finish()?;
            let placement = relative.place(ctx.track.head());
            ctx.scene.cylinders.push(Cylinder {
                line,
                relative,
                placement,
                radius,
                height,
                texturing,
            })
        }
        "sphere" => {
            let offset = p.vector(["rel_x", "rel_y", "rel_z"])?;
            let radius = p.non_negative("radius")?;
            let texturing = texturing(p)?;
            p.finish()?;
            let relative = Relative { offset, ..Relative::default() };
            let placement = relative.place(ctx.track.head());
            ctx.scene.spheres.push(Sphere { line, relative, placement, radius, texturing })
        }
        "tree" => {
            let offset = p.vector(["rel_x", "rel_y", "rel_z"])?;
            let height = p.non_negative("height")?;
            p.finish()?;
            let pos = ctx.track.head().to_world(offset);
            ctx.scene.trees.push(Tree { line, offset, pos, height })
        }
        _ => Err(ParseErrorKind::UnknownCommand(command.to_string()))?,
    }
    Ok(())
}

fn map(p: &mut Parser<'_>, ctx: &mut Ctx) -> Result<(), ParseErrorKind> {
    let filename = p.next("file")?.to_string();
    let cx = p.scalar("cx")?;
    let cz = p.scalar("cz")?;
    let mut world_scale = p.scalar("scale")?;
    p.finish()?;
    if world_scale <= 0.0 {
        ctx.warn(ParseErrorKind::NonPositiveScale);
        world_scale = 1.0;
    }
    ctx.scene.map =
        Some(Map { filename, world_center: geom::xz(cx, cz), world_scale, line: ctx.line });
    Ok(())
}

fn start(p: &mut Parser<'_>, ctx: &mut Ctx) -> Result<(), ParseErrorKind> {
    let position = p.vector(["x", "y", "z"])?;
    let angle_deg = p.scalar("angle")?;
    p.finish()?;
    if !ctx.track.set_start(Pose::new(position, angle_deg.to_radians())) {
        Err(ParseErrorKind::StartAfterTrack)?
    }
    ctx.scene.start = Some(Start { position, angle_deg, line: ctx.line });
    Ok(())
}

fn segment(ctx: &mut Ctx, kind: SegmentKind) -> Result<(), ParseErrorKind> {
    ctx.track.push(kind, ctx.line).map_err(|err| ParseErrorKind::Build(err.kind))?;
    Ok(())
}

fn relative(p: &mut Parser<'_>) -> Result<Relative, ParseErrorKind> {
    let offset = p.vector(["rel_x", "rel_y", "rel_z"])?;
    let rx_deg = p.scalar("rx")?;
    let ry_deg = p.scalar("rel_ry")?;
    let rz_deg = p.scalar("rz")?;
    Ok(Relative { offset, rx_deg, ry_deg, rz_deg })
}

fn texturing(p: &mut Parser<'_>) -> Result<Texturing, ParseErrorKind> {
    let mut res = Texturing::default();
    let Some(tex) = p.words.next() else { return Ok(res) };
    if tex != "-" {
        res.texture = Some(tex.to_string());
    }
    res.u_offset = p.opt_scalar("uOff", res.u_offset)?;
    res.v_offset = p.opt_scalar("vOff", res.v_offset)?;
    res.angle_deg = p.opt_scalar("tAng", res.angle_deg)?;
    if let Some(mode) = p.words.next() {
        res.uv_mode = match mode {
            "0" => UvMode::Tile,
            "1" => UvMode::Stretch,
            _ => Err(ParseErrorKind::InvalidUvMode(mode.to_string()))?,
        }
    }
    for (name, slot) in [("uScale", &mut res.u_scale), ("vScale", &mut res.v_scale)] {
        *slot = p.opt_scalar(name, *slot)?;
        if *slot <= 0.0 {
            Err(ParseErrorKind::NotPositive(name))?
        }
    }
    Ok(res)
}
