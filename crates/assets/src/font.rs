use crate::AssetError;
use glam::Vec2;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::SplitWhitespace;

/// One command of a glyph outline, in font units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlineCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo { ctrl: Vec2, to: Vec2 },
    CubicTo { ctrl1: Vec2, ctrl2: Vec2, to: Vec2 },
}

/// A path command after layout, in scene units.
pub type PathCommand = OutlineCommand;

/// Glyph metrics and outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Horizontal advance in font units.
    pub advance: f32,
    pub outline: Vec<OutlineCommand>,
}

/// The laid-out outline of a single glyph. Holes are resolved per glyph.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphOutline {
    pub commands: Vec<PathCommand>,
}

/// A parsed typeface font description.
#[derive(Debug, Clone)]
pub struct Font {
    pub family_name: String,
    resolution: f32,
    line_height: f32,
    glyphs: HashMap<char, Glyph>,
}

#[derive(Deserialize)]
struct TypefaceJson {
    glyphs: HashMap<String, GlyphJson>,
    #[serde(rename = "familyName", default)]
    family_name: String,
    resolution: f32,
    #[serde(rename = "boundingBox")]
    bounding_box: BoundsJson,
    #[serde(rename = "underlineThickness", default)]
    underline_thickness: f32,
}

#[derive(Deserialize)]
struct GlyphJson {
    ha: f32,
    #[serde(default)]
    o: Option<String>,
}

#[derive(Deserialize)]
struct BoundsJson {
    #[serde(rename = "yMin")]
    y_min: f32,
    #[serde(rename = "yMax")]
    y_max: f32,
}

impl Font {
    /// Parse a typeface JSON document.
    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        let raw: TypefaceJson = serde_json::from_str(json)?;
        if raw.resolution.is_nan() || raw.resolution <= 0.0 {
            return Err(AssetError::Resolution(raw.resolution));
        }

        let mut glyphs = HashMap::with_capacity(raw.glyphs.len());
        for (key, glyph) in raw.glyphs {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                tracing::debug!("skipping multi-character glyph key {key:?}");
                continue;
            };
            let outline = match glyph.o.as_deref() {
                Some(o) => parse_outline(ch, o)?,
                None => Vec::new(),
            };
            glyphs.insert(
                ch,
                Glyph {
                    advance: glyph.ha,
                    outline,
                },
            );
        }

        let line_height =
            raw.bounding_box.y_max - raw.bounding_box.y_min + raw.underline_thickness;

        tracing::debug!(
            family = %raw.family_name,
            glyphs = glyphs.len(),
            "parsed typeface font"
        );

        Ok(Self {
            family_name: raw.family_name,
            resolution: raw.resolution,
            line_height,
            glyphs,
        })
    }

    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Glyph for `ch`, falling back to `?` when the font lacks it.
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch).or_else(|| self.glyphs.get(&'?'))
    }

    /// Lay out `text` at `size` scene units per em. Returns one outline per
    /// visible glyph; `\n` starts a new line below the previous one.
    pub fn layout(&self, text: &str, size: f32) -> Vec<GlyphOutline> {
        let scale = size / self.resolution;
        let line_height = self.line_height * scale;
        let mut offset = Vec2::ZERO;
        let mut outlines = Vec::new();

        for ch in text.chars() {
            if ch == '\n' {
                offset.x = 0.0;
                offset.y -= line_height;
                continue;
            }
            let Some(glyph) = self.glyph(ch) else {
                tracing::error!(
                    "character {ch:?} is missing from font {:?}",
                    self.family_name
                );
                continue;
            };
            let place = |p: Vec2| p * scale + offset;
            let commands: Vec<PathCommand> = glyph
                .outline
                .iter()
                .map(|cmd| match *cmd {
                    OutlineCommand::MoveTo(p) => OutlineCommand::MoveTo(place(p)),
                    OutlineCommand::LineTo(p) => OutlineCommand::LineTo(place(p)),
                    OutlineCommand::QuadTo { ctrl, to } => OutlineCommand::QuadTo {
                        ctrl: place(ctrl),
                        to: place(to),
                    },
                    OutlineCommand::CubicTo { ctrl1, ctrl2, to } => OutlineCommand::CubicTo {
                        ctrl1: place(ctrl1),
                        ctrl2: place(ctrl2),
                        to: place(to),
                    },
                })
                .collect();
            if !commands.is_empty() {
                outlines.push(GlyphOutline { commands });
            }
            offset.x += glyph.advance * scale;
        }

        outlines
    }
}

/// Parse the compact outline string of a typeface glyph.
///
/// Curve commands list the end point first: `q x y cx cy` and
/// `b x y c1x c1y c2x c2y`.
fn parse_outline(glyph: char, outline: &str) -> Result<Vec<OutlineCommand>, AssetError> {
    let mut tokens = outline.split_whitespace();
    let mut commands = Vec::new();

    while let Some(op) = tokens.next() {
        let cmd = match op {
            "m" => OutlineCommand::MoveTo(next_point(&mut tokens, glyph)?),
            "l" => OutlineCommand::LineTo(next_point(&mut tokens, glyph)?),
            "q" => {
                let to = next_point(&mut tokens, glyph)?;
                let ctrl = next_point(&mut tokens, glyph)?;
                OutlineCommand::QuadTo { ctrl, to }
            }
            "b" => {
                let to = next_point(&mut tokens, glyph)?;
                let ctrl1 = next_point(&mut tokens, glyph)?;
                let ctrl2 = next_point(&mut tokens, glyph)?;
                OutlineCommand::CubicTo { ctrl1, ctrl2, to }
            }
            // Contours close implicitly at the next move.
            "z" => continue,
            other => {
                return Err(AssetError::Outline {
                    glyph,
                    reason: format!("unknown command {other:?}"),
                });
            }
        };
        commands.push(cmd);
    }

    Ok(commands)
}

fn next_point(tokens: &mut SplitWhitespace<'_>, glyph: char) -> Result<Vec2, AssetError> {
    let mut coord = || -> Result<f32, AssetError> {
        let tok = tokens.next().ok_or_else(|| AssetError::Outline {
            glyph,
            reason: "truncated coordinate list".into(),
        })?;
        tok.parse::<f32>().map_err(|e| AssetError::Outline {
            glyph,
            reason: format!("bad number {tok:?}: {e}"),
        })
    };
    let x = coord()?;
    let y = coord()?;
    Ok(Vec2::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FONT: &str = r#"{
        "familyName": "Test Sans",
        "resolution": 1000,
        "boundingBox": { "xMin": 0, "xMax": 1000, "yMin": -200, "yMax": 800 },
        "underlineThickness": 100,
        "glyphs": {
            "H": { "ha": 600, "x_min": 0, "x_max": 600,
                   "o": "m 0 0 l 600 0 l 600 700 l 0 700 z" },
            "?": { "ha": 500, "o": "m 0 0 l 400 0 q 400 400 500 200 z" },
            " ": { "ha": 300 }
        }
    }"#;

    #[test]
    fn parses_metrics_and_glyphs() {
        let font = Font::from_json(FONT).unwrap();
        assert_eq!(font.family_name, "Test Sans");
        assert_eq!(font.resolution(), 1000.0);
        assert_eq!(font.glyph_count(), 3);
        let h = font.glyph('H').unwrap();
        assert_eq!(h.advance, 600.0);
        assert_eq!(h.outline.len(), 4);
        assert_eq!(h.outline[0], OutlineCommand::MoveTo(Vec2::ZERO));
    }

    #[test]
    fn quadratic_lists_end_point_first() {
        let font = Font::from_json(FONT).unwrap();
        let q = font.glyph('?').unwrap();
        assert_eq!(
            q.outline[2],
            OutlineCommand::QuadTo {
                ctrl: Vec2::new(500.0, 200.0),
                to: Vec2::new(400.0, 400.0),
            }
        );
    }

    #[test]
    fn cubic_lists_end_point_first() {
        let cmds = parse_outline('c', "m 0 0 b 10 0 1 2 3 4").unwrap();
        assert_eq!(
            cmds[1],
            OutlineCommand::CubicTo {
                ctrl1: Vec2::new(1.0, 2.0),
                ctrl2: Vec2::new(3.0, 4.0),
                to: Vec2::new(10.0, 0.0),
            }
        );
    }

    #[test]
    fn unknown_char_falls_back_to_question_mark() {
        let font = Font::from_json(FONT).unwrap();
        assert_eq!(font.glyph('Z'), font.glyph('?'));
    }

    #[test]
    fn layout_scales_and_advances() {
        let font = Font::from_json(FONT).unwrap();
        let outlines = font.layout("H H", 0.5);
        // The space has no outline but still advances.
        assert_eq!(outlines.len(), 2);
        let OutlineCommand::MoveTo(first) = outlines[1].commands[0] else {
            panic!("expected move");
        };
        // (600 + 300) * 0.5 / 1000
        assert!((first.x - 0.45).abs() < 1e-6);
        let OutlineCommand::LineTo(top) = outlines[0].commands[2] else {
            panic!("expected line");
        };
        assert!((top.y - 0.35).abs() < 1e-6);
    }

    #[test]
    fn newline_moves_down_by_line_height() {
        let font = Font::from_json(FONT).unwrap();
        let outlines = font.layout("H\nH", 1.0);
        let OutlineCommand::MoveTo(second) = outlines[1].commands[0] else {
            panic!("expected move");
        };
        assert_eq!(second.x, 0.0);
        // (800 - -200 + 100) / 1000
        assert!((second.y + 1.1).abs() < 1e-6);
    }

    #[test]
    fn rejects_malformed_outline() {
        let err = parse_outline('x', "m 0").unwrap_err();
        assert!(matches!(err, AssetError::Outline { glyph: 'x', .. }));
        let err = parse_outline('x', "k 1 2").unwrap_err();
        assert!(err.to_string().contains("unknown command"));
    }

    #[test]
    fn rejects_zero_resolution() {
        let json = FONT.replace("\"resolution\": 1000", "\"resolution\": 0");
        assert!(matches!(
            Font::from_json(&json),
            Err(AssetError::Resolution(_))
        ));
    }
}
