//! Story definition: narrative sections plus everything the map needs.
//!
//! Stories are plain text: `#` comments, `[block]` headers and
//! `key = value` lines.  See `default.story` for the built-in example.

use std::collections::HashMap;
use std::path::Path;

use super::actions::{EntryAction, MarkerFilter, SectionActionTable};
use super::engine::StoryController;
use super::error::StoryError;
use super::route::{LineLayer, MapPoint};

/// Source of the built-in story.
pub const DEFAULT_STORY: &str = include_str!("default.story");

// ───────────────────────────────────────── types ─────────────

/// A named camera viewpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    pub name: String,
    pub center: MapPoint,
    /// Half-width of the visible map area, in map units.
    pub extent: f64,
}

/// A point of interest; marker filters match on `name`.
#[derive(Debug, Clone, PartialEq)]
pub struct Poi {
    pub name: String,
    pub at: MapPoint,
}

/// Narrative content of one section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionText {
    pub id: String,
    pub title: String,
    pub paragraphs: Vec<String>,
}

/// A fully parsed story.
#[derive(Debug, Clone)]
pub struct StoryScript {
    pub title: String,
    pub sections: Vec<SectionText>,
    pub bookmarks: Vec<Bookmark>,
    pub pois: Vec<Poi>,
    /// Route features animated by section progress.
    pub route: LineLayer,
    /// Secondary layer toggled by entry actions.
    pub hiking: LineLayer,
    pub actions: SectionActionTable,
    /// Section id → ordinal into the route's feature ids.
    pub animation_index: HashMap<String, usize>,
}

impl StoryScript {
    /// The built-in story.
    pub fn builtin() -> Result<Self, StoryError> {
        Self::parse(DEFAULT_STORY)
    }

    /// Read and parse a story file.
    pub fn load(path: &Path) -> Result<Self, StoryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a story and validate its bookmark references.
    pub fn parse(src: &str) -> Result<Self, StoryError> {
        let mut parser = Parser::default();
        for (i, raw) in src.lines().enumerate() {
            parser.line(i + 1, raw.trim())?;
        }
        parser.finish()
    }

    /// A fresh controller for this story.
    pub fn controller(&self) -> StoryController {
        StoryController::new(self.actions.clone(), self.animation_index.clone())
    }
}

// ───────────────────────────────────────── parser ────────────

#[derive(Debug)]
enum Block {
    Header,
    Bookmark(PartialBookmark),
    Poi(PartialPoi),
    Line {
        hiking: bool,
        kind: Option<String>,
        points: Option<Vec<MapPoint>>,
    },
    Section(PartialSection),
}

#[derive(Debug, Default)]
struct PartialBookmark {
    name: Option<String>,
    center: Option<MapPoint>,
    extent: Option<f64>,
}

#[derive(Debug, Default)]
struct PartialPoi {
    name: Option<String>,
    at: Option<MapPoint>,
}

#[derive(Debug, Default)]
struct PartialSection {
    id: String,
    title: Option<String>,
    paragraphs: Vec<String>,
    filter: Option<MarkerFilter>,
    bookmark: Option<usize>,
    hiking: Option<bool>,
    animate: Option<usize>,
}

#[derive(Debug)]
struct Parser {
    block: Block,
    /// Line where the current block started, for error messages.
    block_line: usize,
    title: String,
    sections: Vec<SectionText>,
    bookmarks: Vec<Bookmark>,
    pois: Vec<Poi>,
    route: Vec<(Option<String>, Vec<MapPoint>)>,
    hiking: Vec<(Option<String>, Vec<MapPoint>)>,
    actions: SectionActionTable,
    animation_index: HashMap<String, usize>,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            block: Block::Header,
            block_line: 0,
            title: String::from("Untitled story"),
            sections: Vec::new(),
            bookmarks: Vec::new(),
            pois: Vec::new(),
            route: Vec::new(),
            hiking: Vec::new(),
            actions: SectionActionTable::new(),
            animation_index: HashMap::new(),
        }
    }
}

impl Parser {
    fn line(&mut self, n: usize, line: &str) -> Result<(), StoryError> {
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        if let Some(header) = line.strip_prefix('[') {
            let header = header
                .strip_suffix(']')
                .ok_or_else(|| StoryError::parse(n, "unterminated block header"))?;
            return self.open_block(n, header.trim());
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(StoryError::parse(n, format!("expected `key = value`, got `{line}`")));
        };
        self.field(n, key.trim(), value.trim())
    }

    fn open_block(&mut self, n: usize, header: &str) -> Result<(), StoryError> {
        self.close_block()?;
        let (kind, arg) = match header.split_once(char::is_whitespace) {
            Some((kind, arg)) => (kind, Some(arg.trim())),
            None => (header, None),
        };
        self.block = match (kind, arg) {
            ("bookmark", None) => Block::Bookmark(PartialBookmark::default()),
            ("poi", None) => Block::Poi(PartialPoi::default()),
            ("route", None) => Block::Line {
                hiking: false,
                kind: None,
                points: None,
            },
            ("hike", None) => Block::Line {
                hiking: true,
                kind: None,
                points: None,
            },
            ("section", Some(id)) if !id.is_empty() => {
                if self.sections.iter().any(|s| s.id == id) {
                    return Err(StoryError::parse(n, format!("duplicate section `{id}`")));
                }
                Block::Section(PartialSection {
                    id: id.to_string(),
                    ..PartialSection::default()
                })
            }
            ("section", _) => return Err(StoryError::parse(n, "section block needs an id")),
            _ => return Err(StoryError::parse(n, format!("unknown block `[{header}]`"))),
        };
        self.block_line = n;
        Ok(())
    }

    fn field(&mut self, n: usize, key: &str, value: &str) -> Result<(), StoryError> {
        match &mut self.block {
            Block::Header => match key {
                "title" => self.title = value.to_string(),
                _ => return Err(unknown_key(n, key)),
            },
            Block::Bookmark(b) => match key {
                "name" => b.name = Some(value.to_string()),
                "center" => b.center = Some(parse_point(n, value)?),
                "extent" => {
                    let extent = parse_f64(n, value)?;
                    if extent <= 0.0 {
                        return Err(StoryError::parse(n, "extent must be positive"));
                    }
                    b.extent = Some(extent);
                }
                _ => return Err(unknown_key(n, key)),
            },
            Block::Poi(p) => match key {
                "name" => p.name = Some(value.to_string()),
                "at" => p.at = Some(parse_point(n, value)?),
                _ => return Err(unknown_key(n, key)),
            },
            Block::Line { kind, points, .. } => match key {
                "kind" => *kind = Some(value.to_string()),
                "points" => *points = Some(parse_points(n, value)?),
                _ => return Err(unknown_key(n, key)),
            },
            Block::Section(s) => match key {
                "title" => s.title = Some(value.to_string()),
                "text" => s.paragraphs.push(value.to_string()),
                "filter" => s.filter = Some(parse_filter(n, value)?),
                "bookmark" => s.bookmark = Some(parse_usize(n, value)?),
                "hiking" => s.hiking = Some(parse_bool(n, value)?),
                "animate" => s.animate = Some(parse_usize(n, value)?),
                _ => return Err(unknown_key(n, key)),
            },
        }
        Ok(())
    }

    /// Move the block under construction into the finished collections.
    fn close_block(&mut self) -> Result<(), StoryError> {
        let n = self.block_line;
        match std::mem::replace(&mut self.block, Block::Header) {
            Block::Header => {}
            Block::Bookmark(b) => {
                let ordinal = self.bookmarks.len() + 1;
                self.bookmarks.push(Bookmark {
                    name: b.name.unwrap_or_else(|| format!("Bookmark {ordinal}")),
                    center: b.center.ok_or_else(|| missing(n, "bookmark", "center"))?,
                    extent: b.extent.ok_or_else(|| missing(n, "bookmark", "extent"))?,
                });
            }
            Block::Poi(p) => self.pois.push(Poi {
                name: p.name.ok_or_else(|| missing(n, "poi", "name"))?,
                at: p.at.ok_or_else(|| missing(n, "poi", "at"))?,
            }),
            Block::Line {
                hiking,
                kind,
                points,
            } => {
                let block = if hiking { "hike" } else { "route" };
                let points = points.ok_or_else(|| missing(n, block, "points"))?;
                if points.len() < 2 {
                    return Err(StoryError::parse(n, format!("{block} needs at least two points")));
                }
                let target = if hiking { &mut self.hiking } else { &mut self.route };
                target.push((kind, points));
            }
            Block::Section(s) => {
                match s.bookmark {
                    Some(bookmark) => self.actions.insert(
                        s.id.clone(),
                        EntryAction {
                            filter: s.filter.unwrap_or(MarkerFilter::Everything),
                            bookmark,
                            show_hiking: s.hiking.unwrap_or(false),
                        },
                    ),
                    None if s.filter.is_some() || s.hiking.is_some() => {
                        return Err(StoryError::parse(
                            n,
                            format!("section `{}` has an entry action but no bookmark", s.id),
                        ));
                    }
                    None => {}
                }
                if let Some(ordinal) = s.animate {
                    self.animation_index.insert(s.id.clone(), ordinal);
                }
                self.sections.push(SectionText {
                    title: s.title.unwrap_or_else(|| s.id.clone()),
                    id: s.id,
                    paragraphs: s.paragraphs,
                });
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<StoryScript, StoryError> {
        self.close_block()?;
        self.actions.validate(self.bookmarks.len())?;

        let route = LineLayer::from_paths(self.route);
        for (section, &ordinal) in &self.animation_index {
            if ordinal >= route.features.len() {
                tracing::warn!(section = %section, ordinal, "animation ordinal beyond route features");
            }
        }

        Ok(StoryScript {
            title: self.title,
            sections: self.sections,
            bookmarks: self.bookmarks,
            pois: self.pois,
            route,
            hiking: LineLayer::from_paths(self.hiking),
            actions: self.actions,
            animation_index: self.animation_index,
        })
    }
}

// ───────────────────────────────────────── values ────────────

fn unknown_key(n: usize, key: &str) -> StoryError {
    StoryError::parse(n, format!("unknown key `{key}`"))
}

fn missing(n: usize, block: &str, key: &str) -> StoryError {
    StoryError::parse(n, format!("[{block}] block is missing `{key}`"))
}

fn parse_f64(n: usize, s: &str) -> Result<f64, StoryError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| StoryError::parse(n, format!("invalid number `{s}`")))
}

fn parse_usize(n: usize, s: &str) -> Result<usize, StoryError> {
    s.trim()
        .parse::<usize>()
        .map_err(|_| StoryError::parse(n, format!("invalid index `{s}`")))
}

fn parse_bool(n: usize, s: &str) -> Result<bool, StoryError> {
    match s.trim() {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        other => Err(StoryError::parse(n, format!("expected true/false, got `{other}`"))),
    }
}

/// `x, y` or `x y`.
fn parse_point(n: usize, s: &str) -> Result<MapPoint, StoryError> {
    let coords: Vec<&str> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    match coords.as_slice() {
        [x, y] => Ok(MapPoint::new(parse_f64(n, x)?, parse_f64(n, y)?)),
        _ => Err(StoryError::parse(n, format!("expected two coordinates, got `{s}`"))),
    }
}

/// `x y; x y; ...`
fn parse_points(n: usize, s: &str) -> Result<Vec<MapPoint>, StoryError> {
    s.split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| parse_point(n, p))
        .collect()
}

/// `none`, `all` or `name in (A, B, ...)`.
fn parse_filter(n: usize, s: &str) -> Result<MarkerFilter, StoryError> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(MarkerFilter::Nothing);
    }
    if s.eq_ignore_ascii_case("all") {
        return Ok(MarkerFilter::Everything);
    }
    const PREFIX: &str = "name in";
    let list = s
        .get(..PREFIX.len())
        .filter(|head| head.eq_ignore_ascii_case(PREFIX))
        .map(|_| s[PREFIX.len()..].trim())
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| StoryError::parse(n, format!("invalid filter `{s}`")))?;
    let names = list
        .split(',')
        .map(|name| name.trim().trim_matches('\'').trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
        .collect();
    Ok(MarkerFilter::NameIn(names))
}
