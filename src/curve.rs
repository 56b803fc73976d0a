//! Smooth path synthesis, path reversal and the path mini-language

use std::fmt;

use crate::error::{Result, SpectrumError};

/// A point in drawing space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

/// One drawing command of a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Lift the pen and put it down at `at`; start and end coincide
    Move { at: Point },
    Line { start: Point, end: Point },
    Cubic {
        start: Point,
        control1: Point,
        control2: Point,
        end: Point,
    },
}

impl PathSegment {
    pub fn start(&self) -> Point {
        match *self {
            PathSegment::Move { at } => at,
            PathSegment::Line { start, .. } | PathSegment::Cubic { start, .. } => start,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            PathSegment::Move { at } => at,
            PathSegment::Line { end, .. } | PathSegment::Cubic { end, .. } => end,
        }
    }

    /// Tag letter used in the path mini-language
    pub fn kind(&self) -> char {
        match self {
            PathSegment::Move { .. } => 'M',
            PathSegment::Line { .. } => 'L',
            PathSegment::Cubic { .. } => 'C',
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, PathSegment::Move { .. })
    }

    /// The same segment traversed end to start. Moves are anchors and stay put.
    pub fn reversed(&self) -> PathSegment {
        match *self {
            PathSegment::Move { at } => PathSegment::Move { at },
            PathSegment::Line { start, end } => PathSegment::Line { start: end, end: start },
            PathSegment::Cubic {
                start,
                control1,
                control2,
                end,
            } => PathSegment::Cubic {
                start: end,
                control1: control2,
                control2: control1,
                end: start,
            },
        }
    }

    fn map_points(&self, f: &impl Fn(Point) -> Point) -> PathSegment {
        match *self {
            PathSegment::Move { at } => PathSegment::Move { at: f(at) },
            PathSegment::Line { start, end } => PathSegment::Line {
                start: f(start),
                end: f(end),
            },
            PathSegment::Cubic {
                start,
                control1,
                control2,
                end,
            } => PathSegment::Cubic {
                start: f(start),
                control1: f(control1),
                control2: f(control2),
                end: f(end),
            },
        }
    }
}

/// A non-empty segment sequence that begins with a Move.
///
/// Paths are implicitly closed: the serialized form ends with `Z`.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Validate and wrap a segment list.
    ///
    /// Besides starting with a Move, every drawing segment must start where
    /// the previous segment ended, and every Move must be followed by at
    /// least one drawing segment unless it is the whole path.
    pub fn new(segments: Vec<PathSegment>) -> Result<Self> {
        let Some(first) = segments.first() else {
            return Err(SpectrumError::MalformedPath("a path needs at least one segment".to_string()));
        };
        if !first.is_move() {
            return Err(SpectrumError::MalformedPath(format!(
                "a path must begin with M, found {}",
                first.kind()
            )));
        }

        for (i, pair) in segments.windows(2).enumerate() {
            let (prev, next) = (pair[0], pair[1]);
            if next.is_move() {
                if prev.is_move() {
                    return Err(SpectrumError::MalformedPath(format!("M at segment {} draws nothing", i)));
                }
            } else if !coincides(next.start(), prev.end()) {
                return Err(SpectrumError::MalformedPath(format!(
                    "segment {} starts at {},{} but the pen is at {},{}",
                    i + 1,
                    next.start().x,
                    next.start().y,
                    prev.end().x,
                    prev.end().y
                )));
            }
        }
        if segments.len() > 1 && segments[segments.len() - 1].is_move() {
            return Err(SpectrumError::MalformedPath(format!(
                "M at segment {} draws nothing",
                segments.len() - 1
            )));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; kept for symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Where the pen rests after the last segment
    pub fn end(&self) -> Point {
        self.segments[self.segments.len() - 1].end()
    }

    /// Apply `f` to every point, including control points.
    ///
    /// Affine maps keep Bezier segments exact.
    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> Path {
        Path {
            segments: self.segments.iter().map(|s| s.map_points(&f)).collect(),
        }
    }

    /// Append `other`, replacing its leading Move with a Line from the current end
    pub fn join(&mut self, other: &Path) {
        let (first, rest) = other.segments.split_at(1);
        let end = self.end();
        let target = first[0].end();
        if target != end {
            self.segments.push(PathSegment::Line { start: end, end: target });
        }
        self.segments.extend_from_slice(rest);
    }
}

/// Build a smooth path through `data` from Hermite tangents.
///
/// Tangents are Y slopes by finite differences: forward at the first
/// point, backward at the last, central elsewhere. Each span becomes one
/// cubic with controls at a third and two thirds of the X span, offset in Y
/// by `tangent / 3`. A single point gives a lone Move.
pub fn cubic_bezier_curves<P>(
    data: &[P],
    get_x: impl Fn(&P) -> f64,
    get_y: impl Fn(&P) -> f64,
) -> Result<Path> {
    let points: Vec<Point> = data.iter().map(|d| Point::new(get_x(d), get_y(d))).collect();
    let Some(&first) = points.first() else {
        return Err(SpectrumError::EmptyPoints);
    };

    let mut segments = Vec::with_capacity(points.len());
    segments.push(PathSegment::Move { at: first });
    if points.len() == 1 {
        return Path::new(segments);
    }

    let last = points.len() - 1;
    let tangents: Vec<f64> = (0..points.len())
        .map(|i| {
            let (p0, p1) = if i == 0 {
                (points[0], points[1])
            } else if i == last {
                (points[last - 1], points[last])
            } else {
                (points[i - 1], points[i + 1])
            };
            (p1.y - p0.y) / (p1.x - p0.x)
        })
        .collect();

    for (i, pair) in points.windows(2).enumerate() {
        let (start, end) = (pair[0], pair[1]);
        segments.push(PathSegment::Cubic {
            start,
            control1: Point::new((start.x * 2.0 + end.x) / 3.0, start.y + tangents[i] / 3.0),
            control2: Point::new((start.x + end.x * 2.0) / 3.0, end.y - tangents[i + 1] / 3.0),
            end,
        });
    }

    Path::new(segments)
}

/// A Move to `d`
pub fn move_to<P>(d: &P, get_x: impl Fn(&P) -> f64, get_y: impl Fn(&P) -> f64) -> PathSegment {
    PathSegment::Move {
        at: Point::new(get_x(d), get_y(d)),
    }
}

/// A straight Line from `d1` to `d2`
pub fn line<P>(d1: &P, d2: &P, get_x: impl Fn(&P) -> f64, get_y: impl Fn(&P) -> f64) -> PathSegment {
    PathSegment::Line {
        start: Point::new(get_x(d1), get_y(d1)),
        end: Point::new(get_x(d2), get_y(d2)),
    }
}

/// Straight-line fallback for `cubic_bezier_curves`
pub fn abs_lines<P>(
    data: &[P],
    get_x: impl Fn(&P) -> f64,
    get_y: impl Fn(&P) -> f64,
) -> Result<Path> {
    let Some(first) = data.first() else {
        return Err(SpectrumError::EmptyPoints);
    };

    let mut segments = Vec::with_capacity(data.len());
    segments.push(move_to(first, &get_x, &get_y));
    for pair in data.windows(2) {
        segments.push(line(&pair[0], &pair[1], &get_x, &get_y));
    }
    Path::new(segments)
}

/// Same position, treating NaN coordinates as equal to themselves
fn coincides(a: Point, b: Point) -> bool {
    let same = |u: f64, v: f64| u == v || (u.is_nan() && v.is_nan());
    same(a.x, b.x) && same(a.y, b.y)
}

/// Coordinate as printed; negative zero prints as `0`
fn coord(v: f64) -> f64 {
    v + 0.0
}

impl fmt::Display for Path {
    /// The compact path language: `M x,y`, `L x,y`,
    /// `C cx1,cy1,cx2,cy2,ex,ey`, no separators, closed with `Z`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match *segment {
                PathSegment::Move { at } => write!(f, "M{},{}", coord(at.x), coord(at.y))?,
                PathSegment::Line { end, .. } => write!(f, "L{},{}", coord(end.x), coord(end.y))?,
                PathSegment::Cubic {
                    control1,
                    control2,
                    end,
                    ..
                } => write!(
                    f,
                    "C{},{},{},{},{},{}",
                    coord(control1.x),
                    coord(control1.y),
                    coord(control2.x),
                    coord(control2.y),
                    coord(end.x),
                    coord(end.y)
                )?,
            }
        }
        f.write_str("Z")
    }
}

/// Serialize a path to its text form
pub fn to_path(path: &Path) -> String {
    path.to_string()
}

/// The path traversed in the opposite direction.
///
/// Each sub-path (a Move and the drawing segments after it) has its
/// segments reversed and reordered, and its Move re-anchored at the new
/// starting point; sub-paths are emitted last to first. Since `Path::new`
/// only admits chained segments and Moves that draw something, reversing
/// twice gives back the original path. A lone Move is returned unchanged.
pub fn reverse_path_components(path: &Path) -> Path {
    let segments = path.segments();
    let mut subpaths = Vec::new();
    let mut begin = 0;
    for i in 1..=segments.len() {
        if i == segments.len() || segments[i].is_move() {
            if i - begin > 1 {
                subpaths.push(&segments[begin + 1..i]);
            }
            begin = i;
        }
    }

    if subpaths.is_empty() {
        return path.clone();
    }

    let mut reversed = Vec::with_capacity(segments.len());
    for draws in subpaths.into_iter().rev() {
        reversed.push(PathSegment::Move {
            at: draws[draws.len() - 1].end(),
        });
        reversed.extend(draws.iter().rev().map(PathSegment::reversed));
    }
    Path { segments: reversed }
}

/// Parse the output of `to_path` back into a path.
///
/// Segment starts are taken from the pen position. A trailing `Z` is
/// optional; anything after it is rejected.
pub fn parse_path(text: &str) -> Result<Path> {
    let mut segments = Vec::new();
    let mut pen: Option<Point> = None;
    let text = text.trim();
    let mut chars = text.char_indices().peekable();
    let mut closed = false;

    while let Some((pos, tag)) = chars.next() {
        if tag.is_whitespace() {
            continue;
        }
        if closed {
            return Err(SpectrumError::MalformedPath(format!(
                "unexpected {:?} after Z at offset {}",
                tag, pos
            )));
        }
        if !tag.is_ascii_alphabetic() {
            return Err(SpectrumError::MalformedPath(format!(
                "expected a segment tag at offset {}, found {:?}",
                pos, tag
            )));
        }

        let body_start = pos + tag.len_utf8();
        let mut body_end = body_start;
        while let Some(&(next_pos, c)) = chars.peek() {
            if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
                break;
            }
            body_end = next_pos + c.len_utf8();
            chars.next();
        }
        let numbers = parse_numbers(&text[body_start..body_end], tag)?;

        let expect = |n: usize| -> Result<()> {
            if numbers.len() == n {
                Ok(())
            } else {
                Err(SpectrumError::MalformedPath(format!(
                    "{} takes {} numbers, got {}",
                    tag,
                    n,
                    numbers.len()
                )))
            }
        };
        let current = || {
            pen.ok_or_else(|| SpectrumError::MalformedPath(format!("{} before any M", tag)))
        };

        let segment = match tag {
            'M' => {
                expect(2)?;
                PathSegment::Move {
                    at: Point::new(numbers[0], numbers[1]),
                }
            }
            'L' => {
                expect(2)?;
                PathSegment::Line {
                    start: current()?,
                    end: Point::new(numbers[0], numbers[1]),
                }
            }
            'C' => {
                expect(6)?;
                PathSegment::Cubic {
                    start: current()?,
                    control1: Point::new(numbers[0], numbers[1]),
                    control2: Point::new(numbers[2], numbers[3]),
                    end: Point::new(numbers[4], numbers[5]),
                }
            }
            'Z' => {
                expect(0)?;
                closed = true;
                continue;
            }
            other => return Err(SpectrumError::UnknownSegmentKind(other)),
        };
        pen = Some(segment.end());
        segments.push(segment);
    }

    Path::new(segments)
}

fn parse_numbers(body: &str, tag: char) -> Result<Vec<f64>> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }
    body.split(',')
        .map(|n| {
            n.trim().parse::<f64>().map_err(|_| {
                SpectrumError::MalformedPath(format!("bad number {:?} in {} segment", n, tag))
            })
        })
        .collect()
}

/// Approximate a path with straight pieces for raster renderers.
///
/// Each piece is `(segment index, from, to)`; cubics are split into
/// `steps` pieces by evaluating the curve, Moves produce nothing.
pub fn flatten(path: &Path, steps: usize) -> Vec<(usize, Point, Point)> {
    let steps = steps.max(1);
    let mut pieces = Vec::new();
    for (index, segment) in path.segments().iter().enumerate() {
        match *segment {
            PathSegment::Move { .. } => {}
            PathSegment::Line { start, end } => pieces.push((index, start, end)),
            PathSegment::Cubic {
                start,
                control1,
                control2,
                end,
            } => {
                let mut prev = start;
                for step in 1..=steps {
                    let next = if step == steps {
                        end
                    } else {
                        cubic_point(start, control1, control2, end, step as f64 / steps as f64)
                    };
                    pieces.push((index, prev, next));
                    prev = next;
                }
            }
        }
    }
    pieces
}

/// de Casteljau evaluation of a cubic Bezier at `t`
fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let a = p0.lerp(p1, t);
    let b = p1.lerp(p2, t);
    let c = p2.lerp(p3, t);
    let d = a.lerp(b, t);
    let e = b.lerp(c, t);
    d.lerp(e, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn px(p: &(f64, f64)) -> f64 {
        p.0
    }

    fn py(p: &(f64, f64)) -> f64 {
        p.1
    }

    #[test]
    fn test_single_point_is_a_lone_move() {
        let path = cubic_bezier_curves(&[(3.0, 4.0)], px, py).unwrap();
        assert_eq!(
            path.segments(),
            &[PathSegment::Move {
                at: Point::new(3.0, 4.0)
            }]
        );
        assert_eq!(to_path(&path), "M3,4Z");
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let empty: [(f64, f64); 0] = [];
        assert_eq!(cubic_bezier_curves(&empty, px, py), Err(SpectrumError::EmptyPoints));
        assert_eq!(abs_lines(&empty, px, py), Err(SpectrumError::EmptyPoints));
    }

    #[test]
    fn test_cubic_controls_follow_tangents() {
        let data = [(0.0, 0.0), (1.0, 3.0), (2.0, 0.0), (3.0, 3.0)];
        let path = cubic_bezier_curves(&data, px, py).unwrap();
        assert_eq!(path.len(), 4);

        // tangents: forward 3, central 0, central 0, backward 3
        match path.segments()[1] {
            PathSegment::Cubic {
                start,
                control1,
                control2,
                end,
            } => {
                assert_eq!(start, Point::new(0.0, 0.0));
                assert_eq!(end, Point::new(1.0, 3.0));
                assert_abs_diff_eq!(control1.x, 1.0 / 3.0, epsilon = 1e-12);
                assert_abs_diff_eq!(control1.y, 1.0, epsilon = 1e-12);
                assert_abs_diff_eq!(control2.x, 2.0 / 3.0, epsilon = 1e-12);
                assert_abs_diff_eq!(control2.y, 3.0, epsilon = 1e-12);
            }
            other => panic!("expected a cubic, got {:?}", other),
        }
        match path.segments()[3] {
            PathSegment::Cubic { control1, control2, .. } => {
                assert_abs_diff_eq!(control1.y, 0.0, epsilon = 1e-12);
                assert_abs_diff_eq!(control2.y, 2.0, epsilon = 1e-12);
            }
            other => panic!("expected a cubic, got {:?}", other),
        }
    }

    #[test]
    fn test_abs_lines_serialization() {
        let data = [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)];
        let path = abs_lines(&data, px, py).unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Move { at: Point::new(0.0, 0.0) },
                PathSegment::Line {
                    start: Point::new(0.0, 0.0),
                    end: Point::new(1.0, 1.0)
                },
                PathSegment::Line {
                    start: Point::new(1.0, 1.0),
                    end: Point::new(2.0, 0.0)
                },
            ]
        );
        assert_eq!(to_path(&path), "M0,0L1,1L2,0Z");
    }

    #[test]
    fn test_cubic_serialization() {
        let data = [(0.0, 0.0), (3.0, 0.0)];
        let path = cubic_bezier_curves(&data, px, py).unwrap();
        assert_eq!(to_path(&path), "M0,0C1,0,2,0,3,0Z");
    }

    #[test]
    fn test_reverse_swaps_and_reanchors() {
        let data = [(0.0, 0.0), (1.0, 2.0), (2.0, 1.0)];
        let path = cubic_bezier_curves(&data, px, py).unwrap();
        let reversed = reverse_path_components(&path);

        assert_eq!(reversed.len(), path.len());
        assert_eq!(reversed.segments()[0], PathSegment::Move { at: Point::new(2.0, 1.0) });
        assert_eq!(reversed.segments()[1], path.segments()[2].reversed());
        assert_eq!(reversed.segments()[2], path.segments()[1].reversed());
        assert_eq!(reversed.end(), Point::new(0.0, 0.0));

        if let (
            PathSegment::Cubic { control1: a1, control2: a2, .. },
            PathSegment::Cubic { control1: b1, control2: b2, .. },
        ) = (path.segments()[2], reversed.segments()[1])
        {
            assert_eq!(a1, b2);
            assert_eq!(a2, b1);
        } else {
            panic!("expected cubic segments");
        }
    }

    #[test]
    fn test_double_reversal_is_identity() {
        let curve = cubic_bezier_curves(&[(0.0, 1.0), (1.0, 5.0), (2.0, -2.0), (3.0, 0.5)], px, py).unwrap();
        let lines = abs_lines(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)], px, py).unwrap();
        let mut joined = curve.clone();
        joined.join(&lines);

        for path in [curve, lines, joined] {
            let twice = reverse_path_components(&reverse_path_components(&path));
            assert_eq!(twice, path);
            assert_eq!(to_path(&twice), to_path(&path));
        }
    }

    #[test]
    fn test_moves_that_draw_nothing_are_rejected() {
        let leading = Path::new(vec![
            PathSegment::Move { at: Point::new(9.0, 9.0) },
            PathSegment::Move { at: Point::new(0.0, 0.0) },
            PathSegment::Line {
                start: Point::new(0.0, 0.0),
                end: Point::new(1.0, 0.0),
            },
        ]);
        assert!(matches!(leading, Err(SpectrumError::MalformedPath(_))));

        assert!(matches!(parse_path("M0,0L1,0M5,5Z"), Err(SpectrumError::MalformedPath(_))));
        assert!(matches!(parse_path("M0,0M5,5L6,6Z"), Err(SpectrumError::MalformedPath(_))));
        assert!(parse_path("M5,5Z").is_ok());
    }

    #[test]
    fn test_unchained_segments_are_rejected() {
        let gap = Path::new(vec![
            PathSegment::Move { at: Point::new(9.0, 9.0) },
            PathSegment::Line {
                start: Point::new(0.0, 0.0),
                end: Point::new(1.0, 0.0),
            },
        ]);
        assert!(matches!(gap, Err(SpectrumError::MalformedPath(_))));

        let chained = Path::new(vec![
            PathSegment::Move { at: Point::new(0.0, 0.0) },
            PathSegment::Line {
                start: Point::new(0.0, 0.0),
                end: Point::new(1.0, 0.0),
            },
        ]);
        assert!(chained.is_ok());
    }

    #[test]
    fn test_every_parsed_path_survives_double_reversal() {
        for text in ["M0,0L1,0M5,5L6,6Z", "M0,0C1,2,3,4,5,6L7,7Z", "M2,3Z"] {
            let path = parse_path(text).unwrap();
            let twice = reverse_path_components(&reverse_path_components(&path));
            assert_eq!(to_path(&twice), text);
        }
    }

    #[test]
    fn test_negative_zero_prints_as_zero() {
        let path = abs_lines(&[(0.0, -0.0), (-0.0, 1.0)], px, py).unwrap();
        assert_eq!(to_path(&path), "M0,0L0,1Z");
        assert_eq!(path.to_string(), to_path(&path));
    }

    #[test]
    fn test_reverse_handles_multiple_subpaths() {
        let path = parse_path("M0,0L1,0M5,5L6,6Z").unwrap();
        let reversed = reverse_path_components(&path);
        assert_eq!(to_path(&reversed), "M6,6L5,5M1,0L0,0Z");
    }

    #[test]
    fn test_move_only_path_is_unchanged_by_reversal() {
        let path = cubic_bezier_curves(&[(1.0, 1.0)], px, py).unwrap();
        assert_eq!(reverse_path_components(&path), path);
    }

    #[test]
    fn test_join_bridges_with_a_line() {
        let mut upper = abs_lines(&[(0.0, 1.0), (1.0, 1.0)], px, py).unwrap();
        let lower = abs_lines(&[(1.0, -1.0), (0.0, -1.0)], px, py).unwrap();
        upper.join(&lower);
        assert_eq!(to_path(&upper), "M0,1L1,1L1,-1L0,-1Z");
    }

    #[test]
    fn test_parse_round_trip() {
        let path = cubic_bezier_curves(&[(0.0, 0.25), (0.5, 1.5), (1.0, -0.75)], px, py).unwrap();
        let text = to_path(&path);
        assert_eq!(parse_path(&text).unwrap(), path);
    }

    #[test]
    fn test_parse_rejects_unknown_and_malformed() {
        assert_eq!(parse_path("M0,0Q1,1,2,2Z"), Err(SpectrumError::UnknownSegmentKind('Q')));
        assert!(matches!(parse_path("L1,1Z"), Err(SpectrumError::MalformedPath(_))));
        assert!(matches!(parse_path("M0,0L1Z"), Err(SpectrumError::MalformedPath(_))));
        assert!(matches!(parse_path("M0,0ZL1,1"), Err(SpectrumError::MalformedPath(_))));
        assert!(matches!(parse_path(""), Err(SpectrumError::MalformedPath(_))));
    }

    #[test]
    fn test_map_points_scales_controls() {
        let path = cubic_bezier_curves(&[(0.0, 0.0), (3.0, 0.0)], px, py).unwrap();
        let scaled = path.map_points(|p| Point::new(p.x * 10.0, p.y + 1.0));
        assert_eq!(to_path(&scaled), "M0,1C10,1,20,1,30,1Z");
    }

    #[test]
    fn test_flatten_follows_curve() {
        let path = cubic_bezier_curves(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)], px, py).unwrap();
        let pieces = flatten(&path, 4);
        assert_eq!(pieces.len(), 8);
        assert_eq!(pieces[0].1, Point::new(0.0, 0.0));
        assert_eq!(pieces[3].2, Point::new(1.0, 1.0));
        assert_eq!(pieces[7].2, Point::new(2.0, 0.0));
        assert!(pieces[..4].iter().all(|p| p.0 == 1));
    }
}
