//! Resolved glyph outlines.

use ttf_read::{
    tables::glyf::{Anchor, Component, CompositeGlyphFlags, SimpleGlyph, Transform},
    types::{BoundingBox, Point},
    ReadError,
};

use crate::GlyphId;

/// A point in a glyph outline, in font units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutlinePoint {
    pub x: i32,
    pub y: i32,
    /// `false` for the control point of a quadratic curve.
    pub on_curve: bool,
}

impl OutlinePoint {
    pub fn new(x: i32, y: i32, on_curve: bool) -> Self {
        Self { x, y, on_curve }
    }

    /// The position of the point.
    pub fn point(&self) -> Point<i32> {
        Point::new(self.x, self.y)
    }
}

/// The fully resolved outline of a glyph.
///
/// Composite glyphs are flattened when the font is loaded, so an outline
/// never refers to another glyph. For a non-empty outline, the last entry
/// of `contour_ends` is the index of the last point.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outline {
    pub glyph_id: GlyphId,
    /// Index of the last point of each contour.
    pub contour_ends: Vec<u16>,
    pub points: Vec<OutlinePoint>,
    pub bounds: BoundingBox<i32>,
    /// TrueType hinting instructions; stored, never executed.
    ///
    /// For a composite this is only the composite's own trailing block;
    /// instructions of its components are not inherited.
    pub instructions: Vec<u8>,
}

impl Outline {
    /// An outline with no contours.
    pub fn empty(glyph_id: GlyphId) -> Self {
        Self {
            glyph_id,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the points of each contour.
    pub fn contours(&self) -> impl Iterator<Item = &[OutlinePoint]> + '_ {
        let mut start = 0;
        self.contour_ends.iter().filter_map(move |end| {
            let end = *end as usize + 1;
            let contour = self.points.get(start..end);
            start = end;
            contour
        })
    }

    pub(crate) fn from_simple(glyph_id: GlyphId, glyph: &SimpleGlyph) -> Result<Self, ReadError> {
        let bbox = glyph.header().bbox;
        let points = glyph
            .read_points()?
            .into_iter()
            .map(|point| OutlinePoint::new(point.x as i32, point.y as i32, point.on_curve))
            .collect();
        Ok(Self {
            glyph_id,
            contour_ends: glyph
                .end_pts_of_contours()
                .iter()
                .map(|end| end.get())
                .collect(),
            points,
            bounds: BoundingBox {
                x_min: bbox.x_min as i32,
                y_min: bbox.y_min as i32,
                x_max: bbox.x_max as i32,
                y_max: bbox.y_max as i32,
            },
            instructions: glyph.instructions().to_vec(),
        })
    }

    /// Appends the points and contours of `child`, placed as described by
    /// `component`.
    ///
    /// Fails if a contour end would no longer fit in 16 bits.
    pub(crate) fn append_component(
        &mut self,
        child: &Outline,
        component: &Component,
    ) -> Result<(), ReadError> {
        if child.is_empty() {
            return Ok(());
        }
        let too_many_points = || ReadError::MalformedData("composite glyph has too many points");
        let point_base = u16::try_from(self.points.len()).map_err(|_| too_many_points())?;
        let contour_ends = child
            .contour_ends
            .iter()
            .map(|end| end.checked_add(point_base).ok_or_else(too_many_points))
            .collect::<Result<Vec<_>, _>>()?;
        let placement = match component.anchor {
            Anchor::Offset { x, y } => {
                if component.flags.contains(CompositeGlyphFlags::ROUND_XY_TO_GRID) {
                    log::trace!(
                        "{}: ignoring grid rounding for component {}",
                        self.glyph_id,
                        component.glyph
                    );
                }
                Affine::new(component.transform, x as i32, y as i32)
            }
            Anchor::Point { base, component: child_point } => {
                log::debug!(
                    "{}: point matching ({base} -> {child_point}) is not applied to component {}",
                    self.glyph_id,
                    component.glyph
                );
                Affine::IDENTITY
            }
        };
        self.contour_ends.extend(contour_ends);
        let first_new_point = self.points.len();
        self.points
            .extend(child.points.iter().map(|point| placement.apply(*point)));
        let added = &self.points[first_new_point..];
        if let Some(bounds) = BoundingBox::from_points(added.iter().map(OutlinePoint::point)) {
            self.bounds = if first_new_point == 0 {
                bounds
            } else {
                self.bounds.union(&bounds)
            };
        }
        Ok(())
    }
}

/// A component transform with its offset.
///
/// The linear part is applied first and rounded half to even, then the
/// offset is added.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Affine {
    xx: f32,
    yx: f32,
    xy: f32,
    yy: f32,
    dx: i32,
    dy: i32,
    is_linear_identity: bool,
}

impl Affine {
    pub(crate) const IDENTITY: Self = Self {
        xx: 1.0,
        yx: 0.0,
        xy: 0.0,
        yy: 1.0,
        dx: 0,
        dy: 0,
        is_linear_identity: true,
    };

    pub(crate) fn new(transform: Transform, dx: i32, dy: i32) -> Self {
        Self::from_matrix(
            [
                transform.xx.to_f32(),
                transform.yx.to_f32(),
                transform.xy.to_f32(),
                transform.yy.to_f32(),
            ],
            dx,
            dy,
        )
    }

    /// `matrix` is `[xx, yx, xy, yy]`, the order used in the font.
    pub(crate) fn from_matrix(matrix: [f32; 4], dx: i32, dy: i32) -> Self {
        let [xx, yx, xy, yy] = matrix;
        Self {
            xx,
            yx,
            xy,
            yy,
            dx,
            dy,
            is_linear_identity: matrix == [1.0, 0.0, 0.0, 1.0],
        }
    }

    pub(crate) fn apply(&self, point: OutlinePoint) -> OutlinePoint {
        let (x, y) = if self.is_linear_identity {
            (point.x, point.y)
        } else {
            let (x, y) = (point.x as f32, point.y as f32);
            (
                (x * self.xx + y * self.xy).round_ties_even() as i32,
                (x * self.yx + y * self.yy).round_ties_even() as i32,
            )
        };
        OutlinePoint::new(
            x.wrapping_add(self.dx),
            y.wrapping_add(self.dy),
            point.on_curve,
        )
    }
}
