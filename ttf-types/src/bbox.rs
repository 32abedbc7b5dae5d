/// Minimum and maximum extents of a rectangular region.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox<T> {
    /// Minimum extent in the x direction-- the left side of a region.
    pub x_min: T,
    /// Minimum extent in the y direction. In a Y-up coordinate system,
    /// which is used by fonts, this represents the bottom of a region.
    pub y_min: T,
    /// Maximum extent in the x direction-- the right side of a region.
    pub x_max: T,
    /// Maximum extent in the y direction. In a Y-up coordinate system,
    /// which is used by fonts, this represents the top of the
    /// region.
    pub y_max: T,
}

impl<T> BoundingBox<T>
where
    T: PartialOrd + Copy,
{
    /// Returns the smallest box containing every point yielded by the
    /// iterator, or `None` if it is empty.
    pub fn from_points(points: impl IntoIterator<Item = crate::Point<T>>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bbox = Self {
            x_min: first.x,
            y_min: first.y,
            x_max: first.x,
            y_max: first.y,
        };
        for point in points {
            bbox.include(point);
        }
        Some(bbox)
    }

    /// Grows the box to contain the given point.
    pub fn include(&mut self, point: crate::Point<T>) {
        if point.x < self.x_min {
            self.x_min = point.x;
        }
        if point.x > self.x_max {
            self.x_max = point.x;
        }
        if point.y < self.y_min {
            self.y_min = point.y;
        }
        if point.y > self.y_max {
            self.y_max = point.y;
        }
    }

    /// Returns the smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        let mut result = *self;
        result.include(crate::Point::new(other.x_min, other.y_min));
        result.include(crate::Point::new(other.x_max, other.y_max));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    #[test]
    fn from_points() {
        let bbox = BoundingBox::from_points([
            Point::new(3, -1),
            Point::new(-4, 8),
            Point::new(10, 2),
        ])
        .unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                x_min: -4,
                y_min: -1,
                x_max: 10,
                y_max: 8
            }
        );
        assert!(BoundingBox::<i32>::from_points([]).is_none());
    }

    #[test]
    fn union() {
        let a = BoundingBox {
            x_min: 0,
            y_min: 0,
            x_max: 5,
            y_max: 5,
        };
        let b = BoundingBox {
            x_min: -2,
            y_min: 3,
            x_max: 4,
            y_max: 9,
        };
        assert_eq!(
            a.union(&b),
            BoundingBox {
                x_min: -2,
                y_min: 0,
                x_max: 5,
                y_max: 9
            }
        );
    }
}
