use bevy::prelude::*;

/// Anything placed on the map at a 2-D position.
///
/// This is the only capability connectivity repair and kingdom clustering
/// need from a payload. Distances are Euclidean and symmetric.
pub trait Located {
    fn position(&self) -> Vec2;

    fn distance<L: Located + ?Sized>(&self, other: &L) -> f32 {
        self.position().distance(other.position())
    }

    fn distance_to_point(&self, point: Vec2) -> f32 {
        self.position().distance(point)
    }
}

impl Located for Vec2 {
    fn position(&self) -> Vec2 {
        *self
    }
}

impl<L: Located + ?Sized> Located for &L {
    fn position(&self) -> Vec2 {
        (**self).position()
    }
}

/// Arithmetic mean of a set of points, `None` for an empty set.
pub fn centroid<I>(points: I) -> Option<Vec2>
where
    I: IntoIterator<Item = Vec2>,
{
    let mut sum = Vec2::ZERO;
    let mut count = 0usize;
    for p in points {
        sum += p;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centroid_of_square_is_its_middle() {
        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
        ];
        assert_eq!(centroid(corners), Some(Vec2::new(2.0, 2.0)));
        assert_eq!(centroid(std::iter::empty()), None);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Vec2::new(1.0, 1.0);
        let b = Vec2::new(4.0, 5.0);
        assert_eq!(Located::distance(&a, &b), 5.0);
        assert_eq!(Located::distance(&b, &a), 5.0);
        assert_eq!(a.distance_to_point(Vec2::new(1.0, 3.0)), 2.0);
    }
}
