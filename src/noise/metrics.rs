//! Distance metrics and distance-list combiners for cellular noise.
//!
//! Both are selected by tag and resolved to a plain function pointer once per
//! generation pass, so the per-sample loops never branch on the tag.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Distance between two points.
pub type DistanceFn = fn(Vec3, Vec3) -> f32;

/// Reduces an ascending list of distances to one value.
pub type CombinerFn = fn(&[f32]) -> f32;

/// Which distance function to use between a sample and a feature point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// `|a - b|²`
    #[default]
    SquaredEuclidean,
    /// `|a - b|`
    Euclidean,
    /// `|dx| + |dy| + |dz|`
    Manhattan,
    /// `max(|dx|, |dy|, |dz|)`
    Chebyshev,
}

impl DistanceMetric {
    pub const ALL: [DistanceMetric; 4] = [
        DistanceMetric::SquaredEuclidean,
        DistanceMetric::Euclidean,
        DistanceMetric::Manhattan,
        DistanceMetric::Chebyshev,
    ];

    /// Wire tag used by the `.emb` file.
    pub fn tag(self) -> i32 {
        match self {
            DistanceMetric::SquaredEuclidean => 0,
            DistanceMetric::Euclidean => 1,
            DistanceMetric::Manhattan => 2,
            DistanceMetric::Chebyshev => 3,
        }
    }

    /// Maps a wire tag back to a metric, or `None` if it is out of range.
    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(DistanceMetric::SquaredEuclidean),
            1 => Some(DistanceMetric::Euclidean),
            2 => Some(DistanceMetric::Manhattan),
            3 => Some(DistanceMetric::Chebyshev),
            _ => None,
        }
    }

    /// Maps a wire tag to a metric, falling back to the default for unknown tags.
    pub fn from_tag_or_default(tag: i32) -> Self {
        Self::from_tag(tag).unwrap_or_default()
    }

    /// Resolves the tag to its distance function.
    pub fn resolve(self) -> DistanceFn {
        match self {
            DistanceMetric::SquaredEuclidean => squared_euclidean,
            DistanceMetric::Euclidean => euclidean,
            DistanceMetric::Manhattan => manhattan,
            DistanceMetric::Chebyshev => chebyshev,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DistanceMetric::SquaredEuclidean => "squared-euclidean",
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Manhattan => "manhattan",
            DistanceMetric::Chebyshev => "chebyshev",
        }
    }
}

/// How the sorted distances of a sample are turned into its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Combiner {
    /// Distance to the nearest feature point.
    D1,
    /// Second-nearest minus nearest; draws cell borders.
    #[default]
    D2MinusD1,
    /// Third-nearest minus nearest.
    D3MinusD1,
}

impl Combiner {
    pub const ALL: [Combiner; 3] = [Combiner::D1, Combiner::D2MinusD1, Combiner::D3MinusD1];

    pub fn tag(self) -> i32 {
        match self {
            Combiner::D1 => 0,
            Combiner::D2MinusD1 => 1,
            Combiner::D3MinusD1 => 2,
        }
    }

    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(Combiner::D1),
            1 => Some(Combiner::D2MinusD1),
            2 => Some(Combiner::D3MinusD1),
            _ => None,
        }
    }

    pub fn from_tag_or_default(tag: i32) -> Self {
        Self::from_tag(tag).unwrap_or_default()
    }

    /// Resolves the tag to its combining function.
    pub fn resolve(self) -> CombinerFn {
        match self {
            Combiner::D1 => d1,
            Combiner::D2MinusD1 => d2_minus_d1,
            Combiner::D3MinusD1 => d3_minus_d1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Combiner::D1 => "d1",
            Combiner::D2MinusD1 => "d2-minus-d1",
            Combiner::D3MinusD1 => "d3-minus-d1",
        }
    }
}

pub fn squared_euclidean(a: Vec3, b: Vec3) -> f32 {
    (a - b).length_squared()
}

pub fn euclidean(a: Vec3, b: Vec3) -> f32 {
    (a - b).length()
}

pub fn manhattan(a: Vec3, b: Vec3) -> f32 {
    let d = (a - b).abs();
    d.x + d.y + d.z
}

pub fn chebyshev(a: Vec3, b: Vec3) -> f32 {
    let d = (a - b).abs();
    d.x.max(d.y).max(d.z)
}

/// Smallest distance, or 0 for an empty list.
pub fn d1(distances: &[f32]) -> f32 {
    match distances {
        [first, ..] => *first,
        _ => 0.0,
    }
}

/// Second-smallest minus smallest, or 0 if fewer than two distances.
pub fn d2_minus_d1(distances: &[f32]) -> f32 {
    match distances {
        [first, second, ..] => second - first,
        _ => 0.0,
    }
}

/// Third-smallest minus smallest, or 0 if fewer than three distances.
pub fn d3_minus_d1(distances: &[f32]) -> f32 {
    match distances {
        [first, _, third, ..] => third - first,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, -4.0, 0.0);
        assert_eq!(squared_euclidean(a, b), 25.0);
        assert_eq!(euclidean(a, b), 5.0);
        assert_eq!(manhattan(a, b), 7.0);
        assert_eq!(chebyshev(a, b), 4.0);
    }

    #[test]
    fn test_metrics_are_symmetric() {
        let a = Vec3::new(0.1, 0.7, -0.2);
        let b = Vec3::new(-0.4, 0.3, 0.9);
        for metric in DistanceMetric::ALL {
            let f = metric.resolve();
            assert_eq!(f(a, b), f(b, a), "{} not symmetric", metric.name());
            assert_eq!(f(a, a), 0.0);
        }
    }

    #[test]
    fn test_combiners() {
        let d = [0.1, 0.4, 0.9];
        assert_eq!(d1(&d), 0.1);
        assert!((d2_minus_d1(&d) - 0.3).abs() < 1e-6);
        assert!((d3_minus_d1(&d) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_combiner_fallback_on_short_lists() {
        assert_eq!(d1(&[]), 0.0);
        assert_eq!(d2_minus_d1(&[0.5]), 0.0);
        assert_eq!(d3_minus_d1(&[0.5, 0.7]), 0.0);
        assert_eq!(Combiner::D2MinusD1.resolve()(&[0.25]), 0.0);
    }

    #[test]
    fn test_tags_round_trip() {
        for metric in DistanceMetric::ALL {
            assert_eq!(DistanceMetric::from_tag(metric.tag()), Some(metric));
        }
        for combiner in Combiner::ALL {
            assert_eq!(Combiner::from_tag(combiner.tag()), Some(combiner));
        }
    }

    #[test]
    fn test_unknown_tags_fall_back_to_defaults() {
        assert_eq!(DistanceMetric::from_tag(9), None);
        assert_eq!(
            DistanceMetric::from_tag_or_default(-1),
            DistanceMetric::SquaredEuclidean
        );
        assert_eq!(Combiner::from_tag_or_default(42), Combiner::D2MinusD1);
    }
}
