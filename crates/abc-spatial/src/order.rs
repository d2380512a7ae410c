//! Ambisonic order, field dimension and channel indexing.

use crate::error::{SpatialError, SpatialResult};

/// Whether a harmonic field is circular (2D) or spherical (3D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dimension {
    /// Circular harmonics: `2n + 1` channels.
    #[default]
    Planar,
    /// Spherical harmonics: `(n + 1)²` channels, ACN ordering.
    Spherical,
}

/// Truncation order of a harmonic expansion.
///
/// Fixed when a processor is built; it determines every channel count.
///
/// ```rust
/// use abc_spatial::{AmbisonicOrder, Dimension};
///
/// let order = AmbisonicOrder::new(3).unwrap();
/// assert_eq!(order.channels(Dimension::Planar), 7);
/// assert_eq!(order.channels(Dimension::Spherical), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AmbisonicOrder(usize);

impl AmbisonicOrder {
    /// Highest supported order.
    pub const MAX: usize = 16;

    /// Validate and wrap an order.
    pub fn new(order: usize) -> SpatialResult<Self> {
        if order > Self::MAX {
            return Err(SpatialError::InvalidOrder {
                order: order as i64,
                max: Self::MAX,
            });
        }
        Ok(Self(order))
    }

    /// The order as an integer.
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    /// Channel count of a circular field, `2n + 1`.
    #[inline]
    pub fn circular_channels(self) -> usize {
        2 * self.0 + 1
    }

    /// Channel count of a spherical field, `(n + 1)²`.
    #[inline]
    pub fn spherical_channels(self) -> usize {
        (self.0 + 1) * (self.0 + 1)
    }

    /// Channel count for the given dimension.
    #[inline]
    pub fn channels(self, dimension: Dimension) -> usize {
        match dimension {
            Dimension::Planar => self.circular_channels(),
            Dimension::Spherical => self.spherical_channels(),
        }
    }

    /// Harmonic degree carried by `channel` in a field of this dimension.
    #[inline]
    pub fn degree_of(self, dimension: Dimension, channel: usize) -> usize {
        match dimension {
            Dimension::Planar => circular_degree(channel),
            Dimension::Spherical => acn_to_degree_order(channel).0,
        }
    }
}

impl Default for AmbisonicOrder {
    /// First order.
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<i64> for AmbisonicOrder {
    type Error = SpatialError;

    fn try_from(order: i64) -> SpatialResult<Self> {
        match usize::try_from(order) {
            Ok(n) if n <= Self::MAX => Ok(Self(n)),
            _ => Err(SpatialError::InvalidOrder {
                order,
                max: Self::MAX,
            }),
        }
    }
}

/// Split an ACN channel index into degree `l` and signed order `m`.
///
/// `l = floor(sqrt(i))`, `m = i - l(l + 1)`; computed with integers so that
/// perfect squares never round down.
#[inline]
pub fn acn_to_degree_order(acn: usize) -> (usize, i32) {
    let mut l = 0usize;
    while (l + 1) * (l + 1) <= acn {
        l += 1;
    }
    let m = acn as i64 - (l * (l + 1)) as i64;
    (l, m as i32)
}

/// ACN index of degree `l`, order `m`.
#[inline]
pub fn acn_index(l: usize, m: i32) -> usize {
    ((l * (l + 1)) as i64 + i64::from(m)) as usize
}

/// Degree of a circular channel: 0 for channel 0, `k` for channels `2k-1`, `2k`.
#[inline]
pub fn circular_degree(channel: usize) -> usize {
    channel.div_ceil(2)
}
