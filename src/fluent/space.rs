//! Array-valued observation and action spaces.

use ndarray::{ArrayD, IxDyn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::map::FluentMap;

/// A box of `f32` arrays with a fixed shape and elementwise bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySpace {
    pub shape: Vec<usize>,
    pub low: f32,
    pub high: f32,
}

impl ArraySpace {
    pub fn new(shape: Vec<usize>, low: f32, high: f32) -> Self {
        Self { shape, low, high }
    }

    /// A space over all real values of the given shape.
    pub fn unbounded(shape: Vec<usize>) -> Self {
        Self::new(shape, f32::NEG_INFINITY, f32::INFINITY)
    }

    pub fn is_bounded_below(&self) -> bool {
        self.low.is_finite()
    }

    pub fn is_bounded_above(&self) -> bool {
        self.high.is_finite()
    }

    /// Returns true if `value` has this shape and every element lies in `[low, high]`.
    pub fn contains(&self, value: &ArrayD<f32>) -> bool {
        value.shape() == self.shape.as_slice()
            && value
                .iter()
                .all(|v| !v.is_nan() && *v >= self.low && *v <= self.high)
    }

    /// Draws a random element.
    ///
    /// Bounded dimensions are sampled uniformly between the bounds (in
    /// either order), unbounded ones from a standard normal, and
    /// half-bounded ones from a shifted exponential.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ArrayD<f32> {
        let size = self.shape.iter().product();
        let values: Vec<f32> = (0..size)
            .map(|_| match (self.is_bounded_below(), self.is_bounded_above()) {
                (true, true) => {
                    let (lo, hi) = (self.low.min(self.high), self.low.max(self.high));
                    rng.gen_range(lo..=hi)
                }
                (true, false) => self.low + standard_exponential(rng),
                (false, true) => self.high - standard_exponential(rng),
                (false, false) => standard_normal(rng),
            })
            .collect();
        ArrayD::from_shape_vec(IxDyn(&self.shape), values)
            .unwrap_or_else(|_| ArrayD::zeros(IxDyn(&self.shape)))
    }
}

fn standard_exponential<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    // 1 - U lies in (0, 1], keeping ln finite.
    let u: f32 = 1.0 - rng.gen::<f32>();
    -u.ln()
}

fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    // Box-Muller.
    let u1: f32 = 1.0 - rng.gen::<f32>();
    let u2: f32 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
}

/// A named collection of [`ArraySpace`]s, one per fluent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DictSpace {
    spaces: FluentMap<ArraySpace>,
}

impl DictSpace {
    pub fn new(spaces: FluentMap<ArraySpace>) -> Self {
        Self { spaces }
    }

    pub fn get(&self, name: &str) -> Option<&ArraySpace> {
        self.spaces.get(name)
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArraySpace)> {
        self.spaces.iter()
    }

    /// Returns true if `value` has exactly this space's fluents and each is contained.
    pub fn contains(&self, value: &FluentMap) -> bool {
        value.len() == self.spaces.len()
            && self
                .spaces
                .iter()
                .all(|(name, space)| value.get(name).is_some_and(|v| space.contains(v)))
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> FluentMap {
        self.spaces
            .iter()
            .map(|(name, space)| (name, space.sample(rng)))
            .collect()
    }

    /// Zero-filled value for every fluent.
    pub fn zeros(&self) -> FluentMap {
        self.spaces
            .iter()
            .map(|(name, space)| (name, ArrayD::zeros(IxDyn(&space.shape))))
            .collect()
    }
}
