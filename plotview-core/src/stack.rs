/// Layered stack of coordinate-frame transforms
use log::trace;
use nalgebra::{Matrix4, Vector3};

use crate::transform::Transform;

/// Number of levels that are always present and never popped.
pub const RESERVED_LEVELS: usize = 4;

/// The reserved base levels of a [`TransformStack`].
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Device millimeters to device pixels (physical display scaling).
    DeviceMmToDevice = 0,
    /// The pan/zoom/rotate transform interactive gestures edit.
    WorldToDeviceMm = 1,
    /// Held for a perspective projection; identity for now.
    CentralProjection = 2,
    /// Look-at matrix derived from the eye and target points.
    ParallelProjection = 3,
}

impl Level {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Ordered sequence of transforms, each composed onto the one below it.
///
/// Every slot holds the *effective* transform of its level, i.e. the
/// product `T0 · T1 · … · Ti` of the local transforms up to and including
/// it, so [`top`](Self::top) is what geometry is mapped through. Levels
/// above [`Level::ParallelProjection`] are transient user frames pushed
/// and popped while drawing.
#[derive(Debug, Clone)]
pub struct TransformStack {
    base: [Matrix4<f64>; RESERVED_LEVELS],
    user: Vec<Matrix4<f64>>,
}

impl TransformStack {
    /// Stack with level 0 scaling by `display_unit` and identity above it.
    pub fn new(display_unit: &Vector3<f64>) -> Self {
        let device = Transform::scaling(display_unit);

        Self {
            base: [device; RESERVED_LEVELS],
            user: Vec::new(),
        }
    }

    /// Drop all user levels and reinitialize the reserved ones.
    pub fn reset(&mut self, display_unit: &Vector3<f64>) {
        *self = Self::new(display_unit);
    }

    pub fn len(&self) -> usize {
        RESERVED_LEVELS + self.user.len()
    }

    /// Always false; the reserved levels cannot be removed.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of user levels above the reserved ones.
    pub fn user_depth(&self) -> usize {
        self.user.len()
    }

    pub fn has_user_levels(&self) -> bool {
        !self.user.is_empty()
    }

    /// Effective transform of `level`.
    ///
    /// # Panics
    /// If `level >= self.len()`.
    pub fn level(&self, level: usize) -> &Matrix4<f64> {
        if level < RESERVED_LEVELS {
            &self.base[level]
        } else {
            &self.user[level - RESERVED_LEVELS]
        }
    }

    fn level_mut(&mut self, level: usize) -> &mut Matrix4<f64> {
        if level < RESERVED_LEVELS {
            &mut self.base[level]
        } else {
            &mut self.user[level - RESERVED_LEVELS]
        }
    }

    pub fn reserved(&self, level: Level) -> &Matrix4<f64> {
        &self.base[level.index()]
    }

    /// The transform geometry is currently mapped through.
    pub fn top(&self) -> &Matrix4<f64> {
        self.user
            .last()
            .unwrap_or(&self.base[RESERVED_LEVELS - 1])
    }

    /// Transform of the top relative to `level` (`level⁻¹ · top`).
    ///
    /// Exactly the identity when nothing is stacked above `level`.
    pub fn relative_to(&self, level: usize) -> Matrix4<f64> {
        if level + 1 >= self.len() {
            Matrix4::identity()
        } else {
            Transform::invert(self.level(level)) * self.top()
        }
    }

    /// Compose `trafo` onto the current top as a new user level.
    pub fn push(&mut self, trafo: &Matrix4<f64>) {
        let composed = self.top() * trafo;
        self.user.push(composed);
        trace!("push transform, depth {}", self.len());
    }

    /// Remove the top user level; a no-op when only reserved levels remain.
    pub fn pop(&mut self) {
        if self.user.pop().is_some() {
            trace!("pop transform, depth {}", self.len());
        }
    }

    /// Replace the effective transform of `level` with `value` and carry
    /// the change through every level above it.
    pub fn edit_level(&mut self, level: usize, value: Matrix4<f64>) {
        let inverse = Transform::invert(self.level(level));
        *self.level_mut(level) = value;
        self.propagate(level, &inverse);
    }

    /// Re-express every level above `level` after `level` was rewritten.
    ///
    /// `inverse` is the inverse of the value `level` held before the
    /// rewrite. Each higher level `i` becomes `(new · inverse) · old[i]`, so
    /// whatever is stacked on top keeps its meaning relative to `level`.
    pub fn propagate(&mut self, level: usize, inverse: &Matrix4<f64>) {
        let delta = self.level(level) * inverse;

        for i in level + 1..self.len() {
            let updated = delta * self.level(i);
            *self.level_mut(i) = updated;
        }
    }
}
