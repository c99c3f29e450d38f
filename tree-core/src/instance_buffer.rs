use crate::types::COMPONENTS;
use glam::{DVec3, Vec3};

/// One emitted sample along a branch segment, before packing.
///
/// Generation works in `f64`; [`InstanceBuffers::push`] narrows to `f32`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointRecord {
    pub position: DVec3,
    /// Unit vector from the jittered sample back toward its segment point.
    pub normal: DVec3,
    pub color: DVec3,
    pub size: f64,
    /// Normalized pseudo-depth that drives the pulse animation.
    pub time: f64,
    pub seed: f64,
}

/// Read-back view of one packed instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
    pub size: f32,
    pub time: f32,
    pub seed: f32,
}

/// Packed per-instance attribute arrays, ready for upload as instanced
/// vertex attributes.
///
/// The buffer stores four parallel arrays:
///
/// - `positions` - `x, y, z` per instance.
/// - `normals` - `x, y, z` per instance.
/// - `colors` - `r, g, b` per instance.
/// - `data` - `size, time, seed` per instance.
///
/// The `i`-th triple of every array describes the same instance, and every
/// array always holds `3 * len()` floats. Instances are only ever appended.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstanceBuffers {
    positions: Vec<f32>,
    normals: Vec<f32>,
    colors: Vec<f32>,
    data: Vec<f32>,
}

impl InstanceBuffers {
    /// Creates an empty [`InstanceBuffers`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer set with room for `instances` instances.
    ///
    /// ### Parameters
    /// - `instances` - Number of instances to reserve space for.
    pub fn with_capacity(instances: usize) -> Self {
        let floats = instances * COMPONENTS;
        Self {
            positions: Vec::with_capacity(floats),
            normals: Vec::with_capacity(floats),
            colors: Vec::with_capacity(floats),
            data: Vec::with_capacity(floats),
        }
    }

    /// Appends one record to all four arrays.
    ///
    /// ### Parameters
    /// - `record` - The sample to pack. Every component is narrowed to `f32`.
    pub fn push(&mut self, record: &PointRecord) {
        let p = record.position;
        let n = record.normal;
        let c = record.color;
        self.positions
            .extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
        self.normals
            .extend_from_slice(&[n.x as f32, n.y as f32, n.z as f32]);
        self.colors
            .extend_from_slice(&[c.x as f32, c.y as f32, c.z as f32]);
        self.data.extend_from_slice(&[
            record.size as f32,
            record.time as f32,
            record.seed as f32,
        ]);
    }

    /// Number of packed instances.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len() / COMPONENTS
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Removes all instances but keeps the allocations.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.colors.clear();
        self.data.clear();
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// `size, time, seed` triples.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the `i`-th instance, or `None` if `i` is out of range.
    ///
    /// ### Parameters
    /// - `i` - Instance index in emission order.
    ///
    /// ### Returns
    /// The four attribute triples of that instance.
    pub fn instance(&self, i: usize) -> Option<Instance> {
        if i >= self.len() {
            return None;
        }
        let at = i * COMPONENTS;
        let triple = |v: &[f32]| Vec3::from_slice(&v[at..at + COMPONENTS]);
        let data = triple(&self.data);
        Some(Instance {
            position: triple(&self.positions),
            normal: triple(&self.normals),
            color: triple(&self.colors),
            size: data.x,
            time: data.y,
            seed: data.z,
        })
    }

    /// Iterates over all instances in emission order.
    pub fn iter(&self) -> impl Iterator<Item = Instance> + '_ {
        (0..self.len()).filter_map(|i| self.instance(i))
    }

    /// Axis-aligned bounds of all instance positions.
    ///
    /// ### Returns
    /// `Some((min, max))`, or `None` for an empty buffer.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.positions
            .chunks_exact(COMPONENTS)
            .map(Vec3::from_slice)
            .fold(None, |acc, p| match acc {
                None => Some((p, p)),
                Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
            })
    }

    /// Appends every instance of `other` after the instances of `self`.
    ///
    /// ### Parameters
    /// - `other` - The source buffers; left untouched.
    pub fn merge_from(&mut self, other: &InstanceBuffers) {
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.colors.extend_from_slice(&other.colors);
        self.data.extend_from_slice(&other.data);
    }
}
