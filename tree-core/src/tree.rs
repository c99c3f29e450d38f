use crate::types::SegmentId;
use glam::{DVec2, DVec3};
use std::ops::Range;

/// A branch segment that survived pruning and emitted samples.
#[derive(Debug)]
pub struct Segment {
    pub start: DVec3,
    pub end: DVec3,
    pub depth: u32,
    pub parent: Option<SegmentId>,
    pub children: Vec<SegmentId>,
    /// Indices of this segment's samples inside the instance buffers.
    pub instances: Range<usize>,
}

/// Branch topology recorded alongside the instance buffers.
#[derive(Debug, Default)]
pub struct Skeleton {
    pub segments: Vec<Segment>,
}

impl Segment {
    pub fn new_root(start: DVec3, end: DVec3, depth: u32, instances: Range<usize>) -> Self {
        Self {
            start,
            end,
            depth,
            parent: None,
            children: Vec::new(),
            instances,
        }
    }

    pub fn new_child(
        start: DVec3,
        end: DVec3,
        depth: u32,
        parent: SegmentId,
        instances: Range<usize>,
    ) -> Self {
        Self {
            start,
            end,
            depth,
            parent: Some(parent),
            children: Vec::new(),
            instances,
        }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).length()
    }
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, start: DVec3, end: DVec3, depth: u32, instances: Range<usize>) -> SegmentId {
        let id = self.segments.len();
        self.segments
            .push(Segment::new_root(start, end, depth, instances));
        id
    }

    pub fn add_child(
        &mut self,
        parent: SegmentId,
        start: DVec3,
        end: DVec3,
        depth: u32,
        instances: Range<usize>,
    ) -> SegmentId {
        let id = self.segments.len();
        self.segments
            .push(Segment::new_child(start, end, depth, parent, instances));
        self.segments[parent].children.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Deepest recursion level that produced a segment.
    pub fn max_depth(&self) -> Option<u32> {
        self.segments.iter().map(|s| s.depth).max()
    }

    pub fn count_at_depth(&self, depth: u32) -> usize {
        self.segments.iter().filter(|s| s.depth == depth).count()
    }

    /// Finds the segment closest to `point` after projecting both segment
    /// endpoints into the same 2-D space.
    ///
    /// Returns the segment id and the squared distance.
    pub fn find_nearest_segment(
        &self,
        point: DVec2,
        project: impl Fn(DVec3) -> DVec2,
    ) -> Option<(SegmentId, f64)> {
        let mut best = None;
        let mut best_d2 = f64::MAX;
        for (id, s) in self.segments.iter().enumerate() {
            let d2 = distance_sq_to_segment(point, project(s.start), project(s.end));
            if d2 < best_d2 {
                best_d2 = d2;
                best = Some(id);
            }
        }
        best.map(|id| (id, best_d2))
    }
}

fn distance_sq_to_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return (p - a).length_squared();
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).length_squared()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DVec2, DVec3};

    fn xy(v: DVec3) -> DVec2 {
        v.truncate()
    }

    #[test]
    fn add_child_links_parent_and_child() {
        let mut sk = Skeleton::new();
        let root = sk.add_root(DVec3::ZERO, DVec3::Y, 0, 0..60);
        let child = sk.add_child(root, DVec3::Y, DVec3::new(1.0, 2.0, 0.0), 1, 60..120);

        assert_eq!(sk.len(), 2);
        assert_eq!(sk.segments[root].children, vec![child]);
        assert_eq!(sk.segments[child].parent, Some(root));
        assert_eq!(sk.segments[child].instances, 60..120);
    }

    #[test]
    fn depth_queries() {
        let mut sk = Skeleton::new();
        assert_eq!(sk.max_depth(), None);

        let root = sk.add_root(DVec3::ZERO, DVec3::Y, 0, 0..1);
        sk.add_child(root, DVec3::Y, DVec3::X, 1, 1..2);
        sk.add_child(root, DVec3::Y, DVec3::NEG_X, 1, 2..3);

        assert_eq!(sk.max_depth(), Some(1));
        assert_eq!(sk.count_at_depth(0), 1);
        assert_eq!(sk.count_at_depth(1), 2);
        assert_eq!(sk.count_at_depth(2), 0);
    }

    #[test]
    fn segment_length() {
        let s = Segment::new_root(DVec3::ZERO, DVec3::new(3.0, 4.0, 0.0), 0, 0..0);
        assert_eq!(s.length(), 5.0);
    }

    #[test]
    fn find_nearest_segment_uses_projection() {
        let mut sk = Skeleton::new();
        let root = sk.add_root(DVec3::ZERO, DVec3::new(0.0, 10.0, 0.0), 0, 0..1);
        let right = sk.add_child(
            root,
            DVec3::new(0.0, 10.0, 0.0),
            DVec3::new(10.0, 10.0, 0.0),
            1,
            1..2,
        );

        let (id, d2) = sk.find_nearest_segment(DVec2::new(1.0, 5.0), xy).unwrap();
        assert_eq!(id, root);
        assert!((d2 - 1.0).abs() < 1e-12);

        let (id, d2) = sk.find_nearest_segment(DVec2::new(6.0, 12.0), xy).unwrap();
        assert_eq!(id, right);
        assert!((d2 - 4.0).abs() < 1e-12);
    }

    #[test]
    fn find_nearest_segment_on_empty_skeleton() {
        let sk = Skeleton::new();
        assert!(sk.find_nearest_segment(DVec2::ZERO, xy).is_none());
    }
}
