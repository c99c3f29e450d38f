//! Seeded recursive branch generator.
//!
//! A generation pass walks the branch recursion depth-first. Each surviving
//! invocation emits `samples_per_segment` jittered instances along its
//! segment and then spawns `branch_factor` children from the segment end.
//!
//! Every random value is drawn from one [`SeedCursor`], so the order of the
//! draws below is part of the output format:
//! 1. survival draw,
//! 2. Z jitter of the segment end,
//! 3. per sample: position, scale, color, instance seed,
//! 4. per child: angle, then length.

use crate::{
    color::hsl_to_rgb,
    config::TreeParams,
    instance_buffer::{InstanceBuffers, PointRecord},
    seed::{SeedCursor, seeded_random},
    tree::Skeleton,
    types::{Seed, SegmentId},
};
use glam::DVec3;

/// Output of one generation pass.
#[derive(Debug, Default)]
pub struct GeneratedTree {
    pub buffers: InstanceBuffers,
    pub skeleton: Skeleton,
    /// Seeds drawn from the cursor during the pass.
    pub seeds_consumed: u64,
}

/// One recursive call: where a branch starts and how it is shaped.
#[derive(Clone, Copy, Debug)]
struct BranchInvocation {
    angle: f64,
    origin: DVec3,
    length: f64,
    depth: u32,
    parent: Option<SegmentId>,
}

/// Per-pass state: the seed cursor and the accumulated output.
struct BranchGenerator<'a> {
    params: &'a TreeParams,
    cursor: SeedCursor,
    buffers: InstanceBuffers,
    skeleton: Skeleton,
}

/// Generates a tree from `seed` and `params`.
///
/// The result is a pure function of its inputs. Independent calls own
/// independent cursors, so they may run concurrently.
pub fn generate(seed: Seed, params: &TreeParams) -> GeneratedTree {
    let mut generator = BranchGenerator {
        params,
        cursor: SeedCursor::new(seed),
        buffers: InstanceBuffers::new(),
        skeleton: Skeleton::new(),
    };

    generator.grow(BranchInvocation {
        angle: params.initial_angle,
        origin: DVec3::ZERO,
        length: params.initial_length,
        depth: 0,
        parent: None,
    });

    let tree = GeneratedTree {
        seeds_consumed: generator.cursor.consumed(),
        buffers: generator.buffers,
        skeleton: generator.skeleton,
    };
    log::debug!(
        "generated tree seed={} instances={} segments={} draws={}",
        seed,
        tree.buffers.len(),
        tree.skeleton.len(),
        tree.seeds_consumed
    );
    tree
}

/// Sample radius for a recursion depth: 0.25 at the trunk, 0.10 at the tips.
#[inline]
pub fn segment_size(depth: u32) -> f64 {
    (30.0 - depth as f64 * 8.0).clamp(10.0, 25.0) / 100.0
}

impl BranchGenerator<'_> {
    fn grow(&mut self, call: BranchInvocation) {
        let max_depth = self.params.max_depth as f64;
        let depth = call.depth as f64;

        // Float division: depth 0 gives +inf (or NaN for max_depth 0), and
        // neither prunes.
        let survival = self.cursor.next_random();
        if survival > (max_depth / depth) * 0.25 {
            return;
        }

        if call.depth >= self.params.max_depth {
            return;
        }

        let child_length = call.length * self.params.length_decay;
        let spread = (depth * depth).min(2.0);
        let end = DVec3::new(
            call.origin.x + call.angle.cos() * call.length,
            call.origin.y + call.angle.sin() * call.length,
            call.origin.z
                + (self.cursor.next_random() * spread - spread / 4.0) * call.length * 0.5,
        );

        let first = self.buffers.len();
        self.emit_samples(&call, end);
        let instances = first..self.buffers.len();

        let id = match call.parent {
            Some(parent) => self
                .skeleton
                .add_child(parent, call.origin, end, call.depth, instances),
            None => self
                .skeleton
                .add_root(call.origin, end, call.depth, instances),
        };

        for _ in 0..self.params.branch_factor {
            let angle = call.angle + self.cursor.next_random();
            let length = child_length + self.cursor.next_random();
            self.grow(BranchInvocation {
                angle,
                origin: end,
                length,
                depth: call.depth + 1,
                parent: Some(id),
            });
        }
    }

    fn emit_samples(&mut self, call: &BranchInvocation, end: DVec3) {
        let max_depth = self.params.max_depth as f64;
        let depth = call.depth as f64;
        let samples = self.params.samples_per_segment;
        let size = segment_size(call.depth);
        let extra = 1.0 / max_depth;
        let start = call.origin;

        for i in 0..samples {
            let percent = i as f64 / samples as f64;
            let base = start + (end - start) * percent;

            let pos_seed = self.cursor.next_seed();
            let position = base
                + DVec3::new(
                    seeded_random(pos_seed) * size * 3.0,
                    seeded_random(pos_seed.wrapping_add(1)) * size * 2.0,
                    seeded_random(pos_seed.wrapping_add(2)) * size * 2.0,
                );

            let scale = self.cursor.next_random() + 5.0;
            let normal = (position - base).normalize_or_zero();

            let color_seed = self.cursor.next_seed();
            let color = hsl_to_rgb(
                (depth / max_depth) * 0.5 + seeded_random(color_seed) * 0.05,
                0.75,
                0.6 + seeded_random(color_seed.wrapping_add(1)) * 0.1,
            );

            let record = PointRecord {
                position,
                normal,
                color,
                size: size * scale,
                time: depth / max_depth + percent * extra,
                seed: self.cursor.next_random(),
            };
            self.buffers.push(&record);
        }
    }
}
