/// Identifier for a segment in a [`crate::tree::Skeleton`].
///
/// This is an index into `Skeleton::segments`, and is only meaningful within
/// the lifetime of a given `Skeleton` instance.
pub type SegmentId = usize;

/// Integer seed fed to [`crate::seed::seeded_random`].
pub type Seed = u64;

/// Number of floats stored per instance in each packed attribute array.
pub const COMPONENTS: usize = 3;
