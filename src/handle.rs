use core::fmt;

/// Identity of a template registered with a pool.
///
/// Template ids are issued by the pool in registration order. Equality is
/// identity-based: registering two structurally equal prefabs yields two
/// distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(u32);

impl TemplateId {
    /// Builds an id from its raw index.
    ///
    /// Ids built this way are only meaningful to the pool that issued the
    /// same index; anything else is rejected as an unknown template.
    pub const fn from_raw(raw: u32) -> Self {
        TemplateId(raw)
    }

    /// Returns the raw index of this id.
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template#{}", self.0)
    }
}

/// Stable handle to an instance living in a pool's arena.
///
/// Handles stay valid for the lifetime of the pool: instances are never
/// destroyed, only toggled between idle and in-use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u32);

impl InstanceId {
    /// Builds a handle from its raw index.
    pub const fn from_raw(raw: u32) -> Self {
        InstanceId(raw)
    }

    /// Returns the raw index of this handle.
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance#{}", self.0)
    }
}

/// Opaque identity of the owner an acquired instance gets attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParentId(pub u64);

/// World placement applied to an instance when it is acquired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Position as `[x, y, z]`.
    pub position: [f32; 3],
    /// Orientation as a unit quaternion `[x, y, z, w]`.
    pub rotation: [f32; 4],
}

impl Placement {
    /// Identity rotation.
    pub const IDENTITY_ROTATION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    /// Placement at the origin with identity rotation.
    pub const ORIGIN: Placement = Placement {
        position: [0.0; 3],
        rotation: Self::IDENTITY_ROTATION,
    };

    /// Placement at `position` with identity rotation.
    pub const fn at(position: [f32; 3]) -> Self {
        Placement {
            position,
            rotation: Self::IDENTITY_ROTATION,
        }
    }

    /// Replaces the rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = rotation;
        self
    }
}

impl Default for Placement {
    fn default() -> Self {
        Placement::ORIGIN
    }
}
