use crate::{ParentId, Placement};

/// A template that instances are created from.
///
/// This is the archetype side of the pool: a mesh description, a behaviour
/// bundle, or any other prototype that knows how to build a fresh instance.
/// Closures returning a [`WorldObject`] implement it as well.
pub trait Prefab {
    /// The instance type this prefab produces.
    type Instance: WorldObject;

    /// Creates a brand-new instance.
    fn instantiate(&self) -> Self::Instance;
}

impl<F, T> Prefab for F
where
    F: Fn() -> T,
    T: WorldObject,
{
    type Instance = T;

    #[inline(always)]
    fn instantiate(&self) -> T {
        self()
    }
}

/// The presentation surface a pooled instance exposes to the pool.
///
/// The pool only ever toggles visibility, applies a placement and, when
/// available, asks the instance to reinitialize itself.
pub trait WorldObject {
    /// Makes the instance visible/active or hidden/inactive.
    fn set_active(&mut self, active: bool);

    /// Positions the instance and attaches it to `parent`.
    ///
    /// By default, this method does nothing.
    #[inline(always)]
    fn place(&mut self, _placement: Placement, _parent: Option<ParentId>) {}

    /// Exposes the [`Resettable`] capability, if the instance has one.
    ///
    /// By default, instances are not resettable and are delivered as-is.
    #[inline(always)]
    fn as_resettable(&mut self) -> Option<&mut dyn Resettable> {
        None
    }
}

/// Optional capability of instances carrying per-use state.
pub trait Resettable {
    /// Re-establishes per-use state so nothing leaks from a previous use.
    ///
    /// Called on every acquire, strictly before the instance is activated.
    fn reinitialize(&mut self);
}
