//! Named GPU resource registry.
//!
//! Every long-lived GPU object of the engine (G-Buffer targets, the depth
//! buffer, pipelines, samplers, constant buffers) is owned by a
//! [`ResourceRegistry`] and addressed by a `(name, kind)` pair. Render passes
//! borrow entries for the duration of a frame; the resize coordinator removes
//! and re-adds the size-dependent subset.
//!
//! A lookup miss or a double registration is a programming error (a typo or a
//! pass-ordering bug), so both panic instead of returning a `Result`: the
//! engine must never silently render with a missing resource.

use std::collections::HashMap;
use std::hash::Hash;

/// The kinds of GPU objects the registry can hold.
///
/// wgpu folds fixed-function state (rasterizer, depth-stencil, blend, input
/// layout) and the shader stages into [`wgpu::RenderPipeline`] and
/// [`wgpu::ShaderModule`], and a single [`wgpu::TextureView`] serves as
/// render-target, depth-stencil and shader-resource view alike.
///
/// `ShaderModule` has no engine-internal producer: the built-in pipelines
/// compile their WGSL during pipeline construction and never register the
/// module. The kind exists for callers that share a module across several
/// pipelines of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Texture,
    TextureView,
    Sampler,
    Buffer,
    BindGroupLayout,
    BindGroup,
    ShaderModule,
    RenderPipeline,
}

/// Tagged union over the wgpu handle types the registry owns.
#[derive(Debug)]
pub enum Resource {
    Texture(wgpu::Texture),
    TextureView(wgpu::TextureView),
    Sampler(wgpu::Sampler),
    Buffer(wgpu::Buffer),
    BindGroupLayout(wgpu::BindGroupLayout),
    BindGroup(wgpu::BindGroup),
    ShaderModule(wgpu::ShaderModule),
    RenderPipeline(wgpu::RenderPipeline),
}

/// Implemented by every wgpu type the registry can store. The associated
/// `KIND` makes `get::<wgpu::TextureView>("main_depth")` statically typed:
/// the kind half of the key travels in the type parameter.
pub trait Registered: Sized {
    const KIND: ResourceKind;

    fn wrap(self) -> Resource;
    fn unwrap_ref(resource: &Resource) -> Option<&Self>;
}

macro_rules! impl_registered {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(impl Registered for $ty {
            const KIND: ResourceKind = ResourceKind::$kind;

            fn wrap(self) -> Resource {
                Resource::$kind(self)
            }

            fn unwrap_ref(resource: &Resource) -> Option<&Self> {
                match resource {
                    Resource::$kind(inner) => Some(inner),
                    _ => None,
                }
            }
        })+
    };
}

impl_registered! {
    wgpu::Texture => Texture,
    wgpu::TextureView => TextureView,
    wgpu::Sampler => Sampler,
    wgpu::Buffer => Buffer,
    wgpu::BindGroupLayout => BindGroupLayout,
    wgpu::BindGroup => BindGroup,
    wgpu::ShaderModule => ShaderModule,
    wgpu::RenderPipeline => RenderPipeline,
}

/// Plain keyed store with explicit add/get/remove semantics. Kept generic so
/// the registry contract can be tested without a GPU device.
#[derive(Debug)]
pub(crate) struct Store<K, V> {
    entries: HashMap<K, V>,
}

impl<K: Eq + Hash, V> Store<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Inserts under `key`. An occupied key is rejected: callers must remove
    /// the old entry first (this is what the resize path does).
    pub(crate) fn add(&mut self, key: K, value: V) -> Result<(), K> {
        if self.entries.contains_key(&key) {
            return Err(key);
        }
        self.entries.insert(key, value);
        Ok(())
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// The registry itself. Owns the canonical reference to each resource; wgpu
/// handles are internally reference-counted, so dropping an entry destroys
/// the GPU object once no pass holds a clone any more. The registry issues no
/// GPU calls of its own.
#[derive(Debug)]
pub struct ResourceRegistry {
    store: Store<(ResourceKind, String), Resource>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            store: Store::new(),
        }
    }

    /// Registers `resource` under `(name, R::KIND)`.
    ///
    /// # Panics
    ///
    /// Panics if an entry already exists for that key.
    pub fn add<R: Registered>(&mut self, name: &str, resource: R) {
        if self
            .store
            .add((R::KIND, name.to_owned()), resource.wrap())
            .is_err()
        {
            panic!(
                "resource `{name}` of kind {:?} is already registered; remove it before re-adding",
                R::KIND
            );
        }
        log::trace!("registered `{name}` ({:?})", R::KIND);
    }

    /// Returns the live resource registered under `(name, R::KIND)`.
    ///
    /// # Panics
    ///
    /// Panics if no such entry exists.
    pub fn get<R: Registered>(&self, name: &str) -> &R {
        let resource = self
            .store
            .get(&(R::KIND, name.to_owned()))
            .unwrap_or_else(|| {
                panic!("no resource `{name}` of kind {:?} in the registry", R::KIND)
            });
        // The variant always matches the kind half of the key; `wrap` is the
        // only way in.
        R::unwrap_ref(resource).expect("registry entry variant diverged from its key")
    }

    /// Drops the registry's reference to `(name, R::KIND)`.
    ///
    /// # Panics
    ///
    /// Panics if no such entry exists.
    pub fn remove<R: Registered>(&mut self, name: &str) {
        if self.store.remove(&(R::KIND, name.to_owned())).is_none() {
            panic!(
                "cannot remove `{name}` of kind {:?}: no such resource",
                R::KIND
            );
        }
        log::trace!("removed `{name}` ({:?})", R::KIND);
    }

    /// Number of live entries, mostly for logging and tests.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_after_add_returns_the_entry() {
        let mut store: Store<(ResourceKind, &str), u32> = Store::new();
        store
            .add((ResourceKind::Buffer, "lights"), 7)
            .expect("fresh key");
        assert_eq!(store.get(&(ResourceKind::Buffer, "lights")), Some(&7));
    }

    #[test]
    fn same_name_different_kind_are_distinct_entries() {
        let mut store: Store<(ResourceKind, &str), u32> = Store::new();
        store.add((ResourceKind::Texture, "main_depth"), 1).unwrap();
        store
            .add((ResourceKind::TextureView, "main_depth"), 2)
            .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&(ResourceKind::Texture, "main_depth")), Some(&1));
        assert_eq!(
            store.get(&(ResourceKind::TextureView, "main_depth")),
            Some(&2)
        );
    }

    #[test]
    fn double_add_without_remove_is_rejected() {
        let mut store: Store<(ResourceKind, &str), u32> = Store::new();
        store.add((ResourceKind::Sampler, "g_buffer"), 1).unwrap();
        let rejected = store.add((ResourceKind::Sampler, "g_buffer"), 2);
        assert_eq!(rejected, Err((ResourceKind::Sampler, "g_buffer")));
        // The original entry survives the rejected insert.
        assert_eq!(store.get(&(ResourceKind::Sampler, "g_buffer")), Some(&1));
    }

    #[test]
    fn get_after_remove_misses() {
        let mut store: Store<(ResourceKind, &str), u32> = Store::new();
        store.add((ResourceKind::Buffer, "lights"), 7).unwrap();
        assert_eq!(store.remove(&(ResourceKind::Buffer, "lights")), Some(7));
        assert_eq!(store.get(&(ResourceKind::Buffer, "lights")), None);
    }

    #[test]
    fn remove_then_add_under_the_same_key_succeeds() {
        // The resize path replaces entries exactly this way.
        let mut store: Store<(ResourceKind, &str), u32> = Store::new();
        store.add((ResourceKind::Texture, "g_buffer_position"), 1).unwrap();
        store.remove(&(ResourceKind::Texture, "g_buffer_position"));
        store.add((ResourceKind::Texture, "g_buffer_position"), 2).unwrap();
        assert_eq!(
            store.get(&(ResourceKind::Texture, "g_buffer_position")),
            Some(&2)
        );
    }
}
