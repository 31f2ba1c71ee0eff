//! Lazy, deduplicating resolution of document entities.
//!
//! Every entity is addressed by `(EntityType, index)`. Resolving one first
//! looks in the parse-scoped [`EntityCache`]; on a miss the type's loader runs
//! and recursively resolves whatever the entity references. The cache cell is
//! created before the loader starts, so concurrent callers join the pending
//! resolution instead of starting their own.
//!
//! All of this is single-threaded: the resolver is `!Send` and fan-out uses
//! [`JoinSet::spawn_local`], so batch operations must run inside a
//! [`tokio::task::LocalSet`].

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Arc;

use tokio::task::JoinSet;

use lumen_vfs::Fetcher;

use crate::animation::{AnimationClip, AnimationCollection, NodeAnimation};
use crate::material::MaterialParams;
use crate::mesh::{BufferAttribute, MeshObject};
use crate::scene::{NodeObject, SceneCamera, SceneRoot};
use crate::texture::CpuTexture;

use super::accessor::{self, BufferViewData, SparseViews};
use super::assembler::SkinEntry;
use super::cache::EntityCache;
use super::config::LoaderConfig;
use super::document::Document;
use super::error::{GltfError, ResolveError};
use super::loader::GltfScene;

/// Boxed, `!Send` resolution future.
pub type ResolveFuture<T> = Pin<Box<dyn Future<Output = Result<T, ResolveError>>>>;

/// The fixed set of resolvable entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityType {
    Scene,
    Node,
    Mesh,
    Accessor,
    BufferView,
    Buffer,
    Material,
    Texture,
    Skin,
    Animation,
    Camera,
}

impl EntityType {
    pub const ALL: [EntityType; 11] = [
        Self::Scene,
        Self::Node,
        Self::Mesh,
        Self::Accessor,
        Self::BufferView,
        Self::Buffer,
        Self::Material,
        Self::Texture,
        Self::Skin,
        Self::Animation,
        Self::Camera,
    ];

    /// Singular name as used in glTF (`"bufferView"`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scene => "scene",
            Self::Node => "node",
            Self::Mesh => "mesh",
            Self::Accessor => "accessor",
            Self::BufferView => "bufferView",
            Self::Buffer => "buffer",
            Self::Material => "material",
            Self::Texture => "texture",
            Self::Skin => "skin",
            Self::Animation => "animation",
            Self::Camera => "camera",
        }
    }

    /// Name of the document's definition list (`"bufferViews"`).
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Scene => "scenes",
            Self::Node => "nodes",
            Self::Mesh => "meshes",
            Self::Accessor => "accessors",
            Self::BufferView => "bufferViews",
            Self::Buffer => "buffers",
            Self::Material => "materials",
            Self::Texture => "textures",
            Self::Skin => "skins",
            Self::Animation => "animations",
            Self::Camera => "cameras",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityType {
    type Err = GltfError;

    /// Accepts the singular or the plural form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.name() == s || ty.plural() == s)
            .ok_or_else(|| GltfError::UnknownEntityType(s.to_owned()))
    }
}

/// A resolved entity of any type.
#[derive(Debug, Clone)]
pub enum Entity {
    Buffer(Arc<[u8]>),
    BufferView(BufferViewData),
    /// `None` for a declared accessor without data.
    Accessor(Option<Arc<BufferAttribute>>),
    Material(Arc<MaterialParams>),
    Texture(Arc<CpuTexture>),
    Mesh(Arc<MeshObject>),
    Node(Arc<NodeObject>),
    Skin(Arc<SkinEntry>),
    Camera(Arc<SceneCamera>),
    Scene(Arc<SceneRoot>),
    Animation(Arc<AnimationClip>),
}

impl Entity {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::Buffer(_) => EntityType::Buffer,
            Self::BufferView(_) => EntityType::BufferView,
            Self::Accessor(_) => EntityType::Accessor,
            Self::Material(_) => EntityType::Material,
            Self::Texture(_) => EntityType::Texture,
            Self::Mesh(_) => EntityType::Mesh,
            Self::Node(_) => EntityType::Node,
            Self::Skin(_) => EntityType::Skin,
            Self::Camera(_) => EntityType::Camera,
            Self::Scene(_) => EntityType::Scene,
            Self::Animation(_) => EntityType::Animation,
        }
    }
}

/// Everything one parse needs, owned for exactly that parse.
pub struct ParseContext {
    pub(super) document: Arc<Document>,
    pub(super) bin: Option<Arc<[u8]>>,
    pub(super) base_path: String,
    pub(super) fetcher: Fetcher,
    pub(super) config: LoaderConfig,

    /// Per node: referenced as a joint by some skin.
    pub(super) bones: Vec<bool>,
    /// Per mesh: instantiated by a node that carries a skin.
    pub(super) skinned_meshes: Vec<bool>,

    entities: EntityCache<(EntityType, usize), Result<Entity, ResolveError>>,
    batches: EntityCache<EntityType, Result<Vec<Entity>, ResolveError>>,
    loads: [Cell<usize>; EntityType::ALL.len()],

    pub(super) default_material: Arc<MaterialParams>,
    /// One shared animation per targeted node, keyed by node index.
    pub(super) animations: RefCell<BTreeMap<usize, NodeAnimation>>,
}

impl ParseContext {
    pub fn new(document: Arc<Document>, fetcher: Fetcher) -> Self {
        let mut bones = vec![false; document.nodes.len()];
        for skin in &document.skins {
            for &joint in &skin.joints {
                if let Some(flag) = bones.get_mut(joint) {
                    *flag = true;
                }
            }
        }
        let mut skinned_meshes = vec![false; document.meshes.len()];
        for node in document.nodes.iter().filter(|n| n.skin.is_some()) {
            if let Some(flag) = node.mesh.and_then(|m| skinned_meshes.get_mut(m)) {
                *flag = true;
            }
        }

        Self {
            document,
            bin: None,
            base_path: String::new(),
            fetcher,
            config: LoaderConfig::default(),
            bones,
            skinned_meshes,
            entities: EntityCache::new(),
            batches: EntityCache::new(),
            loads: Default::default(),
            default_material: Arc::new(MaterialParams::new()),
            animations: RefCell::new(BTreeMap::new()),
        }
    }

    /// Embedded binary chunk, used by buffers without a URI.
    pub fn with_bin(mut self, bin: Option<Arc<[u8]>>) -> Self {
        self.bin = bin;
        self
    }

    /// Directory that relative URIs are resolved against.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn is_bone(&self, node: usize) -> bool {
        self.bones.get(node).copied().unwrap_or(false)
    }

    pub fn is_skinned_mesh(&self, mesh: usize) -> bool {
        self.skinned_meshes.get(mesh).copied().unwrap_or(false)
    }
}

/// Cheap-clone handle resolving entities of one parse.
#[derive(Clone)]
pub struct Resolver {
    pub(super) ctx: Rc<ParseContext>,
}

impl Resolver {
    pub fn new(ctx: ParseContext) -> Self {
        Self { ctx: Rc::new(ctx) }
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.ctx.document
    }

    pub fn context(&self) -> &ParseContext {
        &self.ctx
    }

    /// Number of times the loader for `ty` has run since the last reset.
    pub fn load_count(&self, ty: EntityType) -> usize {
        self.ctx.loads[ty as usize].get()
    }

    /// Drop every cached resolution and the accumulated animation group.
    pub fn reset(&self) {
        self.ctx.entities.clear();
        self.ctx.batches.clear();
        self.ctx.animations.borrow_mut().clear();
        for count in &self.ctx.loads {
            count.set(0);
        }
    }

    /// Resolve one entity, joining an in-flight resolution if there is one.
    pub fn resolve_entity(&self, ty: EntityType, index: usize) -> ResolveFuture<Entity> {
        let this = self.clone();
        Box::pin(async move {
            let slot = this.ctx.entities.slot((ty, index));
            if slot.initialized() {
                log::trace!("Cache hit for {ty} {index}");
            }
            slot.get_or_init(|| this.load(ty, index)).await.clone()
        })
    }

    /// Resolve every entity of one type. Fails on the first failed member.
    pub fn resolve_all(&self, ty: EntityType) -> ResolveFuture<Vec<Entity>> {
        let this = self.clone();
        Box::pin(async move {
            let slot = this.ctx.batches.slot(ty);
            slot.get_or_init(|| async {
                this.resolve_all_settled(ty).await.into_iter().collect()
            })
            .await
            .clone()
        })
    }

    /// Resolve every entity of one type, keeping each member's outcome.
    pub async fn resolve_all_settled(&self, ty: EntityType) -> Vec<Result<Entity, ResolveError>> {
        let count = self.ctx.document.count(ty);
        let futures = (0..count).map(|i| self.resolve_entity(ty, i)).collect();
        join_all(futures, |i| format!("{ty} {i}")).await
    }

    /// Resolve every entity of several types concurrently, keyed by the
    /// plural type name.
    pub async fn resolve_many(
        &self,
        types: &[EntityType],
    ) -> Result<BTreeMap<&'static str, Vec<Entity>>, ResolveError> {
        let futures = types.iter().map(|&ty| self.resolve_all(ty)).collect();
        let results = join_all(futures, |i| types[i].plural().to_owned()).await;
        types
            .iter()
            .zip(results)
            .map(|(ty, result)| result.map(|entities| (ty.plural(), entities)))
            .collect()
    }

    /// Resolve the whole document.
    ///
    /// Clears the cache, then resolves scenes, cameras and (when declared)
    /// animations concurrently. The active scene is the document's default
    /// scene, or the first one.
    pub async fn parse(&self) -> Result<GltfScene, ResolveError> {
        self.reset();
        let document = self.ctx.document.clone();

        let mut types = vec![EntityType::Scene, EntityType::Camera];
        if !document.animations.is_empty() {
            types.push(EntityType::Animation);
        }
        let mut resolved = self.resolve_many(&types).await?;
        let mut take = |ty: EntityType| resolved.remove(ty.plural()).unwrap_or_default();

        let scenes: Vec<Arc<SceneRoot>> = take(EntityType::Scene)
            .into_iter()
            .filter_map(|e| match e {
                Entity::Scene(scene) => Some(scene),
                _ => None,
            })
            .collect();
        let cameras = take(EntityType::Camera)
            .into_iter()
            .filter_map(|e| match e {
                Entity::Camera(camera) => Some(camera),
                _ => None,
            })
            .collect();
        let clips = take(EntityType::Animation)
            .into_iter()
            .filter_map(|e| match e {
                Entity::Animation(clip) => Some(clip),
                _ => None,
            })
            .collect();

        let active = document.scene.unwrap_or(0);
        let scene = scenes.get(active).cloned();
        if scene.is_none() && !scenes.is_empty() {
            log::warn!("Default scene {active} does not exist");
        }
        let animations = AnimationCollection {
            nodes: self.ctx.animations.borrow().values().cloned().collect(),
        };

        Ok(GltfScene {
            scene,
            scenes,
            cameras,
            animations,
            clips,
            document,
            diagnostics: Vec::new(),
        })
    }

    async fn load(&self, ty: EntityType, index: usize) -> Result<Entity, ResolveError> {
        let count = &self.ctx.loads[ty as usize];
        count.set(count.get() + 1);
        if index >= self.ctx.document.count(ty) {
            return Err(ResolveError::IndexOutOfRange {
                kind: ty.name(),
                index,
            });
        }
        log::trace!("Resolving {ty} {index}");

        let result = match ty {
            EntityType::Buffer => self.load_buffer(index).await.map(Entity::Buffer),
            EntityType::BufferView => self.load_buffer_view(index).await.map(Entity::BufferView),
            EntityType::Accessor => self.load_accessor(index).await.map(Entity::Accessor),
            EntityType::Material => self.load_material(index).await.map(Entity::Material),
            EntityType::Texture => self.load_texture(index).await.map(Entity::Texture),
            EntityType::Mesh => self.load_mesh(index).await.map(Entity::Mesh),
            EntityType::Node => self.load_node(index).await.map(Entity::Node),
            EntityType::Skin => self.load_skin(index).await.map(Entity::Skin),
            EntityType::Camera => self.load_camera(index).map(Entity::Camera),
            EntityType::Scene => self.load_scene(index).await.map(Entity::Scene),
            EntityType::Animation => self.load_animation(index).await.map(Entity::Animation),
        };
        if let Err(e) = &result {
            log::debug!("Failed to resolve {ty} {index}: {e}");
        }
        result
    }

    /// Fetch a URI relative to the document.
    pub(super) async fn fetch(&self, uri: &str) -> Result<Vec<u8>, ResolveError> {
        self.ctx
            .fetcher
            .fetch(uri, &self.ctx.base_path)
            .await
            .map_err(|source| ResolveError::Fetch {
                uri: short_uri(uri),
                source: Arc::new(source),
            })
    }

    async fn load_buffer(&self, index: usize) -> Result<Arc<[u8]>, ResolveError> {
        let def = &self.ctx.document.buffers[index];
        let data: Arc<[u8]> = match &def.uri {
            Some(uri) => self.fetch(uri).await?.into(),
            None => self
                .ctx
                .bin
                .clone()
                .ok_or(ResolveError::MissingBinaryChunk(index))?,
        };
        if data.len() < def.byte_length {
            log::warn!(
                "Buffer {index} declares {} bytes but only {} are available",
                def.byte_length,
                data.len()
            );
        }
        Ok(data)
    }

    async fn load_buffer_view(&self, index: usize) -> Result<BufferViewData, ResolveError> {
        let def = &self.ctx.document.buffer_views[index];
        let buffer = self.buffer(def.buffer).await?;
        BufferViewData::new(buffer, def.byte_offset, def.byte_length, def.byte_stride)
    }

    async fn load_accessor(&self, index: usize) -> Result<Option<Arc<BufferAttribute>>, ResolveError> {
        let def = &self.ctx.document.accessors[index];
        let view = match def.buffer_view {
            Some(view) => Some(self.buffer_view(view).await?),
            None => None,
        };
        let sparse_views = match &def.sparse {
            Some(sparse) => Some((
                self.buffer_view(sparse.indices.buffer_view).await?,
                self.buffer_view(sparse.values.buffer_view).await?,
            )),
            None => None,
        };
        let sparse = def
            .sparse
            .as_ref()
            .zip(sparse_views.as_ref())
            .map(|(def, (indices, values))| SparseViews {
                def,
                indices,
                values,
            });
        Ok(accessor::decode(index, def, view.as_ref(), sparse)?.map(Arc::new))
    }
}

macro_rules! typed_getters {
    ($($(#[$meta:meta])* $fn:ident => $variant:ident: $ty:ty;)*) => {
        impl Resolver {
            $(
                $(#[$meta])*
                pub async fn $fn(&self, index: usize) -> Result<$ty, ResolveError> {
                    match self.resolve_entity(EntityType::$variant, index).await? {
                        Entity::$variant(value) => Ok(value),
                        _ => Err(ResolveError::EntityMismatch {
                            expected: EntityType::$variant,
                        }),
                    }
                }
            )*
        }
    };
}

typed_getters! {
    buffer => Buffer: Arc<[u8]>;
    buffer_view => BufferView: BufferViewData;
    /// `None` for an accessor declared without data.
    accessor => Accessor: Option<Arc<BufferAttribute>>;
    material => Material: Arc<MaterialParams>;
    texture => Texture: Arc<CpuTexture>;
    mesh => Mesh: Arc<MeshObject>;
    node => Node: Arc<NodeObject>;
    skin => Skin: Arc<SkinEntry>;
    camera => Camera: Arc<SceneCamera>;
    scene => Scene: Arc<SceneRoot>;
    animation => Animation: Arc<AnimationClip>;
}

/// Run futures as local tasks and collect their results in input order.
///
/// A task that never reports back (panicked or cancelled) yields
/// [`ResolveError::TaskAborted`] labelled by `label(i)`.
pub(super) async fn join_all<T: 'static>(
    futures: Vec<ResolveFuture<T>>,
    label: impl Fn(usize) -> String,
) -> Vec<Result<T, ResolveError>> {
    let mut results: Vec<Option<Result<T, ResolveError>>> =
        futures.iter().map(|_| None).collect();

    let mut set = JoinSet::new();
    for (i, future) in futures.into_iter().enumerate() {
        set.spawn_local(async move { (i, future.await) });
    }
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((i, result)) => results[i] = Some(result),
            Err(e) => log::error!("Resolution task failed: {e}"),
        }
    }

    results
        .into_iter()
        .enumerate()
        .map(|(i, result)| result.unwrap_or_else(|| Err(ResolveError::TaskAborted(label(i)))))
        .collect()
}

const MAX_URI_DISPLAY: usize = 64;

/// URI shortened for error messages; `data:` URIs can be megabytes long.
fn short_uri(uri: &str) -> String {
    match uri.char_indices().nth(MAX_URI_DISPLAY) {
        Some((cut, _)) => format!("{}...", &uri[..cut]),
        None => uri.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_type_names() {
        assert_eq!(EntityType::BufferView.to_string(), "bufferView");
        assert_eq!(EntityType::Mesh.plural(), "meshes");
        for ty in EntityType::ALL {
            assert_eq!(ty.name().parse::<EntityType>().unwrap(), ty);
            assert_eq!(ty.plural().parse::<EntityType>().unwrap(), ty);
        }
    }

    #[test]
    fn unknown_entity_type_is_fatal() {
        let err = "lights".parse::<EntityType>().unwrap_err();
        assert!(matches!(err, GltfError::UnknownEntityType(name) if name == "lights"));
    }

    #[test]
    fn short_uri_truncates_long_data_uris() {
        assert_eq!(short_uri("mesh.bin"), "mesh.bin");
        let long = format!("data:application/octet-stream;base64,{}", "A".repeat(200));
        let short = short_uri(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), MAX_URI_DISPLAY + 3);
    }

    #[test]
    fn bone_and_skinned_marks() {
        let document: Document = serde_json::from_value(serde_json::json!({
            "asset": {"version": "2.0"},
            "nodes": [{"mesh": 0, "skin": 0}, {}, {}, {"mesh": 1}],
            "meshes": [{"primitives": []}, {"primitives": []}],
            "skins": [{"joints": [1, 2, 99]}]
        }))
        .unwrap();
        let ctx = ParseContext::new(Arc::new(document), Fetcher::default());
        assert!(!ctx.is_bone(0));
        assert!(ctx.is_bone(1));
        assert!(ctx.is_bone(2));
        assert!(!ctx.is_bone(99));
        assert!(ctx.is_skinned_mesh(0));
        assert!(!ctx.is_skinned_mesh(1));
    }
}
