//! Load entry point: fetch, container sniffing, version gate, and the
//! top-level parse.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::LocalSet;

use lumen_vfs::path;
use lumen_vfs::uri::UriKind;
use lumen_vfs::Fetcher;

use crate::animation::{AnimationClip, AnimationCollection};
use crate::scene::{SceneCamera, SceneRoot};

use super::config::LoaderConfig;
use super::document::Document;
use super::error::GltfError;
use super::glb::{self, Glb};
use super::resolver::{Entity, EntityType, ParseContext, Resolver};

/// Result of one load.
#[derive(Debug, Clone)]
pub struct GltfScene {
    /// Active scene: the document's default scene, else the first one.
    pub scene: Option<Arc<SceneRoot>>,
    /// Every scene, in document order.
    pub scenes: Vec<Arc<SceneRoot>>,
    /// Every camera, in document order.
    pub cameras: Vec<Arc<SceneCamera>>,
    /// Per-node animations aggregated over all animations.
    pub animations: AnimationCollection,
    /// Per-animation view of the same tracks.
    pub clips: Vec<Arc<AnimationClip>>,
    /// The parsed document, for introspection.
    pub document: Arc<Document>,
    /// Non-fatal findings, such as unsupported extensions.
    pub diagnostics: Vec<String>,
}

/// Loads `.gltf` and `.glb` documents through a [`Fetcher`].
///
/// # Example
///
/// ```ignore
/// let mut vfs = Vfs::new();
/// vfs.mount("assets", FileSystemProvider::new("./assets"));
/// let loader = GltfLoader::new(Fetcher::new(vfs));
///
/// let rt = tokio::runtime::Builder::new_current_thread().build()?;
/// let scene = rt.block_on(loader.load("assets/models/car.glb"))?;
/// ```
#[derive(Clone, Default)]
pub struct GltfLoader {
    fetcher: Fetcher,
    config: LoaderConfig,
}

impl GltfLoader {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            config: LoaderConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Fetch and parse the document at `uri`. Relative references inside it
    /// resolve against the URI's directory.
    pub async fn load(&self, uri: &str) -> Result<GltfScene, GltfError> {
        log::info!("Loading {uri}");
        let data = self.fetcher.fetch(uri, "").await?;
        self.parse(&data, &document_base(uri)).await
    }

    /// [`load`](Self::load) reporting through callbacks instead of a result.
    pub async fn load_with(
        &self,
        uri: &str,
        on_load: impl FnOnce(GltfScene),
        on_error: impl FnOnce(GltfError),
    ) {
        match self.load(uri).await {
            Ok(scene) => on_load(scene),
            Err(e) => {
                log::error!("Failed to load {uri}: {e}");
                on_error(e);
            }
        }
    }

    /// Parse document bytes, either JSON or a binary container.
    ///
    /// Must run inside a Tokio runtime; resolution itself runs on a fresh
    /// [`LocalSet`].
    pub async fn parse(&self, data: &[u8], base_path: &str) -> Result<GltfScene, GltfError> {
        let (resolver, diagnostics) = self.prepare(data, base_path)?;
        let mut scene = LocalSet::new().run_until(resolver.parse()).await?;

        log::info!(
            "Resolved {} scenes, {} cameras, {} animated nodes",
            scene.scenes.len(),
            scene.cameras.len(),
            scene.animations.len()
        );
        scene.diagnostics = diagnostics;
        Ok(scene)
    }

    /// Fetch the document at `uri` and resolve every entity of the named
    /// types, keyed by plural type name.
    ///
    /// Names are checked before anything is fetched; an unknown one fails
    /// the whole call.
    pub async fn load_entities(
        &self,
        uri: &str,
        type_names: &[&str],
    ) -> Result<BTreeMap<&'static str, Vec<Entity>>, GltfError> {
        let types = type_names
            .iter()
            .map(|name| name.parse::<EntityType>())
            .collect::<Result<Vec<_>, _>>()?;
        let data = self.fetcher.fetch(uri, "").await?;
        let (resolver, _) = self.prepare(&data, &document_base(uri))?;
        Ok(LocalSet::new()
            .run_until(resolver.resolve_many(&types))
            .await?)
    }

    /// Container sniffing, version gate and extension checks.
    fn prepare(&self, data: &[u8], base_path: &str) -> Result<(Resolver, Vec<String>), GltfError> {
        let (document, bin) = if glb::is_glb(data) {
            let container = Glb::from_slice(data)?;
            (
                Document::from_slice(container.json)?,
                container.bin.map(Arc::<[u8]>::from),
            )
        } else {
            (Document::from_slice(data)?, None)
        };
        document.check_version()?;
        let diagnostics = self.check_extensions(&document)?;

        let context = ParseContext::new(Arc::new(document), self.fetcher.clone())
            .with_bin(bin)
            .with_base_path(base_path)
            .with_config(self.config.clone());
        Ok((Resolver::new(context), diagnostics))
    }

    fn check_extensions(&self, document: &Document) -> Result<Vec<String>, GltfError> {
        let mut diagnostics = Vec::new();
        for name in &document.extensions_required {
            if self.config.strict_extensions {
                return Err(GltfError::UnsupportedExtension(name.clone()));
            }
            diagnostics.push(format!("required extension {name} is not supported"));
        }
        for name in &document.extensions_used {
            if !document.extensions_required.contains(name) {
                diagnostics.push(format!("extension {name} is not supported"));
            }
        }
        for diagnostic in &diagnostics {
            log::warn!("{diagnostic}");
        }
        Ok(diagnostics)
    }
}

/// Base path that relative references in the document at `uri` resolve
/// against, in VFS path form.
fn document_base(uri: &str) -> String {
    match UriKind::classify(uri) {
        UriKind::Data | UriKind::Blob(_) => String::new(),
        UriKind::Absolute { scheme, rest } => match path::parent(rest) {
            "" => scheme.to_owned(),
            dir => format!("{scheme}/{dir}"),
        },
        UriKind::Rooted(rooted) => decoded(path::parent(rooted)),
        UriKind::Relative(relative) => decoded(path::parent(relative)),
    }
}

fn decoded(dir: &str) -> String {
    path::percent_decode(dir).unwrap_or_else(|_| dir.to_owned())
}
