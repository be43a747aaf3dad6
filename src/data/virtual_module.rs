//! The `virtual:creation-times` data module.
//!
//! A build pipeline asks for the module by its well-known id; loading it
//! resolves every content file and renders the cache snapshot under the
//! content directory.
//!
//! # Staleness
//!
//! Each rendered format is kept until [`VirtualModule::invalidate`] is called
//! (a ref change in watch mode). Invalidation only forces regeneration; the
//! resolver's cache is never cleared, so a reload mostly hits cache and only
//! queries git for files it has not seen.

use super::inventory::content_files;
use super::render::{ModuleFormat, render};
use crate::{
    log,
    resolver::{CreationTimeResolver, HistorySource},
};
use anyhow::{Context, Result};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::{path::PathBuf, time::Instant};

/// Default id importers use to request the module.
pub const DEFAULT_MODULE_ID: &str = "virtual:creation-times";

/// Suffix selecting JSON output instead of JS.
const JSON_SUFFIX: &str = ".json";

/// Marker for resolved virtual ids, so other resolvers leave them alone.
const RESOLVED_PREFIX: char = '\0';

/// Narrow adapter between a build pipeline's module loader and generated data.
pub trait ModuleProvider {
    /// Map an import id to the internal id this provider loads, if it owns it.
    fn resolve_id(&self, id: &str) -> Option<String>;

    /// Source text for a resolved id, or `None` if the id is not ours.
    async fn provide(&self, resolved_id: &str) -> Result<Option<String>>;
}

#[derive(Debug)]
struct Rendered {
    text: String,
    stale: bool,
}

/// Re-loadable creation times module backed by a resolver.
#[derive(Debug)]
pub struct VirtualModule<H> {
    resolver: CreationTimeResolver<H>,
    id: String,
    repo_root: PathBuf,
    content_dir: String,
    keep_last_good: bool,
    rendered: RwLock<FxHashMap<ModuleFormat, Rendered>>,
}

impl<H: HistorySource> VirtualModule<H> {
    pub fn new(
        resolver: CreationTimeResolver<H>,
        repo_root: impl Into<PathBuf>,
        content_dir: impl Into<String>,
    ) -> Self {
        let content_dir: String = content_dir.into();
        Self {
            resolver,
            id: DEFAULT_MODULE_ID.into(),
            repo_root: repo_root.into(),
            content_dir: content_dir.trim_end_matches('/').to_owned(),
            keep_last_good: false,
            rendered: RwLock::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Serve the previous output when regeneration fails (watch sessions).
    pub fn keep_last_good(mut self, keep: bool) -> Self {
        self.keep_last_good = keep;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn resolver(&self) -> &CreationTimeResolver<H> {
        &self.resolver
    }

    /// Mark every rendered format stale; the next load regenerates.
    pub fn invalidate(&self) {
        for rendered in self.rendered.write().values_mut() {
            rendered.stale = true;
        }
    }

    /// Module source text, regenerated only when missing or stale.
    pub async fn load(&self, format: ModuleFormat) -> Result<String> {
        if let Some(rendered) = self.rendered.read().get(&format)
            && !rendered.stale
        {
            return Ok(rendered.text.clone());
        }

        match self.generate(format).await {
            Ok(text) => {
                self.rendered.write().insert(
                    format,
                    Rendered {
                        text: text.clone(),
                        stale: false,
                    },
                );
                Ok(text)
            }
            Err(err) => {
                let previous = self
                    .rendered
                    .read()
                    .get(&format)
                    .map(|r| r.text.clone())
                    .filter(|_| self.keep_last_good);

                match previous {
                    Some(text) => {
                        log!("error"; "{err:#}");
                        log!("module"; "keeping previous {}", self.id);
                        Ok(text)
                    }
                    None => Err(err),
                }
            }
        }
    }

    async fn generate(&self, format: ModuleFormat) -> Result<String> {
        let started = Instant::now();

        let files = content_files(&self.repo_root, &self.content_dir)?;
        self.resolver
            .resolve(&files)
            .await
            .with_context(|| format!("Failed to resolve creation times for {}", self.id))?;

        let snapshot = self.resolver.cache().snapshot_under(&self.content_dir);
        let text = render(&snapshot, format);

        log!("module"; "updated creation times in {}ms", started.elapsed().as_millis());
        Ok(text)
    }

    fn format_of(&self, resolved_id: &str) -> Option<ModuleFormat> {
        let id = resolved_id.strip_prefix(RESOLVED_PREFIX)?;
        if id == self.id {
            return Some(ModuleFormat::Js);
        }
        id.strip_suffix(JSON_SUFFIX)
            .filter(|base| *base == self.id)
            .map(|_| ModuleFormat::Json)
    }
}

impl<H: HistorySource> ModuleProvider for VirtualModule<H> {
    fn resolve_id(&self, id: &str) -> Option<String> {
        let is_ours = id == self.id
            || id
                .strip_suffix(JSON_SUFFIX)
                .is_some_and(|base| base == self.id);
        is_ours.then(|| format!("{RESOLVED_PREFIX}{id}"))
    }

    async fn provide(&self, resolved_id: &str) -> Result<Option<String>> {
        match self.format_of(resolved_id) {
            Some(format) => self.load(format).await.map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{CreationTimeCache, tests::FakeHistory};
    use std::{fs, sync::Arc};
    use tempfile::TempDir;

    fn is_stale<H>(module: &VirtualModule<H>, format: ModuleFormat) -> bool {
        module.rendered.read().get(&format).is_none_or(|r| r.stale)
    }

    const HISTORY: &str = "2024-01-05T10:00:00Z\nsrc/content/blog/a.md\n";

    fn setup(fake: Arc<FakeHistory>) -> (TempDir, VirtualModule<Arc<FakeHistory>>) {
        let dir = TempDir::new().unwrap();
        let blog = dir.path().join("src/content/blog");
        fs::create_dir_all(&blog).unwrap();
        fs::write(blog.join("a.md"), "# a").unwrap();

        let resolver = CreationTimeResolver::new(fake, Arc::new(CreationTimeCache::new()));
        let module = VirtualModule::new(resolver, dir.path(), "src/content/blog/");
        (dir, module)
    }

    #[test]
    fn test_resolve_id() {
        let (_dir, module) = setup(Arc::new(FakeHistory::ok("")));

        assert_eq!(
            module.resolve_id("virtual:creation-times").as_deref(),
            Some("\0virtual:creation-times")
        );
        assert_eq!(
            module.resolve_id("virtual:creation-times.json").as_deref(),
            Some("\0virtual:creation-times.json")
        );
        assert_eq!(module.resolve_id("virtual:other"), None);
        assert_eq!(module.resolve_id("./posts.ts"), None);
    }

    #[test]
    fn test_format_of() {
        let (_dir, module) = setup(Arc::new(FakeHistory::ok("")));

        assert_eq!(module.format_of("\0virtual:creation-times"), Some(ModuleFormat::Js));
        assert_eq!(
            module.format_of("\0virtual:creation-times.json"),
            Some(ModuleFormat::Json)
        );
        // Unresolved ids are not loadable.
        assert_eq!(module.format_of("virtual:creation-times"), None);
    }

    #[tokio::test]
    async fn test_provide_unknown_id() {
        let (_dir, module) = setup(Arc::new(FakeHistory::ok(HISTORY)));
        assert!(module.provide("\0virtual:other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_provide_renders_module() {
        let fake = Arc::new(FakeHistory::ok(HISTORY));
        let (_dir, module) = setup(fake.clone());

        let id = module.resolve_id("virtual:creation-times").unwrap();
        let text = module.provide(&id).await.unwrap().unwrap();

        assert!(text.starts_with("export const creationTimes = {"));
        assert!(text.contains(r#""src/content/blog/a.md": new Date("2024-01-05T10:00:00Z")"#));
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_load_is_memoized_until_invalidated() {
        let fake = Arc::new(FakeHistory::ok(HISTORY));
        let (_dir, module) = setup(fake.clone());

        let first = module.load(ModuleFormat::Js).await.unwrap();
        let second = module.load(ModuleFormat::Js).await.unwrap();
        assert_eq!(first, second);
        assert!(!is_stale(&module, ModuleFormat::Js));

        module.invalidate();
        assert!(is_stale(&module, ModuleFormat::Js));

        let third = module.load(ModuleFormat::Js).await.unwrap();
        assert_eq!(first, third);
        // The reload is satisfied from cache.
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_reload_after_ref_change_adds_new_entries() {
        let fake = Arc::new(FakeHistory::ok(HISTORY));
        let (dir, module) = setup(fake.clone());

        let before = module.load(ModuleFormat::Json).await.unwrap();
        assert!(!before.contains("b.md"));

        // A new post is committed and a branch ref moves.
        fs::write(dir.path().join("src/content/blog/b.md"), "# b").unwrap();
        fake.set_output("2024-03-01T09:00:00Z\nsrc/content/blog/b.md\n");
        module.invalidate();

        let after = module.load(ModuleFormat::Json).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&after).unwrap();

        assert_eq!(value["src/content/blog/a.md"], "2024-01-05T10:00:00Z");
        assert_eq!(value["src/content/blog/b.md"], "2024-03-01T09:00:00Z");
        assert_eq!(fake.calls(), 2);
        assert_eq!(fake.queries.lock()[1].paths, vec!["src/content/blog/b.md".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_last_good() {
        let fake = Arc::new(FakeHistory::ok(HISTORY));
        let (dir, module) = setup(fake.clone());
        let module = module.keep_last_good(true);

        let good = module.load(ModuleFormat::Js).await.unwrap();

        fs::write(dir.path().join("src/content/blog/b.md"), "# b").unwrap();
        *fake.output.lock() = Err(128);
        module.invalidate();

        let text = module.load(ModuleFormat::Js).await.unwrap();
        assert_eq!(text, good);
        assert!(is_stale(&module, ModuleFormat::Js));
    }

    #[tokio::test]
    async fn test_failed_load_propagates_without_keep_last_good() {
        let fake = Arc::new(FakeHistory::failing(128));
        let (_dir, module) = setup(fake);

        let err = module.load(ModuleFormat::Js).await.unwrap_err();
        assert!(format!("{err:#}").contains("history query failed"));
    }

    #[tokio::test]
    async fn test_snapshot_excludes_files_outside_content_dir() {
        let fake = Arc::new(FakeHistory::ok(
            "2024-01-05T10:00:00Z\nsrc/content/blog/a.md\n",
        ));
        let (_dir, module) = setup(fake);
        module
            .resolver()
            .cache()
            .merge([("README.md".to_string(), chrono::DateTime::parse_from_rfc3339("2023-01-01T00:00:00Z").unwrap())]);

        let text = module.load(ModuleFormat::Js).await.unwrap();
        assert!(!text.contains("README.md"));
    }
}
