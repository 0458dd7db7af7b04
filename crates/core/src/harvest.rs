//! Harvest orchestration.
//!
//! A [`Harvester`] walks the lesson listing, fetches every lesson that is not
//! already cached, and extracts its text collection. Fetches run concurrently
//! up to [`HarvestConfig::concurrency`], but results are always returned in
//! listing order so that the rendered document is reproducible.
//!
//! # Example
//!
//! ```rust,no_run
//! use beanpress_core::{ArticleCache, HarvestConfig, Harvester, HttpFetcher};
//!
//! # async fn example() -> beanpress_core::Result<()> {
//! let config = HarvestConfig::builder().min_level(5).concurrency(2).build();
//! let fetcher = HttpFetcher::new(config.fetch.clone())?;
//! let harvester = Harvester::new(fetcher, config);
//!
//! let harvest = harvester.run(&ArticleCache::new(".cache"), false).await?;
//! println!("{} lessons", harvest.collections.len());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::article::{ArticleTextCollection, extract_article};
use crate::cache::ArticleCache;
use crate::fetch::{FetchConfig, PageFetcher};
use crate::metadata::{ArticleMetadata, DEFAULT_LISTING_URL, listing_page_url, parse_listing, parse_max_pages};
use crate::parse::Document;
use crate::vocabulary::DEFAULT_MIN_LEVEL;
use crate::{BeanpressError, Result};

/// Configuration for a harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// First page of the lesson listing, without the page number.
    pub listing_url: String,

    /// Minimum HSK level for vocabulary entries (default: 4).
    pub min_level: u32,

    /// Maximum number of lessons fetched at once (default: 4).
    pub concurrency: usize,

    /// HTTP settings.
    pub fetch: FetchConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            min_level: DEFAULT_MIN_LEVEL,
            concurrency: 4,
            fetch: FetchConfig::default(),
        }
    }
}

impl HarvestConfig {
    /// Creates a new builder for HarvestConfig.
    pub fn builder() -> HarvestConfigBuilder {
        HarvestConfigBuilder::new()
    }
}

/// Builder for HarvestConfig.
pub struct HarvestConfigBuilder {
    config: HarvestConfig,
}

impl HarvestConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: HarvestConfig::default() }
    }

    pub fn listing_url(mut self, value: impl Into<String>) -> Self {
        self.config.listing_url = value.into();
        self
    }

    pub fn min_level(mut self, value: u32) -> Self {
        self.config.min_level = value;
        self
    }

    /// Sets the fetch concurrency; zero is treated as one.
    pub fn concurrency(mut self, value: usize) -> Self {
        self.config.concurrency = value.max(1);
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.config.fetch.timeout = seconds;
        self
    }

    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.fetch.user_agent = value.into();
        self
    }

    pub fn build(self) -> HarvestConfig {
        self.config
    }
}

impl Default for HarvestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of collecting text for a list of lessons.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    /// Collections in listing order, cached and freshly fetched alike.
    pub collections: Vec<ArticleTextCollection>,
    /// Number of lessons fetched and extracted in this run.
    pub fetched: usize,
    /// URLs skipped because fetching them failed.
    pub failed: Vec<String>,
}

/// Fetches and extracts lessons through a [`PageFetcher`].
pub struct Harvester<F> {
    fetcher: Arc<F>,
    config: HarvestConfig,
}

impl<F: PageFetcher + 'static> Harvester<F> {
    pub fn new(fetcher: F, config: HarvestConfig) -> Self {
        Self { fetcher: Arc::new(fetcher), config }
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Reads every listing page and returns the lessons in listing order.
    ///
    /// Listing failures are fatal: without the listing there is nothing to
    /// harvest.
    pub async fn fetch_listing(&self) -> Result<Vec<ArticleMetadata>> {
        let first_url = listing_page_url(&self.config.listing_url, 1)?;
        let first_page = self.fetcher.fetch(&first_url).await?;

        let max_pages = parse_max_pages(&Document::parse(&first_page))?;
        let mut articles = parse_listing(&Document::parse(&first_page))?;
        info!(max_pages, "reading lesson listing");

        for page in 2..=max_pages {
            let url = listing_page_url(&self.config.listing_url, page)?;
            let html = self.fetcher.fetch(&url).await?;
            let found = parse_listing(&Document::parse(&html))?;
            debug!(page, count = found.len(), "listing page parsed");
            articles.extend(found);
        }

        Ok(articles)
    }

    /// Builds the text collection of every lesson in `metadata`.
    ///
    /// Lessons whose URL appears in `cached` are not fetched again. A lesson
    /// that fails to fetch is logged, recorded in [`Harvest::failed`] and left
    /// out; any other error aborts the run.
    pub async fn collect(&self, metadata: &[ArticleMetadata], cached: Vec<ArticleTextCollection>) -> Result<Harvest> {
        let by_url: HashMap<String, ArticleTextCollection> =
            cached.into_iter().map(|c| (c.metadata.url.clone(), c)).collect();

        let misses: Vec<(usize, String)> = metadata
            .iter()
            .enumerate()
            .filter(|(_, m)| !by_url.contains_key(&m.url))
            .map(|(index, m)| (index, m.url.clone()))
            .collect();
        info!(cached = metadata.len() - misses.len(), to_fetch = misses.len(), "collecting lessons");

        let mut harvest = Harvest::default();
        let mut pages: HashMap<usize, String> = HashMap::new();

        for (index, url, result) in self.fetch_all(misses).await {
            match result {
                Ok(html) => {
                    pages.insert(index, html);
                }
                Err(err) if err.is_fetch_failure() => {
                    warn!(url = %url, error = %err, "skipping lesson");
                    harvest.failed.push(url);
                }
                Err(err) => return Err(err),
            }
        }

        for (index, article) in metadata.iter().enumerate() {
            if let Some(collection) = by_url.get(&article.url) {
                harvest.collections.push(collection.clone());
            } else if let Some(html) = pages.remove(&index) {
                let collection = extract_article(article.clone(), &html, self.config.min_level)?;
                debug!(
                    url = %article.url,
                    paragraphs = collection.main_text.len(),
                    words = collection.vocabulary.len(),
                    "lesson extracted"
                );
                harvest.collections.push(collection);
                harvest.fetched += 1;
            }
        }

        Ok(harvest)
    }

    /// Runs a full harvest against a cache directory.
    ///
    /// With `refresh`, existing cache files are ignored and overwritten.
    pub async fn run(&self, cache: &ArticleCache, refresh: bool) -> Result<Harvest> {
        let cached_metadata = if refresh { None } else { cache.load_metadata()? };
        let metadata = match cached_metadata {
            Some(metadata) => metadata,
            None => {
                let metadata = self.fetch_listing().await?;
                cache.save_metadata(&metadata)?;
                metadata
            }
        };

        let cached = if refresh { None } else { cache.load_collections()? };
        let harvest = self.collect(&metadata, cached.unwrap_or_default()).await?;

        if refresh || harvest.fetched > 0 || !cache.collections_path().exists() {
            cache.save_collections(&harvest.collections)?;
        }

        Ok(harvest)
    }

    async fn fetch_all(&self, targets: Vec<(usize, String)>) -> Vec<(usize, String, Result<String>)> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks = JoinSet::new();
        let mut pending: HashMap<usize, String> = HashMap::with_capacity(targets.len());

        for (index, url) in targets {
            pending.insert(index, url.clone());
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                debug!(url = %url, "fetching lesson");
                let result = fetcher.fetch(&url).await;
                (index, url, result)
            });
        }

        let mut results = Vec::with_capacity(pending.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    pending.remove(&result.0);
                    results.push(result);
                }
                Err(err) => warn!(error = %err, "fetch task did not complete"),
            }
        }

        // Whatever is still pending belongs to a task that never returned.
        for (index, url) in pending {
            let err =
                BeanpressError::FetchAborted { url: url.clone(), reason: "task panicked or was cancelled".to_string() };
            results.push((index, url, Err(err)));
        }

        results.sort_by_key(|(index, ..)| *index);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serves canned pages and records which URLs were requested.
    struct StaticFetcher {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        fn new(pages: &[(&str, String)]) -> Self {
            Self {
                pages: pages.iter().map(|(url, html)| (url.to_string(), html.clone())).collect(),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    impl PageFetcher for Arc<StaticFetcher> {
        async fn fetch(&self, url: &str) -> Result<String> {
            if url.ends_with("/crash/") {
                panic!("fetcher crashed on {url}");
            }
            self.requested.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| BeanpressError::HttpStatus { url: url.to_string(), status: 404 })
        }
    }

    fn meta(slug: &str) -> ArticleMetadata {
        ArticleMetadata {
            title: slug.to_string(),
            chinese_title: "課".to_string(),
            url: format!("https://lessons.test/{slug}/"),
            category_tag: "Culture".to_string(),
            difficulty_tag: "HSK4".to_string(),
        }
    }

    fn lesson(traditional: &str) -> String {
        format!(
            r#"<html><body><p><abbr rel="tooltip" title="x&#10;word (HSK5)"><ruby><span class="si">{t}</span><span class="tr">{t}</span><rt>pin</rt></ruby></abbr>。</p></body></html>"#,
            t = traditional
        )
    }

    fn card(slug: &str) -> String {
        format!(
            r#"<article class="elementor-post tag-hsk4 tag-culture"><span class="elementor-heading-title"><a href="https://lessons.test/{slug}/">{slug}</a></span><span class="tr">課</span></article>"#
        )
    }

    fn listing(max_pages: u32, cards: &[&str]) -> String {
        let cards: String = cards.iter().map(|slug| card(slug)).collect();
        format!(
            r#"<html><body><div class="ecs-posts" data-settings='{{"max_num_pages":{max_pages}}}'>{cards}</div></body></html>"#
        )
    }

    const LISTING: &str = "https://lessons.test/all/?tax=hsk";

    fn harvester(fetcher: &Arc<StaticFetcher>, concurrency: usize) -> Harvester<Arc<StaticFetcher>> {
        let config = HarvestConfig::builder().listing_url(LISTING).concurrency(concurrency).build();
        Harvester::new(Arc::clone(fetcher), config)
    }

    #[test]
    fn test_builder_defaults_and_overrides() {
        let config = HarvestConfig::builder().min_level(0).concurrency(0).timeout(5).build();

        assert_eq!(config.min_level, 0);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.fetch.timeout, 5);
        assert_eq!(config.listing_url, DEFAULT_LISTING_URL);
    }

    #[tokio::test]
    async fn test_collect_preserves_listing_order() {
        let metadata: Vec<ArticleMetadata> = ["a", "b", "c", "d", "e"].iter().map(|s| meta(s)).collect();
        let pages: Vec<(&str, String)> = vec![
            ("https://lessons.test/a/", lesson("甲")),
            ("https://lessons.test/b/", lesson("乙")),
            ("https://lessons.test/c/", lesson("丙")),
            ("https://lessons.test/d/", lesson("丁")),
            ("https://lessons.test/e/", lesson("戊")),
        ];
        let fetcher = Arc::new(StaticFetcher::new(&pages));

        let harvest = harvester(&fetcher, 3).collect(&metadata, Vec::new()).await.unwrap();
        let texts: Vec<String> = harvest.collections.iter().map(|c| c.main_text_joined()).collect();

        assert_eq!(texts, vec!["甲。", "乙。", "丙。", "丁。", "戊。"]);
        assert_eq!(harvest.fetched, 5);
    }

    #[tokio::test]
    async fn test_collect_skips_failed_fetch() {
        let metadata = vec![meta("a"), meta("missing"), meta("c")];
        let pages = vec![
            ("https://lessons.test/a/", lesson("甲")),
            ("https://lessons.test/c/", lesson("丙")),
        ];
        let fetcher = Arc::new(StaticFetcher::new(&pages));

        let harvest = harvester(&fetcher, 1).collect(&metadata, Vec::new()).await.unwrap();
        let urls: Vec<&str> = harvest.collections.iter().map(|c| c.metadata.url.as_str()).collect();

        assert_eq!(urls, vec!["https://lessons.test/a/", "https://lessons.test/c/"]);
        assert_eq!(harvest.failed, vec!["https://lessons.test/missing/".to_string()]);
    }

    #[tokio::test]
    async fn test_collect_reports_crashed_fetch_task() {
        let metadata = vec![meta("a"), meta("crash"), meta("c")];
        let pages = vec![
            ("https://lessons.test/a/", lesson("甲")),
            ("https://lessons.test/c/", lesson("丙")),
        ];
        let fetcher = Arc::new(StaticFetcher::new(&pages));

        let harvest = harvester(&fetcher, 2).collect(&metadata, Vec::new()).await.unwrap();
        let texts: Vec<String> = harvest.collections.iter().map(|c| c.main_text_joined()).collect();

        assert_eq!(texts, vec!["甲。", "丙。"]);
        assert_eq!(harvest.failed, vec!["https://lessons.test/crash/".to_string()]);
    }

    #[tokio::test]
    async fn test_collect_uses_cache_hits() {
        let metadata = vec![meta("a"), meta("b")];
        let cached = extract_article(meta("a"), &lesson("舊"), 4).unwrap();
        let pages = vec![("https://lessons.test/b/", lesson("乙"))];
        let fetcher = Arc::new(StaticFetcher::new(&pages));

        let harvest = harvester(&fetcher, 2).collect(&metadata, vec![cached]).await.unwrap();

        assert_eq!(fetcher.requested(), vec!["https://lessons.test/b/".to_string()]);
        assert_eq!(harvest.collections[0].main_text_joined(), "舊。");
        assert_eq!(harvest.collections[1].main_text_joined(), "乙。");
        assert_eq!(harvest.fetched, 1);
    }

    #[tokio::test]
    async fn test_fetch_listing_reads_all_pages() {
        let pages = vec![
            ("https://lessons.test/all/?tax=hsk&pagenum=1", listing(2, &["a", "b"])),
            ("https://lessons.test/all/?tax=hsk&pagenum=2", listing(2, &["c"])),
        ];
        let fetcher = Arc::new(StaticFetcher::new(&pages));

        let metadata = harvester(&fetcher, 1).fetch_listing().await.unwrap();
        let titles: Vec<&str> = metadata.iter().map(|m| m.title.as_str()).collect();

        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_run_writes_and_reuses_cache() {
        let tmp = TempDir::new().unwrap();
        let cache = ArticleCache::new(tmp.path());
        let pages = vec![
            ("https://lessons.test/all/?tax=hsk&pagenum=1", listing(1, &["a"])),
            ("https://lessons.test/a/", lesson("甲")),
        ];
        let fetcher = Arc::new(StaticFetcher::new(&pages));
        let harvester = harvester(&fetcher, 2);

        let first = harvester.run(&cache, false).await.unwrap();
        assert_eq!(first.collections.len(), 1);
        assert_eq!(fetcher.requested().len(), 2);

        let second = harvester.run(&cache, false).await.unwrap();
        assert_eq!(second.collections, first.collections);
        assert_eq!(second.fetched, 0);
        assert_eq!(fetcher.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_run_surfaces_corrupted_cache() {
        let tmp = TempDir::new().unwrap();
        let cache = ArticleCache::new(tmp.path());
        std::fs::write(cache.metadata_path(), "not json").unwrap();
        let fetcher = Arc::new(StaticFetcher::new(&[]));

        let result = harvester(&fetcher, 1).run(&cache, false).await;
        assert!(matches!(result, Err(BeanpressError::CacheCorruption { .. })));
    }
}
