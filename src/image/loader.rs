//! Image loading and caching.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use image::DynamicImage;

/// Decoded images kept per loader.
const DEFAULT_CACHE_SIZE: usize = 24;

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<PathBuf, Arc<DynamicImage>>,
    order: VecDeque<PathBuf>,
}

/// Bounded FIFO cache of decoded images, shareable across threads.
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    inner: Arc<Mutex<CacheInner>>,
    max_size: usize,
}

impl ImageCache {
    /// Create a new image cache with the given maximum number of entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner::default())),
            max_size,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Get a shared handle to a cached image.
    pub fn get(&self, path: &Path) -> Option<Arc<DynamicImage>> {
        self.lock().entries.get(path).cloned()
    }

    /// Insert an image into the cache, evicting the oldest entries past capacity.
    pub fn insert(&self, path: PathBuf, image: Arc<DynamicImage>) {
        let mut guard = self.lock();

        if guard.entries.contains_key(&path) {
            guard.entries.insert(path, image);
            return;
        }

        guard.order.push_back(path.clone());
        guard.entries.insert(path, image);

        while guard.entries.len() > self.max_size {
            if let Some(oldest) = guard.order.pop_front() {
                guard.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    /// Check if an image is in the cache.
    pub fn contains(&self, path: &Path) -> bool {
        self.lock().entries.contains_key(path)
    }

    /// Clear the cache.
    pub fn clear(&self) {
        let mut guard = self.lock();
        guard.entries.clear();
        guard.order.clear();
    }

    /// Get the number of cached images.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Paths a loader should not decode again right now.
#[derive(Debug, Default)]
struct Pending {
    /// Queued or decoding on a prefetch thread.
    in_flight: HashSet<PathBuf>,
    /// Failed to open or decode.
    failed: HashSet<PathBuf>,
}

/// Image loader with caching.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    cache: ImageCache,
    pending: Arc<Mutex<Pending>>,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_SIZE)
    }

    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            cache: ImageCache::new(max_size),
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    fn pending(&self) -> MutexGuard<'_, Pending> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Load an image, using the cache if available.
    ///
    /// Paths that already failed are not retried until [`clear_cache`](Self::clear_cache).
    pub fn load(&self, path: &Path) -> Option<Arc<DynamicImage>> {
        if let Some(img) = self.cache.get(path) {
            return Some(img);
        }
        if self.pending().failed.contains(path) {
            return None;
        }
        decode(&self.cache, &self.pending, path)
    }

    /// Take the paths worth prefetching and mark them in flight.
    fn claim(&self, paths: Vec<PathBuf>) -> Vec<PathBuf> {
        let mut pending = self.pending();
        paths
            .into_iter()
            .filter(|path| {
                !self.cache.contains(path)
                    && !pending.failed.contains(path)
                    && pending.in_flight.insert(path.clone())
            })
            .collect()
    }

    /// Warm the cache with `paths` on a background thread.
    ///
    /// Fire and forget: there is no completion signal and failures are
    /// dropped. A later [`load`](Self::load) picks up whatever finished.
    /// Paths already cached, in flight or known to fail are skipped.
    pub fn prefetch(&self, paths: Vec<PathBuf>) {
        let claimed = self.claim(paths);
        if claimed.is_empty() {
            return;
        }
        tracing::trace!(target: "folio::render", count = claimed.len(), "image.prefetch");
        let cache = self.cache.clone();
        let pending = Arc::clone(&self.pending);
        std::thread::spawn(move || {
            for path in claimed {
                if !cache.contains(&path) {
                    decode(&cache, &pending, &path);
                }
                if let Ok(mut guard) = pending.lock() {
                    guard.in_flight.remove(&path);
                }
            }
        });
    }

    pub const fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Drop cached images and forget failures, so edited files load fresh.
    pub fn clear_cache(&self) {
        self.cache.clear();
        self.pending().failed.clear();
    }

    /// Whether `path` failed to decode since the last [`clear_cache`](Self::clear_cache).
    pub fn has_failed(&self, path: &Path) -> bool {
        self.pending().failed.contains(path)
    }
}

fn decode(cache: &ImageCache, pending: &Mutex<Pending>, path: &Path) -> Option<Arc<DynamicImage>> {
    match image::open(path) {
        Ok(img) => {
            let img = Arc::new(img);
            cache.insert(path.to_path_buf(), Arc::clone(&img));
            Some(img)
        }
        Err(err) => {
            tracing::debug!(path = %path.display(), "image decode failed: {err}");
            if let Ok(mut guard) = pending.lock() {
                guard.failed.insert(path.to_path_buf());
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    fn pixel() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 255])))
    }

    fn shared_pixel() -> Arc<DynamicImage> {
        Arc::new(pixel())
    }

    #[test]
    fn test_cache_new() {
        let cache = ImageCache::new(10);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_evicts_oldest_entry() {
        let cache = ImageCache::new(2);
        cache.insert(PathBuf::from("a"), shared_pixel());
        cache.insert(PathBuf::from("b"), shared_pixel());
        cache.insert(PathBuf::from("c"), shared_pixel());
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(Path::new("a")));
        assert!(cache.contains(Path::new("c")));
    }

    #[test]
    fn test_cache_reinsert_does_not_grow() {
        let cache = ImageCache::new(2);
        cache.insert(PathBuf::from("a"), shared_pixel());
        cache.insert(PathBuf::from("a"), shared_pixel());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_load_missing_file_returns_none() {
        let loader = ImageLoader::new();
        assert!(loader.load(Path::new("/definitely/missing/page.png")).is_none());
        assert!(loader.cache().is_empty());
    }

    #[test]
    fn test_load_caches_decoded_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.png");
        pixel().save(&path).unwrap();

        let loader = ImageLoader::new();
        assert!(loader.load(&path).is_some());
        assert!(loader.cache().contains(&path));
    }

    #[test]
    fn test_prefetch_warms_cache_and_ignores_failures() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("next.png");
        pixel().save(&path).unwrap();

        let loader = ImageLoader::new();
        loader.prefetch(vec![dir.path().join("missing.png"), path.clone()]);

        let deadline = Instant::now() + Duration::from_secs(5);
        while !loader.cache().contains(&path) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(loader.cache().contains(&path));
        assert_eq!(loader.cache().len(), 1);
    }

    #[test]
    fn test_repeated_loads_share_one_decoded_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.png");
        pixel().save(&path).unwrap();

        let loader = ImageLoader::new();
        let first = loader.load(&path).unwrap();
        let second = loader.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failed_path_is_not_claimed_again() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.png");

        let loader = ImageLoader::new();
        assert!(loader.load(&missing).is_none());
        assert!(loader.has_failed(&missing));
        assert!(loader.claim(vec![missing.clone()]).is_empty());

        loader.clear_cache();
        assert!(!loader.has_failed(&missing));
        assert_eq!(loader.claim(vec![missing.clone()]), vec![missing]);
    }

    #[test]
    fn test_in_flight_path_is_claimed_once() {
        let loader = ImageLoader::new();
        let path = PathBuf::from("/books/moon/002.jpg");
        assert_eq!(loader.claim(vec![path.clone(), path.clone()]), vec![path.clone()]);
        assert!(loader.claim(vec![path]).is_empty());
    }

    #[test]
    fn test_prefetch_records_decode_failures() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.png");

        let loader = ImageLoader::new();
        loader.prefetch(vec![missing.clone()]);

        let deadline = Instant::now() + Duration::from_secs(5);
        while !loader.has_failed(&missing) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(loader.has_failed(&missing));
        assert!(loader.claim(vec![missing]).is_empty());
    }
}
