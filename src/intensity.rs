//! Grid carbon-intensity sources.
//!
//! The selector never talks to a grid API itself; it queries an injected
//! [`CarbonIntensityProvider`] and blends the live and historical readings.
//! A failed live read is replaced by a configured default and flagged on the
//! returned [`BlendedIntensity`].

use crate::error::{Error, Result};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Weight of the live reading in the blend; history gets the remainder.
pub const LIVE_WEIGHT: f64 = 0.7;
pub const HISTORICAL_WEIGHT: f64 = 0.3;

/// Live readings are reused for this long by [`CachedIntensityProvider`].
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Source of grid carbon intensity in gCO2/kWh.
pub trait CarbonIntensityProvider: Send + Sync {
    /// Current reading for `region`.
    fn live_intensity(&self, region: &str) -> Result<f64>;

    /// Most recent recorded reading, `None` when no history exists.
    fn recent_historical_intensity(&self, region: &str) -> Result<Option<f64>>;
}

impl<P: CarbonIntensityProvider + ?Sized> CarbonIntensityProvider for &P {
    fn live_intensity(&self, region: &str) -> Result<f64> {
        (**self).live_intensity(region)
    }

    fn recent_historical_intensity(&self, region: &str) -> Result<Option<f64>> {
        (**self).recent_historical_intensity(region)
    }
}

impl<P: CarbonIntensityProvider + ?Sized> CarbonIntensityProvider for Box<P> {
    fn live_intensity(&self, region: &str) -> Result<f64> {
        (**self).live_intensity(region)
    }

    fn recent_historical_intensity(&self, region: &str) -> Result<Option<f64>> {
        (**self).recent_historical_intensity(region)
    }
}

/// Intensity used for scoring one region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlendedIntensity {
    pub value: f64,
    pub live: f64,
    pub historical: Option<f64>,
    /// The live reading failed and `live` holds the default constant.
    pub live_defaulted: bool,
}

impl BlendedIntensity {
    pub fn measured(&self) -> bool {
        !self.live_defaulted
    }
}

fn usable(reading: f64) -> bool {
    reading.is_finite() && reading >= 0.0
}

/// `0.7 * live + 0.3 * history`, live-only without history, and the
/// default constant standing in for an unavailable live reading.
pub fn blend_intensity<P>(provider: &P, region: &str, default_intensity: f64) -> BlendedIntensity
where
    P: CarbonIntensityProvider + ?Sized,
{
    let (live, live_defaulted) = match provider.live_intensity(region) {
        Ok(ci) if usable(ci) => (ci, false),
        Ok(ci) => {
            tracing::warn!(region, reading = ci, default = default_intensity, "discarding unusable live carbon intensity");
            (default_intensity, true)
        }
        Err(err) => {
            tracing::warn!(region, error = %err, default = default_intensity, "live carbon intensity unavailable, using default");
            (default_intensity, true)
        }
    };

    let historical = match provider.recent_historical_intensity(region) {
        Ok(Some(ci)) if usable(ci) => Some(ci),
        Ok(_) => None,
        Err(err) => {
            tracing::warn!(region, error = %err, "historical carbon intensity unreadable, blending live only");
            None
        }
    };

    let value = match historical {
        Some(hist) => LIVE_WEIGHT * live + HISTORICAL_WEIGHT * hist,
        None => live,
    };

    BlendedIntensity {
        value,
        live,
        historical,
        live_defaulted,
    }
}

/// Fixed per-region readings.
#[derive(Debug, Clone, Default)]
pub struct StaticIntensityProvider {
    live: HashMap<String, f64>,
    history: HashMap<String, f64>,
}

impl StaticIntensityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_live(mut self, region: impl Into<String>, ci: f64) -> Self {
        self.live.insert(region.into(), ci);
        self
    }

    pub fn with_history(mut self, region: impl Into<String>, ci: f64) -> Self {
        self.history.insert(region.into(), ci);
        self
    }
}

impl CarbonIntensityProvider for StaticIntensityProvider {
    fn live_intensity(&self, region: &str) -> Result<f64> {
        self.live
            .get(region)
            .copied()
            .ok_or_else(|| Error::intensity_unavailable(region, "no live reading configured"))
    }

    fn recent_historical_intensity(&self, region: &str) -> Result<Option<f64>> {
        Ok(self.history.get(region).copied())
    }
}

/// Same reading everywhere, no history. Used to pin the grid in sweeps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformIntensityProvider(pub f64);

impl CarbonIntensityProvider for UniformIntensityProvider {
    fn live_intensity(&self, _region: &str) -> Result<f64> {
        Ok(self.0)
    }

    fn recent_historical_intensity(&self, _region: &str) -> Result<Option<f64>> {
        Ok(None)
    }
}

/// History from `<dir>/<region>.csv`: the last row's `carbon_intensity`
/// column. Live readings are delegated to `live`.
#[derive(Debug)]
pub struct HistoryFileProvider<P> {
    dirs: Vec<PathBuf>,
    live: P,
}

impl<P: CarbonIntensityProvider> HistoryFileProvider<P> {
    pub fn new(dir: impl Into<PathBuf>, live: P) -> Self {
        Self {
            dirs: vec![dir.into()],
            live,
        }
    }

    /// Extra directory searched after the earlier ones.
    pub fn with_fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.push(dir.into());
        self
    }

    fn history_file(&self, region: &str) -> Result<Option<PathBuf>> {
        // Region names come from fleet files; keep lookups inside the configured dirs.
        if region.is_empty() || region.contains(['/', '\\']) || region.contains("..") {
            return Err(Error::invalid(format!("region name '{region}' is not a valid history file name")));
        }

        Ok(self
            .dirs
            .iter()
            .map(|dir| dir.join(format!("{region}.csv")))
            .find(|path| path.exists()))
    }

    fn last_reading(path: &std::path::Path) -> Result<Option<f64>> {
        let mut reader = csv::Reader::from_path(path)?;
        let column = reader
            .headers()?
            .iter()
            .position(|h| h.trim() == "carbon_intensity")
            .ok_or_else(|| {
                Error::intensity_unavailable(
                    path.display().to_string(),
                    "missing carbon_intensity column",
                )
            })?;

        let mut last = None;
        for record in reader.records() {
            let record = record?;
            if let Some(field) = record.get(column) {
                if let Ok(value) = field.trim().parse::<f64>() {
                    last = Some(value);
                }
            }
        }

        Ok(last)
    }
}

impl<P: CarbonIntensityProvider> CarbonIntensityProvider for HistoryFileProvider<P> {
    fn live_intensity(&self, region: &str) -> Result<f64> {
        self.live.live_intensity(region)
    }

    fn recent_historical_intensity(&self, region: &str) -> Result<Option<f64>> {
        match self.history_file(region)? {
            Some(path) => Self::last_reading(&path),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedReading {
    ci: f64,
    fetched_at: Instant,
}

/// Memoises live readings per region for a fixed TTL. History is never
/// cached.
#[derive(Debug)]
pub struct CachedIntensityProvider<P> {
    inner: P,
    ttl: Duration,
    cache: RwLock<HashMap<String, CachedReading>>,
}

impl<P: CarbonIntensityProvider> CachedIntensityProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_ttl(inner, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Drop every cached reading.
    pub fn clear(&self) {
        self.cache.write().clear();
    }

    fn fresh(&self, region: &str) -> Option<f64> {
        self.cache
            .read()
            .get(region)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.ci)
    }
}

impl<P: CarbonIntensityProvider> CarbonIntensityProvider for CachedIntensityProvider<P> {
    fn live_intensity(&self, region: &str) -> Result<f64> {
        if let Some(ci) = self.fresh(region) {
            return Ok(ci);
        }

        // Failures are not cached; the next call retries the inner provider.
        let ci = self.inner.live_intensity(region)?;
        self.cache.write().insert(
            region.to_string(),
            CachedReading {
                ci,
                fetched_at: Instant::now(),
            },
        );
        Ok(ci)
    }

    fn recent_historical_intensity(&self, region: &str) -> Result<Option<f64>> {
        self.inner.recent_historical_intensity(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_blend_with_history() {
        let provider = StaticIntensityProvider::new()
            .with_live("Northern", 500.0)
            .with_history("Northern", 600.0);

        let blended = blend_intensity(&provider, "Northern", 700.0);
        assert!((blended.value - 530.0).abs() < 1e-9);
        assert_eq!(blended.historical, Some(600.0));
        assert!(blended.measured());
    }

    #[test]
    fn test_blend_live_only() {
        let provider = StaticIntensityProvider::new().with_live("Western", 712.0);
        let blended = blend_intensity(&provider, "Western", 700.0);
        assert_eq!(blended.value, 712.0);
        assert_eq!(blended.historical, None);
    }

    #[test]
    fn test_missing_live_uses_default() {
        let provider = StaticIntensityProvider::new();
        let blended = blend_intensity(&provider, "Eastern", 700.0);
        assert_eq!(blended.value, 700.0);
        assert!(blended.live_defaulted);
    }

    #[test]
    fn test_default_still_blends_history() {
        let provider = StaticIntensityProvider::new().with_history("Eastern", 800.0);
        let blended = blend_intensity(&provider, "Eastern", 700.0);
        assert!((blended.value - 730.0).abs() < 1e-9);
        assert!(blended.live_defaulted);
    }

    #[test]
    fn test_unusable_live_reading_is_defaulted() {
        let provider = StaticIntensityProvider::new().with_live("Southern", f64::NAN);
        let blended = blend_intensity(&provider, "Southern", 700.0);
        assert_eq!(blended.value, 700.0);
        assert!(blended.live_defaulted);
    }

    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl CarbonIntensityProvider for CountingProvider {
        fn live_intensity(&self, _region: &str) -> Result<f64> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(400.0 + n as f64)
        }

        fn recent_historical_intensity(&self, _region: &str) -> Result<Option<f64>> {
            Ok(None)
        }
    }

    #[test]
    fn test_cache_reuses_live_reading() {
        let cached = CachedIntensityProvider::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });

        assert_eq!(cached.live_intensity("Northern").unwrap(), 400.0);
        assert_eq!(cached.live_intensity("Northern").unwrap(), 400.0);
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 1);

        assert_eq!(cached.live_intensity("Southern").unwrap(), 401.0);
        cached.clear();
        assert_eq!(cached.live_intensity("Northern").unwrap(), 402.0);
    }

    #[test]
    fn test_cache_expires() {
        let cached = CachedIntensityProvider::with_ttl(
            CountingProvider {
                calls: AtomicUsize::new(0),
            },
            Duration::ZERO,
        );

        cached.live_intensity("Northern").unwrap();
        cached.live_intensity("Northern").unwrap();
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_history_file_reads_last_row() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Northern.csv"),
            "timestamp,carbon_intensity\n2024-01-01T00:00,520\n2024-01-01T00:05,541.5\n",
        )
        .unwrap();

        let provider = HistoryFileProvider::new(dir.path(), UniformIntensityProvider(500.0));
        assert_eq!(provider.recent_historical_intensity("Northern").unwrap(), Some(541.5));
        assert_eq!(provider.recent_historical_intensity("Western").unwrap(), None);
        assert_eq!(provider.live_intensity("Northern").unwrap(), 500.0);
    }

    #[test]
    fn test_history_file_fallback_dir() {
        let primary = tempfile::tempdir().unwrap();
        let fallback = tempfile::tempdir().unwrap();
        std::fs::write(
            fallback.path().join("Eastern.csv"),
            "carbon_intensity\n813\n",
        )
        .unwrap();

        let provider = HistoryFileProvider::new(primary.path(), UniformIntensityProvider(0.0))
            .with_fallback_dir(fallback.path());
        assert_eq!(provider.recent_historical_intensity("Eastern").unwrap(), Some(813.0));
    }

    #[test]
    fn test_history_file_rejects_path_like_regions() {
        let root = tempfile::tempdir().unwrap();
        let data = root.path().join("data");
        std::fs::create_dir(&data).unwrap();
        std::fs::write(root.path().join("secret.csv"), "carbon_intensity\n1\n").unwrap();

        let provider = HistoryFileProvider::new(&data, UniformIntensityProvider(600.0));
        for region in ["../secret", "a/b", "a\\b", ""] {
            let err = provider.recent_historical_intensity(region).unwrap_err();
            assert!(err.is_invalid_argument(), "{region}");
        }

        let blended = blend_intensity(&provider, "../secret", 700.0);
        assert_eq!(blended.historical, None);
        assert_eq!(blended.value, 600.0);
    }

    #[test]
    fn test_history_file_without_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Western.csv"), "timestamp,value\nx,1\n").unwrap();

        let provider = HistoryFileProvider::new(dir.path(), UniformIntensityProvider(600.0));
        assert!(provider.recent_historical_intensity("Western").is_err());

        // The selector's blend degrades to live-only instead of failing.
        let blended = blend_intensity(&provider, "Western", 700.0);
        assert_eq!(blended.value, 600.0);
    }
}
