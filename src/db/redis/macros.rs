/// Reads a value through the Redis cache.
///
/// Returns the cached value when present. Otherwise awaits `$block`, queues
/// the result for a background write with `$ttl` seconds to live, and returns
/// it. The cache must expose `get_from_cache` and `set_in_background`.
///
/// # Example
/// ```rust,ignore
/// let item = cached!(self.cache, CacheKey::Item(key.clone()), ttl, async move {
///     self.fetch_item_uncached(&key).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
