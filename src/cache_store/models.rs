/// Three-part lookup key for a cached translation.
///
/// `engine_params` must already be in canonical form (see `cache::key`),
/// otherwise equal parameter sets would map to distinct rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheKey<'a> {
    pub engine: &'a str,
    pub engine_params: &'a str,
    pub source_text: &'a str,
}

/// One full row of the translation cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub id: i64,
    pub engine: String,
    pub engine_params: String,
    pub source_text: String,
    pub translation: String,
}

/// Id plus source text, as emitted by the bulk export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub id: i64,
    pub source_text: String,
}
