//! Fragment caching of rendered output.
//!
//! Output is written through a [`Fragments`] writer. Cached regions record
//! what is written inside them and store it under a key derived from the
//! region name and its variations. Parts that must stay fresh are rendered
//! through named dynamic callbacks and recorded as placeholders:
//!
//! ```text
//! begin_cache("sidebar")          miss → record
//!   write("Hello ")
//!   render_dynamic("user", {})    → <![CDATA[DYNAMIC-7]]>
//! end_cache()                     store {content, placeholders}
//!                                 outermost → substitute, then emit
//!
//! begin_cache("sidebar")          hit → substitute, emit, return false
//! ```
//!
//! Substitution only happens when no enabled region encloses the output.
//! Inside another region the raw content is passed up together with its
//! placeholders, so the outer region caches them too.

mod spaceless;
mod store;


pub use spaceless::strip_between_tags;
pub use store::{CachedFragment, DynamicCall, FragmentStore, MemoryStore};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FragmentError {
    #[error("end_cache called outside a cached region")]
    NotInCache,

    #[error("end_spaceless called outside a spaceless region")]
    NotInSpaceless,

    #[error("{0} region(s) still open")]
    Unclosed(usize),

    #[error("no dynamic callback named `{0}`")]
    UnknownDynamic(String),
}

// ============================================================================
// Options
// ============================================================================

/// Settings of one cached region.
#[derive(Debug, Clone)]
pub struct FragmentOptions {
    /// When `false` the region is rendered normally and nothing is stored.
    pub enabled: bool,
    /// Extra key parts, e.g. the current language.
    pub variations: Vec<String>,
    /// Time to live. `None` keeps the fragment until the store drops it.
    pub duration: Option<Duration>,
}

impl Default for FragmentOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            variations: Vec::new(),
            duration: None,
        }
    }
}

impl FragmentOptions {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_variation(mut self, variation: impl Into<String>) -> Self {
        self.variations.push(variation.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Store key of a region.
pub fn fragment_key(name: &str, variations: &[String]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(name.as_bytes());
    for variation in variations {
        hasher.update(b"\0");
        hasher.update(variation.as_bytes());
    }
    hex::encode(hasher.finalize().as_bytes())
}

static NEXT_PLACEHOLDER: AtomicU64 = AtomicU64::new(0);

/// Process-unique marker for one dynamic call.
fn next_placeholder() -> String {
    let n = NEXT_PLACEHOLDER.fetch_add(1, Ordering::Relaxed);
    format!("<![CDATA[DYNAMIC-{n}]]>")
}

// ============================================================================
// Fragments
// ============================================================================

type DynamicFn = dyn FnMut(&Value) -> String;

struct CacheRegion {
    key: String,
    buffer: String,
    placeholders: IndexMap<String, DynamicCall>,
    enabled: bool,
    duration: Option<Duration>,
}

enum Frame {
    Cache(CacheRegion),
    Spaceless(String),
}

impl Frame {
    fn buffer(&mut self) -> &mut String {
        match self {
            Frame::Cache(region) => &mut region.buffer,
            Frame::Spaceless(buffer) => buffer,
        }
    }
}

/// Output writer with cached and spaceless regions.
///
/// One per render, like a register session.
pub struct Fragments {
    store: Arc<dyn FragmentStore>,
    dynamics: FxHashMap<String, Box<DynamicFn>>,
    output: String,
    stack: Vec<Frame>,
}

impl fmt::Debug for Fragments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragments")
            .field("dynamics", &self.dynamics.keys().collect::<Vec<_>>())
            .field("output", &self.output)
            .field("depth", &self.stack.len())
            .finish_non_exhaustive()
    }
}

impl Fragments {
    pub fn new(store: Arc<dyn FragmentStore>) -> Self {
        Self {
            store,
            dynamics: FxHashMap::default(),
            output: String::new(),
            stack: Vec::new(),
        }
    }

    /// Writer backed by a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn FragmentStore> {
        &self.store
    }

    /// Register a callback usable from [`render_dynamic`](Self::render_dynamic).
    pub fn register_dynamic(&mut self, name: impl Into<String>, f: impl FnMut(&Value) -> String + 'static) {
        self.dynamics.insert(name.into(), Box::new(f));
    }

    /// Append to the innermost open region, or to the output.
    pub fn write(&mut self, text: &str) {
        let sink = match self.stack.last_mut() {
            Some(frame) => frame.buffer(),
            None => &mut self.output,
        };
        sink.push_str(text);
    }

    /// Number of open regions.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Take what has been written to the top level so far.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// Return the output. Fails if a region is still open.
    pub fn finish(self) -> Result<String, FragmentError> {
        match self.stack.len() {
            0 => Ok(self.output),
            open => Err(FragmentError::Unclosed(open)),
        }
    }

    // ------------------------------------------------------------------------
    // Cached regions
    // ------------------------------------------------------------------------

    /// Open a cached region.
    ///
    /// On a hit the cached content is emitted and `false` is returned; the
    /// caller skips rendering and does not call [`end_cache`](Self::end_cache).
    /// Otherwise recording starts and `true` is returned.
    pub fn begin_cache(&mut self, name: &str, options: FragmentOptions) -> Result<bool, FragmentError> {
        let key = fragment_key(name, &options.variations);
        if options.enabled {
            if let Some(hit) = self.store.get(&key) {
                crate::debug!("fragment"; "hit {}", name);
                self.emit(hit)?;
                return Ok(false);
            }
        }

        self.stack.push(Frame::Cache(CacheRegion {
            key,
            buffer: String::new(),
            placeholders: IndexMap::new(),
            enabled: options.enabled,
            duration: options.duration,
        }));
        Ok(true)
    }

    /// Close the innermost cached region, store it, and emit its content.
    pub fn end_cache(&mut self) -> Result<(), FragmentError> {
        let region = match self.stack.pop() {
            Some(Frame::Cache(region)) => region,
            Some(other) => {
                self.stack.push(other);
                return Err(FragmentError::NotInCache);
            }
            None => return Err(FragmentError::NotInCache),
        };

        if !region.enabled {
            self.write(&region.buffer);
            return Ok(());
        }
        let fragment = CachedFragment {
            content: region.buffer,
            placeholders: region.placeholders,
        };
        if !fragment.content.is_empty() {
            self.store.set(&region.key, fragment.clone(), region.duration);
        }
        self.emit(fragment)
    }

    /// Output of the callback `name`, or a placeholder for it when inside an
    /// enabled cached region.
    ///
    /// The returned string must be written for the placeholder to be
    /// substituted later.
    pub fn render_dynamic(&mut self, name: &str, params: Value) -> Result<String, FragmentError> {
        if !self.dynamics.contains_key(name) {
            return Err(FragmentError::UnknownDynamic(name.to_string()));
        }
        let call = DynamicCall {
            name: name.to_string(),
            params,
        };
        if !self.in_enabled_region() {
            return self.call(&call);
        }
        let placeholder = next_placeholder();
        self.add_placeholder(&placeholder, &call);
        Ok(placeholder)
    }

    fn in_enabled_region(&self) -> bool {
        self.stack
            .iter()
            .any(|frame| matches!(frame, Frame::Cache(region) if region.enabled))
    }

    /// Record a placeholder in every enclosing enabled region.
    fn add_placeholder(&mut self, placeholder: &str, call: &DynamicCall) {
        for frame in &mut self.stack {
            if let Frame::Cache(region) = frame
                && region.enabled
            {
                region.placeholders.insert(placeholder.to_string(), call.clone());
            }
        }
    }

    /// Write cached content, substituting placeholders at the outermost level.
    fn emit(&mut self, fragment: CachedFragment) -> Result<(), FragmentError> {
        if self.in_enabled_region() {
            for (placeholder, call) in &fragment.placeholders {
                self.add_placeholder(placeholder, call);
            }
            self.write(&fragment.content);
            return Ok(());
        }

        let mut content = fragment.content;
        for (placeholder, call) in &fragment.placeholders {
            let value = self.call(call)?;
            content = content.replace(placeholder.as_str(), &value);
        }
        self.write(&content);
        Ok(())
    }

    fn call(&mut self, call: &DynamicCall) -> Result<String, FragmentError> {
        let f = self
            .dynamics
            .get_mut(&call.name)
            .ok_or_else(|| FragmentError::UnknownDynamic(call.name.clone()))?;
        Ok(f(&call.params))
    }

    // ------------------------------------------------------------------------
    // Spaceless regions
    // ------------------------------------------------------------------------

    /// Open a region whose whitespace between tags is removed on close.
    pub fn begin_spaceless(&mut self) {
        self.stack.push(Frame::Spaceless(String::new()));
    }

    pub fn end_spaceless(&mut self) -> Result<(), FragmentError> {
        match self.stack.pop() {
            Some(Frame::Spaceless(buffer)) => {
                self.write(&strip_between_tags(&buffer));
                Ok(())
            }
            Some(other) => {
                self.stack.push(other);
                Err(FragmentError::NotInSpaceless)
            }
            None => Err(FragmentError::NotInSpaceless),
        }
    }
}

impl fmt::Write for Fragments {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s);
        Ok(())
    }
}
