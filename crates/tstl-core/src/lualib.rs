use rustc_hash::FxHashSet;
pub use tstl_lualib::LuaLibFeature;
use tstl_lualib::ALL_FEATURES;

/// Monotonic set of runtime features used during transformation. One
/// registry per transformer instance; the Host folds registries together
/// across files and serialises the bundle once.
#[derive(Debug, Default)]
pub struct LuaLibRegistry {
    used: FxHashSet<LuaLibFeature>,
}

impl LuaLibRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, feature: LuaLibFeature) {
        self.used.insert(feature);
    }

    pub fn contains(&self, feature: LuaLibFeature) -> bool {
        self.used.contains(&feature)
    }

    pub fn into_used(self) -> FxHashSet<LuaLibFeature> {
        self.used
    }

    pub fn used(&self) -> &FxHashSet<LuaLibFeature> {
        &self.used
    }
}

/// Emit the Lua source for a feature set, with transitive dependencies
/// resolved, in the registry's canonical order so output is deterministic.
pub fn lua_lib_bundle(features: &FxHashSet<LuaLibFeature>) -> String {
    let mut closed = FxHashSet::default();
    for &feature in features {
        close_over(feature, &mut closed);
    }

    let mut bundle = String::new();
    for &feature in ALL_FEATURES {
        if closed.contains(&feature) {
            bundle.push_str(feature.source());
            bundle.push('\n');
        }
    }
    bundle
}

fn close_over(feature: LuaLibFeature, out: &mut FxHashSet<LuaLibFeature>) {
    if !out.insert(feature) {
        return;
    }
    for &dep in feature.dependencies() {
        close_over(dep, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_monotonic() {
        let mut registry = LuaLibRegistry::new();
        registry.record(LuaLibFeature::ArrayPush);
        registry.record(LuaLibFeature::ArrayPush);
        assert_eq!(registry.used().len(), 1);
        assert!(registry.contains(LuaLibFeature::ArrayPush));
    }

    #[test]
    fn test_bundle_includes_dependencies() {
        let mut features = FxHashSet::default();
        features.insert(LuaLibFeature::Map);
        let bundle = lua_lib_bundle(&features);
        // Map pulls in the iterator protocol.
        assert!(bundle.contains("Map = {}"));
        assert!(bundle.contains("__TS__iterator"));
    }

    #[test]
    fn test_bundle_order_is_deterministic() {
        let mut features = FxHashSet::default();
        features.insert(LuaLibFeature::StringSplit);
        features.insert(LuaLibFeature::ArrayPush);
        let a = lua_lib_bundle(&features);
        let b = lua_lib_bundle(&features);
        assert_eq!(a, b);
        // Array helpers precede string helpers in canonical order.
        let push_at = a.find("__TS__ArrayPush").unwrap();
        let split_at = a.find("__TS__StringSplit").unwrap();
        assert!(push_at < split_at);
    }
}
