//! Runtime support code for the tstl transpiler.
//! Each [`LuaLibFeature`] maps to a hand-written Lua snippet embedded as a
//! const; the transformer registers the features it uses and the Host (or
//! CLI) emits the bundle once.

pub mod array;
pub mod class;
pub mod collections;
pub mod iterator;
pub mod misc;
pub mod object;
pub mod string_rt;

/// The closed set of runtime-support features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LuaLibFeature {
    ArrayConcat,
    ArrayEvery,
    ArrayFilter,
    ArrayForEach,
    ArrayIndexOf,
    ArrayMap,
    ArrayPush,
    ArrayReverse,
    ArraySlice,
    ArraySome,
    ArraySplice,
    ClassIndex,
    ClassNewIndex,
    Decorate,
    FunctionApply,
    FunctionBind,
    FunctionCall,
    InstanceOf,
    InstanceOfObject,
    Iterator,
    Map,
    ObjectAssign,
    ObjectEntries,
    ObjectKeys,
    ObjectValues,
    Set,
    Spread,
    StringReplace,
    StringSplit,
    Symbol,
    SymbolRegistry,
    TypeOf,
    WeakMap,
    WeakSet,
}

/// All features in bundle emission order. Dependencies of a feature always
/// precede it in this list.
pub const ALL_FEATURES: &[LuaLibFeature] = &[
    LuaLibFeature::Symbol,
    LuaLibFeature::SymbolRegistry,
    LuaLibFeature::Iterator,
    LuaLibFeature::ArrayEvery,
    LuaLibFeature::ArrayFilter,
    LuaLibFeature::ArrayForEach,
    LuaLibFeature::ArrayIndexOf,
    LuaLibFeature::ArrayMap,
    LuaLibFeature::ArrayPush,
    LuaLibFeature::ArrayConcat,
    LuaLibFeature::ArrayReverse,
    LuaLibFeature::ArraySlice,
    LuaLibFeature::ArraySome,
    LuaLibFeature::ArraySplice,
    LuaLibFeature::ClassIndex,
    LuaLibFeature::ClassNewIndex,
    LuaLibFeature::Decorate,
    LuaLibFeature::FunctionApply,
    LuaLibFeature::FunctionBind,
    LuaLibFeature::FunctionCall,
    LuaLibFeature::InstanceOf,
    LuaLibFeature::InstanceOfObject,
    LuaLibFeature::Map,
    LuaLibFeature::ObjectAssign,
    LuaLibFeature::ObjectEntries,
    LuaLibFeature::ObjectKeys,
    LuaLibFeature::ObjectValues,
    LuaLibFeature::Set,
    LuaLibFeature::Spread,
    LuaLibFeature::StringReplace,
    LuaLibFeature::StringSplit,
    LuaLibFeature::TypeOf,
    LuaLibFeature::WeakMap,
    LuaLibFeature::WeakSet,
];

impl LuaLibFeature {
    /// Features whose snippets this feature's snippet calls into.
    pub fn dependencies(self) -> &'static [LuaLibFeature] {
        match self {
            LuaLibFeature::SymbolRegistry => &[LuaLibFeature::Symbol],
            LuaLibFeature::Map | LuaLibFeature::Set => &[LuaLibFeature::Iterator],
            LuaLibFeature::ArrayConcat => &[LuaLibFeature::ArrayPush],
            _ => &[],
        }
    }

    /// The Lua source implementing this feature.
    pub fn source(self) -> &'static str {
        match self {
            LuaLibFeature::ArrayConcat => array::ARRAY_CONCAT,
            LuaLibFeature::ArrayEvery => array::ARRAY_EVERY,
            LuaLibFeature::ArrayFilter => array::ARRAY_FILTER,
            LuaLibFeature::ArrayForEach => array::ARRAY_FOR_EACH,
            LuaLibFeature::ArrayIndexOf => array::ARRAY_INDEX_OF,
            LuaLibFeature::ArrayMap => array::ARRAY_MAP,
            LuaLibFeature::ArrayPush => array::ARRAY_PUSH,
            LuaLibFeature::ArrayReverse => array::ARRAY_REVERSE,
            LuaLibFeature::ArraySlice => array::ARRAY_SLICE,
            LuaLibFeature::ArraySome => array::ARRAY_SOME,
            LuaLibFeature::ArraySplice => array::ARRAY_SPLICE,
            LuaLibFeature::ClassIndex => class::CLASS_INDEX,
            LuaLibFeature::ClassNewIndex => class::CLASS_NEW_INDEX,
            LuaLibFeature::Decorate => class::DECORATE,
            LuaLibFeature::FunctionApply => misc::FUNCTION_APPLY,
            LuaLibFeature::FunctionBind => misc::FUNCTION_BIND,
            LuaLibFeature::FunctionCall => misc::FUNCTION_CALL,
            LuaLibFeature::InstanceOf => class::INSTANCE_OF,
            LuaLibFeature::InstanceOfObject => class::INSTANCE_OF_OBJECT,
            LuaLibFeature::Iterator => iterator::ITERATOR,
            LuaLibFeature::Map => collections::MAP,
            LuaLibFeature::ObjectAssign => object::OBJECT_ASSIGN,
            LuaLibFeature::ObjectEntries => object::OBJECT_ENTRIES,
            LuaLibFeature::ObjectKeys => object::OBJECT_KEYS,
            LuaLibFeature::ObjectValues => object::OBJECT_VALUES,
            LuaLibFeature::Set => collections::SET,
            LuaLibFeature::Spread => misc::SPREAD,
            LuaLibFeature::StringReplace => string_rt::STRING_REPLACE,
            LuaLibFeature::StringSplit => string_rt::STRING_SPLIT,
            LuaLibFeature::Symbol => misc::SYMBOL,
            LuaLibFeature::SymbolRegistry => misc::SYMBOL_REGISTRY,
            LuaLibFeature::TypeOf => misc::TYPE_OF,
            LuaLibFeature::WeakMap => collections::WEAK_MAP,
            LuaLibFeature::WeakSet => collections::WEAK_SET,
        }
    }

    /// The global helper name the transformer emits for this feature, when
    /// it is function-shaped (collections are class-shaped tables instead).
    pub fn helper_name(self) -> &'static str {
        match self {
            LuaLibFeature::ArrayConcat => "__TS__ArrayConcat",
            LuaLibFeature::ArrayEvery => "__TS__ArrayEvery",
            LuaLibFeature::ArrayFilter => "__TS__ArrayFilter",
            LuaLibFeature::ArrayForEach => "__TS__ArrayForEach",
            LuaLibFeature::ArrayIndexOf => "__TS__ArrayIndexOf",
            LuaLibFeature::ArrayMap => "__TS__ArrayMap",
            LuaLibFeature::ArrayPush => "__TS__ArrayPush",
            LuaLibFeature::ArrayReverse => "__TS__ArrayReverse",
            LuaLibFeature::ArraySlice => "__TS__ArraySlice",
            LuaLibFeature::ArraySome => "__TS__ArraySome",
            LuaLibFeature::ArraySplice => "__TS__ArraySplice",
            LuaLibFeature::ClassIndex => "__TS__Index",
            LuaLibFeature::ClassNewIndex => "__TS__NewIndex",
            LuaLibFeature::Decorate => "__TS__Decorate",
            LuaLibFeature::FunctionApply => "__TS__FunctionApply",
            LuaLibFeature::FunctionBind => "__TS__FunctionBind",
            LuaLibFeature::FunctionCall => "__TS__FunctionCall",
            LuaLibFeature::InstanceOf => "__TS__InstanceOf",
            LuaLibFeature::InstanceOfObject => "__TS__InstanceOfObject",
            LuaLibFeature::Iterator => "__TS__iterator",
            LuaLibFeature::Map => "Map",
            LuaLibFeature::ObjectAssign => "__TS__ObjectAssign",
            LuaLibFeature::ObjectEntries => "__TS__ObjectEntries",
            LuaLibFeature::ObjectKeys => "__TS__ObjectKeys",
            LuaLibFeature::ObjectValues => "__TS__ObjectValues",
            LuaLibFeature::Set => "Set",
            LuaLibFeature::Spread => "__TS__Spread",
            LuaLibFeature::StringReplace => "__TS__StringReplace",
            LuaLibFeature::StringSplit => "__TS__StringSplit",
            LuaLibFeature::Symbol => "__TS__Symbol",
            LuaLibFeature::SymbolRegistry => "__TS__SymbolRegistryFor",
            LuaLibFeature::TypeOf => "__TS__TypeOf",
            LuaLibFeature::WeakMap => "WeakMap",
            LuaLibFeature::WeakSet => "WeakSet",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_features_listed_once() {
        for (i, a) in ALL_FEATURES.iter().enumerate() {
            for b in &ALL_FEATURES[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_dependencies_precede_dependents() {
        for (i, feature) in ALL_FEATURES.iter().enumerate() {
            for dep in feature.dependencies() {
                let dep_index = ALL_FEATURES.iter().position(|f| f == dep).unwrap();
                assert!(dep_index < i, "{dep:?} must precede {feature:?}");
            }
        }
    }

    #[test]
    fn test_sources_define_their_helper() {
        for feature in ALL_FEATURES {
            assert!(
                feature.source().contains(feature.helper_name()),
                "snippet for {feature:?} must define {}",
                feature.helper_name()
            );
        }
    }
}
