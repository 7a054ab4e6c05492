use proptest::prelude::*;
use tstl_core::symbols::NameMangler;

proptest! {
    #[test]
    fn mangling_is_deterministic(name in ".{0,24}") {
        prop_assert_eq!(NameMangler::mangle(&name), NameMangler::mangle(&name));
    }

    #[test]
    fn mangled_names_are_valid_lua_identifiers(name in ".{1,24}") {
        let mangled = NameMangler::mangle(&name);
        if NameMangler::is_unsafe_name(&name) {
            prop_assert!(mangled.starts_with("____"));
        }
        // Whatever comes out must be safe to print as a Lua identifier.
        prop_assert!(NameMangler::is_valid_lua_identifier(&mangled));
        prop_assert!(!NameMangler::is_unsafe_name(&mangled));
    }

    #[test]
    fn safe_names_pass_through(name in "[a-zA-Z_][a-zA-Z0-9_]{0,16}") {
        prop_assume!(!NameMangler::is_unsafe_name(&name));
        prop_assert_eq!(NameMangler::mangle(&name), name);
    }
}
