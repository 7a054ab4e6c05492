//! Object static-method helpers.

pub const OBJECT_ASSIGN: &str = r#"function __TS__ObjectAssign(target, ...)
    for _, source in ipairs({...}) do
        for key, value in pairs(source) do
            target[key] = value
        end
    end
    return target
end
"#;

pub const OBJECT_ENTRIES: &str = r#"function __TS__ObjectEntries(obj)
    local out = {}
    for key, value in pairs(obj) do
        out[#out + 1] = { key, value }
    end
    return out
end
"#;

pub const OBJECT_KEYS: &str = r#"function __TS__ObjectKeys(obj)
    local out = {}
    for key in pairs(obj) do
        out[#out + 1] = key
    end
    return out
end
"#;

pub const OBJECT_VALUES: &str = r#"function __TS__ObjectValues(obj)
    local out = {}
    for _, value in pairs(obj) do
        out[#out + 1] = value
    end
    return out
end
"#;
