//! String method helpers. Indices in and out are 0-based; patterns are
//! treated as plain text, not Lua patterns.

pub const STRING_SPLIT: &str = r#"function __TS__StringSplit(source, separator, limit)
    if limit == nil then
        limit = 4294967295
    end
    if limit == 0 then
        return {}
    end
    local out = {}
    if separator == nil or separator == "" then
        for i = 1, #source do
            out[i] = string.sub(source, i, i)
        end
        return out
    end
    local index = 1
    local count = 0
    while count < limit do
        local found = string.find(source, separator, index, true)
        if found == nil then
            break
        end
        count = count + 1
        out[count] = string.sub(source, index, found - 1)
        index = found + #separator
    end
    if count < limit then
        out[count + 1] = string.sub(source, index)
    end
    return out
end
"#;

pub const STRING_REPLACE: &str = r#"function __TS__StringReplace(source, searchValue, replaceValue)
    local start, finish = string.find(source, searchValue, 1, true)
    if start == nil then
        return source
    end
    return string.sub(source, 1, start - 1) .. replaceValue .. string.sub(source, finish + 1)
end
"#;
