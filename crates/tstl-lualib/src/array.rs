//! Array method helpers. Callbacks receive (value, index, array) with
//! 0-based indices, matching the source semantics.

pub const ARRAY_CONCAT: &str = r#"function __TS__ArrayConcat(arr1, ...)
    local out = {}
    for _, v in ipairs(arr1) do
        out[#out + 1] = v
    end
    for _, arr in ipairs({...}) do
        if type(arr) == "table" then
            for _, v in ipairs(arr) do
                out[#out + 1] = v
            end
        else
            out[#out + 1] = arr
        end
    end
    return out
end
"#;

pub const ARRAY_EVERY: &str = r#"function __TS__ArrayEvery(arr, callback)
    for i = 1, #arr do
        if not callback(arr[i], i - 1, arr) then
            return false
        end
    end
    return true
end
"#;

pub const ARRAY_FILTER: &str = r#"function __TS__ArrayFilter(arr, callback)
    local out = {}
    for i = 1, #arr do
        if callback(arr[i], i - 1, arr) then
            out[#out + 1] = arr[i]
        end
    end
    return out
end
"#;

pub const ARRAY_FOR_EACH: &str = r#"function __TS__ArrayForEach(arr, callback)
    for i = 1, #arr do
        callback(arr[i], i - 1, arr)
    end
end
"#;

pub const ARRAY_INDEX_OF: &str = r#"function __TS__ArrayIndexOf(arr, searchElement, fromIndex)
    local len = #arr
    local start = 1
    if fromIndex ~= nil then
        if fromIndex < 0 then
            fromIndex = len + fromIndex
        end
        start = fromIndex + 1
    end
    for i = start, len do
        if arr[i] == searchElement then
            return i - 1
        end
    end
    return -1
end
"#;

pub const ARRAY_MAP: &str = r#"function __TS__ArrayMap(arr, callback)
    local out = {}
    for i = 1, #arr do
        out[i] = callback(arr[i], i - 1, arr)
    end
    return out
end
"#;

pub const ARRAY_PUSH: &str = r#"function __TS__ArrayPush(arr, ...)
    local items = {...}
    local len = #arr
    for i = 1, #items do
        len = len + 1
        arr[len] = items[i]
    end
    return len
end
"#;

pub const ARRAY_REVERSE: &str = r#"function __TS__ArrayReverse(arr)
    local i = 1
    local j = #arr
    while i < j do
        arr[i], arr[j] = arr[j], arr[i]
        i = i + 1
        j = j - 1
    end
    return arr
end
"#;

pub const ARRAY_SLICE: &str = r#"function __TS__ArraySlice(arr, first, last)
    local len = #arr
    if first == nil then
        first = 0
    elseif first < 0 then
        first = len + first
    end
    if last == nil then
        last = len
    elseif last < 0 then
        last = len + last
    end
    local out = {}
    for i = first + 1, last do
        out[#out + 1] = arr[i]
    end
    return out
end
"#;

pub const ARRAY_SOME: &str = r#"function __TS__ArraySome(arr, callback)
    for i = 1, #arr do
        if callback(arr[i], i - 1, arr) then
            return true
        end
    end
    return false
end
"#;

pub const ARRAY_SPLICE: &str = r#"function __TS__ArraySplice(arr, start, deleteCount, ...)
    local len = #arr
    if start < 0 then
        start = len + start
        if start < 0 then
            start = 0
        end
    elseif start > len then
        start = len
    end
    if deleteCount == nil or deleteCount > len - start then
        deleteCount = len - start
    elseif deleteCount < 0 then
        deleteCount = 0
    end
    local removed = {}
    for i = 1, deleteCount do
        removed[i] = arr[start + i]
    end
    local items = {...}
    local shift = #items - deleteCount
    if shift > 0 then
        for i = len, start + deleteCount + 1, -1 do
            arr[i + shift] = arr[i]
        end
    elseif shift < 0 then
        for i = start + deleteCount + 1, len do
            arr[i + shift] = arr[i]
        end
        for i = len + shift + 1, len do
            arr[i] = nil
        end
    end
    for i = 1, #items do
        arr[start + i] = items[i]
    end
    return removed
end
"#;
