//! The iteration protocol bridge: drives arrays, `next`-style iterator
//! objects (including lowered generators) and iterables from a single
//! generic-for expression.

pub const ITERATOR: &str = r#"function __TS__iterator(iterable)
    if type(iterable) == "table" and iterable.next ~= nil then
        local iterator = iterable
        return function()
            local result = iterator:next()
            if not result.done then
                return result.value
            end
            return nil
        end
    end
    local i = 0
    return function()
        i = i + 1
        return iterable[i]
    end
end
"#;
