//! Remaining runtime helpers: spread, typeof, symbols and Function
//! prototype methods.

pub const SPREAD: &str = r#"function __TS__Spread(iterable)
    if type(iterable) == "string" then
        local out = {}
        for i = 1, #iterable do
            out[i] = string.sub(iterable, i, i)
        end
        return unpack(out)
    end
    if type(iterable) == "table" and iterable.next ~= nil then
        local out = {}
        while true do
            local result = iterable:next()
            if result.done then
                break
            end
            out[#out + 1] = result.value
        end
        return unpack(out)
    end
    return unpack(iterable)
end
"#;

pub const TYPE_OF: &str = r#"function __TS__TypeOf(value)
    local luaType = type(value)
    if luaType == "table" then
        return "object"
    end
    if luaType == "nil" then
        return "undefined"
    end
    return luaType
end
"#;

pub const SYMBOL: &str = r#"function __TS__Symbol(description)
    return setmetatable({ description = description }, {
        __tostring = function(self)
            return "Symbol(" .. tostring(self.description) .. ")"
        end
    })
end
"#;

pub const SYMBOL_REGISTRY: &str = r#"__TS__symbolRegistry = {}
function __TS__SymbolRegistryFor(key)
    if __TS__symbolRegistry[key] == nil then
        __TS__symbolRegistry[key] = __TS__Symbol(key)
    end
    return __TS__symbolRegistry[key]
end
"#;

pub const FUNCTION_APPLY: &str = r#"function __TS__FunctionApply(fn, thisArg, args)
    if args ~= nil then
        return fn(thisArg, unpack(args))
    end
    return fn(thisArg)
end
"#;

pub const FUNCTION_BIND: &str = r#"function __TS__FunctionBind(fn, thisArg, ...)
    local bound = {...}
    return function(_, ...)
        local args = {}
        for i = 1, #bound do
            args[#args + 1] = bound[i]
        end
        local varargs = {...}
        for i = 1, #varargs do
            args[#args + 1] = varargs[i]
        end
        return fn(thisArg, unpack(args))
    end
end
"#;

pub const FUNCTION_CALL: &str = r#"function __TS__FunctionCall(fn, thisArg, ...)
    return fn(thisArg, ...)
end
"#;
