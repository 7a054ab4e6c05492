//! Class protocol helpers: accessor routing, inheritance checks and
//! decorator application.

pub const CLASS_INDEX: &str = r#"function __TS__Index(classProto)
    return function(tbl, key)
        local proto = classProto
        while proto ~= nil do
            local getters = rawget(proto, "____getters")
            if getters ~= nil then
                local getter = getters[key]
                if getter ~= nil then
                    return getter(tbl)
                end
            end
            local value = rawget(proto, key)
            if value ~= nil then
                return value
            end
            proto = getmetatable(proto)
        end
        return nil
    end
end
"#;

pub const CLASS_NEW_INDEX: &str = r#"function __TS__NewIndex(classProto)
    return function(tbl, key, value)
        local proto = classProto
        while proto ~= nil do
            local setters = rawget(proto, "____setters")
            if setters ~= nil then
                local setter = setters[key]
                if setter ~= nil then
                    setter(tbl, value)
                    return
                end
            end
            proto = getmetatable(proto)
        end
        rawset(tbl, key, value)
    end
end
"#;

pub const INSTANCE_OF: &str = r#"function __TS__InstanceOf(obj, classTbl)
    if type(obj) ~= "table" then
        return false
    end
    local proto = getmetatable(obj)
    while proto ~= nil do
        if proto.constructor == classTbl then
            return true
        end
        proto = getmetatable(proto)
    end
    return false
end
"#;

pub const INSTANCE_OF_OBJECT: &str = r#"function __TS__InstanceOfObject(value)
    local valueType = type(value)
    return valueType == "table" or valueType == "function"
end
"#;

pub const DECORATE: &str = r#"function __TS__Decorate(decorators, target)
    local result = target
    for i = #decorators, 1, -1 do
        local decorated = decorators[i](result)
        if decorated ~= nil then
            result = decorated
        end
    end
    return result
end
"#;
