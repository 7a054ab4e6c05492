//! Map/Set/WeakMap/WeakSet backed by Lua tables, exposed through the same
//! constructor-plus-prototype shape the class lowering emits.

pub const MAP: &str = r#"Map = {}
Map.__index = Map
Map.prototype = {}
Map.prototype.__index = Map.prototype
Map.prototype.constructor = Map
function Map.new(entries)
    local self = setmetatable({}, Map.prototype)
    self.items = {}
    self.size = 0
    if entries ~= nil then
        for _, entry in ipairs(entries) do
            self:set(entry[1], entry[2])
        end
    end
    return self
end
function Map.prototype.get(self, key)
    return self.items[key]
end
function Map.prototype.set(self, key, value)
    if self.items[key] == nil then
        self.size = self.size + 1
    end
    self.items[key] = value
    return self
end
function Map.prototype.has(self, key)
    return self.items[key] ~= nil
end
function Map.prototype.delete(self, key)
    if self.items[key] ~= nil then
        self.size = self.size - 1
        self.items[key] = nil
        return true
    end
    return false
end
"#;

pub const SET: &str = r#"Set = {}
Set.__index = Set
Set.prototype = {}
Set.prototype.__index = Set.prototype
Set.prototype.constructor = Set
function Set.new(values)
    local self = setmetatable({}, Set.prototype)
    self.items = {}
    self.size = 0
    if values ~= nil then
        for _, value in ipairs(values) do
            self:add(value)
        end
    end
    return self
end
function Set.prototype.add(self, value)
    if self.items[value] == nil then
        self.size = self.size + 1
    end
    self.items[value] = true
    return self
end
function Set.prototype.has(self, value)
    return self.items[value] == true
end
function Set.prototype.delete(self, value)
    if self.items[value] ~= nil then
        self.size = self.size - 1
        self.items[value] = nil
        return true
    end
    return false
end
"#;

pub const WEAK_MAP: &str = r#"WeakMap = {}
WeakMap.__index = WeakMap
WeakMap.prototype = {}
WeakMap.prototype.__index = WeakMap.prototype
WeakMap.prototype.constructor = WeakMap
function WeakMap.new(entries)
    local self = setmetatable({}, WeakMap.prototype)
    self.items = setmetatable({}, { __mode = "k" })
    if entries ~= nil then
        for _, entry in ipairs(entries) do
            self.items[entry[1]] = entry[2]
        end
    end
    return self
end
function WeakMap.prototype.get(self, key)
    return self.items[key]
end
function WeakMap.prototype.set(self, key, value)
    self.items[key] = value
    return self
end
function WeakMap.prototype.has(self, key)
    return self.items[key] ~= nil
end
function WeakMap.prototype.delete(self, key)
    if self.items[key] ~= nil then
        self.items[key] = nil
        return true
    end
    return false
end
"#;

pub const WEAK_SET: &str = r#"WeakSet = {}
WeakSet.__index = WeakSet
WeakSet.prototype = {}
WeakSet.prototype.__index = WeakSet.prototype
WeakSet.prototype.constructor = WeakSet
function WeakSet.new(values)
    local self = setmetatable({}, WeakSet.prototype)
    self.items = setmetatable({}, { __mode = "k" })
    if values ~= nil then
        for _, value in ipairs(values) do
            self.items[value] = true
        end
    end
    return self
end
function WeakSet.prototype.add(self, value)
    self.items[value] = true
    return self
end
function WeakSet.prototype.has(self, value)
    return self.items[value] == true
end
function WeakSet.prototype.delete(self, value)
    if self.items[value] ~= nil then
        self.items[value] = nil
        return true
    end
    return false
end
"#;
