use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Target Lua dialect. Controls bitwise lowering, goto availability and the
/// unpack spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LuaTarget {
    /// Lua 5.1: no goto, no bitwise support at all.
    #[serde(rename = "5.1")]
    Lua51,
    /// Lua 5.2: goto and the bit32 library.
    #[serde(rename = "5.2")]
    Lua52,
    /// Lua 5.3: native bitwise operators.
    #[serde(rename = "5.3")]
    #[default]
    Lua53,
    /// LuaJIT: goto and the bit library.
    #[serde(rename = "jit")]
    LuaJit,
}

impl LuaTarget {
    pub fn supports_goto(self) -> bool {
        !matches!(self, LuaTarget::Lua51)
    }

    pub fn supports_native_bitwise(self) -> bool {
        matches!(self, LuaTarget::Lua53)
    }

    /// The bitwise helper library for targets without native operators.
    pub fn bit_library(self) -> Option<&'static str> {
        match self {
            LuaTarget::Lua52 => Some("bit32"),
            LuaTarget::LuaJit => Some("bit"),
            _ => None,
        }
    }

    /// The spelling of unpack on this target.
    pub fn unpack_name(self) -> &'static str {
        match self {
            LuaTarget::Lua51 | LuaTarget::LuaJit => "unpack",
            LuaTarget::Lua52 | LuaTarget::Lua53 => "table.unpack",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            LuaTarget::Lua51 => "Lua 5.1",
            LuaTarget::Lua52 => "Lua 5.2",
            LuaTarget::Lua53 => "Lua 5.3",
            LuaTarget::LuaJit => "LuaJIT",
        }
    }
}

/// How the runtime-support bundle reaches the emitted chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LuaLibImport {
    /// Paste the used features into every chunk that needs them.
    Inline,
    /// `require("lualib_bundle")` in chunks that use any feature.
    #[default]
    Require,
    /// Require the bundle in every chunk, used or not.
    Always,
    /// Emit nothing; the Host provides the runtime by other means.
    None,
}

/// Compiler options consumed by the transformer. Loaded from a JSON project
/// file and/or overridden by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Target Lua dialect (default: 5.3)
    #[serde(default)]
    pub lua_target: LuaTarget,

    /// Runtime bundle linkage (default: require)
    #[serde(default)]
    pub lua_lib_import: LuaLibImport,

    /// Project root; import paths are expressed relative to it.
    #[serde(default)]
    pub root_dir: Option<PathBuf>,

    /// Base directory for non-relative import paths.
    #[serde(default)]
    pub base_url: Option<PathBuf>,

    /// Disable symbol hoisting (imports are still lifted first).
    #[serde(default)]
    pub no_hoisting: bool,

    /// Strict mode: bare context calls receive nil instead of _G.
    #[serde(default)]
    pub strict: bool,

    /// Treat every file as strict regardless of per-file pragmas.
    #[serde(default)]
    pub always_strict: bool,

    /// Strict null checking changes which ternary branches may be falsy.
    #[serde(default = "default_true")]
    pub strict_null_checks: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            lua_target: LuaTarget::default(),
            lua_lib_import: LuaLibImport::default(),
            root_dir: None,
            base_url: None,
            no_hoisting: false,
            strict: false,
            always_strict: false,
            strict_null_checks: true,
        }
    }
}

impl CompilerOptions {
    pub fn is_strict(&self) -> bool {
        self.strict || self.always_strict
    }
}

/// Main project configuration file shape.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompilerConfig {
    #[serde(default)]
    pub compiler_options: CompilerOptions,

    /// Files to include (glob patterns)
    #[serde(default)]
    pub include: Vec<String>,

    /// Files to exclude (glob patterns)
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Parse(String),
}

impl CompilerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = CompilerOptions::default();
        assert_eq!(options.lua_target, LuaTarget::Lua53);
        assert_eq!(options.lua_lib_import, LuaLibImport::Require);
        assert!(options.strict_null_checks);
        assert!(!options.is_strict());
    }

    #[test]
    fn test_target_capabilities() {
        assert!(!LuaTarget::Lua51.supports_goto());
        assert!(LuaTarget::Lua52.supports_goto());
        assert!(LuaTarget::Lua53.supports_native_bitwise());
        assert_eq!(LuaTarget::Lua52.bit_library(), Some("bit32"));
        assert_eq!(LuaTarget::LuaJit.bit_library(), Some("bit"));
        assert_eq!(LuaTarget::Lua51.unpack_name(), "unpack");
        assert_eq!(LuaTarget::Lua53.unpack_name(), "table.unpack");
    }

    #[test]
    fn test_deserialize_config() {
        let json = r#"{
            "compilerOptions": {
                "luaTarget": "5.1",
                "luaLibImport": "inline",
                "noHoisting": true
            }
        }"#;
        let config: CompilerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.compiler_options.lua_target, LuaTarget::Lua51);
        assert_eq!(config.compiler_options.lua_lib_import, LuaLibImport::Inline);
        assert!(config.compiler_options.no_hoisting);
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = CompilerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("compilerOptions"));
        let back: CompilerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.compiler_options.lua_target, LuaTarget::Lua53);
    }
}
