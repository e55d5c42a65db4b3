//! Names shared with downstream collaborators through the environment

pub const ENV_VAR_ROOT_DIR: &str = "WEFT_ROOT_DIR";
pub const ENV_VAR_TMP_DIR: &str = "WEFT_TMP_DIR";
pub const ENV_VAR_SRC_DIR: &str = "WEFT_SRC_DIR";
pub const ENV_VAR_WWW_DIR: &str = "WEFT_WWW_DIR";
pub const ENV_VAR_BUILD_DIR: &str = "WEFT_BUILD_DIR";

pub const ENV_VAR_DEBUG_MODE: &str = "WEFT_DEBUG_MODE";
pub const ENV_PRINT_DEPENDENCY_TREE: &str = "WEFT_PRINT_DEPENDENCY_TREE";
pub const ENV_WEBPACK_LOADER: &str = "WEFT_WEBPACK_LOADER";

pub const TMP_DIR: &str = ".tmp";
pub const SRC_DIR: &str = "src";
pub const WWW_DIR: &str = "www";
pub const BUILD_DIR: &str = "build";

pub const PACKAGE_MANIFEST: &str = "package.json";

pub const ARG_DEBUG: &str = "--debug";
pub const ARG_WATCH: &str = "--watch";
pub const ARG_PROD: &str = "--prod";
pub const ARG_AOT: &str = "--aot";
