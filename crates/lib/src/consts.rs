pub const APP_NAME: &str = "patchfiles";

/// Sentinel path written by a successful patch run and removed by revert.
pub const DEFAULT_CONTROL_FILE: &str = "/patchfile";

/// Environment used when `ENVIRONMENT` is unset or blank.
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Suffix of the sibling copy taken before an overwrite.
pub const BACKUP_SUFFIX: &str = ".oldpatchfile";

pub const MARKER_START: &str = "PATCHFILES START";
pub const MARKER_END: &str = "PATCHFILES END";

/// Category that selects every fragment.
pub const CATEGORY_ALL: &str = "all";
