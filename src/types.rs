/// Identifier for a sample source, usually its path as given in configuration.
/// Examples: `wanddata_O3_original.json`, `raw/session_02.json`
pub type SourceId = String;
/// Name of an output split; also its directory name under the output root.
/// Examples: `server`, `client_A`, `test`
pub type SplitName = String;
/// Name of a single persisted unit without extension.
/// Examples: `O_0`, `N_117`
pub type UnitName = String;
