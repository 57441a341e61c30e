//! Contains [DecoderConfig], the options of the decoding read from a TOML file, and the option traits
//! [DecodeOpt] and [CheckOpt] that components take their configuration through.
//!
//! Example of a configuration file, all fields are optional:
//!
//! ```toml
//! debug_mode = false
//! user_logic = false
//! concurrent = true
//! busy_policy = "tolerate_mismatch"
//! fee_id_config_file = "feeId_mapper.txt"
//! crate_masks_file = "crate_masks.txt"
//!
//! [electronics_delay]
//! calib_to_fet = 10
//! bc_to_local = 0
//! reg_to_local = 6
//! ```

use super::crate_masks::CrateMasks;
use super::electronics_delay::ElectronicsDelay;
use super::fee_id_config::FeeIdConfig;
use crate::util::*;

/// What the checker does when the number of local boards disagrees with the regional board while a busy flag is raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyPolicy {
    /// A busy board may not answer, the mismatch is not an error
    #[default]
    TolerateMismatch,
    /// Report the mismatch as an error
    Report,
}

/// Options for the decoders.
pub trait DecodeOpt {
    /// Emit regional boards and skip the checks on the board IDs.
    fn debug_mode(&self) -> bool;
    /// The links carry the CRU user logic format instead of the bare GBT format.
    fn user_logic(&self) -> bool;
    /// Decode the links in parallel, one thread per link.
    fn concurrent(&self) -> bool;
    /// Delays of the electronics.
    fn electronics_delay(&self) -> ElectronicsDelay;
}

impl<T> DecodeOpt for &T
where
    T: DecodeOpt,
{
    fn debug_mode(&self) -> bool {
        (*self).debug_mode()
    }
    fn user_logic(&self) -> bool {
        (*self).user_logic()
    }
    fn concurrent(&self) -> bool {
        (*self).concurrent()
    }
    fn electronics_delay(&self) -> ElectronicsDelay {
        (*self).electronics_delay()
    }
}

impl<T> DecodeOpt for Box<T>
where
    T: DecodeOpt,
{
    fn debug_mode(&self) -> bool {
        (**self).debug_mode()
    }
    fn user_logic(&self) -> bool {
        (**self).user_logic()
    }
    fn concurrent(&self) -> bool {
        (**self).concurrent()
    }
    fn electronics_delay(&self) -> ElectronicsDelay {
        (**self).electronics_delay()
    }
}

impl<T> DecodeOpt for Arc<T>
where
    T: DecodeOpt,
{
    fn debug_mode(&self) -> bool {
        (**self).debug_mode()
    }
    fn user_logic(&self) -> bool {
        (**self).user_logic()
    }
    fn concurrent(&self) -> bool {
        (**self).concurrent()
    }
    fn electronics_delay(&self) -> ElectronicsDelay {
        (**self).electronics_delay()
    }
}

/// Options for the consistency checker.
pub trait CheckOpt {
    /// How to treat a local board count mismatch while a busy flag is raised.
    fn busy_policy(&self) -> BusyPolicy;
}

impl<T> CheckOpt for &T
where
    T: CheckOpt,
{
    fn busy_policy(&self) -> BusyPolicy {
        (*self).busy_policy()
    }
}

impl<T> CheckOpt for Box<T>
where
    T: CheckOpt,
{
    fn busy_policy(&self) -> BusyPolicy {
        (**self).busy_policy()
    }
}

impl<T> CheckOpt for Arc<T>
where
    T: CheckOpt,
{
    fn busy_policy(&self) -> BusyPolicy {
        (**self).busy_policy()
    }
}

/// Decoding options, deserialized from TOML. Missing fields take their default value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// See [DecodeOpt::debug_mode]
    pub debug_mode: bool,
    /// See [DecodeOpt::user_logic]
    pub user_logic: bool,
    /// See [DecodeOpt::concurrent]
    pub concurrent: bool,
    /// See [CheckOpt::busy_policy]
    pub busy_policy: BusyPolicy,
    /// File with the FEE ID mapping, the default mapping is used if not set
    pub fee_id_config_file: Option<PathBuf>,
    /// File with the crate masks, the default masks are used if not set
    pub crate_masks_file: Option<PathBuf>,
    /// See [DecodeOpt::electronics_delay]
    pub electronics_delay: ElectronicsDelay,
}

impl DecoderConfig {
    /// Loads the configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, io::Error> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| {
            io::Error::new(e.kind(), format!("{}: {e}", path.display()))
        })
    }

    /// Parses the configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, io::Error> {
        toml::from_str(content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Serializes the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, io::Error> {
        toml::to_string(self).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }

    /// FEE ID mapping: loaded from [DecoderConfig::fee_id_config_file] if set, the default mapping otherwise.
    pub fn fee_id_config(&self) -> Result<FeeIdConfig, io::Error> {
        match &self.fee_id_config_file {
            Some(path) => FeeIdConfig::load(path),
            None => Ok(FeeIdConfig::default()),
        }
    }

    /// Crate masks: loaded from [DecoderConfig::crate_masks_file] if set, the default masks otherwise.
    pub fn crate_masks(&self) -> Result<CrateMasks, io::Error> {
        match &self.crate_masks_file {
            Some(path) => CrateMasks::load(path),
            None => Ok(CrateMasks::default()),
        }
    }
}

impl DecodeOpt for DecoderConfig {
    fn debug_mode(&self) -> bool {
        self.debug_mode
    }
    fn user_logic(&self) -> bool {
        self.user_logic
    }
    fn concurrent(&self) -> bool {
        self.concurrent
    }
    fn electronics_delay(&self) -> ElectronicsDelay {
        self.electronics_delay
    }
}

impl CheckOpt for DecoderConfig {
    fn busy_policy(&self) -> BusyPolicy {
        self.busy_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_toml_is_default() {
        let config = DecoderConfig::from_toml_str("").unwrap();
        assert_eq!(config, DecoderConfig::default());
        assert_eq!(config.busy_policy(), BusyPolicy::TolerateMismatch);
        assert_eq!(config.electronics_delay().reg_to_local, 6);
    }

    #[test]
    fn test_parse_toml() {
        let content = r#"
user_logic = true
busy_policy = "report"

[electronics_delay]
bc_to_local = 2
"#;
        let config = DecoderConfig::from_toml_str(content).unwrap();
        assert!(config.user_logic());
        assert!(!config.debug_mode());
        assert_eq!(config.busy_policy(), BusyPolicy::Report);
        assert_eq!(config.electronics_delay.bc_to_local, 2);
        assert_eq!(config.electronics_delay.calib_to_fet, 10);
    }

    #[test]
    fn test_invalid_toml() {
        let err = DecoderConfig::from_toml_str("busy_policy = \"sometimes\"").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_blanket_impls() {
        fn is_concurrent(cfg: impl DecodeOpt) -> bool {
            cfg.concurrent()
        }
        let config = DecoderConfig {
            concurrent: true,
            ..Default::default()
        };
        assert!(is_concurrent(&config));
        assert!(is_concurrent(Box::new(config.clone())));
        assert!(is_concurrent(Arc::new(config)));
    }

    #[test]
    fn test_load_with_table_files() {
        let tmp_d = temp_dir::TempDir::new().unwrap();
        let masks_path = tmp_d.child("crate_masks.txt");
        let mut masks = CrateMasks::default();
        masks.set_active_boards(4, 0x0F);
        masks.write(&masks_path).unwrap();

        let config = DecoderConfig {
            debug_mode: true,
            crate_masks_file: Some(masks_path),
            ..Default::default()
        };
        let config_path = tmp_d.child("decoder.toml");
        fs::write(&config_path, config.to_toml_string().unwrap()).unwrap();

        let loaded = DecoderConfig::load(&config_path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.crate_masks().unwrap().mask(4), 0x0F);
        assert_eq!(loaded.fee_id_config().unwrap(), FeeIdConfig::default());
    }

    #[test]
    fn test_missing_table_file() {
        let config = DecoderConfig {
            fee_id_config_file: Some(PathBuf::from("/no/such/feeId_mapper.txt")),
            ..Default::default()
        };
        assert!(config.fee_id_config().is_err());
    }
}
