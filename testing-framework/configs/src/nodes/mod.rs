pub mod settings;

pub use settings::{
    AbciProtocol, DatabaseBackend, FastSyncMode, NodeSetting, PrivvalProtocol,
    UnknownSettingValue,
};
