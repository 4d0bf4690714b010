use std::{fmt, str::FromStr};

use thiserror::Error;

/// Configuration axis a node setting belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NodeSetting {
    FastSync,
    Database,
    AbciProtocol,
    PrivvalProtocol,
}

impl NodeSetting {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FastSync => "fast sync",
            Self::Database => "database",
            Self::AbciProtocol => "ABCI protocol",
            Self::PrivvalProtocol => "privval protocol",
        }
    }
}

impl fmt::Display for NodeSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid {setting} setting {value:?}")]
pub struct UnknownSettingValue {
    pub setting: NodeSetting,
    pub value: String,
}

macro_rules! node_setting {
    (
        $(#[$meta:meta])*
        $name:ident => $setting:expr, { $($variant:ident => $raw:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $raw),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownSettingValue;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($raw => Ok(Self::$variant),)+
                    _ => Err(UnknownSettingValue {
                        setting: $setting,
                        value: value.to_owned(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

node_setting! {
    /// Block synchronization strategy; the empty string leaves fast sync off.
    FastSyncMode => NodeSetting::FastSync, {
        Disabled => "",
        V0 => "v0",
        V1 => "v1",
        V2 => "v2",
    }
}

node_setting! {
    DatabaseBackend => NodeSetting::Database, {
        GoLevelDb => "goleveldb",
        CLevelDb => "cleveldb",
        BoltDb => "boltdb",
        RocksDb => "rocksdb",
        BadgerDb => "badgerdb",
    }
}

node_setting! {
    /// Transport between the node and its application.
    AbciProtocol => NodeSetting::AbciProtocol, {
        Unix => "unix",
        Tcp => "tcp",
        Grpc => "grpc",
    }
}

node_setting! {
    /// Where the node's private validator key lives.
    PrivvalProtocol => NodeSetting::PrivvalProtocol, {
        File => "file",
        Unix => "unix",
        Tcp => "tcp",
    }
}
