use crate::error::{self, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use snafu::ResultExt;
use std::fmt::Debug;

/// The `Configuration` trait is for the records that are persisted between invocations (the
/// cluster configuration, the cluster detail and the resolved resource set).
///
/// The traits aggregated by the `Configuration` trait are typical of "plain old data" types. They
/// let a persistence client store and load any of these records without knowing their shape.
pub trait Configuration:
    Serialize + DeserializeOwned + Clone + Debug + Default + Send + Sync + Sized + 'static
{
    /// Convert the `Configuration` object to a serde `Value`.
    fn into_value(self) -> Result<Value> {
        Ok(serde_json::to_value(self).context(error::ConfigSerializationSnafu)?)
    }

    /// Deserialize the `Configuration` object from a serde `Value`.
    fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value).context(error::ConfigDeserializationSnafu)?)
    }

    /// Pretty JSON, the on-disk form of every persisted record.
    fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self).context(error::ConfigSerializationSnafu)?)
    }

    fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s).context(error::ConfigDeserializationSnafu)?)
    }
}
