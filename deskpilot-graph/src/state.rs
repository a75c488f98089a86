use serde::{de::DeserializeOwned, Serialize};

/// Bound for the single record a graph threads through its nodes. Nodes take
/// the whole record and return the whole record; there is no merge layer.
pub trait StateSchema:
    Serialize + DeserializeOwned + Clone + Default + Send + Sync + 'static
{
}
