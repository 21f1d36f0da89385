use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{NnError, Result};
use crate::nn::network::Network;

impl Network {
    /// JSON with the layer sizes and a {columns, values} record per weight and bias matrix.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restores a network, rejecting data whose shapes disagree.
    pub fn from_json(json: &str) -> Result<Network> {
        serde_json::from_str(json).map_err(|e| NnError::Serialization(e.to_string()))
    }

    /// Writes the network to a file as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), layers = ?self.layers(), "Saved network");

        Ok(())
    }

    /// Loads a network saved with `save`.
    pub fn load(path: impl AsRef<Path>) -> Result<Network> {
        let path = path.as_ref();
        let network = Network::from_json(&fs::read_to_string(path)?)?;
        debug!(path = %path.display(), layers = ?network.layers(), "Loaded network");

        Ok(network)
    }
}
