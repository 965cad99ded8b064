use super::types::{FLOW_DOCUMENT_VERSION, FlowDocument};
use crate::error::ArtifactError;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use std::fs;
use std::io::{Read, Write};

impl FlowDocument {
    /// The JSON form handed to the messaging runtime.
    pub fn to_json(&self) -> Result<String, ArtifactError> {
        serde_json::to_string(self)
            .map_err(|e| ArtifactError::Generic(format!("Serialization failed: {}", e)))
    }

    pub fn to_json_pretty(&self) -> Result<String, ArtifactError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ArtifactError::Generic(format!("Serialization failed: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let document: Self = serde_json::from_str(json)
            .map_err(|e| ArtifactError::Generic(format!("Deserialization failed: {}", e)))?;
        document.check_version()
    }

    /// Encodes the document in the compact bincode format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        encode_to_vec(self, standard())
            .map_err(|e| ArtifactError::Generic(format!("Serialization failed: {}", e)))
    }

    /// Decodes a document produced by [`FlowDocument::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let (document, _): (Self, usize) = decode_from_slice(bytes, standard())
            .map_err(|e| ArtifactError::Generic(format!("Deserialization failed: {}", e)))?;
        document.check_version()
    }

    /// Saves the document to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), ArtifactError> {
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path).map_err(|e| {
            ArtifactError::Generic(format!("Could not create file '{}': {}", path, e))
        })?;
        file.write_all(&bytes).map_err(|e| {
            ArtifactError::Generic(format!("Could not write to file '{}': {}", path, e))
        })?;
        Ok(())
    }

    /// Loads a document saved with [`FlowDocument::save`].
    pub fn from_file(path: &str) -> Result<Self, ArtifactError> {
        let mut file = fs::File::open(path)
            .map_err(|e| ArtifactError::Generic(format!("Could not open file '{}': {}", path, e)))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| {
            ArtifactError::Generic(format!("Could not read from file '{}': {}", path, e))
        })?;
        Self::from_bytes(&bytes)
    }

    fn check_version(self) -> Result<Self, ArtifactError> {
        if self.version == FLOW_DOCUMENT_VERSION {
            Ok(self)
        } else {
            Err(ArtifactError::VersionMismatch {
                found: self.version,
                expected: FLOW_DOCUMENT_VERSION.to_string(),
            })
        }
    }
}
