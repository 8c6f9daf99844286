use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use jwtkeys::{Algorithm, Key, KeyRegistry, MultiKeyParser, MultiKeySigner, ParserOptions};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Key(#[from] jwtkeys::Error),
}

/// One key declared in a manifest. Paths are already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEntry {
    pub kid: String,
    pub alg: Algorithm,
    pub sign_key: PathBuf,
    pub verify_key: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyManifest {
    pub parser: ParserOptions,
    pub keys: BTreeMap<String, KeyEntry>,
}

pub fn validate_manifest(manifest: &KeyManifest) -> Result<(), ManifestError> {
    for (kid, entry) in &manifest.keys {
        if kid.is_empty() {
            return Err(ManifestError::Validation("kid must not be empty".to_string()));
        }
        if entry.alg == Algorithm::None {
            return Err(ManifestError::Validation(format!(
                "key {kid}: alg none cannot sign or verify"
            )));
        }
        if entry.alg.is_asymmetric() && entry.verify_key.is_none() {
            return Err(ManifestError::Validation(format!(
                "key {kid}: {} requires verify_key",
                entry.alg
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    parser: ParserOptions,
    #[serde(default)]
    keys: BTreeMap<String, RawKey>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawKey {
    alg: String,
    sign_key: PathBuf,
    #[serde(default)]
    verify_key: Option<PathBuf>,
}

/// Parse manifest text. Relative key paths resolve against `base_dir`.
pub fn parse_manifest(content: &str, base_dir: &Path) -> Result<KeyManifest, ManifestError> {
    let raw: RawManifest = toml::from_str(content)
        .map_err(|e| ManifestError::Validation(format!("invalid TOML: {e}")))?;

    let keys = raw
        .keys
        .into_iter()
        .map(|(kid, k)| {
            let alg = k
                .alg
                .parse::<Algorithm>()
                .map_err(|e| ManifestError::Validation(format!("key {kid}: {e}")))?;
            let entry = KeyEntry {
                kid: kid.clone(),
                alg,
                sign_key: base_dir.join(k.sign_key),
                verify_key: k.verify_key.map(|p| base_dir.join(p)),
            };
            Ok((kid, entry))
        })
        .collect::<Result<BTreeMap<_, _>, ManifestError>>()?;

    let manifest = KeyManifest {
        parser: raw.parser,
        keys,
    };
    validate_manifest(&manifest)?;
    Ok(manifest)
}

pub fn load_manifest_from_file(path: &Path) -> Result<KeyManifest, ManifestError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ManifestError::NotFound(format!("failed to read {}: {e}", path.display())))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_manifest(&content, base_dir).map_err(|e| match e {
        ManifestError::Validation(msg) => {
            ManifestError::Validation(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

impl KeyManifest {
    /// Read and parse every key. Fails on the first key that cannot be loaded.
    pub fn load_keys(&self) -> Result<Vec<(String, Key)>, ManifestError> {
        self.keys
            .values()
            .map(|entry| {
                let key = Key::from_files(entry.alg, &entry.sign_key, entry.verify_key.as_deref())?;
                Ok((entry.kid.clone(), key))
            })
            .collect()
    }

    /// Load every key into `registry`. Nothing is installed unless all keys load.
    pub fn install(&self, registry: &KeyRegistry) -> Result<usize, ManifestError> {
        let keys = self.load_keys()?;
        let count = keys.len();
        for (kid, key) in keys {
            registry.set_key(&kid, key)?;
        }
        tracing::info!(count, "installed key manifest");
        Ok(count)
    }

    pub fn multi_key_signer(&self) -> Result<MultiKeySigner, ManifestError> {
        let signers = MultiKeySigner::new();
        for (kid, key) in self.load_keys()? {
            signers.set(kid, key.signer())?;
        }
        Ok(signers)
    }

    pub fn multi_key_parser(&self) -> Result<MultiKeyParser, ManifestError> {
        let parsers = MultiKeyParser::new();
        for (kid, key) in self.load_keys()? {
            parsers.set(kid, key.parser(self.parser))?;
        }
        Ok(parsers)
    }
}
