use anyhow::{anyhow, Context, Result};
use jsonschema::JSONSchema;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const ORACLE_SCHEMA: &str = include_str!("../../../schemas/oracle.schema.json");

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OracleConfig {
    pub cmd: Vec<String>,
    pub cwd: Option<PathBuf>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    pub timeout_ms: Option<u64>,
    pub reproduces_exit_codes: Option<Vec<i32>>,
}

impl OracleConfig {
    pub fn from_command(cmd: Vec<String>) -> Result<Self> {
        if cmd.is_empty() {
            anyhow::bail!("oracle command is empty");
        }
        Ok(Self {
            cmd,
            cwd: None,
            env: BTreeMap::new(),
            timeout_ms: None,
            reproduces_exit_codes: None,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let mut config = parse(&text).with_context(|| path.display().to_string())?;
        if let Some(cwd) = &config.cwd {
            if cwd.is_relative() {
                let base = path
                    .parent()
                    .filter(|parent| !parent.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                config.cwd = Some(base.join(cwd));
            }
        }
        Ok(config)
    }
}

pub fn parse(text: &str) -> Result<OracleConfig> {
    let schema = compile_schema()?;
    let raw_json: JsonValue = serde_yaml::from_str(text).context("parse oracle yaml as json")?;
    if let Err(errors) = schema.validate(&raw_json) {
        let details: Vec<String> = errors.map(|err| err.to_string()).collect();
        anyhow::bail!("oracle schema validation failed:\n{}", details.join("\n"));
    }
    serde_yaml::from_str(text).context("parse oracle yaml")
}

fn compile_schema() -> Result<JSONSchema> {
    let schema_json: JsonValue =
        serde_json::from_str(ORACLE_SCHEMA).context("parse oracle schema")?;
    JSONSchema::compile(&schema_json).map_err(|err| anyhow!("compile oracle schema: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let config = parse(
            r#"
cmd: ["./launch.sh", "--headless"]
cwd: game
env:
  MODS_DIR: /tmp/mods
timeout_ms: 30000
reproduces_exit_codes: [134, 139]
"#,
        )
        .expect("parse");

        assert_eq!(config.cmd, vec!["./launch.sh", "--headless"]);
        assert_eq!(config.cwd, Some(PathBuf::from("game")));
        assert_eq!(config.env.get("MODS_DIR").map(String::as_str), Some("/tmp/mods"));
        assert_eq!(config.timeout_ms, Some(30000));
        assert_eq!(config.reproduces_exit_codes, Some(vec![134, 139]));
    }

    #[test]
    fn parse_rejects_missing_cmd() {
        let err = parse("timeout_ms: 10\n").expect_err("missing cmd");
        assert!(err.to_string().contains("oracle schema validation failed"));
    }

    #[test]
    fn parse_rejects_unknown_keys() {
        let err = parse("cmd: [\"true\"]\nretries: 3\n").expect_err("unknown key");
        assert!(format!("{err:#}").contains("retries"));
    }

    #[test]
    fn parse_rejects_empty_cmd() {
        assert!(parse("cmd: []\n").is_err());
    }

    #[test]
    fn inline_command_must_not_be_empty() {
        assert!(OracleConfig::from_command(Vec::new()).is_err());
    }
}
