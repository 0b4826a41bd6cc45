use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub struct ElementsFile {
    pub elements: Vec<String>,
    pub sha256: String,
}

pub fn load(path: &Path) -> Result<ElementsFile> {
    let data = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let text = std::str::from_utf8(&data)
        .with_context(|| format!("{}: elements file is not valid UTF-8", path.display()))?;
    let elements = parse(text);
    if elements.is_empty() {
        anyhow::bail!("{}: no elements", path.display());
    }
    Ok(ElementsFile {
        elements,
        sha256: crate::sha256_hex(&data),
    })
}

pub fn parse(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_blank_lines_and_comments() {
        let text = "# mods to bisect\nmodA.zip\n\n  modB.zip  \n#modC.zip\r\nmodD.zip\r\n";
        assert_eq!(parse(text), vec!["modA.zip", "modB.zip", "modD.zip"]);
    }

    #[test]
    fn parse_keeps_duplicates_in_order() {
        assert_eq!(parse("b\na\nb\n"), vec!["b", "a", "b"]);
    }
}
